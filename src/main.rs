fn main() -> anyhow::Result<()> {
    riego_lib::run()
}
