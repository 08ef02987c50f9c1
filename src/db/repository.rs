//! Repository functions for database CRUD operations

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::models::*;
use super::schema::*;
use crate::error::{StoreError, StoreResult};
use crate::watering::{Ledger, WateringRecord, WateringSchedule};

fn into_schedules(rows: Vec<ScheduleRow>) -> StoreResult<Vec<WateringSchedule>> {
    rows.into_iter().map(WateringSchedule::try_from).collect()
}

fn into_records(rows: Vec<RecordRow>) -> StoreResult<Vec<WateringRecord>> {
    rows.into_iter().map(WateringRecord::try_from).collect()
}

// ============================================================================
// WateringSchedule Repository
// ============================================================================

pub fn get_schedules(conn: &mut SqliteConnection) -> StoreResult<Vec<WateringSchedule>> {
    let rows = watering_schedules::table
        .order((watering_schedules::created_at.asc(), watering_schedules::id.asc()))
        .select(ScheduleRow::as_select())
        .load(conn)?;
    into_schedules(rows)
}

pub fn get_schedule_by_id(
    conn: &mut SqliteConnection,
    schedule_id: &str,
) -> StoreResult<Option<WateringSchedule>> {
    watering_schedules::table
        .filter(watering_schedules::id.eq(schedule_id))
        .select(ScheduleRow::as_select())
        .first(conn)
        .optional()?
        .map(WateringSchedule::try_from)
        .transpose()
}

/// Insert a schedule or overwrite the stored copy.
pub fn upsert_schedule(conn: &mut SqliteConnection, schedule: &WateringSchedule) -> StoreResult<()> {
    diesel::replace_into(watering_schedules::table)
        .values(ScheduleRow::from(schedule))
        .execute(conn)?;
    Ok(())
}

pub fn delete_schedule(conn: &mut SqliteConnection, schedule_id: &str) -> StoreResult<usize> {
    let deleted =
        diesel::delete(watering_schedules::table.filter(watering_schedules::id.eq(schedule_id)))
            .execute(conn)?;
    Ok(deleted)
}

// ============================================================================
// WateringRecord Repository
// ============================================================================

/// All records in the order they were written.
pub fn get_records(conn: &mut SqliteConnection) -> StoreResult<Vec<WateringRecord>> {
    let rows = watering_records::table
        .order((watering_records::watered_at.asc(), watering_records::created_at.asc()))
        .select(RecordRow::as_select())
        .load(conn)?;
    into_records(rows)
}

/// Records for one plant, most recent first.
pub fn get_records_for_plant(
    conn: &mut SqliteConnection,
    plant_id: &str,
) -> StoreResult<Vec<WateringRecord>> {
    let rows = watering_records::table
        .filter(watering_records::plant_id.eq(plant_id))
        .order(watering_records::watered_at.desc())
        .select(RecordRow::as_select())
        .load(conn)?;
    into_records(rows)
}

/// Store a watering and the schedule it moved forward, in one transaction.
pub fn record_watering(
    conn: &mut SqliteConnection,
    record: &WateringRecord,
    schedule: Option<&WateringSchedule>,
) -> StoreResult<()> {
    conn.transaction::<_, StoreError, _>(|conn| {
        diesel::insert_into(watering_records::table)
            .values(RecordRow::from(record))
            .execute(conn)?;
        if let Some(schedule) = schedule {
            upsert_schedule(conn, schedule)?;
        }
        Ok(())
    })
}

// ============================================================================
// Ledger
// ============================================================================

/// Replace everything stored with the given ledger.
pub fn sync_ledger(conn: &mut SqliteConnection, ledger: &Ledger) -> StoreResult<()> {
    conn.transaction::<_, StoreError, _>(|conn| {
        diesel::delete(watering_records::table).execute(conn)?;
        diesel::delete(watering_schedules::table).execute(conn)?;

        for schedule in &ledger.schedules {
            diesel::insert_into(watering_schedules::table)
                .values(ScheduleRow::from(schedule))
                .execute(conn)?;
        }
        for record in &ledger.records {
            diesel::insert_into(watering_records::table)
                .values(RecordRow::from(record))
                .execute(conn)?;
        }
        Ok(())
    })?;

    log::info!(
        "sync_ledger: stored {} schedules and {} records",
        ledger.schedules.len(),
        ledger.records.len()
    );
    Ok(())
}

pub fn load_ledger(conn: &mut SqliteConnection) -> StoreResult<Ledger> {
    let ledger = Ledger {
        schedules: get_schedules(conn)?,
        records: get_records(conn)?,
    };
    log::debug!(
        "load_ledger: found {} schedules and {} records",
        ledger.schedules.len(),
        ledger.records.len()
    );
    Ok(ledger)
}
