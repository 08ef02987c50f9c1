//! The watering schedule engine.
//!
//! All mutable state (schedules and the watering log) lives in a single
//! [`Ledger`] behind one `RwLock`. Every mutation takes the write lock once,
//! so a reader never sees a new watering record without the matching
//! schedule update, or the other way round.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use super::calendar::{self, CalendarDay};
use super::models::{
    validate_frequency, Ledger, ScheduleUpdate, WateringAmount, WateringRecord, WateringSchedule,
};
use super::ports::{Clock, PlantCatalog};
use super::status::{self, PlantWateringStatus, PlantWithWatering, SkewPolicy};
use crate::error::{WateringError, WateringResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    pub skew_policy: SkewPolicy,
    /// Offset used to decide which calendar day a timestamp falls on.
    pub utc_offset: FixedOffset,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            skew_policy: SkewPolicy::Clamp,
            utc_offset: Utc.fix(),
        }
    }
}

pub struct WateringEngine<P, C> {
    catalog: P,
    clock: C,
    options: EngineOptions,
    ledger: RwLock<Ledger>,
}

impl<P: PlantCatalog, C: Clock> WateringEngine<P, C> {
    pub fn new(catalog: P, clock: C) -> Self {
        Self::with_options(catalog, clock, EngineOptions::default())
    }

    pub fn with_options(catalog: P, clock: C, options: EngineOptions) -> Self {
        Self {
            catalog,
            clock,
            options,
            ledger: RwLock::new(Ledger::default()),
        }
    }

    /// Rebuild an engine from a previously captured ledger.
    ///
    /// `next_due_at` is re-derived for every schedule. A schedule whose
    /// frequency is out of range rejects the whole ledger.
    pub fn restore(
        catalog: P,
        clock: C,
        options: EngineOptions,
        mut ledger: Ledger,
    ) -> WateringResult<Self> {
        for schedule in &mut ledger.schedules {
            validate_frequency(schedule.frequency_days)?;
            schedule.refresh_next_due()?;
        }
        log::debug!(
            "Restored watering ledger: {} schedules, {} records",
            ledger.schedules.len(),
            ledger.records.len()
        );
        Ok(Self {
            catalog,
            clock,
            options,
            ledger: RwLock::new(ledger),
        })
    }

    /// Current time according to the engine's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_known_plant(&self, plant_id: &str) -> WateringResult<()> {
        if self.catalog.exists(plant_id) {
            Ok(())
        } else {
            log::warn!("Rejected unknown plant id '{}'", plant_id);
            Err(WateringError::validation(format!("unknown plant '{}'", plant_id)))
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    //
    // Each `*_with` variant computes the change under the write lock, hands it
    // to `commit`, and applies it only if `commit` succeeds. The lock is held
    // throughout, so nothing else can interleave between the two.
    // ------------------------------------------------------------------------

    /// Start watering a plant every `frequency_days`, counting from now.
    pub fn create_schedule(
        &self,
        plant_id: &str,
        frequency_days: i32,
        amount: WateringAmount,
        notes: Option<String>,
    ) -> WateringResult<WateringSchedule> {
        self.create_schedule_with(plant_id, frequency_days, amount, notes, |_| Ok(()))
    }

    pub fn create_schedule_with<E: From<WateringError>>(
        &self,
        plant_id: &str,
        frequency_days: i32,
        amount: WateringAmount,
        notes: Option<String>,
        commit: impl FnOnce(&WateringSchedule) -> Result<(), E>,
    ) -> Result<WateringSchedule, E> {
        self.ensure_known_plant(plant_id)?;
        validate_frequency(frequency_days)?;

        let now = self.clock.now();
        let mut ledger = self.write();
        if ledger.schedules.iter().any(|s| s.plant_id == plant_id) {
            log::warn!("Plant '{}' already has a watering schedule", plant_id);
            return Err(WateringError::Conflict(format!(
                "plant '{}' already has a watering schedule",
                plant_id
            ))
            .into());
        }

        let mut schedule = WateringSchedule {
            id: uuid::Uuid::new_v4().to_string(),
            plant_id: plant_id.to_string(),
            frequency_days,
            last_watered_at: now,
            next_due_at: now,
            amount,
            notes,
            active: true,
            created_at: now,
            updated_at: now,
        };
        schedule.refresh_next_due()?;
        commit(&schedule)?;
        ledger.schedules.push(schedule.clone());

        log::info!(
            "Created watering schedule {} for plant {} (every {} days)",
            schedule.id,
            plant_id,
            frequency_days
        );
        Ok(schedule)
    }

    /// Apply a partial edit. On failure the schedule is left untouched.
    pub fn update_schedule(
        &self,
        schedule_id: &str,
        update: ScheduleUpdate,
    ) -> WateringResult<WateringSchedule> {
        self.update_schedule_with(schedule_id, update, |_| Ok(()))
    }

    pub fn update_schedule_with<E: From<WateringError>>(
        &self,
        schedule_id: &str,
        update: ScheduleUpdate,
        commit: impl FnOnce(&WateringSchedule) -> Result<(), E>,
    ) -> Result<WateringSchedule, E> {
        let now = self.clock.now();
        let mut ledger = self.write();
        let current = ledger
            .schedules
            .iter_mut()
            .find(|s| s.id == schedule_id)
            .ok_or_else(|| WateringError::schedule_not_found(schedule_id))?;

        let mut edited = current.clone();
        if let Some(frequency_days) = update.frequency_days {
            edited.frequency_days = frequency_days;
        }
        if let Some(amount) = update.amount {
            edited.amount = amount;
        }
        if let Some(notes) = update.notes {
            edited.notes = notes;
        }
        if let Some(active) = update.active {
            edited.active = active;
        }
        validate_frequency(edited.frequency_days)?;
        edited.refresh_next_due()?;
        edited.updated_at = now;

        commit(&edited)?;
        *current = edited.clone();

        log::info!("Updated watering schedule {}", schedule_id);
        Ok(edited)
    }

    /// Remove a schedule. The plant's watering history is kept.
    pub fn delete_schedule(&self, schedule_id: &str) -> WateringResult<()> {
        self.delete_schedule_with(schedule_id, |_| Ok(()))
    }

    pub fn delete_schedule_with<E: From<WateringError>>(
        &self,
        schedule_id: &str,
        commit: impl FnOnce(&WateringSchedule) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut ledger = self.write();
        let index = ledger
            .schedules
            .iter()
            .position(|s| s.id == schedule_id)
            .ok_or_else(|| WateringError::schedule_not_found(schedule_id))?;

        commit(&ledger.schedules[index])?;
        let removed = ledger.schedules.remove(index);

        log::info!(
            "Deleted watering schedule {} for plant {}",
            schedule_id,
            removed.plant_id
        );
        Ok(())
    }

    /// Log a watering now and move the plant's schedule forward.
    ///
    /// A plant without a schedule still gets its record.
    pub fn record_watering(
        &self,
        plant_id: &str,
        amount: WateringAmount,
        observations: Option<String>,
    ) -> WateringResult<WateringRecord> {
        self.record_watering_with(plant_id, amount, observations, |_, _| Ok(()))
    }

    /// `commit` sees the new record and the schedule exactly as the watering
    /// leaves it.
    pub fn record_watering_with<E: From<WateringError>>(
        &self,
        plant_id: &str,
        amount: WateringAmount,
        observations: Option<String>,
        commit: impl FnOnce(&WateringRecord, Option<&WateringSchedule>) -> Result<(), E>,
    ) -> Result<WateringRecord, E> {
        self.ensure_known_plant(plant_id)?;

        let now = self.clock.now();
        let record = WateringRecord {
            id: uuid::Uuid::new_v4().to_string(),
            plant_id: plant_id.to_string(),
            watered_at: now,
            amount,
            observations,
            created_at: now,
        };

        let mut ledger = self.write();
        let moved = match ledger.schedules.iter().position(|s| s.plant_id == plant_id) {
            Some(index) => {
                let mut edited = ledger.schedules[index].clone();
                edited.last_watered_at = now;
                edited.refresh_next_due()?;
                edited.updated_at = now;
                Some((index, edited))
            }
            None => None,
        };

        commit(&record, moved.as_ref().map(|(_, schedule)| schedule))?;
        if let Some((index, schedule)) = moved {
            ledger.schedules[index] = schedule;
        }
        ledger.records.push(record.clone());

        log::info!("Recorded {} watering for plant {}", amount, plant_id);
        Ok(record)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn schedules(&self) -> Vec<WateringSchedule> {
        self.read().schedules.clone()
    }

    pub fn schedule(&self, schedule_id: &str) -> Option<WateringSchedule> {
        self.read()
            .schedules
            .iter()
            .find(|s| s.id == schedule_id)
            .cloned()
    }

    pub fn schedule_for_plant(&self, plant_id: &str) -> Option<WateringSchedule> {
        self.read()
            .schedules
            .iter()
            .find(|s| s.plant_id == plant_id)
            .cloned()
    }

    /// Consistent copy of everything the engine holds.
    pub fn snapshot(&self) -> Ledger {
        self.read().clone()
    }

    /// Status of a plant's schedule at `now`, or `None` when it has none.
    pub fn compute_status(&self, plant_id: &str, now: DateTime<Utc>) -> Option<PlantWateringStatus> {
        self.read()
            .schedules
            .iter()
            .find(|s| s.plant_id == plant_id)
            .map(|s| status::compute(s, now, self.options.skew_policy))
    }

    /// Active schedules that need watering, most overdue first.
    pub fn list_needing_water(&self, now: DateTime<Utc>) -> Vec<PlantWateringStatus> {
        let mut statuses: Vec<PlantWateringStatus> = self
            .read()
            .schedules
            .iter()
            .filter(|s| s.active)
            .map(|s| status::compute(s, now, self.options.skew_policy))
            .filter(|s| s.needs_watering)
            .collect();
        statuses.sort_by(|a, b| {
            b.days_since_watered
                .cmp(&a.days_since_watered)
                .then_with(|| a.plant_id.cmp(&b.plant_id))
        });
        statuses
    }

    /// Active schedules falling due on `date`, earliest first.
    pub fn due_on(&self, date: NaiveDate, now: DateTime<Utc>) -> Vec<PlantWateringStatus> {
        let offset = self.options.utc_offset;
        let mut statuses: Vec<PlantWateringStatus> = self
            .read()
            .schedules
            .iter()
            .filter(|s| s.active && calendar::local_date(s.next_due_at, offset) == date)
            .map(|s| status::compute(s, now, self.options.skew_policy))
            .collect();
        statuses.sort_by(|a, b| {
            a.next_due_at
                .cmp(&b.next_due_at)
                .then_with(|| a.plant_id.cmp(&b.plant_id))
        });
        statuses
    }

    /// Active schedules falling due on the same calendar day as `now`.
    pub fn list_due_today(&self, now: DateTime<Utc>) -> Vec<PlantWateringStatus> {
        self.due_on(calendar::local_date(now, self.options.utc_offset), now)
    }

    pub fn calendar_month(&self, year: i32, month: u32) -> WateringResult<Vec<CalendarDay>> {
        calendar::month_view(&self.read().schedules, year, month, self.options.utc_offset)
    }

    /// Every catalog plant with its watering status.
    pub fn plants_with_status(&self, now: DateTime<Utc>) -> Vec<PlantWithWatering> {
        let plants = self.catalog.plants();
        let ledger = self.read();
        plants
            .into_iter()
            .map(|plant| {
                let status = ledger
                    .schedules
                    .iter()
                    .find(|s| s.plant_id == plant.id)
                    .map(|s| status::compute(s, now, self.options.skew_policy));
                PlantWithWatering::new(plant, status)
            })
            .collect()
    }

    /// Watering history of a plant, most recent first.
    pub fn history_for(&self, plant_id: &str) -> Vec<WateringRecord> {
        let mut history: Vec<WateringRecord> = self
            .read()
            .records
            .iter()
            .rev()
            .filter(|r| r.plant_id == plant_id)
            .cloned()
            .collect();
        // Stable, so records sharing a timestamp keep newest-appended first.
        history.sort_by(|a, b| b.watered_at.cmp(&a.watered_at));
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watering::models::next_due;
    use crate::watering::ports::{InMemoryCatalog, ManualClock, Plant};
    use crate::watering::status::Urgency;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 4, 10, 0, 0).unwrap()
    }

    fn plant(id: &str) -> Plant {
        Plant {
            id: id.to_string(),
            name: format!("Plant {}", id),
            variety: String::new(),
            bed_id: None,
        }
    }

    fn engine() -> (WateringEngine<InMemoryCatalog, Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let catalog = InMemoryCatalog::new(vec![plant("p1"), plant("p2"), plant("p3")]);
        (WateringEngine::new(catalog, clock.clone()), clock)
    }

    fn assert_next_due_invariant(engine: &WateringEngine<InMemoryCatalog, Arc<ManualClock>>) {
        for s in engine.schedules() {
            assert_eq!(Ok(s.next_due_at), next_due(s.last_watered_at, s.frequency_days));
        }
    }

    // ------------------------------------------------------------------------
    // create_schedule
    // ------------------------------------------------------------------------

    #[test]
    fn create_schedule_starts_from_now() {
        let (engine, _) = engine();
        let s = engine
            .create_schedule("p1", 3, WateringAmount::Moderate, Some("mornings".into()))
            .unwrap();

        assert_eq!(s.last_watered_at, t0());
        assert_eq!(s.next_due_at, t0() + Duration::days(3));
        assert_eq!(s.created_at, t0());
        assert_eq!(s.updated_at, t0());
        assert!(s.active);
        assert_eq!(s.notes.as_deref(), Some("mornings"));
        assert_next_due_invariant(&engine);
    }

    #[test]
    fn create_schedule_rejects_zero_frequency() {
        let (engine, _) = engine();
        let err = engine
            .create_schedule("p1", 0, WateringAmount::Light, None)
            .unwrap_err();
        assert!(matches!(err, WateringError::Validation(_)));
        assert!(engine.schedules().is_empty());
    }

    #[test]
    fn create_schedule_rejects_huge_frequency() {
        let (engine, _) = engine();
        let err = engine
            .create_schedule("p1", i32::MAX, WateringAmount::Light, None)
            .unwrap_err();
        assert!(matches!(err, WateringError::Validation(_)));
        assert!(engine.schedules().is_empty());
    }

    #[test]
    fn failed_commit_leaves_no_schedule() {
        let (engine, _) = engine();
        let err = engine
            .create_schedule_with("p1", 3, WateringAmount::Light, None, |_| {
                Err(WateringError::Conflict("disk full".into()))
            })
            .unwrap_err();
        assert_eq!(err, WateringError::Conflict("disk full".into()));
        assert!(engine.schedules().is_empty());

        // Nothing was applied, so a retry is not a conflict.
        engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
    }

    #[test]
    fn create_schedule_rejects_unknown_plant() {
        let (engine, _) = engine();
        let err = engine
            .create_schedule("nope", 2, WateringAmount::Light, None)
            .unwrap_err();
        assert!(matches!(err, WateringError::Validation(_)));
    }

    #[test]
    fn second_schedule_for_same_plant_conflicts() {
        let (engine, _) = engine();
        engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        let err = engine
            .create_schedule("p1", 5, WateringAmount::Abundant, None)
            .unwrap_err();
        assert!(matches!(err, WateringError::Conflict(_)));
        assert_eq!(engine.schedules().len(), 1);
    }

    // ------------------------------------------------------------------------
    // update_schedule / delete_schedule
    // ------------------------------------------------------------------------

    #[test]
    fn update_recomputes_next_due_from_last_watering() {
        let (engine, clock) = engine();
        let s = engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        clock.advance(Duration::days(1));

        let updated = engine
            .update_schedule(
                &s.id,
                ScheduleUpdate {
                    frequency_days: Some(5),
                    amount: Some(WateringAmount::Abundant),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.frequency_days, 5);
        assert_eq!(updated.amount, WateringAmount::Abundant);
        assert_eq!(updated.last_watered_at, t0());
        assert_eq!(updated.next_due_at, t0() + Duration::days(5));
        assert_eq!(updated.updated_at, t0() + Duration::days(1));
        assert_next_due_invariant(&engine);
    }

    #[test]
    fn failed_update_changes_nothing() {
        let (engine, clock) = engine();
        let s = engine
            .create_schedule("p1", 3, WateringAmount::Light, Some("keep".into()))
            .unwrap();
        clock.advance(Duration::hours(2));

        let err = engine
            .update_schedule(
                &s.id,
                ScheduleUpdate {
                    frequency_days: Some(0),
                    notes: Some(None),
                    active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(err, WateringError::Validation(_)));
        assert_eq!(engine.schedule(&s.id), Some(s));
    }

    #[test]
    fn update_to_huge_frequency_changes_nothing() {
        let (engine, _) = engine();
        let s = engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        let err = engine
            .update_schedule(
                &s.id,
                ScheduleUpdate { frequency_days: Some(i32::MAX), ..Default::default() },
            )
            .unwrap_err();
        assert!(matches!(err, WateringError::Validation(_)));
        assert_eq!(engine.schedule(&s.id), Some(s));
    }

    #[test]
    fn failed_commit_keeps_update_and_delete_unapplied() {
        let (engine, clock) = engine();
        let s = engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        clock.advance(Duration::hours(1));
        let refuse = |_: &WateringSchedule| -> WateringResult<()> {
            Err(WateringError::validation("refused"))
        };

        engine
            .update_schedule_with(
                &s.id,
                ScheduleUpdate { frequency_days: Some(7), ..Default::default() },
                refuse,
            )
            .unwrap_err();
        engine.delete_schedule_with(&s.id, refuse).unwrap_err();

        assert_eq!(engine.schedules(), vec![s]);
    }

    #[test]
    fn update_unknown_schedule_is_not_found() {
        let (engine, _) = engine();
        let err = engine
            .update_schedule("missing", ScheduleUpdate::default())
            .unwrap_err();
        assert!(matches!(err, WateringError::NotFound { entity: "Schedule", .. }));
    }

    #[test]
    fn update_can_clear_notes_and_deactivate() {
        let (engine, _) = engine();
        let s = engine
            .create_schedule("p1", 3, WateringAmount::Light, Some("note".into()))
            .unwrap();
        let updated = engine
            .update_schedule(
                &s.id,
                ScheduleUpdate {
                    notes: Some(None),
                    active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.notes, None);
        assert!(!updated.active);
    }

    #[test]
    fn delete_twice_fails_the_second_time() {
        let (engine, _) = engine();
        let s = engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        engine.delete_schedule(&s.id).unwrap();
        let err = engine.delete_schedule(&s.id).unwrap_err();
        assert!(matches!(err, WateringError::NotFound { .. }));
    }

    #[test]
    fn delete_keeps_history() {
        let (engine, _) = engine();
        let s = engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        engine.record_watering("p1", WateringAmount::Light, None).unwrap();
        engine.delete_schedule(&s.id).unwrap();

        assert_eq!(engine.history_for("p1").len(), 1);
        assert_eq!(engine.compute_status("p1", t0()), None);
    }

    // ------------------------------------------------------------------------
    // record_watering
    // ------------------------------------------------------------------------

    #[test]
    fn recording_moves_schedule_forward() {
        let (engine, clock) = engine();
        engine.create_schedule("p1", 3, WateringAmount::Moderate, None).unwrap();
        clock.advance(Duration::days(4));

        let record = engine
            .record_watering("p1", WateringAmount::Abundant, Some("dry soil".into()))
            .unwrap();
        let s = engine.schedule_for_plant("p1").unwrap();

        assert_eq!(record.watered_at, t0() + Duration::days(4));
        assert_eq!(s.last_watered_at, record.watered_at);
        assert_eq!(s.next_due_at, t0() + Duration::days(7));
        assert!(!engine.compute_status("p1", clock.now()).unwrap().needs_watering);
        assert_next_due_invariant(&engine);
    }

    #[test]
    fn commit_sees_moved_schedule_and_failure_rolls_back() {
        let (engine, clock) = engine();
        let before = engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        clock.advance(Duration::days(2));

        let err = engine
            .record_watering_with("p1", WateringAmount::Light, None, |record, schedule| {
                let schedule = schedule.unwrap();
                assert_eq!(schedule.last_watered_at, record.watered_at);
                assert_eq!(schedule.next_due_at, record.watered_at + Duration::days(3));
                Err(WateringError::validation("refused"))
            })
            .unwrap_err();

        assert!(matches!(err, WateringError::Validation(_)));
        assert!(engine.history_for("p1").is_empty());
        assert_eq!(engine.schedule_for_plant("p1"), Some(before));
    }

    #[test]
    fn recording_near_the_end_of_time_fails_cleanly() {
        let (engine, clock) = engine();
        let before = engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        clock.set(DateTime::<Utc>::MAX_UTC - Duration::days(1));

        let err = engine
            .record_watering("p1", WateringAmount::Light, None)
            .unwrap_err();

        assert!(matches!(err, WateringError::Validation(_)));
        assert!(engine.history_for("p1").is_empty());
        assert_eq!(engine.schedule_for_plant("p1"), Some(before));
        assert_next_due_invariant(&engine);
    }

    #[test]
    fn recording_without_schedule_still_logs() {
        let (engine, _) = engine();
        engine.record_watering("p2", WateringAmount::Light, None).unwrap();
        assert_eq!(engine.history_for("p2").len(), 1);
        assert!(engine.schedule_for_plant("p2").is_none());
    }

    #[test]
    fn recording_for_unknown_plant_fails() {
        let (engine, _) = engine();
        let err = engine
            .record_watering("ghost", WateringAmount::Light, None)
            .unwrap_err();
        assert!(matches!(err, WateringError::Validation(_)));
        assert!(engine.snapshot().records.is_empty());
    }

    #[test]
    fn history_grows_by_one_per_watering_newest_first() {
        let (engine, clock) = engine();
        for n in 1..=3 {
            engine.record_watering("p1", WateringAmount::Light, None).unwrap();
            assert_eq!(engine.history_for("p1").len(), n);
            clock.advance(Duration::hours(6));
        }
        engine.record_watering("p2", WateringAmount::Light, None).unwrap();

        let history = engine.history_for("p1");
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].watered_at >= w[1].watered_at));
        assert_eq!(history[0].watered_at, t0() + Duration::hours(12));
    }

    #[test]
    fn same_instant_waterings_list_latest_appended_first() {
        let (engine, _) = engine();
        let first = engine.record_watering("p1", WateringAmount::Light, None).unwrap();
        let second = engine.record_watering("p1", WateringAmount::Abundant, None).unwrap();
        let history = engine.history_for("p1");
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
    }

    // ------------------------------------------------------------------------
    // Derived lists
    // ------------------------------------------------------------------------

    #[test]
    fn needing_water_is_most_overdue_first_and_skips_inactive() {
        let (engine, clock) = engine();
        engine.create_schedule("p1", 2, WateringAmount::Light, None).unwrap();
        clock.advance(Duration::days(1));
        engine.create_schedule("p2", 1, WateringAmount::Light, None).unwrap();
        let p3 = engine.create_schedule("p3", 1, WateringAmount::Light, None).unwrap();
        engine
            .update_schedule(&p3.id, ScheduleUpdate { active: Some(false), ..Default::default() })
            .unwrap();

        let now = t0() + Duration::days(4);
        let needing = engine.list_needing_water(now);
        let ids: Vec<&str> = needing.iter().map(|s| s.plant_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(needing[0].days_since_watered, 4);
        assert_eq!(needing[0].urgency, Urgency::Overdue);
        assert_eq!(needing[1].days_since_watered, 3);
    }

    #[test]
    fn needing_water_ties_break_on_plant_id() {
        let (engine, _) = engine();
        engine.create_schedule("p3", 1, WateringAmount::Light, None).unwrap();
        engine.create_schedule("p1", 1, WateringAmount::Light, None).unwrap();
        let needing = engine.list_needing_water(t0() + Duration::days(2));
        let ids: Vec<&str> = needing.iter().map(|s| s.plant_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[test]
    fn due_today_uses_calendar_day_not_24h_window() {
        let (engine, _) = engine();
        // due 2025-01-07 10:00
        engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();

        let early_same_day = Utc.with_ymd_and_hms(2025, 1, 7, 0, 5, 0).unwrap();
        let late_same_day = Utc.with_ymd_and_hms(2025, 1, 7, 23, 55, 0).unwrap();
        let within_24h_day_before = Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap();

        assert_eq!(engine.list_due_today(early_same_day).len(), 1);
        assert_eq!(engine.list_due_today(late_same_day).len(), 1);
        assert!(engine.list_due_today(within_24h_day_before).is_empty());
    }

    #[test]
    fn due_today_respects_offset() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 4, 23, 30, 0).unwrap()));
        let options = EngineOptions {
            skew_policy: SkewPolicy::Clamp,
            utc_offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        };
        let engine = WateringEngine::with_options(
            InMemoryCatalog::new(vec![plant("p1")]),
            clock,
            options,
        );
        // due 2025-01-05 23:30 UTC, which is 2025-01-06 01:30 at +02:00
        engine.create_schedule("p1", 1, WateringAmount::Light, None).unwrap();

        let now = Utc.with_ymd_and_hms(2025, 1, 5, 23, 0, 0).unwrap(); // 01-06 01:00 local
        assert_eq!(engine.list_due_today(now).len(), 1);
        let now = Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap(); // 01-05 local
        assert!(engine.list_due_today(now).is_empty());
    }

    #[test]
    fn plants_with_status_covers_whole_catalog() {
        let (engine, _) = engine();
        engine.create_schedule("p2", 2, WateringAmount::Light, None).unwrap();

        let all = engine.plants_with_status(t0() + Duration::days(2));
        assert_eq!(all.len(), 3);
        let p1 = all.iter().find(|p| p.plant.id == "p1").unwrap();
        let p2 = all.iter().find(|p| p.plant.id == "p2").unwrap();
        assert_eq!(p1.urgency, Urgency::Unscheduled);
        assert!(p1.status.is_none());
        assert!(p2.needs_watering);
        assert_eq!(p2.urgency, Urgency::Due);
    }

    #[test]
    fn calendar_month_lists_due_plants() {
        let (engine, _) = engine();
        engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        let days = engine.calendar_month(2025, 1).unwrap();
        assert_eq!(days[6].plant_ids, vec!["p1".to_string()]);
        assert!(engine.calendar_month(2025, 14).is_err());
    }

    #[test]
    fn restore_rederives_next_due() {
        let (engine, _) = engine();
        engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        let mut ledger = engine.snapshot();
        ledger.schedules[0].next_due_at = t0();

        let clock = Arc::new(ManualClock::new(t0()));
        let restored = WateringEngine::restore(
            InMemoryCatalog::new(vec![plant("p1")]),
            clock,
            EngineOptions::default(),
            ledger,
        )
        .unwrap();
        assert_eq!(
            restored.schedule_for_plant("p1").unwrap().next_due_at,
            t0() + Duration::days(3)
        );
    }

    #[test]
    fn restore_rejects_out_of_range_frequency() {
        let (engine, _) = engine();
        engine.create_schedule("p1", 3, WateringAmount::Light, None).unwrap();
        let mut ledger = engine.snapshot();
        ledger.schedules[0].frequency_days = i32::MAX;

        let result = WateringEngine::restore(
            InMemoryCatalog::new(vec![plant("p1")]),
            Arc::new(ManualClock::new(t0())),
            EngineOptions::default(),
            ledger,
        );
        assert!(matches!(result, Err(WateringError::Validation(_))));
    }
}
