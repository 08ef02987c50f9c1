//! Derived watering status: pure functions of a schedule and "now".

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::models::WateringSchedule;
use super::ports::Plant;

/// What to do when `now` is earlier than the last watering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkewPolicy {
    /// Negative elapsed time counts as zero days.
    #[default]
    Clamp,
    /// Keep the signed ceiling, so a future watering can yield negative days.
    Signed,
}

impl std::str::FromStr for SkewPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "signed" => Ok(Self::Signed),
            other => Err(format!("unknown skew policy '{}'", other)),
        }
    }
}

/// Urgency shown next to a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Unscheduled,
    Ok,
    Due,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantWateringStatus {
    pub plant_id: String,
    pub schedule_id: String,
    pub frequency_days: i32,
    pub days_since_watered: i64,
    pub needs_watering: bool,
    pub next_due_at: DateTime<Utc>,
    pub urgency: Urgency,
}

/// A catalog plant joined with its status, if it has a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantWithWatering {
    pub plant: Plant,
    pub status: Option<PlantWateringStatus>,
    pub days_since_watered: i64,
    pub needs_watering: bool,
    pub urgency: Urgency,
}

impl PlantWithWatering {
    pub fn new(plant: Plant, status: Option<PlantWateringStatus>) -> Self {
        let (days_since_watered, needs_watering, urgency) = match &status {
            Some(s) => (s.days_since_watered, s.needs_watering, s.urgency),
            None => (0, false, Urgency::Unscheduled),
        };
        Self {
            plant,
            status,
            days_since_watered,
            needs_watering,
            urgency,
        }
    }
}

/// Whole days since `last_watered_at`, rounded up.
pub fn days_since_watered(
    last_watered_at: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: SkewPolicy,
) -> i64 {
    let elapsed = now - last_watered_at;
    if elapsed < Duration::zero() && policy == SkewPolicy::Clamp {
        return 0;
    }
    // `num_days` truncates toward zero, which is already the ceiling for
    // negative values. The remainder keeps full nanosecond precision.
    let days = elapsed.num_days();
    if elapsed - Duration::days(days) > Duration::zero() {
        days + 1
    } else {
        days
    }
}

pub fn urgency(days_since_watered: i64, frequency_days: i32, needs_watering: bool) -> Urgency {
    if needs_watering && days_since_watered > i64::from(frequency_days) + 1 {
        Urgency::Overdue
    } else if needs_watering {
        Urgency::Due
    } else {
        Urgency::Ok
    }
}

/// Project a schedule onto `now`. Pure.
pub fn compute(
    schedule: &WateringSchedule,
    now: DateTime<Utc>,
    policy: SkewPolicy,
) -> PlantWateringStatus {
    let days = days_since_watered(schedule.last_watered_at, now, policy);
    let needs_watering = days >= i64::from(schedule.frequency_days);
    PlantWateringStatus {
        plant_id: schedule.plant_id.clone(),
        schedule_id: schedule.id.clone(),
        frequency_days: schedule.frequency_days,
        days_since_watered: days,
        needs_watering,
        next_due_at: schedule.next_due_at,
        urgency: urgency(days, schedule.frequency_days, needs_watering),
    }
}
