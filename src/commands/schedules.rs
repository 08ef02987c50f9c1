//! Schedule commands for managing plant watering schedules

use serde::{Deserialize, Serialize};

use super::{persist, CommandError};
use crate::db::repository;
use crate::state::AppState;
use crate::watering::{Clock, ScheduleUpdate, WateringAmount, WateringSchedule};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleInput {
    pub plant_id: String,
    pub frequency_days: i32,
    pub amount: String,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleInput {
    pub id: String,
    pub frequency_days: Option<i32>,
    pub amount: Option<String>,
    /// An empty string clears the notes
    pub notes: Option<String>,
    pub active: Option<bool>,
}

impl UpdateScheduleInput {
    fn into_update(self) -> Result<(String, ScheduleUpdate), String> {
        let amount = self
            .amount
            .map(|a| a.parse::<WateringAmount>())
            .transpose()
            .map_err(|e| e.to_string())?;
        let notes = self
            .notes
            .map(|n| if n.trim().is_empty() { None } else { Some(n) });

        Ok((
            self.id,
            ScheduleUpdate {
                frequency_days: self.frequency_days,
                amount,
                notes,
                active: self.active,
            },
        ))
    }
}

pub fn get_schedules<C: Clock>(state: &AppState<C>) -> Result<Vec<WateringSchedule>, String> {
    Ok(state.engine.schedules())
}

pub fn get_schedule<C: Clock>(
    state: &AppState<C>,
    id: String,
) -> Result<Option<WateringSchedule>, String> {
    Ok(state.engine.schedule(&id))
}

pub fn create_schedule<C: Clock>(
    state: &AppState<C>,
    input: CreateScheduleInput,
) -> Result<WateringSchedule, String> {
    let amount = input
        .amount
        .parse::<WateringAmount>()
        .map_err(|e| e.to_string())?;

    state
        .engine
        .create_schedule_with(
            &input.plant_id,
            input.frequency_days,
            amount,
            input.notes,
            |schedule| persist(state, |conn| repository::upsert_schedule(conn, schedule)),
        )
        .map_err(|e: CommandError| e.to_string())
}

pub fn update_schedule<C: Clock>(
    state: &AppState<C>,
    input: UpdateScheduleInput,
) -> Result<WateringSchedule, String> {
    let (id, update) = input.into_update()?;
    if update.is_empty() {
        log::debug!("update_schedule called without changes for {}", id);
    }

    state
        .engine
        .update_schedule_with(&id, update, |schedule| {
            persist(state, |conn| repository::upsert_schedule(conn, schedule))
        })
        .map_err(|e: CommandError| e.to_string())
}

pub fn delete_schedule<C: Clock>(state: &AppState<C>, id: String) -> Result<(), String> {
    state
        .engine
        .delete_schedule_with(&id, |schedule| {
            persist(state, |conn| {
                repository::delete_schedule(conn, &schedule.id).map(|_| ())
            })
        })
        .map_err(|e: CommandError| e.to_string())
}
