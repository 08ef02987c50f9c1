//! Watering commands: logging waterings and reading derived status

use serde::{Deserialize, Serialize};

use super::{persist, CommandError};
use crate::db::repository;
use crate::state::AppState;
use crate::watering::{
    CalendarDay, Clock, PlantWateringStatus, PlantWithWatering, WateringAmount, WateringRecord,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWateringInput {
    pub plant_id: String,
    pub amount: String,
    pub observations: Option<String>,
}

pub fn record_watering<C: Clock>(
    state: &AppState<C>,
    input: RecordWateringInput,
) -> Result<WateringRecord, String> {
    let amount = input
        .amount
        .parse::<WateringAmount>()
        .map_err(|e| e.to_string())?;

    state
        .engine
        .record_watering_with(
            &input.plant_id,
            amount,
            input.observations,
            |record, schedule| {
                persist(state, |conn| repository::record_watering(conn, record, schedule))
            },
        )
        .map_err(|e: CommandError| e.to_string())
}

pub fn get_plant_status<C: Clock>(
    state: &AppState<C>,
    plant_id: String,
) -> Result<Option<PlantWateringStatus>, String> {
    Ok(state.engine.compute_status(&plant_id, state.engine.now()))
}

pub fn get_plants_needing_water<C: Clock>(
    state: &AppState<C>,
) -> Result<Vec<PlantWateringStatus>, String> {
    Ok(state.engine.list_needing_water(state.engine.now()))
}

pub fn get_plants_due_today<C: Clock>(
    state: &AppState<C>,
) -> Result<Vec<PlantWateringStatus>, String> {
    Ok(state.engine.list_due_today(state.engine.now()))
}

pub fn get_watering_history<C: Clock>(
    state: &AppState<C>,
    plant_id: String,
) -> Result<Vec<WateringRecord>, String> {
    Ok(state.engine.history_for(&plant_id))
}

pub fn get_plants_with_watering<C: Clock>(
    state: &AppState<C>,
) -> Result<Vec<PlantWithWatering>, String> {
    Ok(state.engine.plants_with_status(state.engine.now()))
}

pub fn get_watering_calendar<C: Clock>(
    state: &AppState<C>,
    year: i32,
    month: u32,
) -> Result<Vec<CalendarDay>, String> {
    state
        .engine
        .calendar_month(year, month)
        .map_err(|e| e.to_string())
}

/// Everything the garden overview shows at once.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WateringDashboard {
    pub plants: Vec<PlantWithWatering>,
    pub needing_water: Vec<PlantWateringStatus>,
    pub due_today: Vec<PlantWateringStatus>,
}

pub fn get_watering_dashboard<C: Clock>(state: &AppState<C>) -> Result<WateringDashboard, String> {
    let now = state.engine.now();
    Ok(WateringDashboard {
        plants: state.engine.plants_with_status(now),
        needing_water: state.engine.list_needing_water(now),
        due_today: state.engine.list_due_today(now),
    })
}
