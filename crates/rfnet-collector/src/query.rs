//! Read-only queries and the sensor directory.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use rfnet_core::{Sensor, StoredReading};
use rfnet_persistence::TimeRange;
use serde::Deserialize;

/// Raw range bounds; parsed by hand so bad values get a specific message.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeParams {
    pub fn to_range(&self) -> Result<TimeRange, ApiError> {
        Ok(TimeRange::new(
            parse_bound(self.start.as_deref(), "start")?,
            parse_bound(self.end.as_deref(), "end")?,
        ))
    }
}

fn parse_bound(raw: Option<&str>, name: &str) -> Result<Option<u64>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("illegal {name} time"))),
    }
}

/// `GET /api/v1/readings?start=&end=`
pub async fn get_readings(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<StoredReading>>, ApiError> {
    let range = params.to_range()?;
    let readings = state
        .with_store(move |store| store.readings_in_range(range))
        .await?;
    Ok(Json(readings))
}

/// `GET /api/v1/readings/latest`
pub async fn get_latest(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredReading>>, ApiError> {
    let readings = state.with_store(|store| store.latest_per_sensor()).await?;
    Ok(Json(readings))
}

/// `GET /api/v1/sensors`
pub async fn get_sensors(State(state): State<AppState>) -> Result<Json<Vec<Sensor>>, ApiError> {
    let sensors = state.with_store(|store| store.sensors()).await?;
    Ok(Json(sensors))
}

/// `POST /api/v1/sensors`
pub async fn post_sensor(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let sensor: Sensor =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state
        .with_store(move |store| store.upsert_sensor(&sensor))
        .await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(start: Option<&str>, end: Option<&str>) -> RangeParams {
        RangeParams {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    #[test]
    fn test_bounds_parsed() {
        let range = params(Some("100"), Some("200")).to_range().unwrap();
        assert_eq!(range, TimeRange::new(Some(100), Some(200)));
    }

    #[test]
    fn test_empty_bounds_are_open() {
        let range = params(Some(""), None).to_range().unwrap();
        assert_eq!(range, TimeRange::default());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        for (start, end, expected) in [
            (Some("abc"), None, "illegal start time"),
            (None, Some("-5"), "illegal end time"),
            (Some("1.5"), None, "illegal start time"),
        ] {
            match params(start, end).to_range() {
                Err(ApiError::BadRequest(msg)) => assert_eq!(msg, expected),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
