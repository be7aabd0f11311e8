use chrono::NaiveDateTime;

use crate::error::ErrorKind;

/// Current readings from the observation endpoint (O-A0003-001).
///
/// Timestamps are kept naive: CWB reports local Taiwan time with no offset.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentObservation {
    pub location_name: String,
    pub temperature: f64,
    pub wind_speed: f64,
    pub observation_time: NaiveDateTime,
}

/// First time-bucket of the 36h forecast endpoint (F-C0032-001).
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub description: String,
    pub weather_code: u16,
    pub rain_possibility: f64,
    pub comfortability: String,
}

/// The merged, immutable snapshot the rendering layer observes.
///
/// Replaced wholesale on every publication, never field-mutated in place:
/// while `is_loading` is true the remaining fields keep their previous
/// values so the dashboard can keep showing stale data during a refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub description: String,
    pub temperature: f64,
    pub wind_speed: f64,
    pub rain_possibility: f64,
    pub comfortability: String,
    pub weather_code: u16,
    pub observation_time: Option<NaiveDateTime>,
    pub is_loading: bool,
    pub last_error: Option<ErrorKind>,
}

impl WeatherSnapshot {
    /// Snapshot published at service initialization: loading, zero-valued.
    pub fn initial() -> Self {
        Self { is_loading: true, ..Self::default() }
    }

    /// Merge one completed fetch cycle. The two sources' field sets are
    /// disjoint by construction, so nothing is dropped or overwritten.
    pub fn from_parts(observation: CurrentObservation, forecast: ForecastSummary) -> Self {
        Self {
            location_name: observation.location_name,
            temperature: observation.temperature,
            wind_speed: observation.wind_speed,
            observation_time: Some(observation.observation_time),
            description: forecast.description,
            weather_code: forecast.weather_code,
            rain_possibility: forecast.rain_possibility,
            comfortability: forecast.comfortability,
            is_loading: false,
            last_error: None,
        }
    }
}
