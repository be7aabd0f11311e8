use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::model::{CurrentObservation, ForecastSummary};

const OBS_DATASET: &str = "O-A0003-001";
const FORECAST_DATASET: &str = "F-C0032-001";
const OBS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the CWB open-data datastore.
///
/// Each call is a fresh, independent request: no retries, no timeouts,
/// no caching.
#[derive(Debug, Clone)]
pub struct CwbClient {
    http: Client,
    base_url: String,
    authorization_key: String,
}

impl CwbClient {
    pub fn new(base_url: impl Into<String>, authorization_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            authorization_key: authorization_key.into(),
        }
    }

    /// Fetch the latest station observation for `location_name`.
    pub async fn fetch_observation(
        &self,
        location_name: &str,
    ) -> Result<CurrentObservation, FetchError> {
        let body = self.fetch_dataset(OBS_DATASET, location_name).await?;
        parse_observation(&body)
    }

    /// Fetch the 36h forecast for `city_name`.
    ///
    /// Note the coarser granularity: forecasts key on the county/city name,
    /// observations on the station name.
    pub async fn fetch_forecast(&self, city_name: &str) -> Result<ForecastSummary, FetchError> {
        let body = self.fetch_dataset(FORECAST_DATASET, city_name).await?;
        parse_forecast(&body)
    }

    async fn fetch_dataset(&self, dataset: &str, location_name: &str) -> Result<String, FetchError> {
        let url = format!("{}/{dataset}", self.base_url);
        tracing::debug!(%url, %location_name, "requesting CWB dataset");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("Authorization", self.authorization_key.as_str()),
                ("locationName", location_name),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct ObsEnvelope {
    records: ObsRecords,
}

#[derive(Debug, Deserialize)]
struct ObsRecords {
    location: Vec<ObsLocation>,
}

#[derive(Debug, Deserialize)]
struct ObsLocation {
    #[serde(rename = "locationName")]
    location_name: String,
    time: ObsTime,
    #[serde(rename = "weatherElement")]
    weather_element: Vec<ObsElement>,
}

#[derive(Debug, Deserialize)]
struct ObsTime {
    #[serde(rename = "obsTime")]
    obs_time: String,
}

#[derive(Debug, Deserialize)]
struct ObsElement {
    #[serde(rename = "elementName")]
    element_name: String,
    #[serde(rename = "elementValue")]
    element_value: String,
}

#[derive(Debug, Deserialize)]
struct ForecastEnvelope {
    records: ForecastRecords,
}

#[derive(Debug, Deserialize)]
struct ForecastRecords {
    location: Vec<ForecastLocation>,
}

#[derive(Debug, Deserialize)]
struct ForecastLocation {
    #[serde(rename = "weatherElement")]
    weather_element: Vec<ForecastElement>,
}

#[derive(Debug, Deserialize)]
struct ForecastElement {
    #[serde(rename = "elementName")]
    element_name: String,
    time: Vec<ForecastBucket>,
}

#[derive(Debug, Deserialize)]
struct ForecastBucket {
    parameter: ForecastParameter,
}

#[derive(Debug, Deserialize)]
struct ForecastParameter {
    #[serde(rename = "parameterName")]
    parameter_name: String,
    #[serde(rename = "parameterValue")]
    parameter_value: Option<String>,
}

/// Project an observation body onto the two readings we keep (TEMP, WDSD);
/// every other element identifier is ignored.
fn parse_observation(body: &str) -> Result<CurrentObservation, FetchError> {
    let envelope: ObsEnvelope = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("observation JSON: {e}")))?;

    let location = envelope
        .records
        .location
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed("observation response contained no locations".into()))?;

    let mut temperature = None;
    let mut wind_speed = None;
    for element in &location.weather_element {
        match element.element_name.as_str() {
            "TEMP" => temperature = Some(parse_reading("TEMP", &element.element_value)?),
            "WDSD" => wind_speed = Some(parse_reading("WDSD", &element.element_value)?),
            _ => {}
        }
    }

    let observation_time = NaiveDateTime::parse_from_str(&location.time.obs_time, OBS_TIME_FORMAT)
        .map_err(|e| {
            FetchError::Malformed(format!("obsTime '{}': {e}", location.time.obs_time))
        })?;

    Ok(CurrentObservation {
        location_name: location.location_name,
        temperature: require_element("TEMP", temperature)?,
        wind_speed: require_element("WDSD", wind_speed)?,
        observation_time,
    })
}

/// Project a forecast body onto the first time bucket of Wx, PoP and CI;
/// later buckets and other element identifiers are ignored.
fn parse_forecast(body: &str) -> Result<ForecastSummary, FetchError> {
    let envelope: ForecastEnvelope = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("forecast JSON: {e}")))?;

    let location = envelope
        .records
        .location
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed("forecast response contained no locations".into()))?;

    let mut description = None;
    let mut weather_code = None;
    let mut rain_possibility = None;
    let mut comfortability = None;

    for element in location.weather_element {
        match element.element_name.as_str() {
            "Wx" => {
                let parameter = first_bucket("Wx", element.time)?.parameter;
                let code = parameter.parameter_value.ok_or_else(|| {
                    FetchError::Malformed("Wx bucket is missing parameterValue".into())
                })?;
                weather_code = Some(parse_code(&code)?);
                description = Some(parameter.parameter_name);
            }
            "PoP" => {
                let parameter = first_bucket("PoP", element.time)?.parameter;
                rain_possibility = Some(parse_reading("PoP", &parameter.parameter_name)?);
            }
            "CI" => {
                comfortability = Some(first_bucket("CI", element.time)?.parameter.parameter_name);
            }
            _ => {}
        }
    }

    Ok(ForecastSummary {
        description: require_element("Wx", description)?,
        weather_code: require_element("Wx", weather_code)?,
        rain_possibility: require_element("PoP", rain_possibility)?,
        comfortability: require_element("CI", comfortability)?,
    })
}

fn first_bucket(name: &str, buckets: Vec<ForecastBucket>) -> Result<ForecastBucket, FetchError> {
    buckets
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed(format!("element {name} has an empty time series")))
}

fn parse_reading(name: &str, value: &str) -> Result<f64, FetchError> {
    value.trim().parse::<f64>().map_err(|_| {
        FetchError::Malformed(format!("element {name} has non-numeric value '{value}'"))
    })
}

fn parse_code(value: &str) -> Result<u16, FetchError> {
    value.trim().parse::<u16>().map_err(|_| {
        FetchError::Malformed(format!("Wx parameterValue '{value}' is not a weather code"))
    })
}

fn require_element<T>(name: &str, value: Option<T>) -> Result<T, FetchError> {
    value.ok_or_else(|| FetchError::Malformed(format!("element {name} missing from response")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    // Back off to a char boundary so multibyte text never splits mid-char.
    let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
    format!("{}...", &body[..cut])
}
