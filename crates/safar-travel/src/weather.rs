//! Current weather and forecast lookup (OpenWeather), with a curated
//! sample-data fallback so the endpoint stays useful offline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use safar_types::find_destination;

use crate::TravelError;

/// Default OpenWeather API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// How many three-hour forecast slots to return (36 hours).
const FORECAST_SLOTS: usize = 12;

pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Current conditions for a destination. `note` tells the client whether it
/// is looking at live or sample data.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentWeather {
    pub city: String,
    pub temp: i32,
    pub condition: String,
    pub humidity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coord: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    pub note: &'static str,
}

/// One three-hour forecast slot.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastEntry {
    pub datetime: String,
    pub temp: f64,
    pub weather: String,
}

#[derive(Deserialize)]
struct OwmCurrent {
    #[serde(default)]
    cod: Value,
    #[serde(default)]
    name: String,
    main: Option<OwmMain>,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: Option<OwmWind>,
    coord: Option<Value>,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: i64,
}

#[derive(Deserialize)]
struct OwmCondition {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Deserialize)]
struct OwmForecast {
    #[serde(default)]
    cod: Value,
    #[serde(default)]
    message: Value,
    #[serde(default)]
    list: Vec<OwmForecastSlot>,
}

#[derive(Deserialize)]
struct OwmForecastSlot {
    dt_txt: String,
    main: OwmSlotMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Deserialize)]
struct OwmSlotMain {
    temp: f64,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent("SafarBot/1.0 (weather)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Current weather for a destination. Known destinations resolve by
    /// precise coordinates; anything else is searched as `{city},PK`. On
    /// any upstream failure the curated sample table answers instead, so
    /// this lookup never fails.
    pub async fn current(&self, city: &str) -> CurrentWeather {
        if let Some(dest) = find_destination(city) {
            match self.fetch_by_coords(dest.lat, dest.lon).await {
                Ok(mut live) => {
                    live.city = dest.name.to_string();
                    return live;
                }
                Err(e) => {
                    tracing::debug!(city = dest.name, error = %e, "live weather unavailable");
                    return fallback_weather(city, dest.name);
                }
            }
        }

        match self.fetch_by_name(city).await {
            Ok(live) => live,
            Err(e) => {
                tracing::debug!(city, error = %e, "live weather unavailable");
                fallback_weather(city, &title_case(city))
            }
        }
    }

    /// The next 36 hours of three-hour forecast slots for a city.
    pub async fn forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, TravelError> {
        let resp = self
            .client
            .get(format!("{}/forecast", self.base_url))
            .query(&[
                ("q", format!("{city},PK")),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;
        let forecast: OwmForecast = resp.json().await?;

        // OpenWeather reports errors in-band with a non-200 `cod`.
        if forecast.cod.as_str() != Some("200") {
            let message = match forecast.message {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(TravelError::Upstream(message));
        }

        Ok(forecast
            .list
            .into_iter()
            .take(FORECAST_SLOTS)
            .map(|slot| ForecastEntry {
                datetime: slot.dt_txt,
                temp: slot.main.temp,
                weather: slot
                    .weather
                    .first()
                    .map(|c| c.description.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn fetch_by_coords(&self, lat: f64, lon: f64) -> Result<CurrentWeather, TravelError> {
        let resp = self
            .client
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;
        self.project_current(resp.json().await?)
    }

    async fn fetch_by_name(&self, city: &str) -> Result<CurrentWeather, TravelError> {
        let resp = self
            .client
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("q", format!("{city},PK")),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;
        self.project_current(resp.json().await?)
    }

    fn project_current(&self, payload: OwmCurrent) -> Result<CurrentWeather, TravelError> {
        // `cod` is a number on success and a string on errors.
        if payload.cod.as_i64() != Some(200) {
            return Err(TravelError::Upstream(payload.cod.to_string()));
        }
        let main = payload
            .main
            .ok_or_else(|| TravelError::Upstream("response missing main block".to_string()))?;

        Ok(CurrentWeather {
            city: payload.name,
            temp: main.temp.round() as i32,
            condition: title_case(
                &payload
                    .weather
                    .first()
                    .map(|c| c.description.clone())
                    .unwrap_or_default(),
            ),
            humidity: main.humidity,
            coord: payload.coord,
            feels_like: Some(main.feels_like.round() as i32),
            wind_speed: payload.wind.map(|w| w.speed),
            note: "Real-time weather data",
        })
    }
}

/// Curated sample conditions, used whenever the live API is unreachable.
fn fallback_weather(city: &str, display_name: &str) -> CurrentWeather {
    let (temp, condition, humidity) = match city.trim().to_lowercase().as_str() {
        "hunza valley" | "hunza" | "gilgit" => (12, "Clear Sky", 45),
        "naran" => (8, "Partly Cloudy", 60),
        "fairy meadows" => (5, "Clear Sky", 40),
        "swat" | "mingora" => (18, "Sunny", 55),
        "chitral" => (15, "Clear Sky", 50),
        "skardu" => (10, "Partly Cloudy", 45),
        "neelam valley" | "neelam" | "muzaffarabad" => (16, "Sunny", 60),
        _ => (15, "Clear Sky", 50),
    };
    CurrentWeather {
        city: display_name.to_string(),
        temp,
        condition: condition.to_string(),
        humidity,
        coord: None,
        feels_like: None,
        wind_speed: None,
        note: "Using sample data",
    }
}

/// Uppercases the first letter of each word, OpenWeather descriptions being
/// all-lowercase.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
