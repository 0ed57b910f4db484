//! Rule-based farming advice derived from a weather snapshot.
//!
//! Rules are evaluated independently and in a fixed order (temperature,
//! humidity, wind, rain); every rule whose condition holds contributes one
//! advisory.

use crate::model::{Advisory, AdvisoryCategory, Severity, WeatherSnapshot};

pub const HEAT_THRESHOLD_C: f64 = 35.0;
pub const FROST_THRESHOLD_C: f64 = 10.0;
pub const HUMID_THRESHOLD_PCT: u8 = 80;
pub const DRY_THRESHOLD_PCT: u8 = 30;
pub const WIND_THRESHOLD_KMH: f64 = 20.0;
pub const RAIN_THRESHOLD_PCT: u8 = 50;

trait Rule: Sync {
    fn evaluate(&self, snapshot: &WeatherSnapshot) -> Option<Advisory>;
}

fn advisory(category: AdvisoryCategory, severity: Severity, message: String) -> Advisory {
    Advisory { category, message, severity }
}

struct TemperatureRule;

impl Rule for TemperatureRule {
    fn evaluate(&self, snapshot: &WeatherSnapshot) -> Option<Advisory> {
        let t = snapshot.temperature;
        let (severity, message) = if t > HEAT_THRESHOLD_C {
            (
                Severity::Warn,
                format!("High heat ({t:.0}°C): increase irrigation and shade sensitive crops."),
            )
        } else if t < FROST_THRESHOLD_C {
            (Severity::Warn, format!("Cold conditions ({t:.0}°C): protect crops from frost."))
        } else {
            (Severity::Info, "Temperature is optimal for most crops.".to_string())
        };

        Some(advisory(AdvisoryCategory::Temperature, severity, message))
    }
}

struct HumidityRule;

impl Rule for HumidityRule {
    fn evaluate(&self, snapshot: &WeatherSnapshot) -> Option<Advisory> {
        let h = snapshot.humidity;
        if h > HUMID_THRESHOLD_PCT {
            Some(advisory(
                AdvisoryCategory::Humidity,
                Severity::Warn,
                format!("High humidity ({h}%): watch for fungal disease and improve airflow."),
            ))
        } else if h < DRY_THRESHOLD_PCT {
            Some(advisory(
                AdvisoryCategory::Humidity,
                Severity::Info,
                format!("Dry air ({h}%): increase irrigation and mulch to keep soil moist."),
            ))
        } else {
            None
        }
    }
}

struct WindRule;

impl Rule for WindRule {
    fn evaluate(&self, snapshot: &WeatherSnapshot) -> Option<Advisory> {
        let w = snapshot.wind_speed;
        (w > WIND_THRESHOLD_KMH).then(|| {
            advisory(
                AdvisoryCategory::Wind,
                Severity::Warn,
                format!("Strong wind ({w:.0} km/h): secure structures and avoid spraying."),
            )
        })
    }
}

struct RainRule;

impl Rule for RainRule {
    fn evaluate(&self, snapshot: &WeatherSnapshot) -> Option<Advisory> {
        let wettest = snapshot
            .forecast
            .iter()
            .filter(|d| d.precipitation_pct > RAIN_THRESHOLD_PCT)
            .max_by_key(|d| d.precipitation_pct)?;

        Some(advisory(
            AdvisoryCategory::Rain,
            Severity::Info,
            format!(
                "Rain likely ({}% on {}): plan irrigation and drainage around it.",
                wettest.precipitation_pct,
                wettest.date.format("%a %d %b")
            ),
        ))
    }
}

static RULES: [&dyn Rule; 4] = [&TemperatureRule, &HumidityRule, &WindRule, &RainRule];

/// Advisories for `snapshot`. Same input, same output.
pub fn advise(snapshot: &WeatherSnapshot) -> Vec<Advisory> {
    RULES.iter().filter_map(|rule| rule.evaluate(snapshot)).collect()
}
