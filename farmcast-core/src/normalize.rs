//! Collapse sub-daily provider samples into one forecast row per local day.

use chrono::NaiveDate;

use crate::model::{DailyForecast, RawWeatherSample};

pub const DEFAULT_HORIZON: usize = 5;

/// Group `samples` by local calendar date, keeping at most `horizon` days.
///
/// `high`/`low` span every sample of a day. Description, icon and
/// precipitation come from the first sample seen for that day in stream
/// order, which is not necessarily the earliest one if the input is
/// unsorted. Output is ordered by date.
pub fn normalize(samples: &[RawWeatherSample], horizon: usize) -> Vec<DailyForecast> {
    let mut days: Vec<DailyForecast> = Vec::with_capacity(horizon.min(samples.len()));

    for sample in samples {
        let date: NaiveDate = sample.timestamp.date_naive();

        if let Some(day) = days.iter_mut().find(|d| d.date == date) {
            day.high = day.high.max(sample.temperature);
            day.low = day.low.min(sample.temperature);
            continue;
        }

        if days.len() == horizon {
            break;
        }

        days.push(DailyForecast {
            date,
            high: sample.temperature,
            low: sample.temperature,
            description: sample.description.clone(),
            icon: sample.icon.clone(),
            precipitation_pct: sample.precipitation_pct.min(100),
        });
    }

    days.sort_by_key(|d| d.date);
    days
}
