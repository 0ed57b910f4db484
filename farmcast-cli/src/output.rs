use chrono::{DateTime, Utc};
use farmcast_core::{Advisory, Provenance, Severity, Source, WeatherSnapshot};
use serde::Serialize;
use std::fmt::{self, Write};

#[derive(Serialize)]
struct Report<'a> {
    snapshot: &'a WeatherSnapshot,
    advisories: &'a [Advisory],
}

pub fn json(snapshot: &WeatherSnapshot, advisories: &[Advisory]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&Report { snapshot, advisories })?)
}

/// Human-readable report. `now` drives the "updated X ago" wording.
pub fn render(
    snapshot: &WeatherSnapshot,
    advisories: &[Advisory],
    now: DateTime<Utc>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, snapshot, advisories, now)?;
    Ok(out)
}

fn write_report(
    out: &mut impl Write,
    snapshot: &WeatherSnapshot,
    advisories: &[Advisory],
    now: DateTime<Utc>,
) -> fmt::Result {
    let provenance = match snapshot.location.provenance {
        Provenance::Precise | Provenance::ReverseGeocoded => "device position",
        Provenance::DefaultFallback => "default location",
    };

    writeln!(out, "Weather for {} ({provenance})", snapshot.location.label)?;
    if let Some(banner) = banner(snapshot, now) {
        writeln!(out, "! {banner}")?;
    }
    writeln!(
        out,
        "Now: {:.0}°C, {}, humidity {}%, wind {:.1} km/h",
        snapshot.temperature, snapshot.description, snapshot.humidity, snapshot.wind_speed
    )?;

    if !snapshot.forecast.is_empty() {
        writeln!(out, "\nForecast:")?;
        for day in &snapshot.forecast {
            writeln!(
                out,
                "  {}  {:>3.0}° / {:>3.0}°  {:<18} {:>3}% rain",
                day.date.format("%a %d %b"),
                day.high,
                day.low,
                day.description,
                day.precipitation_pct
            )?;
        }
    }

    if !advisories.is_empty() {
        writeln!(out, "\nAdvice:")?;
        for advisory in advisories {
            let tag = match advisory.severity {
                Severity::Info => "INFO",
                Severity::Warn => "WARN",
            };
            writeln!(out, "  [{tag}] {}", advisory.message)?;
        }
    }

    Ok(())
}

fn banner(snapshot: &WeatherSnapshot, now: DateTime<Utc>) -> Option<String> {
    match snapshot.source {
        Source::Live => None,
        Source::Cached => {
            Some(format!("Offline: showing data from {}", humanize_age(snapshot, now)))
        }
        Source::Synthetic => Some("Live weather unavailable: showing sample data".to_string()),
    }
}

fn humanize_age(snapshot: &WeatherSnapshot, now: DateTime<Utc>) -> String {
    let minutes = snapshot.age(now).num_minutes();
    match minutes {
        0 => "just now".to_string(),
        1 => "1 minute ago".to_string(),
        m if m < 120 => format!("{m} minutes ago"),
        m => format!("{} hours ago", m / 60),
    }
}
