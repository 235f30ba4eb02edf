use chrono::NaiveDateTime;
use kma_weather_core::{LocationEntry, NormalizedWeather, WeatherOutcome};

/// Human-readable summary of a lookup result.
pub fn render(outcome: &WeatherOutcome) -> String {
    match outcome {
        WeatherOutcome::Weather(w) => render_weather(w),
        WeatherOutcome::Error(err) => {
            let raw = err
                .raw_response
                .as_ref()
                .map(|raw| format!("Response: {raw}\n"))
                .unwrap_or_default();
            let trace = err
                .trace
                .as_ref()
                .map(|trace| format!("Trace: {trace}\n"))
                .unwrap_or_default();

            format!("Error: {}\n{raw}{trace}", err.message)
        }
    }
}

fn render_weather(w: &NormalizedWeather) -> String {
    let obs = &w.weather;

    format!(
        "Location:      {location}\n\
         Observed at:   {observed}\n\
         Temperature:   {temperature}\n\
         Rainfall (1h): {rainfall} mm\n\
         Humidity:      {humidity}\n\
         Precipitation: {pty_name} ({pty_code})\n\
         Wind:          {speed} from {direction}\n",
        location = w.location,
        observed = observed_at(&w.base_date, &w.base_time),
        temperature = or_missing(obs.temperature, "°C"),
        rainfall = obs.rainfall,
        humidity = or_missing(obs.humidity, "%"),
        pty_name = obs.precipitation_type.name,
        pty_code = obs.precipitation_type.code,
        speed = or_missing(obs.wind_speed, " m/s"),
        direction = or_missing(obs.wind_direction, "°"),
    )
}

fn observed_at(base_date: &str, base_time: &str) -> String {
    NaiveDateTime::parse_from_str(&format!("{base_date}{base_time}"), "%Y%m%d%H%M")
        .map(|dt| dt.format("%Y-%m-%d %H:%M KST").to_string())
        .unwrap_or_else(|_| format!("{base_date} {base_time}"))
}

fn or_missing(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => "n/a".to_string(),
    }
}

fn location_row(area: &str, korean: &str, short: &str, nx: &str, ny: &str) -> String {
    format!("{area:<20} {korean:<16} {short:<10} {nx:>4} {ny:>4}\n")
}

/// Table of known regions.
pub fn render_locations(entries: &[LocationEntry]) -> String {
    let header = location_row("AREA", "KOREAN", "SHORT", "NX", "NY");
    let rows = entries.iter().map(|e| {
        location_row(
            e.area,
            e.area_korean,
            e.korean_name,
            &e.nx.to_string(),
            &e.ny.to_string(),
        )
    });

    std::iter::once(header).chain(rows).collect()
}
