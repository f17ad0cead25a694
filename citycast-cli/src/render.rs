use citycast_core::{CurrentDisplay, DayDisplay, View};
use std::fmt::Write;

/// Text for one resolved action. Errors replace everything else.
pub fn render(view: &View) -> String {
    match view {
        View::Error(err) => format!("Error: {}\n", err.message),
        View::Weather { current, forecast } => {
            let mut out = render_current(current);
            if let Some(days) = forecast {
                out.push('\n');
                out.push_str(&render_forecast(days));
            }
            out
        }
    }
}

fn render_current(current: &CurrentDisplay) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", current.name);
    let _ = writeln!(out, "  Temperature: {}°C", current.temperature_c);
    let _ = writeln!(out, "  Humidity:    {}%", current.humidity_pct);
    let _ = writeln!(out, "  Wind:        {} m/s", current.wind_speed);
    let _ = writeln!(out, "  Icon:        {}", current.icon_url);
    out
}

fn render_forecast(days: &[DayDisplay]) -> String {
    let mut out = String::from("5-day forecast\n");
    if days.is_empty() {
        out.push_str("  (no daily readings available)\n");
    }
    for day in days {
        let _ = writeln!(
            out,
            "  {:<10}  {}°C  wind {} m/s  humidity {}%  {}",
            day.date, day.temperature_c, day.wind_speed, day.humidity_pct, day.icon_url
        );
    }
    out
}

pub fn render_recent(cities: &[String]) -> String {
    if cities.is_empty() {
        return "No recent cities yet.\n".to_string();
    }
    cities.iter().map(|c| format!("  {c}\n")).collect()
}
