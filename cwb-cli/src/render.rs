//! Terminal rendering for the dashboard, themed by day/night moment.

use cwb_core::{Location, Moment, WeatherSnapshot};

const RED: &str = "\x1b[31m";

struct Theme {
    heading: &'static str,
    accent: &'static str,
    dim: &'static str,
    reset: &'static str,
    moment_icon: &'static str,
}

fn theme_for(moment: Moment) -> Theme {
    match moment {
        Moment::Day => Theme {
            heading: "\x1b[1;33m",
            accent: "\x1b[36m",
            dim: "\x1b[2m",
            reset: "\x1b[0m",
            moment_icon: "☀",
        },
        Moment::Night => Theme {
            heading: "\x1b[1;34m",
            accent: "\x1b[94m",
            dim: "\x1b[2m",
            reset: "\x1b[0m",
            moment_icon: "☾",
        },
    }
}

/// Icon for a CWB Wx weather code.
fn weather_icon(code: u16) -> &'static str {
    match code {
        1 => "☀",
        2..=3 => "🌤",
        4..=7 => "☁",
        8..=14 => "🌧",
        15..=18 => "⛈",
        19..=22 => "🌦",
        23 | 37 | 42 => "❄",
        24..=28 => "🌫",
        _ => "☁",
    }
}

pub fn dashboard(location: &Location, moment: Moment, snapshot: &WeatherSnapshot) {
    let theme = theme_for(moment);

    println!();
    println!(
        "{}{} {}{}",
        theme.heading, theme.moment_icon, location.city_name, theme.reset
    );

    if snapshot.is_loading {
        println!("  {}refreshing…{}", theme.dim, theme.reset);
    }

    println!(
        "  {}{} {}{}  {:.1}°C",
        theme.accent,
        weather_icon(snapshot.weather_code),
        snapshot.description,
        theme.reset,
        snapshot.temperature
    );
    println!(
        "  降雨機率 {:.0}%  風速 {:.1} m/s  {}",
        snapshot.rain_possibility, snapshot.wind_speed, snapshot.comfortability
    );

    if let Some(time) = snapshot.observation_time {
        println!(
            "  {}觀測時間 {} ({}){}",
            theme.dim,
            time.format("%Y-%m-%d %H:%M"),
            snapshot.location_name,
            theme.reset
        );
    }

    if let Some(err) = snapshot.last_error {
        println!("  {RED}! last refresh failed: {err}{}", theme.reset);
    }

    println!();
}
