//! Параметры установки из командной строки и сборка запроса к API.

use std::ops::RangeInclusive;

use chrono::{Days, NaiveDate};
use serde::Serialize;

pub const PANEL_AREA_RANGE: RangeInclusive<f64> = 10.0..=500.0;
pub const TILT_RANGE: RangeInclusive<f64> = 0.0..=90.0;
pub const AZIMUTH_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Значения формы по умолчанию (переопределяются конфигом).
#[derive(Clone, Debug, PartialEq)]
pub struct FormDefaults {
    pub location: String,
    pub panel_area: f64,
    pub tilt: f64,
    pub azimuth: f64,
    pub horizon_days: u32,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            location: "Ahmedabad, Gujarat".to_string(),
            panel_area: 20.0,
            tilt: 35.0,
            azimuth: 180.0,
            horizon_days: 30,
        }
    }
}

/// Сырые значения формы. Пропущенные поля берутся из `FormDefaults`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormInput {
    pub location: Option<String>,
    pub panel_area: Option<f64>,
    pub tilt: Option<f64>,
    pub azimuth: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Тело POST-запроса к API прогноза.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub location_name: String,
    pub panel_area: f64,
    pub current_tilt: f64,
    pub current_azimuth: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// `"lat, lon"` → координаты; всё остальное считается названием места.
pub fn parse_coordinates(location: &str) -> Option<(f64, f64)> {
    let (lat, lon) = location.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let lon = lon.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((lat, lon))
}

fn coerce(value: Option<f64>, default: f64, range: &RangeInclusive<f64>) -> f64 {
    let value = value.filter(|v| v.is_finite()).unwrap_or(default);
    value.clamp(*range.start(), *range.end())
}

impl FormInput {
    pub fn to_request(&self, defaults: &FormDefaults, today: NaiveDate) -> AnalysisRequest {
        let location = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .unwrap_or(&defaults.location)
            .to_string();
        let coordinates = parse_coordinates(&location);

        let start = self.start_date.unwrap_or(today);
        let end = self.end_date.unwrap_or_else(|| {
            start
                .checked_add_days(Days::new(u64::from(defaults.horizon_days)))
                .unwrap_or(start)
        });
        let (start_date, end_date) = if end < start {
            (end, start)
        } else {
            (start, end)
        };

        AnalysisRequest {
            lat: coordinates.map(|(lat, _)| lat),
            lon: coordinates.map(|(_, lon)| lon),
            location_name: location,
            panel_area: coerce(self.panel_area, defaults.panel_area, &PANEL_AREA_RANGE),
            current_tilt: coerce(self.tilt, defaults.tilt, &TILT_RANGE),
            current_azimuth: coerce(self.azimuth, defaults.azimuth, &AZIMUTH_RANGE),
            start_date,
            end_date,
        }
    }
}
