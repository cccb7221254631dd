//! Встроенный демонстрационный набор данных, который подставляется, если API недоступен.

use crate::forecast::SolarData;

const SAMPLE_JSON: &str = include_str!("../data/sample.json");

/// Декодирует встроенный снимок прогноза.
pub fn sample_data() -> Result<SolarData, serde_json::Error> {
    serde_json::from_str(SAMPLE_JSON)
}

/// Исходный JSON снимка без повторной сериализации.
pub const fn sample_json() -> &'static str {
    SAMPLE_JSON
}
