//! Общие константы форматирования, чтобы не дублировать строки и единицы измерения.

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const UNIT_KWH: &str = "kWh";
pub const UNIT_DEGREE: &str = "°";
pub const UNIT_CELSIUS: &str = "°C";
pub const NOT_AVAILABLE: &str = "N/A";
