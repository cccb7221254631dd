//! CSV-выгрузка прогноза: краткая и подробная.

use std::error::Error;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::constants::{DATE_FORMAT, NOT_AVAILABLE};
use crate::forecast::SolarData;

const HEADER: [&str; 5] = [
    "Date",
    "Predicted Output (kWh)",
    "Temperature (°C)",
    "Cloud Cover (%)",
    "Precipitation (mm)",
];
const DETAILED_HEADER: [&str; 5] = [
    "Day of Week",
    "Predicted Output (kWh)",
    "Temperature (°C)",
    "Cloud Cover (%)",
    "Weather Condition",
];
const FORMAT_WEEKDAY: &str = "%A";

fn format_optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |value| format!("{value:.precision$}"),
    )
}

/// Поле в кавычках; внутренние кавычки удваиваются.
fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, Box<dyn Error>> {
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Дата, выработка, температура, облачность, осадки; строки по возрастанию даты.
pub fn generate_csv(data: &SolarData) -> Result<String, Box<dyn Error>> {
    data.validate()?;
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for (date, day) in data.forecast_series() {
        writer.write_record([
            date.format(DATE_FORMAT).to_string(),
            format!("{:.2}", day.theoretical_panel_output),
            format_optional(day.temperature_2m, 2),
            format_optional(day.cloud_cover, 2),
            format_optional(day.precipitation, 1),
        ])?;
    }
    finish(writer)
}

/// День недели и погодная категория вместо даты и осадков.
/// В кавычках только день и погода; заголовок, числа и `N/A` без них.
pub fn generate_detailed_csv(data: &SolarData) -> Result<String, Box<dyn Error>> {
    data.validate()?;
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());
    writer.write_record(DETAILED_HEADER)?;
    for (date, day) in data.forecast_series() {
        writer.write_record([
            quoted(&date.format(FORMAT_WEEKDAY).to_string()),
            format!("{:.2}", day.theoretical_panel_output),
            format_optional(day.temperature_2m, 2),
            format_optional(day.cloud_cover, 2),
            quoted(day.condition().label()),
        ])?;
    }
    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_data;

    #[test]
    fn sample_export_has_header_and_five_days() {
        let csv = generate_csv(&sample_data().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[0],
            "Date,Predicted Output (kWh),Temperature (°C),Cloud Cover (%),Precipitation (mm)"
        );
        assert_eq!(lines[1], "2025-09-15,15.48,28.62,83.21,0.0");
        assert_eq!(lines[5], "2025-09-19,14.21,28.95,78.62,0.0");
        for line in &lines[1..] {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), 5);
            for field in &fields[1..4] {
                assert_eq!(field.split('.').nth(1).map(str::len), Some(2), "{line}");
            }
        }
    }

    #[test]
    fn missing_weather_is_not_available() {
        let mut data = sample_data().unwrap();
        if let Some(day) = data.future_forecast.values_mut().next() {
            day.temperature_2m = None;
            day.cloud_cover = None;
            day.precipitation = None;
        }
        let csv = generate_csv(&data).unwrap();
        assert_eq!(csv.lines().nth(1), Some("2025-09-15,15.48,N/A,N/A,N/A"));
    }

    #[test]
    fn detailed_export_names_weekday_and_condition() {
        let csv = generate_detailed_csv(&sample_data().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[0],
            "Day of Week,Predicted Output (kWh),Temperature (°C),Cloud Cover (%),Weather Condition"
        );
        assert_eq!(lines[1], "\"Monday\",15.48,28.62,83.21,\"Cloudy\"");
        assert_eq!(lines[3], "\"Wednesday\",14.42,28.38,80.42,\"Rainy\"");
    }

    #[test]
    fn detailed_export_leaves_missing_values_unquoted() {
        let mut data = sample_data().unwrap();
        if let Some(day) = data.future_forecast.values_mut().next() {
            day.temperature_2m = None;
            day.cloud_cover = None;
            day.precipitation = None;
        }
        let csv = generate_detailed_csv(&data).unwrap();
        assert_eq!(csv.lines().nth(1), Some("\"Monday\",15.48,N/A,N/A,\"Clear\""));
        assert_eq!(quoted("Say \"hi\""), "\"Say \"\"hi\"\"\"");
    }

    #[test]
    fn empty_forecast_is_rejected() {
        let mut data = sample_data().unwrap();
        data.future_forecast.clear();
        assert!(generate_csv(&data).is_err());
        assert!(generate_detailed_csv(&data).is_err());
    }
}
