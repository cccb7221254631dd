//! Модель ответа API прогноза (Forecast Result).
//!
//! Снимок неизменяемый: после декодирования все рендеры получают `&SolarData`.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SolarData {
    pub location_analysis: LocationAnalysis,
    pub current_system_performance: SystemPerformance,
    pub optimization_recommendations: OptimizationRecommendations,
    pub weather_impact_analysis: WeatherImpactAnalysis,
    pub financial_projections: FinancialProjections,
    pub maintenance_schedule: MaintenanceSchedule,
    /// Краткосрочный прогноз; ключи упорядочены по возрастанию даты.
    pub future_forecast: BTreeMap<NaiveDate, DailyForecast>,
    pub raw_data: RawData,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LocationAnalysis {
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    pub panel_area: f64,
    pub current_tilt: f64,
    pub current_azimuth: f64,
    pub start_date: String,
    pub end_date: String,
    pub solar_potential_rating: String,
    #[serde(default)]
    pub best_months: Vec<u32>,
    #[serde(default)]
    pub worst_months: Vec<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SystemPerformance {
    pub annual_output_kwh: f64,
    pub monthly_average: f64,
    pub peak_daily_output: f64,
    /// Коэффициент использования установленной мощности, в процентах.
    pub capacity_factor: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OptimizationRecommendations {
    pub current_annual_output: f64,
    pub optimal_annual_output: f64,
    pub improvement_kwh: f64,
    pub improvement_percentage: f64,
    pub annual_financial_benefit: f64,
    pub optimal_tilt: f64,
    pub optimal_azimuth: f64,
    pub payback_period_years: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WeatherImpactAnalysis {
    pub cloud_impact: WeatherImpact,
    pub temperature_impact: WeatherImpact,
    /// Месяц (строкой, как в API) → выработка.
    #[serde(default)]
    pub seasonal_variation: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WeatherImpact {
    pub correlation: f64,
    pub high_impact_threshold: f64,
    pub low_impact_threshold: f64,
    pub average_reduction_high: Option<f64>,
    pub average_reduction_low: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FinancialProjections {
    pub annual_savings: f64,
    #[serde(rename = "25_year_savings")]
    pub savings_25_year: f64,
    pub carbon_offset_tons_per_year: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct MaintenanceSchedule {
    pub panel_cleaning: PanelCleaning,
    pub inspection_schedule: InspectionSchedule,
    pub seasonal_tasks: SeasonalTasks,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PanelCleaning {
    pub frequency: String,
    #[serde(default)]
    pub priority_months: Vec<u32>,
    pub reason: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct InspectionSchedule {
    pub quarterly_check: String,
    pub annual_check: String,
    pub weather_related: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SeasonalTasks {
    pub winter: String,
    pub spring: String,
    pub summer: String,
    pub autumn: String,
}

/// Прогноз на один день. Погодные поля API может не прислать.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DailyForecast {
    pub theoretical_panel_output: f64,
    #[serde(default)]
    pub temperature_2m: Option<f64>,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
    #[serde(default)]
    pub precipitation: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RawData {
    #[serde(default)]
    pub historical_hourly_output: Vec<HourlySample>,
    #[serde(default)]
    pub historical_daily_output: BTreeMap<NaiveDate, f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HourlySample {
    pub time: NaiveDateTime,
    pub predicted_solar_output_kwh: f64,
    #[serde(default)]
    pub temperature_2m: Option<f64>,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
}

/// Грубая классификация погоды по облачности и осадкам.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rainy,
}

impl WeatherCondition {
    pub fn classify(cloud_cover: Option<f64>, precipitation: Option<f64>) -> Self {
        if precipitation.is_some_and(|value| value > 0.0) {
            return Self::Rainy;
        }
        match cloud_cover {
            Some(cloud) if cloud > 70.0 => Self::Cloudy,
            Some(cloud) if cloud > 30.0 => Self::PartlyCloudy,
            _ => Self::Clear,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Rainy => "Rainy",
        }
    }
}

impl DailyForecast {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::classify(self.cloud_cover, self.precipitation)
    }
}

#[derive(Debug)]
pub enum InvalidData {
    EmptyForecast,
    NonFiniteOutput(NaiveDate),
}

impl fmt::Display for InvalidData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyForecast => f.write_str("No forecast data available"),
            Self::NonFiniteOutput(date) => write!(f, "Forecast output for {date} is not a number"),
        }
    }
}

impl Error for InvalidData {}

impl SolarData {
    /// Проверяет, что из снимка можно построить отчёты.
    pub fn validate(&self) -> Result<(), InvalidData> {
        if self.future_forecast.is_empty() {
            return Err(InvalidData::EmptyForecast);
        }
        if let Some((date, _)) = self
            .future_forecast
            .iter()
            .find(|(_, day)| !day.theoretical_panel_output.is_finite())
        {
            return Err(InvalidData::NonFiniteOutput(*date));
        }
        Ok(())
    }

    /// Ряд прогноза в порядке возрастания дат.
    pub fn forecast_series(&self) -> impl Iterator<Item = (NaiveDate, &DailyForecast)> {
        self.future_forecast.iter().map(|(date, day)| (*date, day))
    }

    pub fn location_label(&self) -> String {
        let location = &self.location_analysis;
        if location.location_name.trim().is_empty() {
            format!(
                "Latitude {}, Longitude {}",
                location.latitude, location.longitude
            )
        } else {
            location.location_name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "location_analysis": {
            "latitude": 1.5, "longitude": 2.5, "location_name": "",
            "panel_area": 10, "current_tilt": 30, "current_azimuth": 180,
            "start_date": "2025-01-01", "end_date": "2025-01-31",
            "solar_potential_rating": "Good"
        },
        "current_system_performance": {
            "annual_output_kwh": 100.0, "monthly_average": 8.3,
            "peak_daily_output": 1.2, "capacity_factor": 12.0
        },
        "optimization_recommendations": {
            "current_annual_output": 100.0, "optimal_annual_output": 110.0,
            "improvement_kwh": 10.0, "improvement_percentage": 10.0,
            "annual_financial_benefit": 1.5, "optimal_tilt": 25,
            "optimal_azimuth": 180, "payback_period_years": 7.0
        },
        "weather_impact_analysis": {
            "cloud_impact": {
                "correlation": -0.5, "high_impact_threshold": 80,
                "low_impact_threshold": 20, "average_reduction_high": null,
                "average_reduction_low": 0.3
            },
            "temperature_impact": {
                "correlation": 0.4, "high_impact_threshold": 30,
                "low_impact_threshold": 20, "average_reduction_high": 0.2,
                "average_reduction_low": 0.1
            }
        },
        "financial_projections": {
            "annual_savings": 12.0, "25_year_savings": 300.0,
            "carbon_offset_tons_per_year": 0.1
        },
        "maintenance_schedule": {
            "panel_cleaning": { "frequency": "Monthly", "reason": "Dust" },
            "inspection_schedule": {
                "quarterly_check": "q", "annual_check": "a", "weather_related": "w"
            },
            "seasonal_tasks": {
                "winter": "w", "spring": "s", "summer": "su", "autumn": "a"
            }
        },
        "future_forecast": {
            "2025-01-03": { "theoretical_panel_output": 3.0 },
            "2025-01-01": { "theoretical_panel_output": 1.0, "cloud_cover": 80.0 },
            "2025-01-02": { "theoretical_panel_output": 2.0, "precipitation": 0.4 }
        },
        "raw_data": {
            "historical_hourly_output": [
                { "time": "2025-01-01T10:00:00", "predicted_solar_output_kwh": 0.5, "cloud_cover": 40 }
            ],
            "historical_daily_output": { "2025-01-01": 3.5 }
        }
    }"#;

    #[test]
    fn decodes_minimal_payload_with_optional_fields() {
        let data: SolarData = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(data.financial_projections.savings_25_year, 300.0);
        assert_eq!(
            data.weather_impact_analysis.cloud_impact.average_reduction_high,
            None
        );
        assert!(data.location_analysis.best_months.is_empty());
        assert_eq!(data.raw_data.historical_hourly_output.len(), 1);
        assert_eq!(data.location_label(), "Latitude 1.5, Longitude 2.5");
    }

    #[test]
    fn forecast_series_is_sorted_by_date() {
        let data: SolarData = serde_json::from_str(MINIMAL).unwrap();
        let dates: Vec<String> = data
            .forecast_series()
            .map(|(date, _)| date.to_string())
            .collect();
        assert_eq!(dates, ["2025-01-01", "2025-01-02", "2025-01-03"]);
    }

    #[test]
    fn weather_condition_prefers_precipitation() {
        let data: SolarData = serde_json::from_str(MINIMAL).unwrap();
        let conditions: Vec<WeatherCondition> = data
            .forecast_series()
            .map(|(_, day)| day.condition())
            .collect();
        assert_eq!(
            conditions,
            [
                WeatherCondition::Cloudy,
                WeatherCondition::Rainy,
                WeatherCondition::Clear
            ]
        );
        assert_eq!(
            WeatherCondition::classify(Some(50.0), Some(0.0)),
            WeatherCondition::PartlyCloudy
        );
    }

    #[test]
    fn validate_rejects_empty_forecast() {
        let mut data: SolarData = serde_json::from_str(MINIMAL).unwrap();
        assert!(data.validate().is_ok());
        data.future_forecast.clear();
        assert!(matches!(data.validate(), Err(InvalidData::EmptyForecast)));
    }
}
