//! Содержимое панели рекомендаций: оптимальная ориентация, финансы, обслуживание и погода.

use chrono::Month;
use itertools::Itertools;

use crate::constants::{UNIT_CELSIUS, UNIT_DEGREE, UNIT_KWH};
use crate::forecast::SolarData;
use crate::form::{AZIMUTH_RANGE, TILT_RANGE};

const CURRENCY: &str = "₹";

/// Значение с долей заполнения индикатора (0..=1).
#[derive(Clone, Debug, PartialEq)]
pub struct Gauge {
    pub label: &'static str,
    pub value: String,
    pub fraction: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub title: &'static str,
    pub detail: String,
}

pub type Row = (&'static str, String);

#[derive(Clone, Debug, PartialEq)]
pub struct Recommendations {
    pub configuration: Vec<Gauge>,
    pub expected_improvement: String,
    pub financial: Vec<Row>,
    pub maintenance: Vec<Row>,
    pub priority_note: Option<String>,
    pub comparison: Vec<Row>,
    pub benefits: Vec<Row>,
    pub steps: Vec<Step>,
    pub weather: Vec<Row>,
    pub seasonal_tasks: Vec<Row>,
}

fn fraction_in(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !value.is_finite() || span <= 0.0 {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map_or_else(|| month.to_string(), |month| month.name().to_string())
}

fn degrees(value: f64) -> String {
    format!("{value}{UNIT_DEGREE}")
}

fn percent_of_correlation(correlation: f64) -> String {
    format!("{:.0}%", (correlation * 100.0).abs())
}

impl Recommendations {
    pub fn from_data(data: &SolarData) -> Self {
        let location = &data.location_analysis;
        let optimization = &data.optimization_recommendations;
        let financial = &data.financial_projections;
        let maintenance = &data.maintenance_schedule;
        let weather = &data.weather_impact_analysis;

        let configuration = vec![
            Gauge {
                label: "Tilt Angle",
                value: degrees(optimization.optimal_tilt),
                fraction: fraction_in(
                    optimization.optimal_tilt,
                    *TILT_RANGE.start(),
                    *TILT_RANGE.end(),
                ),
            },
            Gauge {
                label: "Azimuth Angle",
                value: degrees(optimization.optimal_azimuth),
                fraction: fraction_in(
                    optimization.optimal_azimuth,
                    *AZIMUTH_RANGE.start(),
                    *AZIMUTH_RANGE.end(),
                ),
            },
        ];

        let priority_months = &maintenance.panel_cleaning.priority_months;
        let priority_note = (!priority_months.is_empty()).then(|| {
            format!(
                "Priority cleaning in {}",
                priority_months.iter().map(|m| month_name(*m)).join(", ")
            )
        });

        Self {
            configuration,
            expected_improvement: format!("+{:.1}%", optimization.improvement_percentage),
            financial: vec![
                (
                    "Annual Savings",
                    format!("{CURRENCY} {:.2}", financial.annual_savings),
                ),
                (
                    "25-Year Savings",
                    format!("{CURRENCY} {:.0}", financial.savings_25_year),
                ),
                (
                    "Carbon Offset",
                    format!("{:.3} tons/year", financial.carbon_offset_tons_per_year),
                ),
            ],
            maintenance: vec![
                ("Panel Cleaning", maintenance.panel_cleaning.frequency.clone()),
                (
                    "Visual Inspection",
                    maintenance.inspection_schedule.quarterly_check.clone(),
                ),
                (
                    "Professional Check",
                    maintenance.inspection_schedule.annual_check.clone(),
                ),
                (
                    "After Severe Weather",
                    maintenance.inspection_schedule.weather_related.clone(),
                ),
            ],
            priority_note,
            comparison: vec![
                (
                    "Current Annual Output",
                    format!("{:.2} {UNIT_KWH}", optimization.current_annual_output),
                ),
                (
                    "Optimal Annual Output",
                    format!("{:.2} {UNIT_KWH}", optimization.optimal_annual_output),
                ),
                (
                    "Improvement",
                    format!(
                        "+{:.2} {UNIT_KWH} (+{:.1}%)",
                        optimization.improvement_kwh, optimization.improvement_percentage
                    ),
                ),
            ],
            benefits: vec![
                (
                    "Annual Financial Benefit",
                    format!("{CURRENCY} {:.2}", optimization.annual_financial_benefit),
                ),
                (
                    "Payback Period",
                    format!("{:.1} years", optimization.payback_period_years),
                ),
            ],
            steps: vec![
                Step {
                    title: "Adjust Panel Tilt",
                    detail: format!(
                        "Change your current tilt angle from {} to the optimal {} for maximum energy production.",
                        degrees(location.current_tilt),
                        degrees(optimization.optimal_tilt)
                    ),
                },
                Step {
                    title: "Correct Panel Azimuth",
                    detail: format!(
                        "Reorient your panels from {} to {} azimuth to better align with the sun's path.",
                        degrees(location.current_azimuth),
                        degrees(optimization.optimal_azimuth)
                    ),
                },
                Step {
                    title: "Follow Maintenance Schedule",
                    detail: format!(
                        "Implement the recommended {} cleaning schedule, especially during priority months.",
                        maintenance.panel_cleaning.frequency.to_lowercase()
                    ),
                },
            ],
            weather: vec![
                (
                    "Cloud Impact",
                    format!(
                        "{} correlation with output reduction",
                        percent_of_correlation(weather.cloud_impact.correlation)
                    ),
                ),
                (
                    "Temperature Impact",
                    format!(
                        "{} correlation with performance",
                        percent_of_correlation(weather.temperature_impact.correlation)
                    ),
                ),
                (
                    "Best Performance",
                    format!(
                        "At temperatures between {:.1}{UNIT_CELSIUS} and {:.1}{UNIT_CELSIUS}",
                        weather.temperature_impact.low_impact_threshold,
                        weather.temperature_impact.high_impact_threshold
                    ),
                ),
            ],
            seasonal_tasks: vec![
                ("Winter", maintenance.seasonal_tasks.winter.clone()),
                ("Spring", maintenance.seasonal_tasks.spring.clone()),
                ("Summer", maintenance.seasonal_tasks.summer.clone()),
                ("Autumn", maintenance.seasonal_tasks.autumn.clone()),
            ],
        }
    }
}
