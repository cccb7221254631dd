//! Рендер HTML-панели результатов.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use super::chart::{PLOT_ID, build_optimization_chart};
use super::recommendations::Recommendations;
use super::{ChartSize, DownloadLinks};
use crate::chart::{BarDatum, ChartView, ForecastBarChart, SvgCanvas, WeatherScatterChart};
use crate::constants::{NOT_AVAILABLE, UNIT_KWH};
use crate::fetch::DataSource;
use crate::forecast::SolarData;
use crate::stats::SeriesSummary;

const PAGE_TITLE: &str = "Solar Forecast Dashboard";
const PAGE_SUBTITLE: &str = "Panel output forecast, weather impact and optimization advice.";
const FAVICON_DATA_URI: &str = "data:image/svg+xml,%3Csvg%20xmlns='http://www.w3.org/2000/svg'%20viewBox='0%200%2064%2064'%3E%3Crect%20width='64'%20height='64'%20rx='14'%20fill='%2310b981'/%3E%3Ccircle%20cx='32'%20cy='32'%20r='12'%20fill='white'/%3E%3C/svg%3E";
const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M UTC";
const GOOGLE_FONTS_CSS: &str =
    "https://fonts.googleapis.com/css2?family=IBM+Plex+Sans:wght@400;500;600&display=swap";
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const FORECAST_CHART_ID: &str = "forecast-chart";
const SCATTER_CHART_ID: &str = "weather-chart";
const CURRENCY: &str = "₹";
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const STYLE: &str = "
:root {
    color-scheme: dark;
    --bg: #0a0a0a;
    --card: rgba(17, 24, 39, 0.85);
    --ink: #f3f4f6;
    --muted: #9ca3af;
    --accent: #10b981;
    --blue: #3b82f6;
    --warn: #f59e0b;
    --border: rgba(255, 255, 255, 0.08);
}
* { box-sizing: border-box; }
body {
    margin: 0;
    background: linear-gradient(135deg, #0a0a0a, #111111 50%, #0a0a0a);
    color: var(--ink);
    font-family: \"IBM Plex Sans\", Inter, sans-serif;
}
.page { max-width: 1240px; margin: 40px auto 60px; padding: 0 24px; }
.hero { display: flex; flex-wrap: wrap; gap: 16px; justify-content: space-between; align-items: flex-end; margin-bottom: 22px; }
.title { font-size: 26px; font-weight: 600; margin: 0; }
.subtitle { margin: 6px 0 0; color: var(--muted); font-size: 13px; }
.badge { display: inline-flex; padding: 4px 10px; border-radius: 999px; border: 1px solid var(--border); font-size: 11px; font-weight: 600; letter-spacing: 0.02em; }
.badge.api { color: var(--accent); }
.badge.sample { color: var(--warn); border-style: dashed; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 14px; }
.card { background: var(--card); border: 1px solid var(--border); border-radius: 18px; padding: 16px 18px; }
.section { margin-top: 18px; }
.section h2 { margin: 0 0 4px; font-size: 18px; font-weight: 600; }
.section p.lead { margin: 0 0 12px; color: var(--muted); font-size: 13px; }
.label { font-size: 11px; text-transform: uppercase; letter-spacing: 0.08em; color: var(--muted); }
.value { font-size: 20px; font-weight: 600; margin-top: 6px; }
.sub { margin-top: 6px; font-size: 12px; color: var(--muted); }
.stats { display: flex; flex-wrap: wrap; gap: 18px; margin-bottom: 10px; font-size: 13px; }
.stats span { color: var(--muted); margin-right: 4px; }
svg.chart { width: 100%; height: auto; display: block; border-radius: 12px; }
svg.chart .hover-target:hover { fill: rgba(255, 255, 255, 0.06); cursor: crosshair; }
#optimization-plot { width: 100%; min-height: 320px; }
.rows { margin: 0; padding: 0; list-style: none; font-size: 13px; }
.rows li { display: flex; justify-content: space-between; gap: 12px; padding: 6px 0; border-bottom: 1px solid var(--border); }
.rows li span:first-child { color: var(--muted); }
.gauge { height: 6px; border-radius: 3px; background: rgba(255, 255, 255, 0.08); margin: 6px 0 12px; overflow: hidden; }
.gauge div { height: 100%; background: var(--accent); }
.note { margin-top: 10px; font-size: 12px; color: var(--warn); }
.steps { margin: 0; padding-left: 18px; font-size: 13px; }
.steps li { margin-bottom: 8px; }
.steps strong { display: block; }
.downloads { display: flex; flex-wrap: wrap; gap: 10px; }
.downloads a { padding: 8px 14px; border-radius: 999px; border: 1px solid rgba(16, 185, 129, 0.35); color: var(--accent); text-decoration: none; font-weight: 500; }
.downloads a:hover { background: rgba(16, 185, 129, 0.08); }
footer { margin-top: 16px; font-size: 12px; color: var(--muted); text-align: right; }
@media (max-width: 900px) { .title { font-size: 22px; } }
";

/// Входные данные страницы.
pub(super) struct PageContext<'a> {
    pub data: &'a SolarData,
    pub source: DataSource,
    pub links: &'a DownloadLinks,
    pub size: ChartSize,
    pub generated_at: DateTime<Utc>,
}

fn rows(items: &[(&'static str, String)]) -> Markup {
    html! {
        ul class="rows" {
            @for (label, value) in items {
                li { span { (label) } span { (value) } }
            }
        }
    }
}

fn month_list(months: &[u32]) -> String {
    if months.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        months.iter().join(", ")
    }
}

fn forecast_section(ctx: &PageContext<'_>) -> Markup {
    let data = BarDatum::from_forecast(ctx.data);
    let values = data.iter().map(|datum| datum.value).collect_vec();
    let summary = SeriesSummary::of(&values);
    let mut chart = ForecastBarChart::new(data, ctx.size.width, ctx.size.height);
    let mut canvas = SvgCanvas::new(ctx.size.width, ctx.size.height);
    chart.draw(&mut canvas, 1.0);
    html! {
        section class="section card" {
            h2 { "Power Generation Forecast" }
            p class="lead" { "Predicted daily panel output. Hover a bar for weather details." }
            @if let Some(summary) = summary {
                div class="stats" {
                    div { span { "Total" } (format!("{:.2} {UNIT_KWH}", summary.total)) }
                    div { span { "Daily average" } (format!("{:.2} {UNIT_KWH}", summary.average)) }
                    div { span { "Peak" } (format!("{:.2} {UNIT_KWH}", summary.max)) }
                    div { span { "Trend" } (format!("{:+.1}%", summary.trend_percent)) }
                }
            }
            (canvas.to_markup(FORECAST_CHART_ID, "Daily power generation forecast"))
        }
    }
}

fn weather_section(ctx: &PageContext<'_>) -> Markup {
    let mut chart = WeatherScatterChart::new(
        &ctx.data.raw_data.historical_hourly_output,
        ctx.size.width,
        ctx.size.height,
    );
    let mut canvas = SvgCanvas::new(ctx.size.width, ctx.size.height);
    chart.draw(&mut canvas, 1.0);
    let summary = chart.summary();
    html! {
        section class="section card" {
            h2 { "Weather Impact Analysis" }
            p class="lead" { "Hourly output against cloud cover with a least-squares trend line." }
            div class="stats" {
                div { span { "Samples" } (summary.samples) }
                div { span { "Correlation" } (format!("{:.3}", summary.correlation)) }
                div { span { "Avg output" } (format!("{:.3} {UNIT_KWH}", summary.average_output)) }
                div { span { "Avg cloud cover" } (format!("{:.0}%", summary.average_cloud_cover)) }
            }
            (canvas.to_markup(SCATTER_CHART_ID, "Cloud cover versus power output"))
        }
    }
}

fn recommendations_section(recommendations: &Recommendations) -> Markup {
    html! {
        section class="section" {
            h2 { "Smart Recommendations" }
            p class="lead" { "Insights to get more out of the installation." }
            div class="grid" {
                div class="card" {
                    div class="label" { "Optimal Configuration" }
                    @for gauge in &recommendations.configuration {
                        ul class="rows" { li { span { (gauge.label) } span { (gauge.value) } } }
                        div class="gauge" {
                            div style=(format!("width: {:.1}%", gauge.fraction * 100.0)) {}
                        }
                    }
                    div class="sub" { "Expected improvement" }
                    div class="value" { (recommendations.expected_improvement) }
                }
                div class="card" {
                    div class="label" { "Financial Projection" }
                    (rows(&recommendations.financial))
                }
                div class="card" {
                    div class="label" { "Maintenance Schedule" }
                    (rows(&recommendations.maintenance))
                    @if let Some(note) = &recommendations.priority_note {
                        div class="note" { (note) }
                    }
                }
            }
            div class="section card" {
                h2 { "Actionable Recommendations" }
                div class="grid" {
                    div {
                        div class="label" { "Current vs. Optimal Setup" }
                        (rows(&recommendations.comparison))
                        div class="label" style="margin-top: 14px" { "Financial Benefits" }
                        (rows(&recommendations.benefits))
                    }
                    div {
                        div class="label" { "Optimization Steps" }
                        ol class="steps" {
                            @for step in &recommendations.steps {
                                li { strong { (step.title) } (step.detail) }
                            }
                        }
                    }
                    div {
                        div class="label" { "Weather Considerations" }
                        (rows(&recommendations.weather))
                        div class="label" style="margin-top: 14px" { "Seasonal Tasks" }
                        (rows(&recommendations.seasonal_tasks))
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_lines)]
pub(super) fn render_dashboard(ctx: &PageContext<'_>) -> String {
    let data = ctx.data;
    let location = &data.location_analysis;
    let performance = &data.current_system_performance;
    let optimization = &data.optimization_recommendations;
    let plot_html = build_optimization_chart(optimization).to_inline_html(Some(PLOT_ID));
    let recommendations = Recommendations::from_data(data);
    let generated_label = ctx.generated_at.format(GENERATED_AT_FORMAT).to_string();
    let (source_class, source_label) = match ctx.source {
        DataSource::Api => ("badge api", "API data"),
        DataSource::Sample => ("badge sample", "Sample data"),
    };
    let page = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (PAGE_TITLE) " · " (data.location_label()) }
                link rel="icon" type="image/svg+xml" href=(FAVICON_DATA_URI);
                link rel="preconnect" href="https://fonts.googleapis.com";
                link rel="stylesheet" href=(GOOGLE_FONTS_CSS);
                script src=(PLOTLY_CDN) {}
                style { (PreEscaped(STYLE)) }
            }
            body {
                div class="page" {
                    header class="hero" {
                        div {
                            h1 class="title" { (PAGE_TITLE) }
                            p class="subtitle" {
                                (data.location_label()) " · " (location.start_date) " – " (location.end_date)
                            }
                            p class="subtitle" { (PAGE_SUBTITLE) }
                        }
                        span class=(source_class) { (source_label) }
                    }
                    section class="grid" {
                        div class="card" {
                            div class="label" { "Annual Output" }
                            div class="value" { (format!("{:.1} {UNIT_KWH}", performance.annual_output_kwh)) }
                            div class="sub" { "Current system performance" }
                        }
                        div class="card" {
                            div class="label" { "Optimal Potential" }
                            div class="value" { (format!("{:.1} {UNIT_KWH}", optimization.optimal_annual_output)) }
                            div class="sub" { (format!("+{:.1}% improvement", optimization.improvement_percentage)) }
                        }
                        div class="card" {
                            div class="label" { "Annual Savings" }
                            div class="value" { (format!("{CURRENCY} {:.2}", data.financial_projections.annual_savings)) }
                            div class="sub" { "Projected financial benefit" }
                        }
                        div class="card" {
                            div class="label" { "Solar Potential" }
                            div class="value" { (location.solar_potential_rating) }
                            div class="sub" {
                                (format!("Capacity factor {:.1}%", performance.capacity_factor))
                                " · best months " (month_list(&location.best_months))
                                " · worst months " (month_list(&location.worst_months))
                            }
                        }
                    }
                    (forecast_section(ctx))
                    (weather_section(ctx))
                    section class="section card" {
                        h2 { "Optimization Potential" }
                        p class="lead" { "Annual output of the current setup against the optimal orientation." }
                        (PreEscaped(plot_html))
                    }
                    (recommendations_section(&recommendations))
                    section class="section card" {
                        h2 { "Download Reports" }
                        p class="lead" { "Forecast data and the full report." }
                        div class="downloads" {
                            a href=(&ctx.links.csv) download { "Forecast CSV" }
                            a href=(&ctx.links.detailed_csv) download { "Detailed CSV" }
                            @if let Some(pdf) = &ctx.links.pdf {
                                a href=(pdf) download { "PDF Report" }
                            }
                            @if let Some(json) = &ctx.links.json {
                                a href=(json) download { "Raw JSON" }
                            }
                        }
                    }
                    footer {
                        "Version: " (APP_VERSION) " · Generated: " (generated_label)
                    }
                }
            }
        }
    };
    page.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_data;

    fn links() -> DownloadLinks {
        DownloadLinks {
            csv: "solar_forecast.csv.gz".to_string(),
            detailed_csv: "solar_forecast_detailed.csv".to_string(),
            pdf: Some("solar_report.pdf".to_string()),
            json: None,
        }
    }

    #[test]
    fn dashboard_contains_charts_and_downloads() {
        let data = sample_data().unwrap();
        let links = links();
        let html = render_dashboard(&PageContext {
            data: &data,
            source: DataSource::Sample,
            links: &links,
            size: ChartSize {
                width: 800.0,
                height: 400.0,
            },
            generated_at: Utc::now(),
        });
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("id=\"forecast-chart\""));
        assert!(html.contains("id=\"weather-chart\""));
        assert!(html.contains(PLOT_ID));
        assert!(html.contains("href=\"solar_forecast.csv.gz\""));
        assert!(html.contains("Sample data"));
        assert!(html.contains("Priority cleaning in September"));
        assert!(!html.contains("Raw JSON"));
        assert_eq!(html.matches("class=\"hover-target\"").count(), 5 + 13);
    }
}
