//! Диаграмма рассеяния облачности и выработки с линией тренда.

use chrono::NaiveDateTime;
use itertools::Itertools;

use super::{
    Anchor, Animation, Canvas, ChartView, GRID_DIVISIONS, HoverRegion, Margin, Point, Rect, Rgba,
    Stroke, TextStyle, Tooltip, Viewport,
};
use crate::constants::{NOT_AVAILABLE, UNIT_CELSIUS, UNIT_KWH};
use crate::forecast::{HourlySample, WeatherCondition};
use crate::stats::{Extent, LinearFit, linear_regression, pearson};

const MARGIN: Margin = Margin {
    top: 30.0,
    right: 40.0,
    bottom: 70.0,
    left: 80.0,
};
const MAX_CLOUD_COVER: f64 = 100.0;
const HOVER_RADIUS: f64 = 15.0;
const POINT_BASE_RADIUS: f64 = 3.0;
const POINT_RADIUS_SPAN: f64 = 4.0;
const HOVER_SCALE: f64 = 1.5;
const SHADOW_THRESHOLD: f64 = 0.5;
const TICK_LENGTH: f64 = 5.0;
const FONT_SIZE_LABEL: f64 = 11.0;
const FONT_SIZE_TITLE: f64 = 13.0;
const X_TITLE: &str = "Cloud Cover (%)";
const Y_TITLE: &str = "Power Output (kWh)";
const DASH_GRID: (f64, f64) = (2.0, 2.0);
const DASH_TREND: (f64, f64) = (5.0, 5.0);
const COLOR_BACKGROUND: Rgba = Rgba::new(17, 24, 39, 1.0);
const COLOR_PLOT_BG: Rgba = Rgba::new(59, 130, 246, 0.05);
const COLOR_GRID: Rgba = Rgba::new(255, 255, 255, 0.1);
const COLOR_TREND: Rgba = Rgba::opaque(245, 158, 11);
const COLOR_SHADOW: Rgba = Rgba::new(0, 0, 0, 0.3);
const COLOR_CLEAR_SKY: Rgba = Rgba::new(250, 204, 21, 0.8);
const COLOR_OVERCAST: Rgba = Rgba::new(100, 116, 139, 0.8);
const COLOR_HIGHLIGHT: Rgba = Rgba::opaque(255, 255, 255);
const COLOR_PULSE: Rgba = Rgba::new(255, 255, 255, 0.5);
const COLOR_AXIS: Rgba = Rgba::new(255, 255, 255, 0.4);
const COLOR_TICK: Rgba = Rgba::new(255, 255, 255, 0.3);
const COLOR_LABEL: Rgba = Rgba::opaque(209, 213, 219);
const COLOR_TITLE: Rgba = Rgba::opaque(255, 255, 255);
const FORMAT_TIME: &str = "%Y-%m-%d %H:%M";

/// Точка диаграммы с экранными координатами последней отрисовки.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterPoint {
    pub time: NaiveDateTime,
    pub cloud_cover: f64,
    pub output: f64,
    pub temperature: Option<f64>,
    pub color: Rgba,
    pub radius: f64,
    pub position: Point,
}

/// Сводные показатели для заголовка диаграммы.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterSummary {
    pub samples: usize,
    pub correlation: f64,
    pub average_output: f64,
    pub average_cloud_cover: f64,
}

pub struct WeatherScatterChart {
    points: Vec<ScatterPoint>,
    viewport: Viewport,
    trend: Option<LinearFit>,
    correlation: f64,
    hovered: Option<usize>,
    animation: Animation,
}

/// Отбрасывает ночные/нулевые часы и часы без облачности, считает цвет и размер точек.
fn prepare_points(samples: &[HourlySample]) -> Vec<ScatterPoint> {
    let usable = samples
        .iter()
        .filter(|sample| sample.predicted_solar_output_kwh > 0.0)
        .filter_map(|sample| {
            sample
                .cloud_cover
                .filter(|cloud| cloud.is_finite())
                .map(|cloud| (sample, cloud))
        })
        .collect_vec();
    let max_output = usable
        .iter()
        .map(|(sample, _)| sample.predicted_solar_output_kwh)
        .fold(0.0, f64::max);

    usable
        .into_iter()
        .map(|(sample, cloud)| {
            let fraction = (cloud / MAX_CLOUD_COVER).clamp(0.0, 1.0);
            let relative = if max_output > 0.0 {
                sample.predicted_solar_output_kwh / max_output
            } else {
                0.0
            };
            ScatterPoint {
                time: sample.time,
                cloud_cover: cloud,
                output: sample.predicted_solar_output_kwh,
                temperature: sample.temperature_2m,
                color: COLOR_CLEAR_SKY.lerp(COLOR_OVERCAST, fraction),
                radius: relative.mul_add(POINT_RADIUS_SPAN, POINT_BASE_RADIUS),
                position: Point::default(),
            }
        })
        .collect()
}

impl WeatherScatterChart {
    pub fn new(samples: &[HourlySample], width: f64, height: f64) -> Self {
        let mut chart = Self {
            points: Vec::new(),
            viewport: Viewport::new(width, height, MARGIN),
            trend: None,
            correlation: 0.0,
            hovered: None,
            animation: Animation::scatter_entrance(),
        };
        chart.load(samples);
        chart
    }

    fn load(&mut self, samples: &[HourlySample]) {
        self.points = prepare_points(samples);
        let pairs = self
            .points
            .iter()
            .map(|point| (point.cloud_cover, point.output))
            .collect_vec();
        self.trend = linear_regression(&pairs);
        self.correlation = pearson(&pairs);
        self.hovered = None;
    }

    /// Новые данные: пересчёт статистики и перезапуск анимации появления.
    pub fn set_data(&mut self, samples: &[HourlySample]) {
        self.animation.cancel();
        self.load(samples);
        self.animation.restart();
    }

    pub fn summary(&self) -> ScatterSummary {
        let outputs = self.points.iter().map(|point| point.output).collect_vec();
        let clouds = self
            .points
            .iter()
            .map(|point| point.cloud_cover)
            .collect_vec();
        ScatterSummary {
            samples: self.points.len(),
            correlation: self.correlation,
            average_output: Extent::of(&outputs).map_or(0.0, |extent| extent.mean),
            average_cloud_cover: Extent::of(&clouds).map_or(0.0, |extent| extent.mean),
        }
    }

    /// Ближайшая к указателю точка не дальше радиуса наведения.
    fn hit_test(&self, pointer: Point) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(index, point)| (index, point.position.distance(pointer)))
            .filter(|(_, distance)| *distance < HOVER_RADIUS)
            .min_by(|(_, left), (_, right)| left.total_cmp(right))
            .map(|(index, _)| index)
    }

    fn tooltip(&self, index: usize) -> Tooltip {
        let point = &self.points[index];
        Tooltip {
            anchor: point.position,
            title: point.time.format(FORMAT_TIME).to_string(),
            rows: vec![
                (
                    "Cloud Cover".to_string(),
                    format!("{:.0}%", point.cloud_cover),
                ),
                (
                    "Output".to_string(),
                    format!("{:.3} {UNIT_KWH}", point.output),
                ),
                (
                    "Temperature".to_string(),
                    point.temperature.map_or_else(
                        || NOT_AVAILABLE.to_string(),
                        |value| format!("{value:.1}{UNIT_CELSIUS}"),
                    ),
                ),
                (
                    "Weather".to_string(),
                    WeatherCondition::classify(Some(point.cloud_cover), None)
                        .label()
                        .to_string(),
                ),
            ],
        }
    }
}

impl ChartView for WeatherScatterChart {
    #[allow(clippy::too_many_lines)]
    fn draw(&mut self, canvas: &mut impl Canvas, progress: f64) {
        canvas.clear(self.viewport.width, self.viewport.height);
        canvas.fill_rect(
            Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height),
            COLOR_BACKGROUND,
        );
        let Some(area) = self.viewport.plot_area() else {
            return;
        };
        let outputs = self.points.iter().map(|point| point.output).collect_vec();
        let Some(extent) = Extent::of(&outputs) else {
            return;
        };
        let span = extent.span();
        let to_y = |output: f64| area.bottom() - (output - extent.min) / span * area.height;
        let to_x = |cloud: f64| (cloud / MAX_CLOUD_COVER).mul_add(area.width, area.x);

        canvas.fill_rect(area, COLOR_PLOT_BG);
        let grid = Stroke::dashed(COLOR_GRID, 1.0, DASH_GRID);
        let divisions = f64::from(GRID_DIVISIONS);
        for step in 0..=GRID_DIVISIONS {
            let fraction = f64::from(step) / divisions;
            let y = area.height.mul_add(fraction, area.y);
            canvas.line(Point::new(area.x, y), Point::new(area.right(), y), grid);
            let x = area.width.mul_add(fraction, area.x);
            canvas.line(Point::new(x, area.y), Point::new(x, area.bottom()), grid);
        }

        for point in &mut self.points {
            point.position = Point::new(to_x(point.cloud_cover), to_y(point.output));
        }

        if let Some(trend) = self.trend {
            canvas.line(
                Point::new(area.x, to_y(trend.at(0.0))),
                Point::new(area.right(), to_y(trend.at(MAX_CLOUD_COVER))),
                Stroke::dashed(COLOR_TREND, 3.0, DASH_TREND),
            );
        }

        for (index, point) in self.points.iter().enumerate() {
            let hovered = self.hovered == Some(index);
            let scale = if hovered { HOVER_SCALE } else { 1.0 };
            let radius = (point.radius * progress * scale).max(0.0);
            if progress > SHADOW_THRESHOLD {
                canvas.circle(
                    Point::new(point.position.x + 1.0, point.position.y + 1.0),
                    radius,
                    COLOR_SHADOW,
                    None,
                );
            }
            canvas.circle(point.position, radius, point.color, None);
            if hovered {
                canvas.circle(
                    point.position,
                    radius + 2.0,
                    Rgba::new(0, 0, 0, 0.0),
                    Some(Stroke::solid(COLOR_HIGHLIGHT, 3.0)),
                );
                canvas.circle(
                    point.position,
                    radius + 6.0,
                    Rgba::new(0, 0, 0, 0.0),
                    Some(Stroke::solid(COLOR_PULSE, 1.0)),
                );
            }
        }

        let axis = Stroke::solid(COLOR_AXIS, 2.0);
        canvas.line(
            Point::new(area.x, area.y),
            Point::new(area.x, area.bottom()),
            axis,
        );
        canvas.line(
            Point::new(area.x, area.bottom()),
            Point::new(area.right(), area.bottom()),
            axis,
        );

        let tick = Stroke::solid(COLOR_TICK, 1.0);
        for step in 0..=GRID_DIVISIONS {
            let fraction = f64::from(step) / divisions;
            let x = area.width.mul_add(fraction, area.x);
            canvas.line(
                Point::new(x, area.bottom()),
                Point::new(x, area.bottom() + TICK_LENGTH),
                tick,
            );
            canvas.text(
                Point::new(x, area.bottom() + 18.0),
                &format!("{:.0}%", MAX_CLOUD_COVER * fraction),
                TextStyle::new(FONT_SIZE_LABEL, COLOR_LABEL, Anchor::Middle),
            );

            let y = area.bottom() - area.height * fraction;
            canvas.line(
                Point::new(area.x - TICK_LENGTH, y),
                Point::new(area.x, y),
                tick,
            );
            canvas.text(
                Point::new(area.x - 10.0, y + 4.0),
                &format!("{:.1}", span.mul_add(fraction, extent.min)),
                TextStyle::new(FONT_SIZE_LABEL, COLOR_LABEL, Anchor::End),
            );
        }

        let title_style = TextStyle::new(FONT_SIZE_TITLE, COLOR_TITLE, Anchor::Middle).bold();
        canvas.text(
            Point::new(area.x + area.width / 2.0, self.viewport.height - 15.0),
            X_TITLE,
            title_style,
        );
        canvas.text(
            Point::new(25.0, area.y + area.height / 2.0),
            Y_TITLE,
            title_style.rotated(-90.0),
        );

        for (index, point) in self.points.iter().enumerate() {
            canvas.hover_region(
                HoverRegion::Circle {
                    center: point.position,
                    radius: HOVER_RADIUS,
                },
                &self.tooltip(index),
            );
        }
    }

    fn animation(&mut self) -> &mut Animation {
        &mut self.animation
    }

    fn viewport(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn pointer_move(&mut self, pointer: Point) -> Option<Tooltip> {
        self.hovered = self.hit_test(pointer);
        self.hovered.map(|index| {
            let mut tooltip = self.tooltip(index);
            tooltip.anchor = Point::new(pointer.x, pointer.y - 10.0);
            tooltip
        })
    }

    fn pointer_leave(&mut self) {
        self.hovered = None;
    }

    fn hovered(&self) -> Option<usize> {
        self.hovered
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::chart::testing::RecordingCanvas;
    use crate::sample::sample_data;

    fn sample(hour: u32, cloud: Option<f64>, output: f64) -> HourlySample {
        HourlySample {
            time: NaiveDateTime::parse_from_str(
                &format!("2025-09-15 {hour:02}:00:00"),
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
            predicted_solar_output_kwh: output,
            temperature_2m: Some(30.0),
            cloud_cover: cloud,
        }
    }

    #[test]
    fn filters_non_positive_output_and_missing_cloud() {
        let chart = WeatherScatterChart::new(
            &[
                sample(2, Some(100.0), 0.0),
                sample(9, Some(20.0), 0.8),
                sample(10, None, 0.9),
                sample(11, Some(60.0), -0.1),
                sample(12, Some(40.0), 1.2),
            ],
            640.0,
            320.0,
        );
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.summary().samples, 2);
    }

    #[test]
    fn trend_line_follows_linear_data() {
        let samples = (0..10)
            .map(|step| {
                let cloud = f64::from(step) * 10.0;
                sample(8 + step, Some(cloud), 2.0 - 0.015 * cloud)
            })
            .collect_vec();
        let chart = WeatherScatterChart::new(&samples, 640.0, 320.0);
        let trend = chart.trend.unwrap();
        assert!((trend.slope + 0.015).abs() < 1e-9);
        assert!((trend.intercept - 2.0).abs() < 1e-9);
        assert!((chart.summary().correlation + 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_cloud_cover_reports_zero_correlation() {
        let samples = [
            sample(9, Some(100.0), 0.2),
            sample(10, Some(100.0), 0.4),
            sample(11, Some(100.0), 0.6),
        ];
        let chart = WeatherScatterChart::new(&samples, 640.0, 320.0);
        let summary = chart.summary();
        assert!(chart.trend.is_none());
        assert!(summary.correlation.abs() < f64::EPSILON);
        assert!(!summary.correlation.is_nan());
    }

    #[test]
    fn fractional_constant_cloud_cover_draws_no_trend_line() {
        let samples = (0..24)
            .map(|hour| sample(hour, Some(83.21), f64::from(hour).sin() + 2.0))
            .collect_vec();
        let mut chart = WeatherScatterChart::new(&samples, 640.0, 320.0);
        assert_eq!(chart.points.len(), 24);
        assert!(chart.trend.is_none());
        assert!(chart.summary().correlation.abs() < f64::EPSILON);

        let mut with_trend = RecordingCanvas::default();
        let mut without_trend = RecordingCanvas::default();
        chart.draw(&mut without_trend, 1.0);
        let mut linear = WeatherScatterChart::new(
            &[sample(9, Some(10.0), 1.0), sample(10, Some(90.0), 0.5)],
            640.0,
            320.0,
        );
        linear.draw(&mut with_trend, 1.0);
        assert_eq!(with_trend.lines.len(), without_trend.lines.len() + 1);
    }

    #[test]
    fn point_colour_depends_on_cloud_fraction() {
        let chart = WeatherScatterChart::new(
            &[sample(9, Some(0.0), 0.5), sample(10, Some(100.0), 1.0)],
            640.0,
            320.0,
        );
        assert_eq!(chart.points[0].color, COLOR_CLEAR_SKY);
        assert_eq!(chart.points[1].color, COLOR_OVERCAST);
        assert!((chart.points[1].radius - 7.0).abs() < 1e-9);
        assert!((chart.points[0].radius - 5.0).abs() < 1e-9);
    }

    #[test]
    fn hover_picks_nearest_point_within_radius() {
        let mut chart = WeatherScatterChart::new(
            &[
                sample(9, Some(10.0), 0.5),
                sample(10, Some(12.0), 0.55),
                sample(11, Some(90.0), 1.0),
            ],
            640.0,
            320.0,
        );
        let mut canvas = RecordingCanvas::default();
        chart.draw(&mut canvas, 1.0);

        let second = chart.points[1].position;
        let tooltip = chart
            .pointer_move(Point::new(second.x + 1.0, second.y))
            .unwrap();
        assert_eq!(chart.hovered(), Some(1));
        assert_eq!(tooltip.rows[0].1, "12%");

        let far = chart.points[2].position;
        assert!(chart.pointer_move(Point::new(far.x, far.y + 40.0)).is_none());
        assert_eq!(chart.hovered(), None);
        assert_eq!(canvas.hovers.len(), 3);
    }

    #[test]
    fn renders_sample_dataset() {
        let data = sample_data().unwrap();
        let mut chart =
            WeatherScatterChart::new(&data.raw_data.historical_hourly_output, 640.0, 320.0);
        let mut canvas = RecordingCanvas::default();
        let mut frames = 0;
        while chart.next_frame(&mut canvas, Duration::from_millis(100)) {
            frames += 1;
        }
        assert_eq!(frames, 21);
        assert_eq!(canvas.circles.len(), chart.points.len() * 2);
        assert!(chart.summary().correlation < 0.0);
    }
}
