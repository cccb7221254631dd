//! Столбчатый график краткосрочного прогноза выработки.

use chrono::NaiveDate;
use itertools::Itertools;

use super::{
    Anchor, Animation, Canvas, ChartView, GRID_DIVISIONS, HoverRegion, Margin, Point, Rect, Rgba,
    Stroke, TextStyle, Tooltip, Viewport,
};
use crate::constants::{NOT_AVAILABLE, UNIT_CELSIUS, UNIT_KWH};
use crate::forecast::{SolarData, WeatherCondition};
use crate::stats::Extent;

const MARGIN: Margin = Margin {
    top: 30.0,
    right: 30.0,
    bottom: 60.0,
    left: 70.0,
};
const BAR_FILL_RATIO: f64 = 0.7;
const VALUE_LABEL_THRESHOLD: f64 = 0.7;
const SHADOW_OFFSET: f64 = 2.0;
const VALUE_LABEL_OFFSET: f64 = 8.0;
const DATE_LABEL_OFFSET: f64 = 20.0;
const DAY_LABEL_OFFSET: f64 = 35.0;
const Y_LABEL_OFFSET: f64 = 10.0;
const Y_TITLE_X: f64 = 20.0;
const Y_TITLE: &str = "Power Output (kWh)";
const FONT_SIZE_LABEL: f64 = 11.0;
const FONT_SIZE_TITLE: f64 = 12.0;
const DASH_GRID: (f64, f64) = (2.0, 2.0);
const COLOR_BACKGROUND: Rgba = Rgba::new(17, 24, 39, 1.0);
const COLOR_GRID: Rgba = Rgba::new(255, 255, 255, 0.1);
const COLOR_SHADOW: Rgba = Rgba::new(0, 0, 0, 0.2);
const COLOR_BAR: Rgba = Rgba::opaque(16, 185, 129);
const COLOR_BAR_HOVER: Rgba = Rgba::opaque(59, 130, 246);
const COLOR_OUTLINE: Rgba = Rgba::new(255, 255, 255, 0.3);
const COLOR_OUTLINE_HOVER: Rgba = Rgba::new(255, 255, 255, 0.8);
const COLOR_AXIS: Rgba = Rgba::new(255, 255, 255, 0.4);
const COLOR_VALUE: Rgba = Rgba::opaque(255, 255, 255);
const COLOR_DATE: Rgba = Rgba::opaque(209, 213, 219);
const COLOR_TICK: Rgba = Rgba::opaque(156, 163, 175);
const FORMAT_SHORT_DATE: &str = "%b %-d";
const FORMAT_DAY: &str = "%a";
const FORMAT_TOOLTIP_DATE: &str = "%A, %B %-d";

/// Один столбец: дата и прогнозная выработка с погодой.
#[derive(Clone, Debug, PartialEq)]
pub struct BarDatum {
    pub date: NaiveDate,
    pub value: f64,
    pub temperature: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub condition: WeatherCondition,
}

impl BarDatum {
    /// Ряд столбцов из прогноза, в порядке возрастания дат.
    pub fn from_forecast(data: &SolarData) -> Vec<Self> {
        data.forecast_series()
            .map(|(date, day)| Self {
                date,
                value: day.theoretical_panel_output,
                temperature: day.temperature_2m,
                cloud_cover: day.cloud_cover,
                condition: day.condition(),
            })
            .collect()
    }
}

/// Столбчатый график с подсветкой столбца под указателем.
pub struct ForecastBarChart {
    data: Vec<BarDatum>,
    viewport: Viewport,
    bars: Vec<Rect>,
    hovered: Option<usize>,
    animation: Animation,
}

impl ForecastBarChart {
    pub fn new(data: Vec<BarDatum>, width: f64, height: f64) -> Self {
        let data = data
            .into_iter()
            .sorted_by_key(|datum| datum.date)
            .collect();
        Self {
            data,
            viewport: Viewport::new(width, height, MARGIN),
            bars: Vec::new(),
            hovered: None,
            animation: Animation::bar_entrance(),
        }
    }

    /// Новые данные: сбрасывает подсветку и перезапускает анимацию появления.
    pub fn set_data(&mut self, data: Vec<BarDatum>) {
        self.animation.cancel();
        self.data = data
            .into_iter()
            .sorted_by_key(|datum| datum.date)
            .collect();
        self.bars.clear();
        self.hovered = None;
        self.animation.restart();
    }

    /// Индекс столбца, в прямоугольник которого попадает точка.
    fn hit_test(&self, point: Point) -> Option<usize> {
        self.bars.iter().position(|bar| bar.contains(point))
    }

    fn tooltip(&self, index: usize) -> Tooltip {
        let datum = &self.data[index];
        let anchor = self
            .bars
            .get(index)
            .map_or_else(Point::default, |rect| Point::new(rect.center_x(), rect.y));
        Tooltip {
            anchor,
            title: datum.date.format(FORMAT_TOOLTIP_DATE).to_string(),
            rows: vec![
                (
                    "Output".to_string(),
                    format!("{:.2} {UNIT_KWH}", datum.value),
                ),
                (
                    "Temperature".to_string(),
                    datum.temperature.map_or_else(
                        || NOT_AVAILABLE.to_string(),
                        |value| format!("{value:.1}{UNIT_CELSIUS}"),
                    ),
                ),
                (
                    "Cloud Cover".to_string(),
                    datum.cloud_cover.map_or_else(
                        || NOT_AVAILABLE.to_string(),
                        |value| format!("{value:.0}%"),
                    ),
                ),
                ("Weather".to_string(), datum.condition.label().to_string()),
            ],
        }
    }
}

impl ChartView for ForecastBarChart {
    fn draw(&mut self, canvas: &mut impl Canvas, progress: f64) {
        canvas.clear(self.viewport.width, self.viewport.height);
        self.bars.clear();
        canvas.fill_rect(
            Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height),
            COLOR_BACKGROUND,
        );

        let Some(area) = self.viewport.plot_area() else {
            return;
        };
        let values = self.data.iter().map(|datum| datum.value).collect_vec();
        let Some(extent) = Extent::of(&values) else {
            return;
        };
        // Ось от нуля, либо от минимума, если он отрицательный.
        let baseline = extent.min.min(0.0);
        let top = if extent.max > baseline {
            extent.max
        } else {
            baseline + 1.0
        };
        let range = top - baseline;
        let progress = progress.max(0.0);

        let grid = Stroke::dashed(COLOR_GRID, 1.0, DASH_GRID);
        let slot = area.width / self.data.len() as f64;
        for step in 0..=GRID_DIVISIONS {
            let y = area.y + area.height / f64::from(GRID_DIVISIONS) * f64::from(step);
            canvas.line(Point::new(area.x, y), Point::new(area.right(), y), grid);
        }
        for index in 0..self.data.len() {
            let x = (index as f64 + 0.5).mul_add(slot, area.x);
            canvas.line(Point::new(x, area.y), Point::new(x, area.bottom()), grid);
        }

        let bar_width = slot * BAR_FILL_RATIO;
        let spacing = slot - bar_width;
        for (index, datum) in self.data.iter().enumerate() {
            let height = (datum.value - baseline) / range * area.height * progress;
            let x = (index as f64).mul_add(slot, area.x) + spacing / 2.0;
            let y = area.bottom() - height;
            let bar = Rect::new(x, y, bar_width, height);
            let hovered = self.hovered == Some(index);

            canvas.fill_rect(
                Rect::new(x + SHADOW_OFFSET, y + SHADOW_OFFSET, bar_width, height),
                COLOR_SHADOW,
            );
            canvas.fill_rect(bar, if hovered { COLOR_BAR_HOVER } else { COLOR_BAR });
            canvas.stroke_rect(
                bar,
                if hovered {
                    Stroke::solid(COLOR_OUTLINE_HOVER, 2.0)
                } else {
                    Stroke::solid(COLOR_OUTLINE, 1.0)
                },
            );

            if progress > VALUE_LABEL_THRESHOLD {
                canvas.text(
                    Point::new(bar.center_x(), y - VALUE_LABEL_OFFSET),
                    &format!("{:.1}", datum.value),
                    TextStyle::new(FONT_SIZE_LABEL, COLOR_VALUE, Anchor::Middle).bold(),
                );
            }
            let label_style = TextStyle::new(FONT_SIZE_LABEL, COLOR_DATE, Anchor::Middle);
            canvas.text(
                Point::new(bar.center_x(), area.bottom() + DATE_LABEL_OFFSET),
                &datum.date.format(FORMAT_SHORT_DATE).to_string(),
                label_style,
            );
            canvas.text(
                Point::new(bar.center_x(), area.bottom() + DAY_LABEL_OFFSET),
                &datum.date.format(FORMAT_DAY).to_string(),
                label_style,
            );

            self.bars.push(bar);
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

        let tick_style = TextStyle::new(FONT_SIZE_LABEL, COLOR_TICK, Anchor::End);
        for step in 0..=GRID_DIVISIONS {
            let fraction = f64::from(step) / f64::from(GRID_DIVISIONS);
            let value = range.mul_add(fraction, baseline);
            let y = area.bottom() - area.height * fraction;
            canvas.text(
                Point::new(area.x - Y_LABEL_OFFSET, y + 4.0),
                &format!("{value:.1}"),
                tick_style,
            );
        }
        canvas.text(
            Point::new(Y_TITLE_X, area.y + area.height / 2.0),
            Y_TITLE,
            TextStyle::new(FONT_SIZE_TITLE, COLOR_DATE, Anchor::Middle).rotated(-90.0),
        );

        for (index, bar) in self.bars.iter().enumerate() {
            canvas.hover_region(HoverRegion::Rect(*bar), &self.tooltip(index));
        }
    }

    fn animation(&mut self) -> &mut Animation {
        &mut self.animation
    }

    fn viewport(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn pointer_move(&mut self, point: Point) -> Option<Tooltip> {
        self.hovered = self.hit_test(point);
        self.hovered.map(|index| {
            let mut tooltip = self.tooltip(index);
            tooltip.anchor.y = point.y - 30.0;
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

    fn datum(date: &str, value: f64) -> BarDatum {
        BarDatum {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            value,
            temperature: None,
            cloud_cover: None,
            condition: WeatherCondition::Clear,
        }
    }

    #[test]
    fn draws_one_bar_per_date_in_ascending_order() {
        let data = sample_data().unwrap();
        let mut chart = ForecastBarChart::new(BarDatum::from_forecast(&data), 640.0, 320.0);
        let mut canvas = RecordingCanvas::default();
        chart.draw(&mut canvas, 1.0);

        assert_eq!(chart.bars.len(), data.future_forecast.len());
        assert!(chart.data.windows(2).all(|pair| pair[0].date < pair[1].date));
        assert!(chart.bars.windows(2).all(|pair| pair[0].x < pair[1].x));
        assert_eq!(canvas.hovers.len(), 5);
    }

    #[test]
    fn unordered_input_is_sorted_by_date() {
        let chart = ForecastBarChart::new(
            vec![
                datum("2025-09-17", 3.0),
                datum("2025-09-15", 1.0),
                datum("2025-09-16", 2.0),
            ],
            640.0,
            320.0,
        );
        let dates: Vec<String> = chart.data.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, ["2025-09-15", "2025-09-16", "2025-09-17"]);
    }

    #[test]
    fn bar_heights_are_proportional_and_animated() {
        let mut chart = ForecastBarChart::new(
            vec![datum("2025-09-15", 5.0), datum("2025-09-16", 10.0)],
            400.0,
            300.0,
        );
        let mut canvas = RecordingCanvas::default();
        chart.draw(&mut canvas, 1.0);
        let full = chart.bars[1].height;
        assert!((chart.bars[0].height * 2.0 - full).abs() < 1e-9);
        assert!((full - 210.0).abs() < 1e-9);

        chart.draw(&mut canvas, 0.5);
        assert!((chart.bars[1].height - full / 2.0).abs() < 1e-9);
    }

    #[test]
    fn value_labels_appear_late_in_animation() {
        let mut chart = ForecastBarChart::new(vec![datum("2025-09-15", 7.5)], 400.0, 300.0);
        let mut canvas = RecordingCanvas::default();
        chart.draw(&mut canvas, 0.5);
        let early = canvas.texts.len();
        chart.draw(&mut canvas, 0.9);
        assert_eq!(canvas.texts.len(), early + 1);
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let mut chart = ForecastBarChart::new(
            vec![datum("2025-09-15", 0.0), datum("2025-09-16", 0.0)],
            400.0,
            300.0,
        );
        let mut canvas = RecordingCanvas::default();
        chart.draw(&mut canvas, 1.0);
        assert!(chart.bars.iter().all(|bar| bar.height.is_finite()));
    }

    #[test]
    fn pointer_hit_testing_uses_bar_bounds() {
        let mut chart = ForecastBarChart::new(
            vec![datum("2025-09-15", 1.0), datum("2025-09-16", 10.0)],
            400.0,
            300.0,
        );
        let mut canvas = RecordingCanvas::default();
        chart.draw(&mut canvas, 1.0);

        let first = chart.bars[0];
        assert!((first.y - 219.0).abs() < 1e-9);
        assert!((first.height - 21.0).abs() < 1e-9);
        // Над невысоким столбцом подсказки нет.
        assert!(
            chart
                .pointer_move(Point::new(first.center_x(), first.y - 100.0))
                .is_none()
        );
        assert_eq!(chart.hovered(), None);

        let tooltip = chart
            .pointer_move(Point::new(first.center_x(), first.y + 10.0))
            .unwrap();
        assert_eq!(chart.hovered(), Some(0));
        assert_eq!(tooltip.rows[0].1, "1.00 kWh");
        assert_eq!(tooltip.rows[1].1, "N/A");
        assert_eq!(canvas.hovers[0].0, HoverRegion::Rect(first));

        assert!(chart.pointer_move(Point::new(5.0, 5.0)).is_none());
        assert_eq!(chart.hovered(), None);

        chart.pointer_move(Point::new(chart.bars[1].center_x(), 200.0));
        assert_eq!(chart.hovered(), Some(1));
        chart.pointer_leave();
        assert_eq!(chart.hovered(), None);
    }

    #[test]
    fn resize_recomputes_layout() {
        let mut chart = ForecastBarChart::new(vec![datum("2025-09-15", 5.0)], 400.0, 300.0);
        let mut canvas = RecordingCanvas::default();
        chart.draw(&mut canvas, 1.0);
        let before = chart.bars[0];
        chart.resize(&mut canvas, 800.0, 300.0);
        assert!(chart.bars[0].width > before.width);
    }

    #[test]
    fn new_data_restarts_entrance_animation() {
        let mut chart = ForecastBarChart::new(vec![datum("2025-09-15", 5.0)], 400.0, 300.0);
        let mut canvas = RecordingCanvas::default();
        let mut frames = 0;
        while chart.next_frame(&mut canvas, Duration::from_millis(500)) {
            frames += 1;
        }
        assert_eq!(frames, 4);
        chart.pointer_move(Point::new(chart.bars[0].center_x(), 100.0));
        chart.set_data(vec![datum("2025-09-16", 3.0), datum("2025-09-17", 4.0)]);
        assert_eq!(chart.hovered(), None);
        assert!(chart.bars.is_empty());
        assert!(chart.next_frame(&mut canvas, Duration::from_millis(500)));
        assert_eq!(chart.bars.len(), 2);
    }
}
