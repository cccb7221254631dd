//! Plotly-график сравнения текущей и оптимальной годовой выработки.

use plotly::color::{Rgb, Rgba};
use plotly::common::{Anchor, Font, Line, Marker, TextPosition, Title};
use plotly::layout::{Annotation, Axis, Layout, Margin, TicksDirection};
use plotly::{Bar, Configuration, Plot};

use crate::constants::UNIT_KWH;
use crate::forecast::OptimizationRecommendations;

pub(super) const PLOT_ID: &str = "optimization-plot";
const LABEL_CURRENT: &str = "Current System";
const LABEL_OPTIMAL: &str = "Optimized System";
const Y_TITLE: &str = "Annual Output (kWh)";
const FONT_FAMILY: &str = "IBM Plex Sans, Inter, sans-serif";
const FONT_SIZE_BASE: usize = 12;
const FONT_SIZE_AXIS_TITLE: usize = 13;
const FONT_SIZE_IMPROVEMENT: usize = 16;
const HEADROOM: f64 = 1.1;
const MARKER_LINE_WIDTH: f64 = 2.0;
const BAR_WIDTH: f64 = 0.5;
const TICK_LENGTH: usize = 6;
const MARGIN_LEFT: usize = 80;
const MARGIN_RIGHT: usize = 40;
const MARGIN_TOP: usize = 40;
const MARGIN_BOTTOM: usize = 60;
const COLOR_CURRENT: (u8, u8, u8) = (239, 68, 68);
const COLOR_OPTIMAL: (u8, u8, u8) = (16, 185, 129);
const COLOR_BAR_OUTLINE: (u8, u8, u8, f64) = (255, 255, 255, 0.2);
const COLOR_TEXT: (u8, u8, u8) = (209, 213, 219);
const COLOR_AXIS_LINE: (u8, u8, u8, f64) = (255, 255, 255, 0.3);
const COLOR_AXIS_GRID: (u8, u8, u8, f64) = (255, 255, 255, 0.08);
const COLOR_BACKGROUND: (u8, u8, u8, f64) = (0, 0, 0, 0.0);

fn rgb(color: (u8, u8, u8)) -> Rgb {
    Rgb::new(color.0, color.1, color.2)
}

fn rgba(color: (u8, u8, u8, f64)) -> Rgba {
    Rgba::new(color.0, color.1, color.2, color.3)
}

/// Два столбца (текущая и оптимальная выработка) и подпись прироста над ними.
pub(super) fn build_optimization_chart(optimization: &OptimizationRecommendations) -> Plot {
    let current = optimization.current_annual_output;
    let optimal = optimization.optimal_annual_output;
    let axis_max = current.max(optimal).max(0.0) * HEADROOM;

    let mut plot = Plot::new();
    plot.add_trace(
        Bar::new(
            vec![LABEL_CURRENT.to_string(), LABEL_OPTIMAL.to_string()],
            vec![current, optimal],
        )
        .width(BAR_WIDTH)
        .marker(
            Marker::new()
                .color_array(vec![rgb(COLOR_CURRENT), rgb(COLOR_OPTIMAL)])
                .line(
                    Line::new()
                        .color(rgba(COLOR_BAR_OUTLINE))
                        .width(MARKER_LINE_WIDTH),
                ),
        )
        .text_array(vec![
            format!("{current:.1} {UNIT_KWH}"),
            format!("{optimal:.1} {UNIT_KWH}"),
        ])
        .text_position(TextPosition::Outside)
        .show_legend(false),
    );

    let improvement = Annotation::new()
        .text(format!("+{:.1}%", optimization.improvement_percentage))
        .x_ref("paper")
        .y_ref("paper")
        .x(0.5)
        .y(0.5)
        .x_anchor(Anchor::Center)
        .y_anchor(Anchor::Middle)
        .show_arrow(false)
        .font(
            Font::new()
                .size(FONT_SIZE_IMPROVEMENT)
                .color(rgb(COLOR_OPTIMAL)),
        );

    let layout = Layout::new()
        .font(
            Font::new()
                .family(FONT_FAMILY)
                .size(FONT_SIZE_BASE)
                .color(rgb(COLOR_TEXT)),
        )
        .auto_size(true)
        .margin(
            Margin::new()
                .left(MARGIN_LEFT)
                .right(MARGIN_RIGHT)
                .top(MARGIN_TOP)
                .bottom(MARGIN_BOTTOM),
        )
        .paper_background_color(rgba(COLOR_BACKGROUND))
        .plot_background_color(rgba(COLOR_BACKGROUND))
        .show_legend(false)
        .annotations(vec![improvement])
        .x_axis(
            Axis::new()
                .show_line(true)
                .line_color(rgba(COLOR_AXIS_LINE)),
        )
        .y_axis(
            Axis::new()
                .title(
                    Title::with_text(Y_TITLE).font(Font::new().size(FONT_SIZE_AXIS_TITLE)),
                )
                .range(vec![0.0, axis_max])
                .ticks(TicksDirection::Outside)
                .tick_length(TICK_LENGTH)
                .show_line(true)
                .line_color(rgba(COLOR_AXIS_LINE))
                .grid_color(rgba(COLOR_AXIS_GRID))
                .auto_margin(true),
        );
    plot.set_layout(layout);
    plot.set_configuration(Configuration::new().responsive(true));
    plot
}
