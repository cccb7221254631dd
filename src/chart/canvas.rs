//! Поверхность рисования и её SVG-реализация.

use maud::{Markup, html};

use super::{FONT_FAMILY, Point, Rect, Rgba, Tooltip};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
    /// Длина штриха и промежутка для пунктира.
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub const fn solid(color: Rgba, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub const fn dashed(color: Rgba, width: f64, dash: (f64, f64)) -> Self {
        Self {
            color,
            width,
            dash: Some(dash),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Middle,
    End,
}

impl Anchor {
    const fn svg(self) -> &'static str {
        match self {
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub color: Rgba,
    pub anchor: Anchor,
    pub bold: bool,
    /// Поворот вокруг точки привязки, в градусах.
    pub rotate: Option<f64>,
}

impl TextStyle {
    pub const fn new(size: f64, color: Rgba, anchor: Anchor) -> Self {
        Self {
            size,
            color,
            anchor,
            bold: false,
            rotate: None,
        }
    }

    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub const fn rotated(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

/// Область, в которой действует подсказка при наведении.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HoverRegion {
    Rect(Rect),
    Circle { center: Point, radius: f64 },
}

/// 2D-поверхность, на которую рисуют графики.
pub trait Canvas {
    fn clear(&mut self, width: f64, height: f64);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);
    fn line(&mut self, from: Point, to: Point, stroke: Stroke);
    fn circle(&mut self, center: Point, radius: f64, fill: Rgba, stroke: Option<Stroke>);
    fn text(&mut self, at: Point, content: &str, style: TextStyle);

    /// Поверхности без интерактивности подсказки игнорируют.
    fn hover_region(&mut self, _region: HoverRegion, _tooltip: &Tooltip) {}
}

/// Накапливает элементы SVG и отдаёт их одной разметкой.
pub struct SvgCanvas {
    width: f64,
    height: f64,
    nodes: Vec<Markup>,
}

impl SvgCanvas {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            nodes: Vec::new(),
        }
    }

    pub fn to_markup(&self, id: &str, label: &str) -> Markup {
        html! {
            svg
                id=(id)
                class="chart"
                xmlns="http://www.w3.org/2000/svg"
                viewBox=(format!("0 0 {} {}", self.width, self.height))
                preserveAspectRatio="xMidYMid meet"
                role="img"
                aria-label=(label) {
                @for node in &self.nodes {
                    (node)
                }
            }
        }
    }

    /// Самостоятельный SVG-документ (для покадровой выгрузки анимации).
    pub fn to_document(&self, id: &str, label: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}",
            self.to_markup(id, label).into_string()
        )
    }
}

fn dash_array(stroke: Stroke) -> Option<String> {
    stroke.dash.map(|(on, off)| format!("{on} {off}"))
}

fn round(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Canvas for SvgCanvas {
    fn clear(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.nodes.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        self.nodes.push(html! {
            rect
                x=(round(rect.x))
                y=(round(rect.y))
                width=(round(rect.width))
                height=(round(rect.height))
                fill=(color.css());
        });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.nodes.push(html! {
            rect
                x=(round(rect.x))
                y=(round(rect.y))
                width=(round(rect.width.max(0.0)))
                height=(round(rect.height.max(0.0)))
                fill="none"
                stroke=(stroke.color.css())
                stroke-width=(stroke.width)
                stroke-dasharray=[dash_array(stroke)];
        });
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.nodes.push(html! {
            line
                x1=(round(from.x))
                y1=(round(from.y))
                x2=(round(to.x))
                y2=(round(to.y))
                stroke=(stroke.color.css())
                stroke-width=(stroke.width)
                stroke-dasharray=[dash_array(stroke)];
        });
    }

    fn circle(&mut self, center: Point, radius: f64, fill: Rgba, stroke: Option<Stroke>) {
        if radius <= 0.0 {
            return;
        }
        self.nodes.push(html! {
            circle
                cx=(round(center.x))
                cy=(round(center.y))
                r=(round(radius))
                fill=(fill.css())
                stroke=[stroke.map(|s| s.color.css())]
                stroke-width=[stroke.map(|s| s.width)];
        });
    }

    fn text(&mut self, at: Point, content: &str, style: TextStyle) {
        let transform = style
            .rotate
            .map(|degrees| format!("rotate({degrees} {} {})", round(at.x), round(at.y)));
        self.nodes.push(html! {
            text
                x=(round(at.x))
                y=(round(at.y))
                fill=(style.color.css())
                font-family=(FONT_FAMILY)
                font-size=(style.size)
                font-weight=[style.bold.then_some("bold")]
                text-anchor=(style.anchor.svg())
                transform=[transform] {
                (content)
            }
        });
    }

    fn hover_region(&mut self, region: HoverRegion, tooltip: &Tooltip) {
        let title = tooltip.plain_text();
        let node = match region {
            HoverRegion::Rect(rect) => html! {
                rect
                    class="hover-target"
                    x=(round(rect.x))
                    y=(round(rect.y))
                    width=(round(rect.width))
                    height=(round(rect.height))
                    fill="transparent" {
                    title { (title) }
                }
            },
            HoverRegion::Circle { center, radius } => html! {
                circle
                    class="hover-target"
                    cx=(round(center.x))
                    cy=(round(center.y))
                    r=(round(radius))
                    fill="transparent" {
                    title { (title) }
                }
            },
        };
        self.nodes.push(node);
    }
}
