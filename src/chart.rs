//! Рисованные графики прогноза: геометрия, цвета, подсказки и общая поверхность рисования.

mod animation;
mod bar;
mod canvas;
mod scatter;

use std::time::Duration;

pub use animation::Animation;
pub use bar::{BarDatum, ForecastBarChart};
pub use canvas::{Anchor, Canvas, HoverRegion, Stroke, SvgCanvas, TextStyle};
pub use scatter::WeatherScatterChart;

pub const FONT_FAMILY: &str = "IBM Plex Sans, Inter, sans-serif";
pub const GRID_DIVISIONS: u32 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Попадание точки в прямоугольник, границы включительно.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Размер поверхности рисования и поля вокруг области графика.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Viewport {
    pub const fn new(width: f64, height: f64, margin: Margin) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    /// Область графика без полей; `None`, если поверхность слишком мала.
    pub fn plot_area(&self) -> Option<Rect> {
        let width = self.width - self.margin.left - self.margin.right;
        let height = self.height - self.margin.top - self.margin.bottom;
        (width > 0.0 && height > 0.0).then(|| {
            Rect::new(self.margin.left, self.margin.top, width, height)
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Линейная интерполяция между двумя цветами, `t` ограничивается отрезком 0..=1.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let channel = |from: u8, to: u8| -> u8 {
            let value = (f64::from(to) - f64::from(from)).mul_add(t, f64::from(from));
            value.round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: (other.a - self.a).mul_add(t, self.a),
        }
    }

    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Содержимое всплывающей подсказки при наведении.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub anchor: Point,
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl Tooltip {
    /// Текст для нативной подсказки (`<title>` в SVG).
    pub fn plain_text(&self) -> String {
        std::iter::once(self.title.clone())
            .chain(
                self.rows
                    .iter()
                    .map(|(label, value)| format!("{label}: {value}")),
            )
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Интерактивный график: кадры анимации появления, размер поверхности и указатель.
pub trait ChartView {
    /// Полная перерисовка с прогрессом анимации `progress`.
    fn draw(&mut self, canvas: &mut impl Canvas, progress: f64);
    fn animation(&mut self) -> &mut Animation;
    fn viewport(&mut self) -> &mut Viewport;
    /// Движение указателя: обновляет подсветку и возвращает подсказку.
    fn pointer_move(&mut self, pointer: Point) -> Option<Tooltip>;
    fn pointer_leave(&mut self);
    fn hovered(&self) -> Option<usize>;

    /// Очередной кадр анимации появления; `false`, когда анимация закончилась или отменена.
    fn next_frame(&mut self, canvas: &mut impl Canvas, frame: Duration) -> bool {
        match self.animation().tick(frame) {
            Some(progress) => {
                self.draw(canvas, progress);
                true
            }
            None => false,
        }
    }

    fn cancel_animation(&mut self) {
        self.animation().cancel();
    }

    /// Изменение размера поверхности: пересчёт раскладки и перерисовка целиком.
    fn resize(&mut self, canvas: &mut impl Canvas, width: f64, height: f64) {
        let viewport = self.viewport();
        viewport.width = width;
        viewport.height = height;
        self.draw(canvas, 1.0);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_area_excludes_margins() {
        let viewport = Viewport::new(
            400.0,
            300.0,
            Margin {
                top: 30.0,
                right: 30.0,
                bottom: 60.0,
                left: 70.0,
            },
        );
        assert_eq!(
            viewport.plot_area(),
            Some(Rect::new(70.0, 30.0, 300.0, 210.0))
        );
        let tiny = Viewport::new(50.0, 50.0, viewport.margin);
        assert!(tiny.plot_area().is_none());
    }

    #[test]
    fn rect_contains_is_inclusive() {
        let rect = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(rect.contains(Point::new(10.0, 15.0)));
        assert!(!rect.contains(Point::new(15.1, 12.0)));
    }

    #[test]
    fn color_interpolation_hits_endpoints() {
        let clear = Rgba::new(250, 204, 21, 0.8);
        let overcast = Rgba::new(100, 116, 139, 0.8);
        assert_eq!(clear.lerp(overcast, 0.0), clear);
        assert_eq!(clear.lerp(overcast, 1.0), overcast);
        assert_eq!(clear.lerp(overcast, 2.0), overcast);
        assert_eq!(clear.lerp(overcast, 0.5).r, 175);
    }
}
