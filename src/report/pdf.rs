//! PDF-отчёт A4: сводка на первой странице и таблица прогноза на следующих.
//!
//! Раскладка считается отдельно от отрисовки: страницы описываются текстами и линиями
//! в миллиметрах от верхнего левого угла, а printpdf получает уже готовые координаты.

use std::error::Error;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use crate::constants::{DATE_FORMAT, NOT_AVAILABLE};
use crate::forecast::{DailyForecast, SolarData};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LAYER_NAME: &str = "Layer 1";
const DOCUMENT_TITLE: &str = "Solar Power Generation Report";
const TABLE_TITLE: &str = "Daily Power Generation Forecast";
const FONT_SIZE_TITLE: f32 = 20.0;
const FONT_SIZE_SECTION: f32 = 16.0;
const FONT_SIZE_BODY: f32 = 12.0;
const FONT_SIZE_TABLE: f32 = 10.0;
const LEFT: f32 = 14.0;
const INDENT: f32 = 20.0;
const TABLE_TOP: f32 = 30.0;
const TABLE_BOTTOM: f32 = 277.0;
const ROW_HEIGHT: f32 = 8.0;
const CELL_PADDING: f32 = 2.0;
const TEXT_BASELINE: f32 = 5.5;
/// Средняя ширина глифа Helvetica относительно кегля.
const GLYPH_WIDTH: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;
const COLUMNS: [(&str, f32); 5] = [
    ("Date", 30.0),
    ("Output (kWh)", 34.0),
    ("Temperature (C)", 40.0),
    ("Cloud Cover (%)", 40.0),
    ("Precipitation (mm)", 38.0),
];
const CURRENCY: &str = "Rs.";
const COLOR_GRID: (f32, f32, f32) = (0.55, 0.55, 0.55);
const COLOR_HEADER: (f32, f32, f32) = (0.26, 0.53, 0.96);
const COLOR_TEXT: (f32, f32, f32) = (0.0, 0.0, 0.0);

#[derive(Clone, Debug, PartialEq)]
pub(super) struct PdfText {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub bold: bool,
    pub accent: bool,
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct PdfPage {
    pub texts: Vec<PdfText>,
    pub lines: Vec<((f32, f32), (f32, f32))>,
}

impl PdfPage {
    fn text(&mut self, x: f32, y: f32, size: f32, content: impl Into<String>) {
        self.texts.push(PdfText {
            x,
            y,
            size,
            bold: false,
            accent: false,
            content: ascii(&content.into()),
        });
    }

    fn heading(&mut self, x: f32, y: f32, size: f32, content: impl Into<String>) {
        self.text(x, y, size, content);
        if let Some(last) = self.texts.last_mut() {
            last.bold = true;
        }
    }

    fn centered(&mut self, y: f32, size: f32, content: &str) {
        let x = (PAGE_WIDTH - approx_width(content, size)) / 2.0;
        self.heading(x.max(LEFT), y, size, content);
    }
}

/// Встроенные шрифты PDF кодируют только однобайтовые символы.
fn ascii(text: &str) -> String {
    text.chars()
        .filter(|ch| *ch != '°')
        .map(|ch| if ch.is_ascii() { ch } else { '?' })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn approx_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH * PT_TO_MM
}

fn money(value: f64) -> String {
    format!("{CURRENCY} {value:.2}")
}

/// Первая страница с фиксированными координатами строк.
pub(super) fn summary_page(data: &SolarData) -> PdfPage {
    let location = &data.location_analysis;
    let performance = &data.current_system_performance;
    let optimization = &data.optimization_recommendations;
    let financial = &data.financial_projections;
    let mut page = PdfPage::default();

    page.centered(20.0, FONT_SIZE_TITLE, DOCUMENT_TITLE);
    page.text(
        LEFT,
        30.0,
        FONT_SIZE_BODY,
        format!(
            "Location: {} (Latitude {}, Longitude {})",
            data.location_label(),
            location.latitude,
            location.longitude
        ),
    );
    page.text(
        LEFT,
        38.0,
        FONT_SIZE_BODY,
        format!(
            "Solar Potential Rating: {}",
            location.solar_potential_rating
        ),
    );

    page.heading(LEFT, 50.0, FONT_SIZE_SECTION, "Current System Performance");
    page.text(
        INDENT,
        58.0,
        FONT_SIZE_BODY,
        format!("Annual Output: {:.2} kWh", performance.annual_output_kwh),
    );
    page.text(
        INDENT,
        66.0,
        FONT_SIZE_BODY,
        format!("Monthly Average: {:.2} kWh", performance.monthly_average),
    );
    page.text(
        INDENT,
        74.0,
        FONT_SIZE_BODY,
        format!("Peak Daily Output: {:.2} kWh", performance.peak_daily_output),
    );

    page.heading(LEFT, 90.0, FONT_SIZE_SECTION, "Optimization Recommendations");
    let optimization_rows = [
        format!(
            "Current Annual Output: {:.2} kWh",
            optimization.current_annual_output
        ),
        format!(
            "Optimal Annual Output: {:.2} kWh",
            optimization.optimal_annual_output
        ),
        format!("Improvement: {:.2}%", optimization.improvement_percentage),
        format!("Optimal Tilt: {} deg", optimization.optimal_tilt),
        format!("Optimal Azimuth: {} deg", optimization.optimal_azimuth),
    ];
    for (row, content) in (0u8..).zip(optimization_rows) {
        page.text(INDENT, f32::from(row).mul_add(8.0, 98.0), FONT_SIZE_BODY, content);
    }

    page.heading(LEFT, 146.0, FONT_SIZE_SECTION, "Financial Projections");
    page.text(
        INDENT,
        154.0,
        FONT_SIZE_BODY,
        format!("Annual Savings: {}", money(financial.annual_savings)),
    );
    page.text(
        INDENT,
        162.0,
        FONT_SIZE_BODY,
        format!("25-Year Savings: {}", money(financial.savings_25_year)),
    );
    page.text(
        INDENT,
        170.0,
        FONT_SIZE_BODY,
        format!(
            "Carbon Offset: {:.2} tons/year",
            financial.carbon_offset_tons_per_year
        ),
    );
    page
}

fn table_cells(date: chrono::NaiveDate, day: &DailyForecast) -> [String; 5] {
    let optional = |value: Option<f64>, suffix: &str| {
        value.map_or_else(|| NOT_AVAILABLE.to_string(), |value| format!("{value:.2}{suffix}"))
    };
    [
        date.format(DATE_FORMAT).to_string(),
        format!("{:.2} kWh", day.theoretical_panel_output),
        optional(day.temperature_2m, " C"),
        optional(day.cloud_cover, "%"),
        day.precipitation
            .map_or_else(|| NOT_AVAILABLE.to_string(), |value| format!("{value:.1} mm")),
    ]
}

fn table_row(page: &mut PdfPage, top: f32, cells: &[String], header: bool) {
    let width: f32 = COLUMNS.iter().map(|(_, width)| width).sum();
    page.lines.push(((LEFT, top), (LEFT + width, top)));
    page.lines
        .push(((LEFT, top + ROW_HEIGHT), (LEFT + width, top + ROW_HEIGHT)));
    let mut x = LEFT;
    page.lines.push(((x, top), (x, top + ROW_HEIGHT)));
    for ((_, column_width), cell) in COLUMNS.iter().zip(cells) {
        page.texts.push(PdfText {
            x: x + CELL_PADDING,
            y: top + TEXT_BASELINE,
            size: FONT_SIZE_TABLE,
            bold: header,
            accent: header,
            content: ascii(cell),
        });
        x += column_width;
        page.lines.push(((x, top), (x, top + ROW_HEIGHT)));
    }
}

/// Строк данных на странице таблицы (под строкой заголовка).
pub(super) fn rows_per_page() -> usize {
    let rows = ((TABLE_BOTTOM - TABLE_TOP) / ROW_HEIGHT).floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rows = rows as usize;
    rows.saturating_sub(1).max(1)
}

/// Таблица прогноза на стольких страницах, сколько нужно; шапка повторяется на каждой.
pub(super) fn table_pages(data: &SolarData) -> Vec<PdfPage> {
    let header = COLUMNS.map(|(title, _)| title.to_string());
    let rows = data
        .forecast_series()
        .map(|(date, day)| table_cells(date, day))
        .collect::<Vec<_>>();
    rows.chunks(rows_per_page())
        .enumerate()
        .map(|(index, chunk)| {
            let mut page = PdfPage::default();
            if index == 0 {
                page.centered(20.0, FONT_SIZE_SECTION, TABLE_TITLE);
            }
            table_row(&mut page, TABLE_TOP, &header, true);
            let mut top = TABLE_TOP + ROW_HEIGHT;
            for row in chunk {
                table_row(&mut page, top, row, false);
                top += ROW_HEIGHT;
            }
            page
        })
        .collect()
}

fn rgb(color: (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(color.0, color.1, color.2, None))
}

fn draw_page(
    layer: &PdfLayerReference,
    page: &PdfPage,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    layer.set_outline_color(rgb(COLOR_GRID));
    layer.set_outline_thickness(0.5);
    for ((x1, y1), (x2, y2)) in &page.lines {
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(*x1), Mm(PAGE_HEIGHT - y1)), false),
                (Point::new(Mm(*x2), Mm(PAGE_HEIGHT - y2)), false),
            ],
            is_closed: false,
        });
    }
    for text in &page.texts {
        let color = if text.accent { COLOR_HEADER } else { COLOR_TEXT };
        layer.set_fill_color(rgb(color));
        let font = if text.bold { bold } else { regular };
        layer.use_text(
            text.content.as_str(),
            text.size,
            Mm(text.x),
            Mm(PAGE_HEIGHT - text.y),
            font,
        );
    }
}

/// Собирает PDF целиком в памяти.
pub fn generate_pdf(data: &SolarData) -> Result<Vec<u8>, Box<dyn Error>> {
    data.validate()?;
    let (document, first_page, first_layer) = PdfDocument::new(
        DOCUMENT_TITLE,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        LAYER_NAME,
    );
    let regular = document.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = document.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let layer = document.get_page(first_page).get_layer(first_layer);
    draw_page(&layer, &summary_page(data), &regular, &bold);

    for page in table_pages(data) {
        let (page_index, layer_index) =
            document.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let layer = document.get_page(page_index).get_layer(layer_index);
        draw_page(&layer, &page, &regular, &bold);
    }
    Ok(document.save_to_bytes()?)
}
