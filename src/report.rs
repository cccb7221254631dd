//! Генерация отчётов: CSV, PDF и HTML-панель результатов.

mod chart;
mod csv;
mod page;
mod pdf;
mod recommendations;

use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::Utc;
use minify_html::{Cfg, minify};

use crate::fetch::DataSource;
use crate::forecast::SolarData;

pub use self::csv::{generate_csv, generate_detailed_csv};
pub use self::pdf::generate_pdf;

/// Имена файлов для ссылок на скачивание (относительно HTML).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadLinks {
    pub csv: String,
    pub detailed_csv: String,
    pub pdf: Option<String>,
    pub json: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartSize {
    pub width: f64,
    pub height: f64,
}

fn ensure_parent(path: &Path) -> Result<(), Box<dyn Error>> {
    // Создаём директорию для файла, если её ещё нет.
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn write_csv(data: &SolarData, path: &Path) -> Result<(), Box<dyn Error>> {
    let content = generate_csv(data)?;
    ensure_parent(path)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn write_detailed_csv(data: &SolarData, path: &Path) -> Result<(), Box<dyn Error>> {
    let content = generate_detailed_csv(data)?;
    ensure_parent(path)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn write_pdf(data: &SolarData, path: &Path) -> Result<(), Box<dyn Error>> {
    let bytes = generate_pdf(data)?;
    ensure_parent(path)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn minify_page(page: &str) -> Vec<u8> {
    let cfg = Cfg {
        keep_closing_tags: true,
        minify_css: true,
        minify_js: true,
        ..Cfg::default()
    };
    minify(page.as_bytes(), &cfg)
}

/// Рендерит панель результатов и сохраняет её в `output_html`.
pub fn write_dashboard(
    data: &SolarData,
    source: DataSource,
    links: &DownloadLinks,
    size: ChartSize,
    output_html: &Path,
    minify_html: bool,
) -> Result<(), Box<dyn Error>> {
    data.validate()?;
    let page = page::render_dashboard(&page::PageContext {
        data,
        source,
        links,
        size,
        generated_at: Utc::now(),
    });
    ensure_parent(output_html)?;
    if minify_html {
        fs::write(output_html, minify_page(&page))?;
    } else {
        fs::write(output_html, page)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_data;
    use std::env;

    #[test]
    fn writes_all_reports_into_nested_directory() {
        let data = sample_data().unwrap();
        let dir = env::temp_dir().join(format!("sunscope-report-{}", std::process::id()));
        let csv_path = dir.join("nested/solar_forecast.csv");
        let pdf_path = dir.join("nested/solar_report.pdf");
        let html_path = dir.join("nested/index.html");

        write_csv(&data, &csv_path).unwrap();
        write_pdf(&data, &pdf_path).unwrap();
        let links = DownloadLinks {
            csv: "solar_forecast.csv".to_string(),
            detailed_csv: "solar_forecast_detailed.csv".to_string(),
            pdf: Some("solar_report.pdf".to_string()),
            json: None,
        };
        let size = ChartSize {
            width: 640.0,
            height: 320.0,
        };
        write_dashboard(&data, DataSource::Api, &links, size, &html_path, true).unwrap();

        assert_eq!(fs::read_to_string(&csv_path).unwrap().lines().count(), 6);
        assert!(fs::read(&pdf_path).unwrap().starts_with(b"%PDF"));
        let html = fs::read_to_string(&html_path).unwrap();
        assert!(html.contains("API data"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn dashboard_rejects_empty_forecast() {
        let mut data = sample_data().unwrap();
        data.future_forecast.clear();
        let links = DownloadLinks {
            csv: String::new(),
            detailed_csv: String::new(),
            pdf: None,
            json: None,
        };
        let path = env::temp_dir().join("sunscope-empty-dashboard.html");
        let size = ChartSize {
            width: 640.0,
            height: 320.0,
        };
        assert!(write_dashboard(&data, DataSource::Sample, &links, size, &path, false).is_err());
        assert!(!path.exists());
    }
}
