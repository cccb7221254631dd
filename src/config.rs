//! Настройки приложения из TOML-файла поверх встроенных значений.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::form::{AZIMUTH_RANGE, FormDefaults, PANEL_AREA_RANGE, TILT_RANGE};

pub const DEFAULT_CONFIG: &str = "config/sunscope.toml";
pub const API_URL_ENV: &str = "SOLAR_API_URL";
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/solar-analysis";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OUTPUT_DIR: &str = "dist";
const DEFAULT_CHART_WIDTH: f64 = 800.0;
const DEFAULT_CHART_HEIGHT: f64 = 400.0;
const DEFAULT_FRAME_MS: u64 = 16;
const MIN_CHART_SIZE: f64 = 200.0;

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api: Option<ApiFile>,
    form: Option<FormFile>,
    chart: Option<ChartFile>,
    output: Option<OutputFile>,
}

#[derive(Debug, Deserialize)]
struct ApiFile {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FormFile {
    location: Option<String>,
    panel_area: Option<f64>,
    tilt: Option<f64>,
    azimuth: Option<f64>,
    horizon_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChartFile {
    width: Option<f64>,
    height: Option<f64>,
    frame_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OutputFile {
    dir: Option<PathBuf>,
    #[serde(alias = "minify")]
    minify_html: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub frame: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub minify_html: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub form: FormDefaults,
    pub chart: ChartConfig,
    pub output: OutputConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                url: DEFAULT_API_URL.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            form: FormDefaults::default(),
            chart: ChartConfig {
                width: DEFAULT_CHART_WIDTH,
                height: DEFAULT_CHART_HEIGHT,
                frame: Duration::from_millis(DEFAULT_FRAME_MS),
            },
            output: OutputConfig {
                dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
                minify_html: true,
            },
        }
    }
}

fn resolve(file: ConfigFile) -> AppConfig {
    let mut cfg = AppConfig::default();
    if let Some(api) = file.api {
        if let Some(url) = api.url {
            cfg.api.url = url;
        }
        if let Some(timeout_secs) = api.timeout_secs {
            cfg.api.timeout = Duration::from_secs(timeout_secs);
        }
    }
    if let Some(form) = file.form {
        if let Some(location) = form.location {
            cfg.form.location = location;
        }
        if let Some(panel_area) = form.panel_area {
            cfg.form.panel_area = panel_area;
        }
        if let Some(tilt) = form.tilt {
            cfg.form.tilt = tilt;
        }
        if let Some(azimuth) = form.azimuth {
            cfg.form.azimuth = azimuth;
        }
        if let Some(horizon_days) = form.horizon_days {
            cfg.form.horizon_days = horizon_days;
        }
    }
    if let Some(chart) = file.chart {
        if let Some(width) = chart.width {
            cfg.chart.width = width;
        }
        if let Some(height) = chart.height {
            cfg.chart.height = height;
        }
        if let Some(frame_ms) = chart.frame_ms {
            cfg.chart.frame = Duration::from_millis(frame_ms);
        }
    }
    if let Some(output) = file.output {
        if let Some(dir) = output.dir {
            cfg.output.dir = dir;
        }
        if let Some(minify_html) = output.minify_html {
            cfg.output.minify_html = minify_html;
        }
    }
    cfg
}

fn apply_env(cfg: &mut AppConfig) {
    if let Ok(url) = env::var(API_URL_ENV)
        && !url.trim().is_empty()
    {
        tracing::info!(url = %url, "Using API endpoint from {API_URL_ENV}");
        cfg.api.url = url;
    }
}

fn validate(cfg: &AppConfig) -> Result<(), String> {
    let url = cfg.api.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err("api.url must start with http:// or https://".to_string());
    }
    if cfg.api.timeout.is_zero() {
        return Err("api.timeout_secs must be > 0".to_string());
    }
    if cfg.form.location.trim().is_empty() {
        return Err("form.location must not be empty".to_string());
    }
    if !PANEL_AREA_RANGE.contains(&cfg.form.panel_area) {
        return Err("form.panel_area must be within 10..=500".to_string());
    }
    if !TILT_RANGE.contains(&cfg.form.tilt) {
        return Err("form.tilt must be within 0..=90".to_string());
    }
    if !AZIMUTH_RANGE.contains(&cfg.form.azimuth) {
        return Err("form.azimuth must be within -180..=180".to_string());
    }
    if cfg.form.horizon_days == 0 {
        return Err("form.horizon_days must be > 0".to_string());
    }
    if !cfg.chart.width.is_finite() || cfg.chart.width < MIN_CHART_SIZE {
        return Err(format!("chart.width must be >= {MIN_CHART_SIZE}"));
    }
    if !cfg.chart.height.is_finite() || cfg.chart.height < MIN_CHART_SIZE {
        return Err(format!("chart.height must be >= {MIN_CHART_SIZE}"));
    }
    if cfg.chart.frame.is_zero() {
        return Err("chart.frame_ms must be > 0".to_string());
    }
    Ok(())
}

fn parse_config(raw: &str) -> Result<AppConfig, String> {
    let file: ConfigFile = toml::from_str(raw).map_err(|err| err.to_string())?;
    Ok(resolve(file))
}

/// Читает конфиг. Отсутствие файла по умолчанию не ошибка, отсутствие явно указанного файла ошибка.
pub fn load_config(path: &Path) -> Result<AppConfig, String> {
    let mut cfg = if path.exists() {
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read config {}: {err}", path.display()))?;
        parse_config(&raw)
            .map_err(|err| format!("Failed to parse config {}: {err}", path.display()))?
    } else if path == Path::new(DEFAULT_CONFIG) {
        tracing::info!(
            "Config {} not found, using built-in defaults",
            path.display()
        );
        AppConfig::default()
    } else {
        return Err(format!("Config {} does not exist", path.display()));
    };
    apply_env(&mut cfg);
    validate(&cfg).map_err(|err| format!("Invalid config {}: {err}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn overrides_are_merged() {
        let cfg = parse_config(
            r#"
            [api]
            url = "https://solar.example.org/api/solar-analysis"

            [form]
            location = "23.0225, 72.5714"
            tilt = 20

            [output]
            minify = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.api.url, "https://solar.example.org/api/solar-analysis");
        assert_eq!(cfg.api.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!((cfg.form.tilt - 20.0).abs() < f64::EPSILON);
        assert!((cfg.form.panel_area - 20.0).abs() < f64::EPSILON);
        assert!(!cfg.output.minify_html);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cfg = parse_config("[form]\ntilt = 120.0\n").unwrap();
        assert!(validate(&cfg).unwrap_err().contains("form.tilt"));
        let cfg = parse_config("[api]\nurl = \"ftp://host\"\n").unwrap();
        assert!(validate(&cfg).is_err());
        let cfg = parse_config("[chart]\nwidth = 50.0\n").unwrap();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let path = env::temp_dir().join("sunscope-missing-config.toml");
        let err = load_config(&path).unwrap_err();
        assert!(err.contains("does not exist"));
    }
}
