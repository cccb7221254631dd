mod chart;
mod config;
mod constants;
mod fetch;
mod forecast;
mod form;
mod report;
mod sample;
mod stats;

use chrono::{NaiveDate, Utc};
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chart::{
    BarDatum, ChartView, ForecastBarChart, Point, SvgCanvas, WeatherScatterChart,
};
use crate::config::{AppConfig, ChartConfig, DEFAULT_CONFIG, load_config};
use crate::fetch::{DataSource, Session};
use crate::forecast::SolarData;
use crate::form::FormInput;
use crate::report::{ChartSize, DownloadLinks};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

const APP_ABOUT: &str = "Sunscope - solar installation forecast, charts and reports";
const OUTPUT_HTML: &str = "index.html";
const OUTPUT_CSV: &str = "solar_forecast.csv";
const OUTPUT_DETAILED_CSV: &str = "solar_forecast_detailed.csv";
const OUTPUT_PDF: &str = "solar_report.pdf";
const OUTPUT_JSON: &str = "solar_data.json";
const DEFAULT_FRAMES_DIR: &str = "dist/frames";
const FRAME_PREFIX: &str = "frame";
const NEXT_FRAME_PREFIX: &str = "next";
const HOVER_FRAME: &str = "hover.svg";
const RESIZED_FRAME: &str = "resized.svg";
const CSV_ARCHIVE_EXTENSION: &str = "gz";

#[derive(Parser, Debug)]
#[command(name = "sunscope", about = APP_ABOUT)]
struct Args {
    /// TOML-файл с настройками (API, значения формы, размеры графиков).
    #[arg(
        long = "config",
        value_name = "PATH",
        global = true,
        default_value = DEFAULT_CONFIG
    )]
    config: PathBuf,
    /// Архивировать CSV в .csv.gz и ссылаться на архивы в HTML.
    /// Исходные CSV удаляются после успешной архивации.
    #[arg(long = "archive-csv", global = true)]
    archive_csv: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Запросить прогноз у API (или взять пример при ошибке) и сгенерировать отчёты.
    Analyze {
        #[command(flatten)]
        form: FormArgs,
        /// Каталог для HTML, CSV и PDF (по умолчанию из конфига).
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Сохранить ответ API в JSON рядом с отчётами.
        #[arg(long = "save-json")]
        save_json: bool,
        /// Не минифицировать HTML.
        #[arg(long = "no-minify-html", action = ArgAction::SetTrue)]
        no_minify_html: bool,
    },
    /// Сгенерировать отчёты из сохранённого JSON без обращения к API.
    Render {
        /// JSON с результатом анализа.
        #[arg(short = 'i', long = "input", value_name = "PATH")]
        input: PathBuf,
        /// Каталог для HTML, CSV и PDF (по умолчанию из конфига).
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Не минифицировать HTML.
        #[arg(long = "no-minify-html", action = ArgAction::SetTrue)]
        no_minify_html: bool,
    },
    /// Выгрузить встроенный пример данных в JSON.
    Sample {
        /// Куда сохранить файл (по умолчанию stdout).
        #[arg(short = 'o', long = "output", value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Сохранить кадры анимации появления графика в SVG.
    Frames {
        /// Какой график анимировать.
        #[arg(value_enum)]
        chart: FrameChart,
        /// JSON с результатом анализа (по умолчанию встроенный пример).
        #[arg(short = 'i', long = "input", value_name = "PATH")]
        input: Option<PathBuf>,
        /// Каталог для кадров.
        #[arg(
            short = 'o',
            long = "output-dir",
            value_name = "DIR",
            default_value = DEFAULT_FRAMES_DIR
        )]
        output_dir: PathBuf,
        /// Остановить анимацию после N кадров.
        #[arg(long = "max-frames", value_name = "N")]
        max_frames: Option<usize>,
        /// После анимации навести указатель в точку «X,Y» и сохранить hover.svg.
        #[arg(
            long = "pointer",
            value_name = "X,Y",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        pointer: Option<Point>,
        /// После анимации изменить размер графика и сохранить resized.svg.
        #[arg(long = "resize", value_name = "WxH", value_parser = parse_size)]
        resize: Option<(f64, f64)>,
        /// Затем подменить данные этим JSON и записать повторную анимацию (next_*.svg).
        #[arg(long = "then", value_name = "PATH")]
        then: Option<PathBuf>,
    },
    /// Сгенерировать файлы автодополнения для shell.
    Completions {
        /// Целевой shell.
        #[arg(value_enum)]
        shell: Shell,
        /// Куда сохранить файл (по умолчанию stdout).
        #[arg(short = 'o', long = "output", value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Поля формы; пропущенные берутся из конфига.
#[derive(clap::Args, Debug)]
struct FormArgs {
    /// Название места или координаты «lat, lon».
    #[arg(short = 'l', long = "location", value_name = "TEXT")]
    location: Option<String>,
    /// Площадь панелей, м² (10..=500).
    #[arg(long = "panel-area", value_name = "M2")]
    panel_area: Option<f64>,
    /// Угол наклона, градусы (0..=90).
    #[arg(long = "tilt", value_name = "DEG")]
    tilt: Option<f64>,
    /// Азимут, градусы (-180..=180).
    #[arg(long = "azimuth", value_name = "DEG", allow_negative_numbers = true)]
    azimuth: Option<f64>,
    /// Начало периода (YYYY-MM-DD), по умолчанию сегодня.
    #[arg(long = "start-date", value_name = "DATE")]
    start_date: Option<NaiveDate>,
    /// Конец периода (YYYY-MM-DD), по умолчанию начало + horizon_days.
    #[arg(long = "end-date", value_name = "DATE")]
    end_date: Option<NaiveDate>,
}

impl From<FormArgs> for FormInput {
    fn from(args: FormArgs) -> Self {
        Self {
            location: args.location,
            panel_area: args.panel_area,
            tilt: args.tilt,
            azimuth: args.azimuth,
            start_date: args.start_date,
            end_date: args.end_date,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FrameChart {
    Bar,
    Scatter,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sunscope=info"));
    let ansi = std::io::stdout().is_terminal();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .compact()
        .init();
}

fn headline(message: &str) {
    tracing::info!(status = "start", "{message}");
}

fn info(message: &str) {
    tracing::info!(status = "info", "{message}");
}

fn success(message: &str) {
    tracing::info!(status = "ok", "{message}");
}

fn error(message: &str) {
    tracing::error!(status = "err", "{message}");
}

fn create_parent(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create {}: {err}", parent.display()))?;
    }
    Ok(())
}

fn generate_completions(shell: Shell, output: Option<PathBuf>) -> Result<(), String> {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    if let Some(path) = output {
        create_parent(&path)?;
        let mut file = File::create(&path)
            .map_err(|err| format!("Failed to create {}: {err}", path.display()))?;
        generate(shell, &mut cmd, bin_name, &mut file);
    } else {
        let mut stdout = std::io::stdout();
        generate(shell, &mut cmd, bin_name, &mut stdout);
    }
    Ok(())
}

fn file_name_for(path: &Path) -> Result<String, String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| format!("Path {} has no file name", path.display()))
}

fn archive_path_for(csv_path: &Path) -> Result<PathBuf, String> {
    let file_name = file_name_for(csv_path)?;
    let archive_name = format!("{file_name}.{CSV_ARCHIVE_EXTENSION}");
    let mut archive_path = csv_path.to_path_buf();
    archive_path.set_file_name(archive_name);
    Ok(archive_path)
}

/// Сжимает CSV в `.csv.gz` и удаляет исходный файл.
fn archive_csv_file(csv_path: &Path) -> Result<PathBuf, String> {
    let archive_path = archive_path_for(csv_path)?;
    let mut input = File::open(csv_path)
        .map_err(|err| format!("Failed to open CSV {}: {err}", csv_path.display()))?;
    let output = File::create(&archive_path)
        .map_err(|err| format!("Failed to create archive {}: {err}", archive_path.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    std::io::copy(&mut input, &mut encoder)
        .map_err(|err| format!("Failed to write archive {}: {err}", archive_path.display()))?;
    encoder.finish().map_err(|err| {
        format!(
            "Failed to finalize archive {}: {err}",
            archive_path.display()
        )
    })?;
    fs::remove_file(csv_path)
        .map_err(|err| format!("Failed to remove CSV {}: {err}", csv_path.display()))?;
    Ok(archive_path)
}

fn download_name(csv_path: &Path, archive: bool) -> Result<String, String> {
    if archive {
        let archive_path = archive_path_for(csv_path)?;
        file_name_for(&archive_path)
    } else {
        file_name_for(csv_path)
    }
}

struct ReportJob<'a> {
    data: &'a SolarData,
    source: DataSource,
    output_dir: &'a Path,
    chart: ChartConfig,
    minify_html: bool,
    archive_csv: bool,
    json_link: Option<String>,
}

/// Пишет CSV, подробный CSV, PDF и HTML. Ошибка одного отчёта не прерывает остальные.
/// Возвращает число неудавшихся отчётов.
fn write_reports(job: &ReportJob<'_>) -> Result<usize, String> {
    let csv_path = job.output_dir.join(OUTPUT_CSV);
    let detailed_path = job.output_dir.join(OUTPUT_DETAILED_CSV);
    let pdf_path = job.output_dir.join(OUTPUT_PDF);
    let html_path = job.output_dir.join(OUTPUT_HTML);
    let mut failures = 0;

    for (path, detailed) in [(&csv_path, false), (&detailed_path, true)] {
        let written = if detailed {
            report::write_detailed_csv(job.data, path)
        } else {
            report::write_csv(job.data, path)
        };
        match written {
            Ok(()) if job.archive_csv => match archive_csv_file(path) {
                Ok(archive) => success(&format!("Saved archive to {}", archive.display())),
                Err(err) => {
                    error(&err);
                    failures += 1;
                }
            },
            Ok(()) => success(&format!("Saved CSV to {}", path.display())),
            Err(err) => {
                error(&format!("Failed to write CSV {}: {err}", path.display()));
                failures += 1;
            }
        }
    }

    let pdf_link = match report::write_pdf(job.data, &pdf_path) {
        Ok(()) => {
            success(&format!("Saved PDF to {}", pdf_path.display()));
            Some(file_name_for(&pdf_path)?)
        }
        Err(err) => {
            error(&format!("Failed to write PDF report: {err}"));
            failures += 1;
            None
        }
    };

    let links = DownloadLinks {
        csv: download_name(&csv_path, job.archive_csv)?,
        detailed_csv: download_name(&detailed_path, job.archive_csv)?,
        pdf: pdf_link,
        json: job.json_link.clone(),
    };
    let size = ChartSize {
        width: job.chart.width,
        height: job.chart.height,
    };
    match report::write_dashboard(
        job.data,
        job.source,
        &links,
        size,
        &html_path,
        job.minify_html,
    ) {
        Ok(()) => success(&format!("Saved HTML to {}", html_path.display())),
        Err(err) => {
            error(&format!("Failed to render dashboard: {err}"));
            failures += 1;
        }
    }
    Ok(failures)
}

fn report_outcome(failures: usize, output_dir: &Path) {
    if failures == 0 {
        success(&format!("Reports written to {}", output_dir.display()));
    } else {
        error(&format!(
            "{failures} report(s) failed, see messages above ({})",
            output_dir.display()
        ));
    }
}

fn save_json(data: &SolarData, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|err| format!("Failed to encode {}: {err}", path.display()))?;
    create_parent(path)?;
    fs::write(path, json).map_err(|err| format!("Failed to write {}: {err}", path.display()))
}

fn read_solar_data(path: &Path) -> Result<SolarData, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("Failed to parse {}: {err}", path.display()))
}

async fn run_analyze(
    cfg: &AppConfig,
    form: FormInput,
    output_dir: &Path,
    save_json_file: bool,
    minify_html: bool,
    archive_csv: bool,
) -> Result<usize, String> {
    let request = form.to_request(&cfg.form, Utc::now().date_naive());
    tracing::info!(
        mode = "analyze",
        endpoint = %cfg.api.url,
        location = %request.location_name,
        lat = ?request.lat,
        lon = ?request.lon,
        panel_area = request.panel_area,
        tilt = request.current_tilt,
        azimuth = request.current_azimuth,
        output_dir = %output_dir.display(),
        "Starting analysis"
    );
    let client = fetch::build_client(cfg.api.timeout)
        .map_err(|err| format!("Failed to build HTTP client: {err}"))?;
    let mut session = Session::new();
    let source = session
        .analyze(&client, &cfg.api.url, &request)
        .await
        .map_err(|err| format!("Failed to load sample data: {err}"))?;
    tracing::debug!(step = ?session.step(), "Analysis finished");
    let data = session
        .data()
        .ok_or_else(|| "Analysis finished without results".to_string())?;
    info(&format!(
        "Received forecast for {} ({} days, source: {})",
        data.location_label(),
        data.future_forecast.len(),
        source.label()
    ));

    let json_link = if save_json_file {
        let path = output_dir.join(OUTPUT_JSON);
        save_json(data, &path)?;
        success(&format!("Saved JSON to {}", path.display()));
        Some(OUTPUT_JSON.to_string())
    } else {
        None
    };

    write_reports(&ReportJob {
        data,
        source,
        output_dir,
        chart: cfg.chart,
        minify_html,
        archive_csv,
        json_link,
    })
}

fn run_render(
    cfg: &AppConfig,
    input: &Path,
    output_dir: &Path,
    minify_html: bool,
    archive_csv: bool,
) -> Result<usize, String> {
    tracing::info!(
        mode = "render",
        input = %input.display(),
        output_dir = %output_dir.display(),
        minify_html,
        archive_csv,
        "Rendering reports from saved data"
    );
    let mut session = Session::new();
    session.load(read_solar_data(input)?, DataSource::Api);
    let data = session
        .data()
        .ok_or_else(|| "No data loaded".to_string())?;
    write_reports(&ReportJob {
        data,
        source: session.source().unwrap_or(DataSource::Api),
        output_dir,
        chart: cfg.chart,
        minify_html,
        archive_csv,
        json_link: None,
    })
}

fn write_sample(output: Option<PathBuf>) -> Result<(), String> {
    let json = sample::sample_json();
    if let Some(path) = output {
        create_parent(&path)?;
        fs::write(&path, json)
            .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
        success(&format!("Saved sample data to {}", path.display()));
    } else {
        std::io::stdout()
            .write_all(json.as_bytes())
            .map_err(|err| format!("Failed to write sample data: {err}"))?;
    }
    Ok(())
}

/// «X,Y» в координатах поверхности графика.
fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {value:?}"))?;
    let coordinate = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .ok_or_else(|| format!("invalid coordinate {part:?}"))
    };
    Ok(Point::new(coordinate(x)?, coordinate(y)?))
}

/// «ШИРИНАxВЫСОТА», например `1024x480`.
fn parse_size(value: &str) -> Result<(f64, f64), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let side = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite() && *number > 0.0)
            .ok_or_else(|| format!("invalid size {part:?}"))
    };
    Ok((side(width)?, side(height)?))
}

struct FramesJob<'a> {
    kind: FrameChart,
    input: Option<&'a Path>,
    then: Option<&'a Path>,
    output_dir: &'a Path,
    max_frames: Option<usize>,
    pointer: Option<Point>,
    resize: Option<(f64, f64)>,
}

/// Пишет кадры графика отдельными SVG-документами.
struct FrameRecorder<'a> {
    output_dir: &'a Path,
    label: &'static str,
    frame: Duration,
    max_frames: Option<usize>,
    canvas: SvgCanvas,
}

impl FrameRecorder<'_> {
    fn save(&self, name: &str) -> Result<(), String> {
        let path = self.output_dir.join(name);
        fs::write(&path, self.canvas.to_document("frame", self.label))
            .map_err(|err| format!("Failed to write {}: {err}", path.display()))
    }

    /// Крутит кадровый цикл до конца анимации (или до `max_frames`).
    fn record(&mut self, chart: &mut impl ChartView, prefix: &str) -> Result<usize, String> {
        let mut count = 0;
        while chart.next_frame(&mut self.canvas, self.frame) {
            self.save(&format!("{prefix}_{count:04}.svg"))?;
            count += 1;
            if self.max_frames.is_some_and(|limit| count >= limit) {
                chart.cancel_animation();
            }
        }
        Ok(count)
    }

    /// Наведение указателя и изменение размера после анимации.
    fn interact(&mut self, chart: &mut impl ChartView, job: &FramesJob<'_>) -> Result<(), String> {
        if let Some(pointer) = job.pointer {
            chart.draw(&mut self.canvas, 1.0);
            match chart.pointer_move(pointer) {
                Some(tooltip) => tracing::info!(
                    x = pointer.x,
                    y = pointer.y,
                    element = ?chart.hovered(),
                    tooltip = %tooltip.plain_text().replace('\n', "; "),
                    "Pointer over chart element"
                ),
                None => info(&format!(
                    "No chart element under pointer ({}, {})",
                    pointer.x, pointer.y
                )),
            }
            chart.draw(&mut self.canvas, 1.0);
            self.save(HOVER_FRAME)?;
            chart.pointer_leave();
        }
        if let Some((width, height)) = job.resize {
            chart.resize(&mut self.canvas, width, height);
            self.save(RESIZED_FRAME)?;
            tracing::info!(width, height, "Chart resized");
        }
        Ok(())
    }
}

fn load_frames_data(path: Option<&Path>) -> Result<SolarData, String> {
    match path {
        Some(path) => read_solar_data(path),
        None => sample::sample_data().map_err(|err| format!("Failed to load sample data: {err}")),
    }
}

fn run_frames(cfg: &AppConfig, job: &FramesJob<'_>) -> Result<usize, String> {
    let data = load_frames_data(job.input)?;
    let next = job.then.map(read_solar_data).transpose()?;
    let chart = cfg.chart;
    tracing::info!(
        mode = "frames",
        chart = ?job.kind,
        frame_ms = chart.frame.as_millis(),
        max_frames = ?job.max_frames,
        output_dir = %job.output_dir.display(),
        "Rendering animation frames"
    );
    fs::create_dir_all(job.output_dir)
        .map_err(|err| format!("Failed to create {}: {err}", job.output_dir.display()))?;
    let mut recorder = FrameRecorder {
        output_dir: job.output_dir,
        label: match job.kind {
            FrameChart::Bar => "Forecast chart frame",
            FrameChart::Scatter => "Weather chart frame",
        },
        frame: chart.frame,
        max_frames: job.max_frames,
        canvas: SvgCanvas::new(chart.width, chart.height),
    };

    match job.kind {
        FrameChart::Bar => {
            let mut renderer =
                ForecastBarChart::new(BarDatum::from_forecast(&data), chart.width, chart.height);
            let mut count = recorder.record(&mut renderer, FRAME_PREFIX)?;
            recorder.interact(&mut renderer, job)?;
            if let Some(next) = &next {
                renderer.set_data(BarDatum::from_forecast(next));
                count += recorder.record(&mut renderer, NEXT_FRAME_PREFIX)?;
            }
            Ok(count)
        }
        FrameChart::Scatter => {
            let mut renderer = WeatherScatterChart::new(
                &data.raw_data.historical_hourly_output,
                chart.width,
                chart.height,
            );
            let mut count = recorder.record(&mut renderer, FRAME_PREFIX)?;
            recorder.interact(&mut renderer, job)?;
            if let Some(next) = &next {
                renderer.set_data(&next.raw_data.historical_hourly_output);
                count += recorder.record(&mut renderer, NEXT_FRAME_PREFIX)?;
            }
            Ok(count)
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let archive_csv = args.archive_csv;
    let command = match args.command {
        Command::Completions { shell, output } => {
            if let Err(err) = generate_completions(shell, output) {
                eprintln!("{err}");
            }
            return;
        }
        command => command,
    };

    init_logging();
    headline(APP_ABOUT);
    let cfg = match load_config(&args.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            error(&err);
            return;
        }
    };

    match command {
        Command::Analyze {
            form,
            output_dir,
            save_json,
            no_minify_html,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| cfg.output.dir.clone());
            let minify_html = cfg.output.minify_html && !no_minify_html;
            match run_analyze(
                &cfg,
                form.into(),
                &output_dir,
                save_json,
                minify_html,
                archive_csv,
            )
            .await
            {
                Ok(failures) => report_outcome(failures, &output_dir),
                Err(err) => error(&err),
            }
        }
        Command::Render {
            input,
            output_dir,
            no_minify_html,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| cfg.output.dir.clone());
            let minify_html = cfg.output.minify_html && !no_minify_html;
            match run_render(&cfg, &input, &output_dir, minify_html, archive_csv) {
                Ok(failures) => report_outcome(failures, &output_dir),
                Err(err) => error(&err),
            }
        }
        Command::Sample { output } => {
            if let Err(err) = write_sample(output) {
                error(&err);
            }
        }
        Command::Frames {
            chart,
            input,
            output_dir,
            max_frames,
            pointer,
            resize,
            then,
        } => match run_frames(
            &cfg,
            &FramesJob {
                kind: chart,
                input: input.as_deref(),
                then: then.as_deref(),
                output_dir: &output_dir,
                max_frames,
                pointer,
                resize,
            },
        ) {
            Ok(count) => success(&format!(
                "Saved {count} frames to {}",
                output_dir.display()
            )),
            Err(err) => error(&err),
        },
        Command::Completions { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_dir(name: &str) -> PathBuf {
        env::temp_dir().join(format!("sunscope-{name}-{}", std::process::id()))
    }

    #[test]
    fn archive_path_appends_gz() {
        let path = archive_path_for(Path::new("dist/solar_forecast.csv")).unwrap();
        assert_eq!(path, PathBuf::from("dist/solar_forecast.csv.gz"));
        assert_eq!(
            download_name(Path::new("dist/solar_forecast.csv"), true).unwrap(),
            "solar_forecast.csv.gz"
        );
        assert!(file_name_for(Path::new("/")).is_err());
    }

    #[test]
    fn reports_with_archived_csv_link_to_archives() {
        let dir = temp_dir("archive");
        let data = sample::sample_data().unwrap();
        let cfg = AppConfig::default();
        let failures = write_reports(&ReportJob {
            data: &data,
            source: DataSource::Sample,
            output_dir: &dir,
            chart: cfg.chart,
            minify_html: false,
            archive_csv: true,
            json_link: None,
        })
        .unwrap();
        assert_eq!(failures, 0);
        assert!(dir.join("solar_forecast.csv.gz").exists());
        assert!(!dir.join(OUTPUT_CSV).exists());
        let html = fs::read_to_string(dir.join(OUTPUT_HTML)).unwrap();
        assert!(html.contains("href=\"solar_forecast_detailed.csv.gz\""));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_reports_are_counted_not_fatal() {
        let dir = temp_dir("empty");
        let mut data = sample::sample_data().unwrap();
        data.future_forecast.clear();
        let failures = write_reports(&ReportJob {
            data: &data,
            source: DataSource::Sample,
            output_dir: &dir,
            chart: AppConfig::default().chart,
            minify_html: false,
            archive_csv: false,
            json_link: None,
        })
        .unwrap();
        assert_eq!(failures, 4);
        let _ = fs::remove_dir_all(&dir);
    }

    fn frames_job(kind: FrameChart, output_dir: &Path) -> FramesJob<'_> {
        FramesJob {
            kind,
            input: None,
            then: None,
            output_dir,
            max_frames: None,
            pointer: None,
            resize: None,
        }
    }

    #[test]
    fn frames_end_with_full_progress() {
        let dir = temp_dir("frames");
        let cfg = AppConfig::default();
        let count = run_frames(&cfg, &frames_job(FrameChart::Scatter, &dir)).unwrap();
        // 2000 мс по 16 мс: 125 шагов плюс финальный кадр.
        assert_eq!(count, 126);
        assert!(dir.join("frame_0125.svg").exists());
        assert!(!dir.join(HOVER_FRAME).exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn max_frames_cancels_entrance_animation() {
        let dir = temp_dir("frames-limit");
        let cfg = AppConfig::default();
        let job = FramesJob {
            max_frames: Some(10),
            ..frames_job(FrameChart::Bar, &dir)
        };
        assert_eq!(run_frames(&cfg, &job).unwrap(), 10);
        assert!(dir.join("frame_0009.svg").exists());
        assert!(!dir.join("frame_0010.svg").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn pointer_and_resize_snapshots_follow_animation() {
        let dir = temp_dir("frames-pointer");
        let cfg = AppConfig::default();
        // Низ первого столбца при 800x400.
        let job = FramesJob {
            pointer: Some(Point::new(140.0, 335.0)),
            resize: Some((1000.0, 500.0)),
            ..frames_job(FrameChart::Bar, &dir)
        };
        run_frames(&cfg, &job).unwrap();

        let hover = fs::read_to_string(dir.join(HOVER_FRAME)).unwrap();
        assert!(hover.contains("rgba(59, 130, 246, 1)"));
        let resized = fs::read_to_string(dir.join(RESIZED_FRAME)).unwrap();
        assert!(resized.contains("viewBox=\"0 0 1000 500\""));
        // После ухода указателя подсветки нет.
        assert!(!resized.contains("rgba(59, 130, 246, 1)"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn new_data_replays_entrance_animation() {
        let dir = temp_dir("frames-then");
        fs::create_dir_all(&dir).unwrap();
        let next = dir.join("next.json");
        fs::write(&next, sample::sample_json()).unwrap();
        let cfg = AppConfig::default();
        let job = FramesJob {
            then: Some(next.as_path()),
            ..frames_job(FrameChart::Scatter, &dir)
        };
        assert_eq!(run_frames(&cfg, &job).unwrap(), 252);
        assert!(dir.join("next_0125.svg").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn frames_options_parse_pointer_and_size() {
        let args = Args::try_parse_from([
            "sunscope",
            "frames",
            "bar",
            "--pointer",
            "-5, 12.5",
            "--resize",
            "1024x480",
            "--max-frames",
            "3",
        ])
        .unwrap();
        match args.command {
            Command::Frames {
                pointer,
                resize,
                max_frames,
                ..
            } => {
                assert_eq!(pointer, Some(Point::new(-5.0, 12.5)));
                assert_eq!(resize, Some((1024.0, 480.0)));
                assert_eq!(max_frames, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(parse_size("0x480").is_err());
        assert!(parse_point("12").is_err());
    }

    #[test]
    fn cli_parses_negative_azimuth_and_dates() {
        let args = Args::try_parse_from([
            "sunscope",
            "analyze",
            "--location",
            "23.02, 72.57",
            "--azimuth",
            "-90",
            "--start-date",
            "2025-09-15",
        ])
        .unwrap();
        match args.command {
            Command::Analyze { form, .. } => {
                assert_eq!(form.azimuth, Some(-90.0));
                assert_eq!(form.start_date, NaiveDate::from_ymd_opt(2025, 9, 15));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
