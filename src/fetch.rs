//! HTTP-клиент API прогноза и состояние сеанса анализа.

use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use std::{env, fmt};
use tracing::{info, warn};

use crate::form::AnalysisRequest;
use crate::forecast::SolarData;
use crate::sample::sample_data;

const HTTPS_PROXY_ENV: &str = "HTTPS_PROXY";

#[derive(Debug)]
pub enum FetchError {
    Request(reqwest::Error),
    Status { status: StatusCode, body: String },
    Decode(serde_json::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(err) => write!(f, "{err}"),
            Self::Status { status, body } => {
                write!(f, "API request failed with status {status}: {body}")
            }
            Self::Decode(err) => write!(f, "Failed to decode API response: {err}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Status { .. } => None,
        }
    }
}

pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let builder = Client::builder().timeout(timeout);
    match env::var(HTTPS_PROXY_ENV) {
        Ok(val) => {
            info!(proxy = %val, "Using HTTPS proxy");
            let proxy = reqwest::Proxy::https(val)?;
            builder.proxy(proxy).build()
        }
        Err(_) => builder.build(),
    }
}

async fn read_body(response: Response) -> Result<(StatusCode, Bytes), FetchError> {
    let status = response.status();
    let body = response.bytes().await.map_err(FetchError::Request)?;
    Ok((status, body))
}

/// Один POST с JSON-телом и декодирование ответа. Повторов нет.
pub async fn post_analysis(
    client: &Client,
    endpoint: &str,
    request: &AnalysisRequest,
) -> Result<SolarData, FetchError> {
    info!(
        endpoint,
        location = %request.location_name,
        start_date = %request.start_date,
        end_date = %request.end_date,
        "Sending analysis request"
    );
    let response = client
        .post(endpoint)
        .json(request)
        .send()
        .await
        .map_err(FetchError::Request)?;
    let (status, body) = read_body(response).await?;
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    serde_json::from_slice(&body).map_err(FetchError::Decode)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisStep {
    Input,
    Analyzing,
    Results,
}

/// Откуда взяты показанные результаты.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSource {
    Api,
    Sample,
}

impl DataSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Sample => "sample",
        }
    }
}

/// Сеанс анализа: ввод → запрос → результаты. Новый анализ сбрасывает прошлый результат.
#[derive(Debug)]
pub struct Session {
    step: AnalysisStep,
    data: Option<SolarData>,
    source: Option<DataSource>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub const fn new() -> Self {
        Self {
            step: AnalysisStep::Input,
            data: None,
            source: None,
        }
    }

    pub const fn step(&self) -> AnalysisStep {
        self.step
    }

    pub const fn data(&self) -> Option<&SolarData> {
        self.data.as_ref()
    }

    pub const fn source(&self) -> Option<DataSource> {
        self.source
    }

    /// Результаты из сохранённого снимка, без обращения к API.
    pub fn load(&mut self, data: SolarData, source: DataSource) {
        self.data = Some(data);
        self.source = Some(source);
        self.step = AnalysisStep::Results;
    }

    /// Запрашивает прогноз; при любой ошибке API подставляет встроенный пример.
    /// Ошибка возвращается только если не декодируется сам пример.
    pub async fn analyze(
        &mut self,
        client: &Client,
        endpoint: &str,
        request: &AnalysisRequest,
    ) -> Result<DataSource, serde_json::Error> {
        self.step = AnalysisStep::Analyzing;
        self.data = None;
        self.source = None;

        let (data, source) = match post_analysis(client, endpoint, request).await {
            Ok(data) => (data, DataSource::Api),
            Err(err) => {
                warn!(error = %err, "API call failed, falling back to sample data");
                match sample_data() {
                    Ok(data) => (data, DataSource::Sample),
                    Err(err) => {
                        self.step = AnalysisStep::Input;
                        return Err(err);
                    }
                }
            }
        };
        self.load(data, source);
        Ok(source)
    }
}
