//! Loading of Kibana's built-in "logs" sample data set.
//!
//! Request construction is kept free of I/O so it can be checked without a
//! live service; [`SampleDataLoader`] performs the single POST through any
//! [`RestTransport`](crate::adapter::RestTransport) behind a [`Client`].

use std::{
    collections::BTreeMap,
    fmt,
    io::{self, Write},
};

use serde::Deserialize;
use thiserror::Error;

use crate::adapter::{Client, RestError, RestRequest, RestResponse, RestResult};

pub const SAMPLE_DATA_PATH: &str = "/api/sample_data/logs";
pub const XSRF_HEADER: &str = "kbn-xsrf";
pub const SUCCESS_MESSAGE: &str = "Sample data added successfully!";

/// Service location and basic-auth credentials for one load.
#[derive(Clone, PartialEq, Eq)]
pub struct SampleDataTarget {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl SampleDataTarget {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SampleDataTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleDataTarget")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Appends [`SAMPLE_DATA_PATH`] to `base_url`, dropping trailing slashes so the
/// separator is never doubled. The base URL is otherwise passed through as is.
pub fn sample_data_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), SAMPLE_DATA_PATH)
}

pub fn sample_data_request(target: &SampleDataTarget) -> RestRequest {
    RestRequest::post(sample_data_url(&target.base_url))
        .with_header(XSRF_HEADER, "true")
        .with_header("Content-Type", "application/json")
        .with_basic_auth(target.username.as_str(), target.password.as_str())
}

/// A run that did not reach an outcome report.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("sample data request failed: {0}")]
    Transport(#[from] RestError),
    #[error("failed to write sample data report: {0}")]
    Report(#[from] io::Error),
}

impl LoadError {
    pub fn transport(&self) -> Option<&RestError> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Report(_) => None,
        }
    }
}

/// What Kibana reports after installing a sample data set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SampleDataSummary {
    pub elasticsearch_indices_created: BTreeMap<String, u64>,
    pub kibana_saved_objects_loaded: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstallResponse {
    elasticsearch_indices_created: Option<BTreeMap<String, u64>>,
    kibana_saved_objects_loaded: Option<u64>,
}

impl SampleDataSummary {
    /// Best effort; `None` unless the body is a JSON object carrying at least
    /// one of Kibana's install fields.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let raw: InstallResponse = match sonic_rs::from_slice(body) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!("sample data response is not a summary: {}", err);
                return None;
            }
        };
        if raw.elasticsearch_indices_created.is_none() && raw.kibana_saved_objects_loaded.is_none()
        {
            tracing::debug!("sample data response carries no install summary");
            return None;
        }
        Some(Self {
            elasticsearch_indices_created: raw.elasticsearch_indices_created.unwrap_or_default(),
            kibana_saved_objects_loaded: raw.kibana_saved_objects_loaded.unwrap_or_default(),
        })
    }

    pub fn documents_indexed(&self) -> u64 {
        self.elasticsearch_indices_created.values().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SampleDataOutcome {
    Loaded { summary: Option<SampleDataSummary> },
    Failed { status: u16, body: String },
}

impl SampleDataOutcome {
    /// Only status `200` counts as loaded; every other code is a failure.
    pub fn from_response(response: &RestResponse) -> Self {
        if response.status() == 200 {
            Self::Loaded {
                summary: SampleDataSummary::parse(response.body()),
            }
        } else {
            Self::Failed {
                status: response.status(),
                body: response.text(),
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    pub fn report_lines(&self) -> Vec<String> {
        match self {
            Self::Loaded { .. } => vec![SUCCESS_MESSAGE.to_string()],
            Self::Failed { status, body } => vec![
                format!("Failed to add sample data. Status code: {status}"),
                format!("Response: {body}"),
            ],
        }
    }

    pub fn report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.report_lines() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SampleDataLoader {
    client: Client,
}

impl SampleDataLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Issues exactly one request. Transport failures are returned as errors;
    /// any HTTP status is an outcome.
    pub async fn load(&self, target: &SampleDataTarget) -> RestResult<SampleDataOutcome> {
        let request = sample_data_request(target);
        tracing::debug!(url = %request.url, "requesting sample data");

        let response = self.client.execute(request).await?;
        tracing::debug!(
            status = response.status(),
            elapsed_ms = response.elapsed.as_millis() as u64,
            "sample data response received"
        );

        let outcome = SampleDataOutcome::from_response(&response);
        match &outcome {
            SampleDataOutcome::Loaded {
                summary: Some(summary),
            } => {
                tracing::info!(
                    indices = summary.elasticsearch_indices_created.len(),
                    documents = summary.documents_indexed(),
                    saved_objects = summary.kibana_saved_objects_loaded,
                    "sample data installed"
                );
            }
            SampleDataOutcome::Loaded { summary: None } => {}
            SampleDataOutcome::Failed { status, .. } => {
                tracing::warn!("sample data request rejected with status {}", status);
            }
        }
        Ok(outcome)
    }

    /// [`load`](Self::load), then writes the outcome report to `out`.
    pub async fn run<W: Write>(
        &self,
        target: &SampleDataTarget,
        out: &mut W,
    ) -> Result<SampleDataOutcome, LoadError> {
        let outcome = self.load(target).await?;
        outcome.report(out)?;
        Ok(outcome)
    }
}

/// Loads the sample data into the service at `base_url` and prints the
/// outcome to stdout.
pub async fn load_sample_data(
    client: &Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<SampleDataOutcome, LoadError> {
    let target = SampleDataTarget::new(base_url, username, password);
    let outcome = SampleDataLoader::new(client.clone()).load(&target).await?;
    outcome.report(&mut io::stdout().lock())?;
    Ok(outcome)
}
