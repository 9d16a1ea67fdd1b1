use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

use crate::error::FetchError;
use crate::table::CompanyRecord;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can produce the full company record list in one call.
pub trait RecordSource {
    /// Human readable origin, used in logs
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<Vec<CompanyRecord>, FetchError>;
}

/// Fetches the record list with a single HTTP GET.
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let url = url.into();
        let client = Client::builder()
            .user_agent(concat!("yc-to-sqlite/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RecordSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<CompanyRecord>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let text = response.text().map_err(transport)?;
        let records = parse_records(&self.url, &text)?;

        info!("fetched {} records from {}", records.len(), self.url);
        Ok(records)
    }
}

/// Decode a response body that must be a JSON array of objects
pub fn parse_records(url: &str, body: &str) -> Result<Vec<CompanyRecord>, FetchError> {
    let json: Value = serde_json::from_str(body).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })?;

    let Value::Array(items) = json else {
        return Err(FetchError::NotAnArray {
            url: url.to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(FetchError::NotAnObject {
                url: url.to_string(),
                index,
            }),
        })
        .collect()
}
