//! HTTP implementation of the remote client

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use crate::config::SyncSettings;
use crate::error::{Error, Result};

use super::wire::{ActivityRow, CreatedRow, Envelope, ReportRow};

/// Read access to the server's activity table
pub trait ActivityRemote {
    /// Fetch every activity row (activities have no incremental protocol)
    fn fetch_all(&self) -> Result<Vec<ActivityRow>>;
}

/// Read/write access to the server's report table
pub trait ReportRemote {
    /// Fetch report rows with `seq > watermark`, ordered by remote primary
    /// key ascending, paged by `limit`/`offset`. `max_age_days` bounds the
    /// first-ever pull so a fresh client does not download all history.
    fn fetch_changed(
        &self,
        watermark: i64,
        limit: usize,
        offset: usize,
        max_age_days: Option<i64>,
    ) -> Result<Vec<ReportRow>>;

    /// Create a report remotely, returning the assigned id
    fn create(&self, row: &ReportRow) -> Result<i64>;

    /// Update (or tombstone, when `row.deleted` is set) a remote report
    fn update(&self, id: i64, row: &ReportRow) -> Result<()>;
}

/// Blocking HTTP client against the report/activity REST surface.
///
/// Workers build one per sync pass; each call blocks with the configured
/// timeout. There is no retry logic here — a failed call aborts the pass and
/// the next pass retries whatever is still flagged locally.
pub struct HttpRemote {
    base_url: String,
    client: Client,
}

impl HttpRemote {
    /// Build a client from the given settings.
    pub fn new(settings: &SyncSettings) -> Result<Self> {
        let base_url = normalize_base_url(&settings.server_url)?;
        let client = Client::builder()
            .timeout(settings.network_timeout())
            .build()?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().unwrap_or_default();
        Err(Error::Remote(format_api_error(status, &url, &body)))
    }
}

impl ActivityRemote for HttpRemote {
    fn fetch_all(&self) -> Result<Vec<ActivityRow>> {
        let response = self.client.get(self.url("/activity")).send()?;
        let envelope: Envelope<Vec<ActivityRow>> = Self::check(response)?.json()?;
        Ok(envelope.data)
    }
}

impl ReportRemote for HttpRemote {
    fn fetch_changed(
        &self,
        watermark: i64,
        limit: usize,
        offset: usize,
        max_age_days: Option<i64>,
    ) -> Result<Vec<ReportRow>> {
        let mut request = self
            .client
            .get(self.url(&format!("/report/sync/{watermark}")))
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())]);
        if let Some(days) = max_age_days {
            request = request.query(&[("maxage", days.to_string())]);
        }

        let envelope: Envelope<Vec<ReportRow>> = Self::check(request.send()?)?.json()?;
        Ok(envelope.data)
    }

    fn create(&self, row: &ReportRow) -> Result<i64> {
        let response = self.client.post(self.url("/report")).json(row).send()?;
        let envelope: Envelope<CreatedRow> = Self::check(response)?.json()?;

        if envelope.data.id < 0 {
            return Err(Error::Protocol(format!(
                "server returned invalid report id {}",
                envelope.data.id
            )));
        }

        Ok(envelope.data.id)
    }

    fn update(&self, id: i64, row: &ReportRow) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("/report/{id}")))
            .json(row)
            .send()?;
        Self::check(response)?;
        Ok(())
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(
            "sync server URL is not configured".to_string(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(Error::InvalidInput(format!(
            "sync server URL must include http:// or https://: {trimmed}"
        )));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

fn format_api_error(status: StatusCode, url: &reqwest::Url, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {} for {url}", status.as_u16())
    } else {
        format!("HTTP {} for {url}: {trimmed}", status.as_u16())
    }
}
