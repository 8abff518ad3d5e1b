use std::sync::Arc;

use reqwest::{multipart, Client, StatusCode};
use shared::protocol::{ApiMessage, DeviceFormFields, DeviceListResponse, DeviceRecord};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

pub mod view;
pub use view::{InventoryView, NullView};

const NO_FILE_SELECTED: &str = "Please select a CSV file.";
const EMPTY_LIST_PLACEHOLDER: &str = "No devices found.";
const ADD_DEVICE_SUCCESS: &str = "Device added successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Per-region status value. Each terminal state is overwritten by the next
/// action in its region; there is no retry or automatic recovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Pending,
    Success(String),
    Warning(String),
    ServerError(String),
    TransportError(String),
}

impl Status {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Status::Idle | Status::Pending => None,
            Status::Success(_) => Some(Severity::Success),
            Status::Warning(_) => Some(Severity::Warning),
            Status::ServerError(_) | Status::TransportError(_) => Some(Severity::Error),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Status::Idle | Status::Pending => None,
            Status::Success(text)
            | Status::Warning(text)
            | Status::ServerError(text)
            | Status::TransportError(text) => Some(text),
        }
    }
}

/// Transient view-side state; never persisted. `devices` always holds the
/// payload of the most recently completed list fetch, cleared when a fetch
/// fails.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub upload_status: Status,
    pub add_device_status: Status,
    pub devices: Vec<DeviceRecord>,
}

#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub filename: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("server url must use http or https, got scheme '{0}'")]
    UnsupportedScheme(String),
}

/// Mediates between user-initiated mutations (CSV upload, manual add) and
/// the rendered device list, against an inventory backend reached over
/// HTTP. Every operation renders its outcome into the injected view; no
/// error escapes to the caller.
pub struct ViewController {
    http: Client,
    server_url: String,
    view: Arc<dyn InventoryView>,
    state: Mutex<ViewState>,
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController")
            .field("server_url", &self.server_url)
            .finish_non_exhaustive()
    }
}

impl ViewController {
    pub fn new(server_url: &str, view: Arc<dyn InventoryView>) -> Result<Self, ControllerError> {
        let parsed = Url::parse(server_url).map_err(|source| ControllerError::InvalidServerUrl {
            url: server_url.to_string(),
            source,
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(ControllerError::UnsupportedScheme(other.to_string())),
        }

        Ok(Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            view,
            state: Mutex::new(ViewState::default()),
        })
    }

    /// One unconditional list fetch, run when a frontend attaches.
    pub async fn initialize(&self) {
        self.refresh_list().await;
    }

    pub async fn view_state(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    pub async fn submit_upload(&self, selection: Option<CsvUpload>) {
        let Some(upload) = selection else {
            self.transition_upload(Status::Warning(NO_FILE_SELECTED.to_string()))
                .await;
            return;
        };

        let filename = upload.filename.clone();
        self.transition_upload(Status::Pending).await;
        match self.post_csv(upload).await {
            Ok((code, body)) if code.is_success() => {
                info!(filename = %filename, status = %code, "upload: backend accepted csv");
                self.transition_upload(Status::Success(body.message)).await;
                self.refresh_list().await;
            }
            Ok((code, body)) => {
                warn!(filename = %filename, status = %code, "upload: backend rejected csv");
                self.transition_upload(Status::ServerError(body.rejection_text()))
                    .await;
            }
            Err(err) => {
                warn!(filename = %filename, "upload: transport failure: {err}");
                self.transition_upload(Status::TransportError(format!(
                    "Error uploading file: {err}"
                )))
                .await;
            }
        }
    }

    pub async fn submit_add_device(&self, fields: DeviceFormFields) {
        self.transition_add_device(Status::Pending).await;
        match self.post_device(&fields).await {
            // The backend signals creation with 201 specifically; any other
            // code, 2xx included, is a rejection.
            Ok((code, _body)) if code == StatusCode::CREATED => {
                info!(field_count = fields.len(), "add_device: backend created device");
                self.transition_add_device(Status::Success(ADD_DEVICE_SUCCESS.to_string()))
                    .await;
                self.view.clear_add_device_form().await;
                self.refresh_list().await;
            }
            Ok((code, body)) => {
                warn!(status = %code, "add_device: backend rejected device");
                self.transition_add_device(Status::ServerError(format!(
                    "Error adding device: {}",
                    body.rejection_text()
                )))
                .await;
            }
            Err(err) => {
                warn!("add_device: transport failure: {err}");
                self.transition_add_device(Status::TransportError(format!(
                    "Error adding device: {err}"
                )))
                .await;
            }
        }
    }

    /// Replaces the rendered list wholesale with the current server truth;
    /// overlapping calls are not deduplicated and the later completion
    /// wins.
    pub async fn refresh_list(&self) {
        match self.fetch_devices().await {
            Ok(devices) => {
                info!(count = devices.len(), "device_list: refreshed");
                let entries = if devices.is_empty() {
                    vec![EMPTY_LIST_PLACEHOLDER.to_string()]
                } else {
                    devices.iter().map(format_device_line).collect()
                };
                {
                    let mut state = self.state.lock().await;
                    state.devices = devices;
                }
                self.view.show_device_list(entries).await;
            }
            Err(err) => {
                warn!("device_list: refresh failed: {err}");
                {
                    let mut state = self.state.lock().await;
                    state.devices.clear();
                }
                self.view
                    .show_list_error(format!("Error loading devices: {err}"))
                    .await;
            }
        }
    }

    async fn post_csv(&self, upload: CsvUpload) -> reqwest::Result<(StatusCode, ApiMessage)> {
        let part = multipart::Part::bytes(upload.contents)
            .file_name(upload.filename)
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("csv_file", part);
        let response = self
            .http
            .post(format!("{}/api/upload-csv", self.server_url))
            .multipart(form)
            .send()
            .await?;
        let code = response.status();
        // The body is decoded before the code is inspected, so a non-JSON
        // body surfaces as a transport failure even on a success code.
        let body: ApiMessage = response.json().await?;
        Ok((code, body))
    }

    async fn post_device(
        &self,
        fields: &DeviceFormFields,
    ) -> reqwest::Result<(StatusCode, ApiMessage)> {
        let response = self
            .http
            .post(format!("{}/api/devices", self.server_url))
            .json(fields)
            .send()
            .await?;
        let code = response.status();
        let body: ApiMessage = response.json().await?;
        Ok((code, body))
    }

    async fn fetch_devices(&self) -> reqwest::Result<Vec<DeviceRecord>> {
        let response: DeviceListResponse = self
            .http
            .get(format!("{}/api/devices", self.server_url))
            .send()
            .await?
            .json()
            .await?;
        Ok(response.devices)
    }

    async fn transition_upload(&self, status: Status) {
        {
            let mut state = self.state.lock().await;
            state.upload_status = status.clone();
        }
        self.view.set_upload_status(status).await;
    }

    async fn transition_add_device(&self, status: Status) {
        {
            let mut state = self.state.lock().await;
            state.add_device_status = status.clone();
        }
        self.view.set_add_device_status(status).await;
    }
}

pub fn format_device_line(device: &DeviceRecord) -> String {
    format!(
        "{} - {} (ID: {})",
        device.manufacturer, device.device_type, device.id.0
    )
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
