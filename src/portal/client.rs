//! ArcGIS REST client
//!
//! Blocking client for the portal content API and FeatureServer replica
//! endpoints. Requests carry a pre-issued token when one is configured;
//! signing in is left to the operator.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::types::{
    ErrorEnvelope, ItemResponse, LayerRef, LayerResponse, ReplicaResponse, ServiceResponse,
};
use super::{Catalog, ExportRequest, Exporter};
use crate::error::{BackupError, BackupResult, ExportError};
use crate::models::{ItemMetadata, SubLayer};

/// Item type of a hosted feature service in the portal catalog
const FEATURE_SERVICE_TYPE: &str = "Feature Service";

/// ArcGIS portal and feature service client
#[derive(Debug, Clone)]
pub struct ArcGisClient {
    /// HTTP client
    client: Client,
    /// Portal root, e.g. `https://www.arcgis.com`
    portal_url: String,
    /// Pre-issued access token
    token: Option<String>,
}

impl ArcGisClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `portal_url` - portal root without the `/sharing/rest` suffix
    /// * `token` - access token appended to every request, if any
    /// * `timeout` - per-request timeout; replica creation is synchronous and can be slow
    pub fn new(
        portal_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> BackupResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("hfs-backup/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BackupError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            portal_url: portal_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Item details URL in the portal content API
    pub fn item_url(&self, item_id: &str) -> String {
        format!("{}/sharing/rest/content/items/{}", self.portal_url, item_id)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.query(&[("token", token.as_str())]),
            None => request,
        }
    }

    /// GET a REST resource as JSON, surfacing error envelopes
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> BackupResult<T> {
        debug!(url, "GET");
        let request = self.with_auth(self.client.get(url).query(&[("f", "json")]));
        let value: serde_json::Value = request.send()?.error_for_status()?.json()?;
        decode_rest(value).map_err(BackupError::Catalog)
    }

    fn service(&self, service_url: &str) -> BackupResult<ServiceResponse> {
        self.get_json(service_url.trim_end_matches('/'))
    }

    fn sub_layer(&self, service_url: &str, layer: &LayerRef) -> BackupResult<SubLayer> {
        let url = format!("{}/{}", service_url.trim_end_matches('/'), layer.id);
        let details: LayerResponse = self.get_json(&url)?;
        Ok(sub_layer_from(layer, details))
    }

    fn download(&self, url: &str, out_dir: &Path, fallback_name: &str) -> Result<PathBuf, ExportError> {
        let target = out_dir.join(download_file_name(url, fallback_name));

        debug!(url, target = %target.display(), "Downloading replica");
        let mut response = self
            .with_auth(self.client.get(url))
            .send()?
            .error_for_status()
            .map_err(|e| ExportError::Download(e.to_string()))?;

        let mut file = File::create(&target)
            .map_err(|e| ExportError::Download(format!("{}: {}", target.display(), e)))?;
        response
            .copy_to(&mut file)
            .map_err(|e| ExportError::Download(e.to_string()))?;

        Ok(target)
    }
}

/// Edit state of one layer or table; a missing last edit date stays unknown
fn sub_layer_from(layer: &LayerRef, details: LayerResponse) -> SubLayer {
    let last_edit_ts = details.editing_info.and_then(|e| e.last_edit_date);

    if last_edit_ts.is_none() {
        debug!(layer = %layer.name, "Layer does not report a last edit date");
    }

    SubLayer::new(layer.id, layer.name.clone(), last_edit_ts)
}

/// Service URL of a catalog item, rejecting anything but a hosted feature service
fn feature_service_url(item_id: &str, item: &ItemResponse) -> BackupResult<String> {
    if item.item_type != FEATURE_SERVICE_TYPE {
        return Err(BackupError::Catalog(format!(
            "item {} is a '{}', not a '{}'",
            item_id, item.item_type, FEATURE_SERVICE_TYPE
        )));
    }

    item.url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BackupError::Catalog(format!("item {} has no service URL", item_id)))
}

/// Fail unless the service can build replicas
fn require_sync(service: &ServiceResponse, title: &str) -> Result<(), ExportError> {
    if service.supports_sync() {
        Ok(())
    } else {
        Err(ExportError::SyncDisabled(title.to_string()))
    }
}

/// Form parameters of a `createReplica` request
fn replica_form(request: &ExportRequest<'_>) -> Vec<(&'static str, String)> {
    let layers = request
        .layers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let sync_model = if request.sync { "perReplica" } else { "none" };

    vec![
        ("f", "json".to_string()),
        ("replicaName", request.replica_name.clone()),
        ("layers", layers),
        ("returnAttachments", request.return_attachments.to_string()),
        ("returnAttachmentsDataByUrl", "false".to_string()),
        ("async", request.asynchronous.to_string()),
        ("syncModel", sync_model.to_string()),
        ("dataFormat", request.data_format.as_param().to_string()),
        ("transportType", "esriTransportTypeUrl".to_string()),
        ("attachmentsSyncDirection", "none".to_string()),
    ]
}

/// Local file name for a replica download
///
/// Uses the last path segment of the URL when it names a zip, otherwise
/// `<fallback_name>.zip`.
fn download_file_name(url: &str, fallback_name: &str) -> String {
    url.split('?')
        .next()
        .and_then(|u| u.rsplit('/').next())
        .filter(|name| name.to_ascii_lowercase().ends_with(".zip"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}.zip", fallback_name))
}

/// Turn a REST response into `T`, or the message of its error envelope
fn decode_rest<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    if value.get("error").is_some() {
        return match serde_json::from_value::<ErrorEnvelope>(value) {
            Ok(envelope) => Err(envelope.error.describe()),
            Err(e) => Err(format!("unreadable error response: {}", e)),
        };
    }
    serde_json::from_value(value).map_err(|e| format!("unexpected response: {}", e))
}

impl Catalog for ArcGisClient {
    fn item(&self, item_id: &str) -> BackupResult<ItemMetadata> {
        let item: ItemResponse = self.get_json(&self.item_url(item_id)).map_err(|e| match e {
            BackupError::Catalog(message) if message.contains("(400)") || message.contains("(404)") => {
                BackupError::item_not_found(format!("{} ({})", item_id, message))
            }
            other => other,
        })?;

        let url = feature_service_url(item_id, &item)?;

        let service = self.service(&url)?;

        let layers = service
            .layers
            .iter()
            .map(|l| self.sub_layer(&url, l))
            .collect::<BackupResult<Vec<_>>>()?;
        let tables = service
            .tables
            .iter()
            .map(|t| self.sub_layer(&url, t))
            .collect::<BackupResult<Vec<_>>>()?;

        info!(
            item_id,
            title = %item.title,
            layers = layers.len(),
            tables = tables.len(),
            "Fetched item metadata"
        );

        Ok(ItemMetadata {
            id: item.id,
            name: item.name.unwrap_or_default(),
            title: item.title,
            url,
            modified_ts: item.modified,
            layers,
            tables,
        })
    }
}

impl Exporter for ArcGisClient {
    fn export(&self, request: &ExportRequest<'_>) -> Result<PathBuf, ExportError> {
        let service_url = request.item.url.trim_end_matches('/');

        let service = self
            .service(service_url)
            .map_err(|e| ExportError::Transport(e.to_string()))?;
        require_sync(&service, &request.item.title)?;

        let form = replica_form(request);

        info!(title = %request.item.title, layers = ?request.layers, "Requesting replica");
        let value: serde_json::Value = self
            .with_auth(self.client.post(format!("{}/createReplica", service_url)))
            .form(&form)
            .send()?
            .error_for_status()?
            .json()?;

        let replica: ReplicaResponse = decode_rest(value).map_err(ExportError::Rejected)?;
        let Some(url) = replica.download_url() else {
            warn!(title = %request.item.title, "Replica response carried no download URL");
            return Err(ExportError::Rejected("response has no download URL".into()));
        };

        self.download(url, request.out_dir, &request.replica_name)
    }
}
