//! ArcGIS REST response shapes
//!
//! Only the fields the backup needs are modelled; everything else in the
//! responses is ignored.

use serde::Deserialize;

/// `{"error": {"code": 400, "message": "..."}}` envelope returned with HTTP 200
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: RestError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

impl RestError {
    pub fn describe(&self) -> String {
        let mut text = match (self.code, &self.message) {
            (Some(code), Some(message)) => format!("{} ({})", message, code),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => format!("error code {}", code),
            (None, None) => "unknown error".to_string(),
        };
        if !self.details.is_empty() {
            text.push_str(": ");
            text.push_str(&self.details.join("; "));
        }
        text
    }
}

/// `GET /sharing/rest/content/items/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct ItemResponse {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub modified: i64,
    #[serde(rename = "type")]
    pub item_type: String,
}

/// `GET {service}` for a FeatureServer
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServiceResponse {
    #[serde(default)]
    pub layers: Vec<LayerRef>,
    #[serde(default)]
    pub tables: Vec<LayerRef>,
    #[serde(default)]
    pub capabilities: String,
    #[serde(default)]
    pub sync_enabled: bool,
}

impl ServiceResponse {
    pub fn supports_sync(&self) -> bool {
        self.sync_enabled
            || self
                .capabilities
                .split(',')
                .any(|c| c.trim().eq_ignore_ascii_case("sync"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LayerRef {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

/// `GET {service}/{layer}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LayerResponse {
    #[serde(default)]
    pub editing_info: Option<EditingInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditingInfo {
    #[serde(default)]
    pub last_edit_date: Option<i64>,
}

/// `POST {service}/createReplica` with `async=false`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplicaResponse {
    #[serde(default)]
    pub response_url: Option<String>,
    #[serde(default, rename = "URL")]
    pub url: Option<String>,
}

impl ReplicaResponse {
    pub fn download_url(&self) -> Option<&str> {
        self.response_url
            .as_deref()
            .or(self.url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_response_parses_layers_and_tables() {
        let json = r#"{
            "currentVersion": 11.1,
            "capabilities": "Create,Delete,Query,Update,Editing,Sync",
            "syncEnabled": false,
            "layers": [{"id": 0, "name": "Points"}, {"id": 3, "name": "Lines"}],
            "tables": [{"id": 7, "name": "Inspections"}]
        }"#;
        let service: ServiceResponse = serde_json::from_str(json).unwrap();

        assert_eq!(
            service.layers.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![0, 3]
        );
        assert_eq!(service.tables[0].name, "Inspections");
        assert!(service.supports_sync());
    }

    #[test]
    fn test_service_without_sync() {
        let service: ServiceResponse =
            serde_json::from_str(r#"{"capabilities": "Query", "layers": []}"#).unwrap();
        assert!(!service.supports_sync());
    }

    #[test]
    fn test_layer_edit_date() {
        let layer: LayerResponse =
            serde_json::from_str(r#"{"editingInfo": {"lastEditDate": 1704067200000}}"#).unwrap();
        assert_eq!(
            layer.editing_info.and_then(|e| e.last_edit_date),
            Some(1_704_067_200_000)
        );

        let layer: LayerResponse = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(layer.editing_info.is_none());
    }

    #[test]
    fn test_replica_download_url() {
        let response: ReplicaResponse =
            serde_json::from_str(r#"{"replicaName": "r", "responseUrl": "https://x/r.zip"}"#)
                .unwrap();
        assert_eq!(response.download_url(), Some("https://x/r.zip"));

        let response: ReplicaResponse = serde_json::from_str(r#"{"URL": "https://y/r.zip"}"#).unwrap();
        assert_eq!(response.download_url(), Some("https://y/r.zip"));
    }

    #[test]
    fn test_error_envelope() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error": {"code": 400, "message": "Unable to create replica", "details": ["Sync is not enabled"]}}"#,
        )
        .unwrap();
        assert_eq!(
            envelope.error.describe(),
            "Unable to create replica (400): Sync is not enabled"
        );
    }
}
