use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::DeviceId;

/// Flat field-name to raw-value map submitted when creating a device
/// manually. Field names mirror the backend's column names; coercion and
/// validation of the values stay server-side.
pub type DeviceFormFields = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub manufacturer: String,
    pub device_type: String,
    /// Columns the client does not interpret (ratings, efficiency figures,
    /// pricing); carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceListResponse {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

/// Mutation-response body. Whether the mutation succeeded is implied by the
/// HTTP status code, not by this body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiMessage {
    /// User-facing rejection line: the message, plus the optional detail
    /// appended as ` Error: <detail>`.
    pub fn rejection_text(&self) -> String {
        match &self.error {
            Some(detail) => format!("{} Error: {}", self.message, detail),
            None => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_list_tolerates_missing_devices_key() {
        let parsed: DeviceListResponse = serde_json::from_value(json!({})).expect("parse");
        assert!(parsed.devices.is_empty());
    }

    #[test]
    fn device_record_preserves_unknown_columns() {
        let parsed: DeviceRecord = serde_json::from_value(json!({
            "id": 4,
            "manufacturer": "Acme",
            "device_type": "heat_pump",
            "power_rating_kw": 12.5,
            "data_source": "catalog"
        }))
        .expect("parse");

        assert_eq!(parsed.id, DeviceId(4));
        assert_eq!(parsed.extra.get("power_rating_kw"), Some(&json!(12.5)));
        assert_eq!(parsed.extra.get("data_source"), Some(&json!("catalog")));

        let round_tripped = serde_json::to_value(&parsed).expect("serialize");
        assert_eq!(round_tripped.get("power_rating_kw"), Some(&json!(12.5)));
    }

    #[test]
    fn rejection_text_appends_detail_when_present() {
        let bare = ApiMessage {
            message: "Error processing CSV".to_string(),
            error: None,
        };
        assert_eq!(bare.rejection_text(), "Error processing CSV");

        let detailed = ApiMessage {
            message: "Error processing CSV".to_string(),
            error: Some("missing column 'manufacturer'".to_string()),
        };
        assert_eq!(
            detailed.rejection_text(),
            "Error processing CSV Error: missing column 'manufacturer'"
        );
    }
}
