use serde::{Deserialize, Serialize};

/// `GET /data/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStatus {
    pub total_users: u64,
    pub data_loaded: bool,
}

/// Wire body of `POST /data/load`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkLoadResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub loaded_count: i64,
}

fn default_success() -> bool {
    true
}

/// Outcome of a bulk load the backend accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkLoadResult {
    pub loaded_count: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let status: DataStatus =
            serde_json::from_str(r#"{"totalUsers": 208, "dataLoaded": true}"#).unwrap();

        assert_eq!(status.total_users, 208);
        assert!(status.data_loaded);
    }

    #[test]
    fn test_bulk_load_response_ignores_extra_counts() {
        let body = r#"{
            "success": true,
            "message": "Users data loaded successfully",
            "previousCount": 0,
            "currentCount": 100,
            "loadedCount": 100
        }"#;

        let response: BulkLoadResponse = serde_json::from_str(body).unwrap();

        assert!(response.success);
        assert_eq!(response.loaded_count, 100);
    }

    #[test]
    fn test_bulk_load_failure_body_has_no_count() {
        let body = r#"{"success": false, "message": "Error loading users data: timeout"}"#;
        let response: BulkLoadResponse = serde_json::from_str(body).unwrap();

        assert!(!response.success);
        assert_eq!(response.loaded_count, 0);
    }
}
