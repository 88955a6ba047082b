//! Built-in resource models.
//!
//! # Design
//! Models mirror the backend's camelCase wire format. Server-assigned and
//! optional fields are `Option` and omitted from the wire when absent, so the
//! same type serves as create payload, update payload and response entity.

use serde::{Deserialize, Serialize};

pub const AGENT: &str = "Agent";
pub const FILE_RECORD: &str = "FileRecord";
pub const MCP_RESOURCE: &str = "McpResource";

/// An agent definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Payload returned by the agent activation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResult {
    pub agent_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Metadata for a stored file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

/// A resource exposed to agents over MCP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn agent_uses_camel_case_and_omits_absent_fields() {
        let agent = Agent {
            name: "scout".to_string(),
            ..Agent::default()
        };
        assert_eq!(serde_json::to_value(&agent).unwrap(), json!({"name": "scout"}));
    }

    #[test]
    fn file_record_reads_camel_case() {
        let record: FileRecord = serde_json::from_value(json!({
            "id": "f-1",
            "fileName": "report.pdf",
            "contentType": "application/pdf",
            "size": 1024,
            "agentId": "a-1"
        }))
        .unwrap();
        assert_eq!(record.file_name, "report.pdf");
        assert_eq!(record.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(record.size, Some(1024));
        assert_eq!(record.agent_id.as_deref(), Some("a-1"));
        assert!(record.checksum.is_none());
    }

    #[test]
    fn mcp_resource_requires_uri_and_name() {
        let result: Result<McpResource, _> = serde_json::from_value(json!({"name": "docs"}));
        assert!(result.is_err());
    }

    #[test]
    fn activation_result_reads_agent_id() {
        let result: ActivationResult =
            serde_json::from_value(json!({"agentId": "a-1", "status": "ACTIVE"})).unwrap();
        assert_eq!(result.agent_id, "a-1");
        assert_eq!(result.status, "ACTIVE");
        assert!(result.message.is_none());
    }
}
