//! Collection, environment, and history data models.
//!
//! Collections are the top-level organizational unit: a named, ordered group
//! of folders and requests. Environments hold variable sets; at most one is
//! active at a time (enforced by the store). History items are write-once
//! snapshots recorded after each dispatch.

use crate::auth::AuthConfig;
use crate::models::{generate_id, now_millis, ApiRequest, ApiResponse, KeyValuePair};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A folder inside a collection, grouping related requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique identifier for the folder.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description shown in the sidebar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Requests contained in this folder, in display order.
    #[serde(default)]
    pub requests: Vec<ApiRequest>,

    /// Creation time, epoch milliseconds.
    pub created_at: i64,

    /// Last modification time, epoch milliseconds.
    pub updated_at: i64,
}

impl Folder {
    /// Creates an empty folder with a fresh id and current timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: generate_id(),
            name: name.into(),
            description: None,
            requests: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A named, ordered group of folders and requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique identifier for the collection.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional owner label (used when sharing exports).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Whether the collection is publicly shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,

    /// Folders in this collection, in display order.
    #[serde(default)]
    pub folders: Vec<Folder>,

    /// Requests at the collection root, in display order.
    #[serde(default)]
    pub requests: Vec<ApiRequest>,

    /// Collection-level authentication, inherited by requests without their
    /// own auth configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Collection-level variables.
    #[serde(default)]
    pub variables: Vec<KeyValuePair>,

    /// Creation time, epoch milliseconds.
    pub created_at: i64,

    /// Last modification time, epoch milliseconds.
    pub updated_at: i64,
}

impl Collection {
    /// Creates an empty collection with a fresh id and current timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: generate_id(),
            name: name.into(),
            description: None,
            owner: None,
            is_public: None,
            folders: Vec::new(),
            requests: Vec::new(),
            auth: None,
            variables: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A named set of variables; at most one environment is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Unique identifier for the environment.
    pub id: String,

    /// Display name (e.g. "dev", "staging", "production").
    pub name: String,

    /// Variable rows, in editor order.
    #[serde(default)]
    pub values: Vec<KeyValuePair>,

    /// Whether this is the active environment. The store keeps at most one
    /// environment active.
    #[serde(default)]
    pub is_active: bool,

    /// Creation time, epoch milliseconds.
    pub created_at: i64,

    /// Last modification time, epoch milliseconds.
    pub updated_at: i64,
}

impl Environment {
    /// Creates an empty, inactive environment with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: generate_id(),
            name: name.into(),
            values: Vec::new(),
            is_active: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the enabled, non-empty-key variable rows as a map.
    ///
    /// Later duplicate keys overwrite earlier ones.
    pub fn variables(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for pair in self.values.iter().filter(|v| v.enabled && !v.key.is_empty()) {
            map.insert(pair.key.clone(), pair.value.clone());
        }
        map
    }

    /// Sets a variable row, replacing an existing row with the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(existing) = self.values.iter_mut().find(|v| v.key == key) {
            existing.value = value;
        } else {
            self.values.push(KeyValuePair::new(key, value));
        }
        self.updated_at = now_millis();
    }
}

/// A write-once record of one dispatch: the request snapshot and, when a
/// response was produced, the response snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Unique identifier for the history entry.
    pub id: String,

    /// Snapshot of the request as sent.
    pub request: ApiRequest,

    /// Snapshot of the response, absent when the dispatch never produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ApiResponse>,

    /// Creation time, epoch milliseconds.
    pub created_at: i64,
}

impl HistoryItem {
    /// Creates a history entry for a (request, response) pair.
    pub fn new(request: ApiRequest, response: Option<ApiResponse>) -> Self {
        Self {
            id: generate_id(),
            request,
            response,
            created_at: now_millis(),
        }
    }
}

/// Application settings affecting the execution pipeline.
///
/// Only `request_timeout` and `follow_redirects` influence dispatch; the
/// remaining fields belong to the shell UI but travel with the same settings
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// UI theme name.
    pub theme: String,

    /// Request timeout in milliseconds.
    pub request_timeout: u64,

    /// Whether the transport follows redirects.
    pub follow_redirects: bool,

    /// Whether query parameters are percent-encoded.
    pub encode_url: bool,

    /// Whether the shell shows the network log panel.
    pub show_network_log: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            request_timeout: 30_000,
            follow_redirects: true,
            encode_url: true,
            show_network_log: false,
        }
    }
}

/// The full persisted data set: collections, environments, history, the
/// active environment pointer, and settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageData {
    /// All collections.
    pub collections: Vec<Collection>,

    /// All environments.
    pub environments: Vec<Environment>,

    /// Dispatch history, most recent first.
    pub history: Vec<HistoryItem>,

    /// Id of the active environment, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_environment_id: Option<String>,

    /// Application settings.
    pub settings: AppSettings,
}
