//! In-memory persistence for collections, environments, history, and
//! settings.
//!
//! The execution pipeline only needs the active environment's variables and
//! the settings; the [`StoreService`] trait exposes exactly that, so the
//! resolver and dispatcher stay decoupled from the full storage surface and
//! tests can plug in a fixture store.
//!
//! [`InMemoryStore`] is the reference implementation. A shell embedding this
//! crate typically wraps it with file persistence by serializing
//! [`StorageData`] on change.

use crate::models::{
    generate_id, now_millis, ApiRequest, AppSettings, Collection, Environment, Folder,
    HistoryItem, StorageData,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Maximum number of history entries kept; older entries are dropped.
pub const HISTORY_LIMIT: usize = 100;

/// Errors from store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The named entity does not exist.
    NotFound(String),
    /// Import or export payload could not be (de)serialized.
    Serialization(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "not found: {}", what),
            StoreError::Serialization(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}

/// The view of storage the execution pipeline depends on.
pub trait StoreService: Send + Sync {
    /// Returns the active environment's enabled variables, or an empty map
    /// when no environment is active.
    fn environment_variables(&self) -> HashMap<String, String>;

    /// Returns the current application settings.
    fn settings(&self) -> AppSettings;
}

/// Thread-safe in-memory store over a [`StorageData`] document.
#[derive(Default)]
pub struct InMemoryStore {
    data: RwLock<StorageData>,
}

impl InMemoryStore {
    /// Creates an empty store with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with existing data.
    pub fn with_data(data: StorageData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StorageData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StorageData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- collections ----

    /// Returns all collections.
    pub fn collections(&self) -> Vec<Collection> {
        self.read().collections.clone()
    }

    /// Returns the collection with the given id.
    pub fn get_collection(&self, id: &str) -> Option<Collection> {
        self.read().collections.iter().find(|c| c.id == id).cloned()
    }

    /// Inserts or replaces a collection, refreshing its update timestamp.
    pub fn save_collection(&self, mut collection: Collection) {
        collection.updated_at = now_millis();
        let mut data = self.write();
        if let Some(existing) = data.collections.iter_mut().find(|c| c.id == collection.id) {
            *existing = collection;
        } else {
            data.collections.push(collection);
        }
    }

    /// Deletes a collection and everything in it.
    pub fn delete_collection(&self, id: &str) -> Result<(), StoreError> {
        let mut data = self.write();
        let before = data.collections.len();
        data.collections.retain(|c| c.id != id);
        if data.collections.len() == before {
            return Err(StoreError::NotFound(format!("collection {}", id)));
        }
        Ok(())
    }

    // ---- folders ----

    /// Creates a folder inside a collection and returns it.
    pub fn create_folder(
        &self,
        collection_id: &str,
        name: impl Into<String>,
    ) -> Result<Folder, StoreError> {
        let folder = Folder::new(name);
        let mut data = self.write();
        let collection = data
            .collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| StoreError::NotFound(format!("collection {}", collection_id)))?;
        collection.folders.push(folder.clone());
        collection.updated_at = now_millis();
        Ok(folder)
    }

    /// Deletes a folder and its requests.
    pub fn delete_folder(&self, collection_id: &str, folder_id: &str) -> Result<(), StoreError> {
        let mut data = self.write();
        let collection = data
            .collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| StoreError::NotFound(format!("collection {}", collection_id)))?;
        let before = collection.folders.len();
        collection.folders.retain(|f| f.id != folder_id);
        if collection.folders.len() == before {
            return Err(StoreError::NotFound(format!("folder {}", folder_id)));
        }
        collection.updated_at = now_millis();
        Ok(())
    }

    // ---- requests ----

    /// Inserts or replaces a request at the collection root, or inside the
    /// named folder when `folder_id` is given.
    pub fn save_request(
        &self,
        collection_id: &str,
        folder_id: Option<&str>,
        mut request: ApiRequest,
    ) -> Result<(), StoreError> {
        request.updated_at = now_millis();
        request.collection_id = Some(collection_id.to_string());
        request.folder_id = folder_id.map(String::from);

        let mut data = self.write();
        let collection = data
            .collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| StoreError::NotFound(format!("collection {}", collection_id)))?;

        let requests = match folder_id {
            Some(fid) => {
                &mut collection
                    .folders
                    .iter_mut()
                    .find(|f| f.id == fid)
                    .ok_or_else(|| StoreError::NotFound(format!("folder {}", fid)))?
                    .requests
            }
            None => &mut collection.requests,
        };

        if let Some(existing) = requests.iter_mut().find(|r| r.id == request.id) {
            *existing = request;
        } else {
            requests.push(request);
        }
        collection.updated_at = now_millis();
        Ok(())
    }

    /// Deletes a request, searching the collection root and every folder.
    pub fn delete_request(&self, collection_id: &str, request_id: &str) -> Result<(), StoreError> {
        let mut data = self.write();
        let collection = data
            .collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| StoreError::NotFound(format!("collection {}", collection_id)))?;

        let before = collection.requests.len();
        collection.requests.retain(|r| r.id != request_id);
        let mut removed = collection.requests.len() != before;

        for folder in &mut collection.folders {
            let before = folder.requests.len();
            folder.requests.retain(|r| r.id != request_id);
            removed = removed || folder.requests.len() != before;
        }

        if !removed {
            return Err(StoreError::NotFound(format!("request {}", request_id)));
        }
        collection.updated_at = now_millis();
        Ok(())
    }

    /// Returns every request across all collections and folders.
    pub fn all_requests(&self) -> Vec<ApiRequest> {
        let data = self.read();
        let mut requests = Vec::new();
        for collection in &data.collections {
            requests.extend(collection.requests.iter().cloned());
            for folder in &collection.folders {
                requests.extend(folder.requests.iter().cloned());
            }
        }
        requests
    }

    // ---- environments ----

    /// Returns all environments.
    pub fn environments(&self) -> Vec<Environment> {
        self.read().environments.clone()
    }

    /// Inserts or replaces an environment.
    pub fn save_environment(&self, mut environment: Environment) -> Result<(), StoreError> {
        environment.updated_at = now_millis();
        let mut data = self.write();
        // is_active follows the active pointer, never the incoming flag
        environment.is_active = data.active_environment_id.as_deref() == Some(&environment.id);
        if let Some(existing) = data
            .environments
            .iter_mut()
            .find(|e| e.id == environment.id)
        {
            *existing = environment;
        } else {
            data.environments.push(environment);
        }
        Ok(())
    }

    /// Deletes an environment; clears the active pointer if it was active.
    pub fn delete_environment(&self, id: &str) -> Result<(), StoreError> {
        let mut data = self.write();
        let before = data.environments.len();
        data.environments.retain(|e| e.id != id);
        if data.environments.len() == before {
            return Err(StoreError::NotFound(format!("environment {}", id)));
        }
        if data.active_environment_id.as_deref() == Some(id) {
            data.active_environment_id = None;
        }
        Ok(())
    }

    /// Makes the given environment the single active one, or deactivates all
    /// environments when `id` is `None`.
    pub fn set_active_environment(&self, id: Option<&str>) -> Result<(), StoreError> {
        let mut data = self.write();
        if let Some(id) = id {
            if !data.environments.iter().any(|e| e.id == id) {
                return Err(StoreError::NotFound(format!("environment {}", id)));
            }
        }
        data.active_environment_id = id.map(String::from);
        for env in &mut data.environments {
            env.is_active = Some(env.id.as_str()) == id;
        }
        Ok(())
    }

    /// Returns the active environment, if any.
    pub fn active_environment(&self) -> Option<Environment> {
        let data = self.read();
        let id = data.active_environment_id.as_deref()?;
        data.environments.iter().find(|e| e.id == id).cloned()
    }

    // ---- history ----

    /// Prepends a history entry, dropping the oldest past [`HISTORY_LIMIT`].
    pub fn add_history(&self, item: HistoryItem) {
        let mut data = self.write();
        data.history.insert(0, item);
        data.history.truncate(HISTORY_LIMIT);
    }

    /// Returns the history, most recent first.
    pub fn history(&self) -> Vec<HistoryItem> {
        self.read().history.clone()
    }

    /// Deletes a single history entry.
    pub fn delete_history_item(&self, id: &str) -> Result<(), StoreError> {
        let mut data = self.write();
        let before = data.history.len();
        data.history.retain(|h| h.id != id);
        if data.history.len() == before {
            return Err(StoreError::NotFound(format!("history item {}", id)));
        }
        Ok(())
    }

    /// Clears the history.
    pub fn clear_history(&self) {
        self.write().history.clear();
    }

    // ---- settings ----

    /// Replaces the application settings.
    pub fn update_settings(&self, settings: AppSettings) {
        self.write().settings = settings;
    }

    // ---- import / export ----

    /// Serializes the full data set as pretty-printed JSON.
    pub fn export_data(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&*self.read())?)
    }

    /// Serializes one collection as pretty-printed JSON.
    pub fn export_collection(&self, id: &str) -> Result<String, StoreError> {
        let collection = self
            .get_collection(id)
            .ok_or_else(|| StoreError::NotFound(format!("collection {}", id)))?;
        Ok(serde_json::to_string_pretty(&collection)?)
    }

    /// Replaces the full data set from exported JSON. Missing sections fall
    /// back to defaults, so partial or older exports still import.
    pub fn import_data(&self, json: &str) -> Result<(), StoreError> {
        let imported: StorageData = serde_json::from_str(json)?;
        *self.write() = imported;
        Ok(())
    }

    /// Imports a collection from exported JSON as a new collection.
    ///
    /// Every id inside is reassigned and timestamps are refreshed, so
    /// importing the same file twice yields two independent collections.
    pub fn import_collection(&self, json: &str) -> Result<Collection, StoreError> {
        let mut collection: Collection = serde_json::from_str(json)?;
        let now = now_millis();

        collection.id = generate_id();
        collection.created_at = now;
        collection.updated_at = now;

        let reassign = |request: &mut ApiRequest, collection_id: &str, folder_id: Option<&str>| {
            request.id = generate_id();
            request.collection_id = Some(collection_id.to_string());
            request.folder_id = folder_id.map(String::from);
            request.created_at = now;
            request.updated_at = now;
            for pair in request.headers.iter_mut().chain(request.params.iter_mut()) {
                pair.id = generate_id();
            }
        };

        for pair in &mut collection.variables {
            pair.id = generate_id();
        }
        for request in &mut collection.requests {
            reassign(request, &collection.id, None);
        }
        for folder in &mut collection.folders {
            folder.id = generate_id();
            folder.created_at = now;
            folder.updated_at = now;
            let folder_id = folder.id.clone();
            for request in &mut folder.requests {
                reassign(request, &collection.id, Some(&folder_id));
            }
        }

        self.write().collections.push(collection.clone());
        Ok(collection)
    }
}

impl StoreService for InMemoryStore {
    fn environment_variables(&self) -> HashMap<String, String> {
        self.active_environment()
            .map(|e| e.variables())
            .unwrap_or_default()
    }

    fn settings(&self) -> AppSettings {
        self.read().settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpMethod;

    fn store_with_collection() -> (InMemoryStore, String) {
        let store = InMemoryStore::new();
        let collection = Collection::new("api");
        let id = collection.id.clone();
        store.save_collection(collection);
        (store, id)
    }

    #[test]
    fn test_collection_crud() {
        let (store, id) = store_with_collection();
        assert_eq!(store.collections().len(), 1);
        assert!(store.get_collection(&id).is_some());

        let mut updated = store.get_collection(&id).unwrap();
        updated.name = "renamed".to_string();
        store.save_collection(updated);
        assert_eq!(store.get_collection(&id).unwrap().name, "renamed");
        assert_eq!(store.collections().len(), 1);

        store.delete_collection(&id).unwrap();
        assert!(store.collections().is_empty());
        assert!(store.delete_collection(&id).is_err());
    }

    #[test]
    fn test_request_in_folder() {
        let (store, collection_id) = store_with_collection();
        let folder = store.create_folder(&collection_id, "users").unwrap();

        let request = ApiRequest::new("list", HttpMethod::GET, "https://x/users");
        let request_id = request.id.clone();
        store
            .save_request(&collection_id, Some(&folder.id), request)
            .unwrap();

        let all = store.all_requests();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].folder_id.as_deref(), Some(folder.id.as_str()));

        store.delete_request(&collection_id, &request_id).unwrap();
        assert!(store.all_requests().is_empty());
    }

    #[test]
    fn test_save_request_upserts() {
        let (store, collection_id) = store_with_collection();
        let mut request = ApiRequest::new("get", HttpMethod::GET, "https://x");
        store.save_request(&collection_id, None, request.clone()).unwrap();

        request.url = "https://y".to_string();
        store.save_request(&collection_id, None, request).unwrap();

        let all = store.all_requests();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].url, "https://y");
    }

    #[test]
    fn test_single_active_environment() {
        let store = InMemoryStore::new();
        let a = Environment::new("a");
        let b = Environment::new("b");
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.save_environment(a).unwrap();
        store.save_environment(b).unwrap();

        store.set_active_environment(Some(&a_id)).unwrap();
        store.set_active_environment(Some(&b_id)).unwrap();

        let envs = store.environments();
        assert_eq!(envs.iter().filter(|e| e.is_active).count(), 1);
        assert_eq!(store.active_environment().unwrap().id, b_id);

        store.set_active_environment(None).unwrap();
        assert!(store.active_environment().is_none());
        assert!(store.environments().iter().all(|e| !e.is_active));
    }

    #[test]
    fn test_delete_active_environment_clears_pointer() {
        let store = InMemoryStore::new();
        let env = Environment::new("dev");
        let id = env.id.clone();
        store.save_environment(env).unwrap();
        store.set_active_environment(Some(&id)).unwrap();

        store.delete_environment(&id).unwrap();
        assert!(store.active_environment().is_none());
        assert!(store.environment_variables().is_empty());
    }

    #[test]
    fn test_environment_variables_from_active() {
        let store = InMemoryStore::new();
        let mut env = Environment::new("dev");
        env.set("baseUrl", "https://dev.example.com");
        let id = env.id.clone();
        store.save_environment(env).unwrap();

        // nothing active yet
        assert!(store.environment_variables().is_empty());

        store.set_active_environment(Some(&id)).unwrap();
        assert_eq!(
            store.environment_variables().get("baseUrl").map(String::as_str),
            Some("https://dev.example.com")
        );
    }

    #[test]
    fn test_history_limit() {
        let store = InMemoryStore::new();
        for i in 0..(HISTORY_LIMIT + 10) {
            let request = ApiRequest::new(format!("r{}", i), HttpMethod::GET, "https://x");
            store.add_history(HistoryItem::new(request, None));
        }

        let history = store.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        // most recent first
        assert_eq!(history[0].request.name, format!("r{}", HISTORY_LIMIT + 9));
    }

    #[test]
    fn test_import_collection_reassigns_ids() {
        let (store, collection_id) = store_with_collection();
        let folder = store.create_folder(&collection_id, "f").unwrap();
        store
            .save_request(
                &collection_id,
                Some(&folder.id),
                ApiRequest::new("r", HttpMethod::GET, "https://x"),
            )
            .unwrap();

        let exported = store.export_collection(&collection_id).unwrap();
        let imported = store.import_collection(&exported).unwrap();

        assert_ne!(imported.id, collection_id);
        assert_ne!(imported.folders[0].id, folder.id);
        let original = store.get_collection(&collection_id).unwrap();
        assert_ne!(
            imported.folders[0].requests[0].id,
            original.folders[0].requests[0].id
        );
        assert_eq!(store.collections().len(), 2);
    }

    #[test]
    fn test_import_data_replaces_everything() {
        let (store, _) = store_with_collection();
        store.import_data("{}").unwrap();
        assert!(store.collections().is_empty());
        assert_eq!(store.settings(), AppSettings::default());
    }

    #[test]
    fn test_import_data_rejects_invalid_json() {
        let store = InMemoryStore::new();
        assert!(store.import_data("not json").is_err());
    }

    #[test]
    fn test_update_settings() {
        let store = InMemoryStore::new();
        let mut settings = AppSettings::default();
        settings.request_timeout = 5_000;
        store.update_settings(settings);
        assert_eq!(store.settings().request_timeout, 5_000);
    }
}
