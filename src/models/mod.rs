//! Core data models for the Airpost request-testing client.
//!
//! This module defines the structures shared across the execution pipeline:
//! requests, responses, collections, environments, and history records.
//! All persistent types serialize as camelCase JSON so that exports remain
//! compatible with the client's on-disk data format.

pub mod collection;
pub mod request;
pub mod response;

pub use collection::{AppSettings, Collection, Environment, Folder, HistoryItem, StorageData};
pub use request::{ApiRequest, BodyType, HttpMethod, KeyValuePair};
pub use response::{ApiResponse, TestResult, TestStatus};

/// Returns the current time as epoch milliseconds.
///
/// All `createdAt`/`updatedAt` fields in the data model use this clock.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generates a fresh identifier for a model object.
///
/// Identifiers are v4 UUID strings; they only need to be unique within a
/// single user's data set.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_reasonable() {
        let ts = now_millis();
        // After 2020-01-01 and before 2100-01-01
        assert!(ts > 1_577_836_800_000);
        assert!(ts < 4_102_444_800_000);
    }

    #[test]
    fn test_generate_id_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
