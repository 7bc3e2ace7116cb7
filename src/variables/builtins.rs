//! Built-in dynamic variables.
//!
//! These are the `$`-prefixed variables available in every request without
//! any environment: timestamps, date parts, and random values. Each value is
//! recomputed on every lookup, so two placeholders in the same request may
//! differ (two `{{$randomInt}}` occurrences are independent draws).

use chrono::{Datelike, Local, Timelike, Utc};
use rand::Rng;
use std::collections::HashMap;
use uuid::Uuid;

/// Returns the built-in dynamic variables, freshly computed.
///
/// | Name | Value |
/// |------|-------|
/// | `$timestamp` | Unix timestamp in seconds |
/// | `$isoTimestamp` | Current time in ISO-8601 (UTC) |
/// | `$randomInt` | Random integer in `0..10000` |
/// | `$guid`, `$randomUUID` | Random v4 UUID |
/// | `$year` | Four-digit local year |
/// | `$month`, `$day`, `$hour`, `$minute`, `$second` | Zero-padded two-digit local date parts |
/// | `$millisecond` | Local millisecond, unpadded |
pub fn builtin_variables() -> HashMap<String, String> {
    let mut rng = rand::thread_rng();
    let now_utc = Utc::now();
    let now = Local::now();

    let mut vars = HashMap::new();
    vars.insert("$timestamp".to_string(), now_utc.timestamp().to_string());
    vars.insert("$isoTimestamp".to_string(), now_utc.to_rfc3339());
    vars.insert("$randomInt".to_string(), rng.gen_range(0..10000).to_string());

    vars.insert("$guid".to_string(), Uuid::new_v4().to_string());
    vars.insert("$randomUUID".to_string(), Uuid::new_v4().to_string());

    vars.insert("$year".to_string(), now.year().to_string());
    vars.insert("$month".to_string(), format!("{:02}", now.month()));
    vars.insert("$day".to_string(), format!("{:02}", now.day()));
    vars.insert("$hour".to_string(), format!("{:02}", now.hour()));
    vars.insert("$minute".to_string(), format!("{:02}", now.minute()));
    vars.insert("$second".to_string(), format!("{:02}", now.second()));
    vars.insert(
        "$millisecond".to_string(),
        (now.timestamp_subsec_millis()).to_string(),
    );

    vars
}
