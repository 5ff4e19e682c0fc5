use chrono::{SecondsFormat, Utc};

/// Unix epoch milliseconds; item expiry and schedule timestamps use this unit.
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
