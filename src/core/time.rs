use chrono::{DateTime, Utc};

/// Current instant, overridable via `FUSION_FIXED_TIME` (RFC-3339) for
/// deterministic replays.
pub fn now_utc() -> DateTime<Utc> {
    if let Ok(value) = std::env::var("FUSION_FIXED_TIME") {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
            return dt.with_timezone(&Utc);
        }
    }
    Utc::now()
}

/// Lenient RFC-3339 parse. Feed timestamps are advisory inputs; a bad date
/// is a verdict concern, never a hard failure.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
