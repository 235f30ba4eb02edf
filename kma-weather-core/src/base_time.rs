use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Minutes past the hour before that hour's observation batch is reliably
/// published.
pub const PUBLISH_DELAY_MINUTES: u32 = 10;

/// KMA publishes in Korea Standard Time (UTC+9, no DST).
const KST_OFFSET_HOURS: i64 = 9;

/// Label of an observation batch, in the upstream's own formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationWindow {
    /// `YYYYMMDD`
    pub base_date: String,
    /// `HH00`
    pub base_time: String,
}

impl ObservationWindow {
    /// Latest published batch as of the current instant.
    pub fn current() -> Self {
        latest_base_time(now_kst())
    }
}

/// Current wall-clock time in KST, independent of the host timezone.
pub fn now_kst() -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::hours(KST_OFFSET_HOURS)
}

/// Most recent observation batch the API is expected to have published at
/// `now` (KST local time).
pub fn latest_base_time(now: NaiveDateTime) -> ObservationWindow {
    let slot = if now.minute() < PUBLISH_DELAY_MINUTES {
        // 00:0x rolls back to 23:00 of the previous day.
        now - Duration::hours(1)
    } else {
        now
    };

    ObservationWindow {
        base_date: slot.format("%Y%m%d").to_string(),
        base_time: slot.format("%H00").to_string(),
    }
}
