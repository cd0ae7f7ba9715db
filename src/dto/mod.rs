use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Match paired with its build.
pub mod match_view;

pub use self::match_view::MatchView;

/// Format epoch milliseconds as RFC 3339, tolerating out-of-range values.
fn format_epoch_millis(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}
