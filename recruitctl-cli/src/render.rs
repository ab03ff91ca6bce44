//! Plain-text reply formatting
//!
//! Replies are sized for a chat message: anything past
//! [`MAX_REPLY_CHARS`] characters is cut and marked.

use chrono::{DateTime, Utc};

/// Longest reply body kept before truncation
pub const MAX_REPLY_CHARS: usize = 1900;

pub const TRUNCATION_NOTICE: &str = "\n\n[Message truncated due to character limit]";

/// Cut `reply` to [`MAX_REPLY_CHARS`] characters and append the notice.
///
/// Counts characters, so multi-byte text is never split mid-codepoint.
pub fn truncate_reply(reply: String) -> String {
    match reply.char_indices().nth(MAX_REPLY_CHARS) {
        Some((cut, _)) => {
            let mut out = reply;
            out.truncate(cut);
            out.push_str(TRUNCATION_NOTICE);
            out
        }
        None => reply,
    }
}

/// Day-only date, `YYYY-MM-DD`
pub fn day(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Day-only date, or "Never" when absent
pub fn day_or_never(at: Option<DateTime<Utc>>) -> String {
    at.map(day).unwrap_or_else(|| "Never".to_string())
}
