//! Flat `key=value` wire format.
//!
//! ```text
//! username=alice&message=hello
//! ```
//!
//! Tokens are joined by `&` and split on the first `=`. Nothing is escaped,
//! so a key or value containing `&` or `=` cannot round-trip.

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::warn;

use postbox_types::models::StoredRecord;

pub const FIELD_DELIMITER: char = '&';
pub const KEY_VALUE_SEPARATOR: char = '=';

pub const USERNAME_FIELD: &str = "username";
pub const MESSAGE_FIELD: &str = "message";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedMessage {
    #[error("message is not valid UTF-8")]
    InvalidUtf8,
    #[error("token {index} has no '=' separator: {token:?}")]
    MissingSeparator { index: usize, token: String },
    #[error("field '{field}' not found in a message of {tokens} token(s)")]
    MissingField { field: &'static str, tokens: usize },
}

/// Serialize fields in the given order.
pub fn encode<'a, I>(fields: I) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    for (i, (key, value)) in fields.into_iter().enumerate() {
        if has_delimiter(key) || has_delimiter(value) {
            warn!("Wire: field '{}' contains a delimiter and will not decode cleanly", key);
        }
        if i > 0 {
            out.push(FIELD_DELIMITER);
        }
        out.push_str(key);
        out.push(KEY_VALUE_SEPARATOR);
        out.push_str(value);
    }
    out.into_bytes()
}

/// Parse a wire message into ordered key/value pairs.
pub fn decode(bytes: &[u8]) -> Result<Vec<(String, String)>, MalformedMessage> {
    let text = std::str::from_utf8(bytes).map_err(|_| MalformedMessage::InvalidUtf8)?;

    text.split(FIELD_DELIMITER)
        .enumerate()
        .map(|(index, token)| {
            token
                .split_once(KEY_VALUE_SEPARATOR)
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| MalformedMessage::MissingSeparator {
                    index,
                    token: token.to_string(),
                })
        })
        .collect()
}

/// Build a `StoredRecord` from decoded fields.
///
/// `username` and `message` are looked up by key. Older senders that used
/// other key names are still accepted: a missing key falls back to the token
/// at the field's historical position (0 for username, 1 for message), which
/// requires at least two tokens.
pub fn extract_record(
    fields: &[(String, String)],
    date: DateTime<Local>,
) -> Result<StoredRecord, MalformedMessage> {
    let username = field_value(fields, USERNAME_FIELD, 0)?;
    let message = field_value(fields, MESSAGE_FIELD, 1)?;
    Ok(StoredRecord::new(date, username.to_string(), message.to_string()))
}

fn field_value<'a>(
    fields: &'a [(String, String)],
    name: &'static str,
    position: usize,
) -> Result<&'a str, MalformedMessage> {
    if let Some((_, value)) = fields.iter().find(|(k, _)| k == name) {
        return Ok(value);
    }

    let missing = MalformedMessage::MissingField {
        field: name,
        tokens: fields.len(),
    };
    if fields.len() < 2 {
        return Err(missing);
    }
    fields.get(position).map(|(_, v)| v.as_str()).ok_or(missing)
}

fn has_delimiter(s: &str) -> bool {
    s.contains(FIELD_DELIMITER) || s.contains(KEY_VALUE_SEPARATOR)
}
