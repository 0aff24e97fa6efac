//! Typed AT command argument lists and response/URC payloads.
//!
//! Unlike the teacher crate, this module does not hand command dispatch or
//! line classification to `atat`'s own client/ingress machinery — the line
//! scanner and response interpreter are the engine's own (`processor.rs`),
//! since building that is the point of this crate. What *is* reused from
//! `atat` is its compact AT-argument (de)serializer: a command's argument
//! list is an ordinary `#[derive(Serialize)]` struct (with `AtatEnum` for
//! fixed-width encoded fields, exactly as the teacher crate used it), and
//! [`format_set`]/[`parse_fields`] call straight into `atat::serde_at`,
//! matching the one usage of that serializer the teacher crate exercised
//! directly in its own tests (`command/types.rs`, `ser_nullable`/
//! `de_nullable`).

use atat::serde_at::{SerializeOptions, from_slice, ser::to_slice};
use serde::Serialize;

pub mod call;
pub mod conn;
pub mod device;
pub mod mobile_equipment;
pub mod network;
pub mod phonebook;
pub mod sim;
pub mod sms;
pub mod system_features;
pub mod types;
pub mod ussd;

/// Implemented by a command's argument-list struct to name the AT prefix
/// (e.g. `"+CMGS"`) it is serialized under.
pub trait AtCommand: Serialize {
    const PREFIX: &'static str;
}

/// Formats `args` as a complete `AT<prefix>=<args>\r\n` line.
pub fn format_set<T: AtCommand>(args: &T) -> Vec<u8> {
    let mut buf = [0u8; 512];
    let written = to_slice(args, T::PREFIX, &mut buf, SerializeOptions::default()).unwrap_or(0);
    buf[..written].to_vec()
}

/// Formats a bare execute-form command with no arguments: `AT<prefix>\r\n`.
pub fn format_bare(prefix: &str) -> Vec<u8> {
    format!("AT{prefix}\r\n").into_bytes()
}

/// Formats a read-form (query) command: `AT<prefix>?\r\n`.
pub fn format_query(prefix: &str) -> Vec<u8> {
    format!("AT{prefix}?\r\n").into_bytes()
}

/// Parses the comma-separated field list following a response/URC prefix
/// (the prefix itself must already be stripped by the caller — that is the
/// line classifier's job, not this function's).
pub fn parse_fields<'a, T>(bytes: &'a [u8]) -> Result<T, atat::Error>
where
    T: serde::Deserialize<'a>,
{
    from_slice::<T>(bytes).map_err(|_| atat::Error::Parse)
}
