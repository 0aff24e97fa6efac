//! Voice call control, grounded on `lwcell_call.c`'s `ATD`/`ATA`/`ATH`.
//!
//! `ATD`/`ATA`/`ATH` are bare dial-string commands rather than `+`-prefixed
//! argument lists, so they have no `AtCommand` impl — the engine formats the
//! dial string directly (`ATD<number>;\r\n`).

use serde::Serialize;

use super::types::Bool;
use super::AtCommand;

pub mod urc;

pub const ANSWER: &str = "A";
pub const HANGUP: &str = "H";

pub fn dial(number: &str) -> Vec<u8> {
    format!("ATD{number};\r\n").into_bytes()
}

/// `AT+CLCC=<n>`. Turns on the unsolicited call-status reports this dialect
/// relies on for `RING`/`+CRING`/`+CLIP` tracking, grounded on
/// `lwcell_call.c`'s `lwcell_call_enable` sending `LWCELL_CMD_CALL_ENABLE`
/// (`LWCELL_CMD_CLCC_SET`) as its first step.
#[derive(Clone, Serialize)]
pub struct EnableUnsolicitedCallStatus {
    pub n: Bool,
}

impl AtCommand for EnableUnsolicitedCallStatus {
    const PREFIX: &'static str = "+CLCC";
}
