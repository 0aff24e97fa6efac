use heapless::String;
use serde::Serialize;
use types::{NetworkSelectionMode, OperatorNameFormat};

use super::types::Nullable;
use super::AtCommand;

pub mod types;
pub mod urc;

/// `AT+COPS=<mode>[,<format>[,<oper>]]`. Grounded on `lwcell_operator.c`:
/// `mode = Manual` drives an explicit registration attempt, `mode =
/// Automatic` lets the baseband pick, and `mode = Unregister` deregisters.
/// `format`/`oper` use [`Nullable`] rather than `Option` since a manual
/// selection with no operator given must drop the trailing fields outright
/// (`AT+COPS=1`), not leave blank slots (`AT+COPS=1,,`).
#[derive(Clone, Serialize, Default)]
pub struct OperatorSet {
    pub mode: NetworkSelectionMode,
    pub format: Nullable<OperatorNameFormat>,
    pub oper: Nullable<String<16>>,
}

impl AtCommand for OperatorSet {
    const PREFIX: &'static str = "+COPS";
}

pub const OPERATOR: &str = "+COPS";
pub const OPERATOR_SCAN: &str = "+COPS=?";
pub const NETWORK_STATUS: &str = "+CREG";
pub const NETWORK_ATTACH_STATUS: &str = "+CGATT";
