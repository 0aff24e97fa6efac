use serde::Serialize;
use types::{FunctionalMode, ResetFlag};

use super::types::Nullable;
use super::AtCommand;

pub mod responses;
pub mod types;

/// `AT+CFUN=<fun>[,<rst>]`. Sets the functionality level of the device.
/// `rst` uses [`Nullable`] since an omitted reset flag must drop the
/// trailing field (`AT+CFUN=1`) rather than leave a blank slot (`AT+CFUN=1,`).
#[derive(Clone, Debug, Serialize)]
pub struct SetFunctionality {
    pub fun: FunctionalMode,
    pub rst: Nullable<ResetFlag>,
}

impl AtCommand for SetFunctionality {
    const PREFIX: &'static str = "+CFUN";
}

pub const GET_SIGNAL_QUALITY: &str = "+CSQ";
