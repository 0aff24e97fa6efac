//! USSD session control, grounded on `lwcell_ussd.c`'s `+CUSD`.

use heapless::String;
use serde::Serialize;

use super::AtCommand;

pub mod urc;

/// `AT+CUSD=1,"<code>",15`. The `15` data coding scheme (GSM 7-bit default
/// alphabet) is fixed, matching `lwcell_ussd_run`.
#[derive(Clone, Serialize)]
pub struct Run {
    pub enable: u8,
    pub code: String<64>,
    pub dcs: u8,
}

impl AtCommand for Run {
    const PREFIX: &'static str = "+CUSD";
}

impl Run {
    pub fn new(code: String<64>) -> Self {
        Self { enable: 1, code, dcs: 15 }
    }
}
