//! SMS in text mode, grounded on `lwcell_sms.c`'s `CMGF`/`CPMS`/`CMGS`/
//! `CMGR`/`CMGL`/`CMGD`/`CMGDA` sequencing.

use heapless::String;
use serde::Serialize;

use super::types::Bool;
use super::AtCommand;

pub mod responses;
pub mod types;
pub mod urc;

/// `AT+CMGF=<mode>`. `mode = 1` selects text mode (as opposed to PDU mode,
/// which this crate does not implement).
#[derive(Clone, Serialize)]
pub struct SetTextMode {
    pub mode: Bool,
}

impl AtCommand for SetTextMode {
    const PREFIX: &'static str = "+CMGF";
}

impl Default for SetTextMode {
    fn default() -> Self {
        Self { mode: Bool::True }
    }
}

/// `AT+CPMS=<mem1>[,<mem2>[,<mem3>]]`. Selects the SMS storage, grounded on
/// `lwcell_sms.c`'s two-phase `CPMS_GET`/`CPMS_SET` dance (read the current
/// storage first; only send the set form if it differs).
#[derive(Clone, Serialize)]
pub struct SetPreferredStorage {
    pub mem1: String<2>,
    pub mem2: Option<String<2>>,
    pub mem3: Option<String<2>>,
}

impl AtCommand for SetPreferredStorage {
    const PREFIX: &'static str = "+CPMS";
}

pub const GET_PREFERRED_STORAGE: &str = "+CPMS";

/// `AT+CMGS="<number>"` followed by the body and a Ctrl-Z terminator; the
/// two-stage prompt/body exchange is handled by the command group in
/// `dialect`, not by this argument struct.
#[derive(Clone, Serialize)]
pub struct Send {
    pub number: String<20>,
}

impl AtCommand for Send {
    const PREFIX: &'static str = "+CMGS";
}

/// `AT+CMGR=<index>`.
#[derive(Clone, Serialize)]
pub struct Read {
    pub index: u32,
}

impl AtCommand for Read {
    const PREFIX: &'static str = "+CMGR";
}

/// `AT+CMGL="<stat>"`.
#[derive(Clone, Serialize)]
pub struct List {
    pub stat: String<12>,
}

impl AtCommand for List {
    const PREFIX: &'static str = "+CMGL";
}

/// `AT+CMGD=<index>[,<delflag>]`.
#[derive(Clone, Serialize)]
pub struct Delete {
    pub index: u32,
    pub delflag: Option<u8>,
}

impl AtCommand for Delete {
    const PREFIX: &'static str = "+CMGD";
}

/// `AT+CMGDA="<delflag>"`. Bulk delete, grounded on `lwcell_sms_delete_all`.
#[derive(Clone, Serialize)]
pub struct DeleteAll {
    pub delflag: String<8>,
}

impl AtCommand for DeleteAll {
    const PREFIX: &'static str = "+CMGDA";
}
