//! TCP/UDP sockets over `+CIP*`, grounded on `lwcell_conn.c` and the
//! `gsm_device_sim800.c` network-attach script.

use heapless::String;
use serde::Serialize;

use super::AtCommand;

pub mod types;
pub mod urc;

pub const CGACT: &str = "+CGACT";
pub const CGATT: &str = "+CGATT";
pub const CIPSHUT: &str = "+CIPSHUT";
pub const CIPMUX: &str = "+CIPMUX";
pub const CIPRXGET: &str = "+CIPRXGET";
pub const CIICR: &str = "+CIICR";
pub const CIFSR: &str = "+CIFSR";
pub const CIPSTATUS: &str = "+CIPSTATUS";
pub const CIPCLOSE: &str = "+CIPCLOSE";

/// `AT+CSTT="<apn>","<user>","<pass>"`.
#[derive(Clone, Serialize)]
pub struct SetApn {
    pub apn: String<32>,
    pub user: String<32>,
    pub pass: String<32>,
}

impl AtCommand for SetApn {
    const PREFIX: &'static str = "+CSTT";
}

/// `AT+CIPSTART=<id>,"<type>","<host>",<port>`.
#[derive(Clone, Serialize)]
pub struct Start {
    pub id: u8,
    pub kind: String<3>,
    pub host: String<64>,
    pub port: u16,
}

impl AtCommand for Start {
    const PREFIX: &'static str = "+CIPSTART";
}

/// `AT+CIPSEND=<id>,<len>`. The payload bytes themselves follow once the
/// modem replies with the `>` data prompt — handled by the command group,
/// not serialized here.
#[derive(Clone, Serialize)]
pub struct Send {
    pub id: u8,
    pub len: usize,
}

impl AtCommand for Send {
    const PREFIX: &'static str = "+CIPSEND";
}

/// `AT+CIPRXGET=2,<id>,<len>`. Polls buffered received bytes for a
/// connection in manual receive mode.
#[derive(Clone, Serialize)]
pub struct RxGet {
    pub mode: u8,
    pub id: u8,
    pub len: usize,
}

impl AtCommand for RxGet {
    const PREFIX: &'static str = "+CIPRXGET";
}
