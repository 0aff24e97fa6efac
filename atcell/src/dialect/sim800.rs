//! SIM800 network-attach script, grounded byte-for-byte on
//! `gsm_device_sim800.c`'s `GSM_CMD_CSTM_*` state machine: `CGACT=0` (clear
//! any stale context) → `CGACT=1` → `CGATT=0` → `CGATT=1` → `CIPSHUT` →
//! `CIPMUX=1` → `CIPRXGET=1` → `CSTT=apn,user,pass` → `CIICR` → `CIFSR`.

use heapless::String;

use crate::command::{conn, format_bare, format_set};
use crate::script::{Dialect, Step};

pub struct Sim800;

impl Dialect for Sim800 {
    fn name(&self) -> &'static str {
        "sim800"
    }

    fn network_attach_steps(&self, apn: &str, user: &str, pass: &str) -> Vec<Step> {
        let set_apn = conn::SetApn {
            apn: String::try_from(apn).unwrap_or_default(),
            user: String::try_from(user).unwrap_or_default(),
            pass: String::try_from(pass).unwrap_or_default(),
        };
        vec![
            Step::ok(format!("AT{}=0\r\n", conn::CGACT).into_bytes()),
            Step::ok(format!("AT{}=1\r\n", conn::CGACT).into_bytes()),
            Step::ok(format!("AT{}=0\r\n", conn::CGATT).into_bytes()),
            Step::ok(format!("AT{}=1\r\n", conn::CGATT).into_bytes()),
            Step::ok(format_bare(conn::CIPSHUT)),
            Step::ok(format!("AT{}=1\r\n", conn::CIPMUX).into_bytes()),
            Step::ok(format!("AT{}=1\r\n", conn::CIPRXGET).into_bytes()),
            Step::ok(format_set(&set_apn)),
            Step::ok(format_bare(conn::CIICR)),
            Step::line(format_bare(conn::CIFSR)),
        ]
    }
}
