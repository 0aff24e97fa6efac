//! SIM7000 network-attach script. `original_source` only models the SIM800
//! family, so this dialect generalizes its shape (clear any stale PDP
//! context, attach, bring up the bearer, query the address) to SIM7000's
//! actual attach primitives: `CGDCONT` defines the context, `CNACT`
//! activates it and reports the address directly rather than needing a
//! separate `CIFSR`-equivalent query.

use heapless::String;

use crate::command::conn;
use crate::script::{Dialect, Step};

pub struct Sim7000;

impl Dialect for Sim7000 {
    fn name(&self) -> &'static str {
        "sim7000"
    }

    fn network_attach_steps(&self, apn: &str, _user: &str, _pass: &str) -> Vec<Step> {
        let apn = String::<32>::try_from(apn).unwrap_or_default();
        vec![
            Step::ok(format!("AT{}=0\r\n", conn::CGACT).into_bytes()),
            Step::ok(format!("AT+CGDCONT=1,\"IP\",\"{apn}\"\r\n").into_bytes()),
            Step::ok(format!("AT{}=1\r\n", conn::CGATT).into_bytes()),
            Step::ok(b"AT+CNACT=1\r\n".to_vec()),
            Step::line(b"AT+CNACT?\r\n".to_vec()),
        ]
    }
}
