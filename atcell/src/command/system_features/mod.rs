use serde::Serialize;
use types::{CMEErrorReports, RegistrationReports};

use super::AtCommand;

pub mod types;

/// `AT+CMEE=<typ>`. Switches `+CME ERROR` reporting between off/numeric/verbose.
#[derive(Clone, Serialize)]
pub struct ConfigureCMEErrorReports {
    pub typ: CMEErrorReports,
}

impl AtCommand for ConfigureCMEErrorReports {
    const PREFIX: &'static str = "+CMEE";
}

/// `AT+CREG=<typ>`. Enables unsolicited `+CREG` circuit-switched registration
/// URCs.
#[derive(Clone, Serialize)]
pub struct ConfigureNetworkRegistrationReports {
    pub typ: RegistrationReports,
}

impl AtCommand for ConfigureNetworkRegistrationReports {
    const PREFIX: &'static str = "+CREG";
}

/// `AT+CGREG=<typ>`. Enables unsolicited `+CGREG` packet-switched
/// registration URCs.
#[derive(Clone, Serialize)]
pub struct ConfigurePacketRegistrationReports {
    pub typ: RegistrationReports,
}

impl AtCommand for ConfigurePacketRegistrationReports {
    const PREFIX: &'static str = "+CGREG";
}
