use heapless::String;
use serde::Serialize;

use super::AtCommand;

pub mod types;

/// `AT+CPIN=<pin>`. Sends the PIN currently pending.
#[derive(Clone, Serialize)]
pub struct EnterPin {
    pub pin: String<8>,
}

impl AtCommand for EnterPin {
    const PREFIX: &'static str = "+CPIN";
}

/// `AT+CPIN=<puk>,<new_pin>`. Unblocks the SIM and sets a fresh PIN.
#[derive(Clone, Serialize)]
pub struct EnterPuk {
    pub puk: String<8>,
    pub new_pin: String<8>,
}

impl AtCommand for EnterPuk {
    const PREFIX: &'static str = "+CPIN";
}

/// `AT+CPWD="SC",<old_pin>,<new_pin>`. Changes the SIM PIN without going
/// through a pending-password prompt.
#[derive(Clone, Serialize)]
pub struct ChangePin {
    pub facility: String<2>,
    pub old_pin: String<8>,
    pub new_pin: String<8>,
}

impl AtCommand for ChangePin {
    const PREFIX: &'static str = "+CPWD";
}

impl ChangePin {
    pub fn new(old_pin: String<8>, new_pin: String<8>) -> Self {
        Self { facility: String::try_from("SC").unwrap(), old_pin, new_pin }
    }
}

/// `AT+CLCK="SC",0,<pin>`. Disables PIN-on-boot entirely.
#[derive(Clone, Serialize)]
pub struct RemovePin {
    pub facility: String<2>,
    pub mode: u8,
    pub pin: String<8>,
}

impl AtCommand for RemovePin {
    const PREFIX: &'static str = "+CLCK";
}

impl RemovePin {
    pub fn new(pin: String<8>) -> Self {
        Self { facility: String::try_from("SC").unwrap(), mode: 0, pin }
    }
}
