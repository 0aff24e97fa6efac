use std::str::FromStr;

/// The possible states the `+CPIN?` read command reports the SIM in. Unlike
/// the teacher's Sequans dialect (which returns a single proprietary numeric
/// code for this field) this dialect's `+CPIN` returns a textual mnemonic, so
/// this is parsed by hand rather than carried through an `AtatEnum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    /// No SIM inserted, or the SIM has not been detected yet.
    NotInserted,
    /// MT is not waiting for any password.
    Ready,
    /// MT is waiting for the SIM PIN to be given.
    PinRequired,
    /// MT is waiting for the SIM PUK to be given.
    PukRequired,
    /// SIM is present but not yet ready to accept commands.
    NotReady,
}

#[derive(Debug)]
pub struct ParseSimStateError;

impl FromStr for SimState {
    type Err = ParseSimStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('"') {
            "READY" => Ok(SimState::Ready),
            "SIM PIN" => Ok(SimState::PinRequired),
            "SIM PUK" => Ok(SimState::PukRequired),
            "NOT READY" => Ok(SimState::NotReady),
            "NOT INSERTED" => Ok(SimState::NotInserted),
            _ => Err(ParseSimStateError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_ready() {
        assert_eq!("\"READY\"".parse::<SimState>().unwrap(), SimState::Ready);
    }

    #[test]
    fn parses_sim_pin() {
        assert_eq!("SIM PIN".parse::<SimState>().unwrap(), SimState::PinRequired);
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        assert!("PH-NET PIN".parse::<SimState>().is_err());
    }
}
