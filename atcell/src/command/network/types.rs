use atat::atat_derive::AtatEnum;

/// The supported network selection modes for `+COPS`.
#[derive(Clone, PartialEq, AtatEnum, Default)]
#[at_enum(u8)]
pub enum NetworkSelectionMode {
    /// Automatic (`oper` field is ignored).
    #[default]
    Automatic = 0,
    /// Manual (`oper` field must be present).
    Manual = 1,
    /// Unregister from the network.
    Unregister = 2,
    /// Manual with automatic fallback if manual selection fails.
    ManualAutoFallback = 4,
}

/// The supported network operator name formats for `+COPS`.
#[derive(Clone, PartialEq, AtatEnum, Default)]
#[at_enum(u8)]
pub enum OperatorNameFormat {
    #[default]
    LongAlphanumeric = 0,
    ShortAlphanumeric = 1,
    Numeric = 2,
}

/// The registration states reported by `+CREG`/`+CGREG` (GSM/GPRS
/// registration; this dialect predates LTE's `+CEREG` and its extra
/// CSFB/emergency-only states).
#[derive(Clone, Copy, Debug, PartialEq, Eq, AtatEnum)]
#[at_enum(u8)]
pub enum NetworkRegistrationState {
    NotSearching = 0,
    RegisteredHome = 1,
    Searching = 2,
    Denied = 3,
    Unknown = 4,
    RegisteredRoaming = 5,
}

impl NetworkRegistrationState {
    pub fn is_registered(self) -> bool {
        matches!(self, Self::RegisteredHome | Self::RegisteredRoaming)
    }
}
