use atat::atat_derive::AtatEnum;

/// Functional mode of the modem.
#[derive(Clone, Debug, PartialEq, AtatEnum)]
#[at_enum(u8)]
pub enum FunctionalMode {
    Minimum = 0,
    Full = 1,
    AirplaneMode = 4,
}

#[derive(Clone, Debug, PartialEq, AtatEnum)]
#[at_enum(u8)]
pub enum ResetFlag {
    Off = 0,
    On = 1,
}
