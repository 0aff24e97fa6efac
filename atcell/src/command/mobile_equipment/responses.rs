use serde::Deserialize;

/// `+CSQ: <rssi>,<ber>`. `rssi` is the raw 0-31/99 code, not dBm — converting
/// it is the engine's job (`engine::signal_strength`), mirroring
/// `lwcell_network.c`'s `gsm_RSSI_to_percent` split between parser and API.
#[derive(Clone, Debug, Deserialize)]
pub struct SignalQuality {
    pub rssi: i32,
    pub ber: u8,
}
