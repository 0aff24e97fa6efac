use serde::Deserialize;

use super::types::NetworkRegistrationState;

/// Unsolicited `+CREG: <stat>` / `+CGREG: <stat>` payload. The `<n>` echo
/// some firmwares prepend when unsolicited reporting was enabled with a
/// non-zero mode is not present here — the line classifier only hands this
/// struct the single-field form, stripping a leading `<n>,` first if seen.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkRegistrationStatus {
    pub stat: NetworkRegistrationState,
}
