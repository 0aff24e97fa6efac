//! The link adapter: the byte-level transport the engine writes AT bytes to
//! and reads modem bytes from. Out of core scope per the spec — this module
//! only defines the seam and a loopback mock used by engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Bytes-in, bytes-out transport to the modem. A real implementation wraps
/// a UART/serial port; `serialport`-backed one lives in `demos/cli`.
pub trait Link: Send + Sync {
    /// Writes as many bytes as the transport currently accepts; the engine
    /// retries on a short write.
    fn send(&self, bytes: &[u8]) -> usize;

    /// Drives (or releases) the modem's hardware reset line. Adapters that
    /// have no reset line wired up may no-op.
    fn reset(&self, _asserted: bool) {}
}

/// An in-memory loopback link used by tests: bytes written by the engine
/// are captured for assertions, and a test harness pushes bytes into the
/// engine's input path separately to simulate modem responses.
pub struct MockLink {
    written: Mutex<VecDeque<u8>>,
}

impl Default for MockLink {
    fn default() -> Self {
        Self { written: Mutex::new(VecDeque::new()) }
    }
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains and returns everything written so far.
    pub fn take_written(&self) -> Vec<u8> {
        let mut w = self.written.lock().expect("mock link lock poisoned");
        w.drain(..).collect()
    }
}

impl Link for MockLink {
    fn send(&self, bytes: &[u8]) -> usize {
        let mut w = self.written.lock().expect("mock link lock poisoned");
        w.extend(bytes.iter().copied());
        bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_link_captures_writes() {
        let link = MockLink::new();
        assert_eq!(link.send(b"AT\r\n"), 4);
        assert_eq!(link.take_written(), b"AT\r\n");
        assert!(link.take_written().is_empty());
    }
}
