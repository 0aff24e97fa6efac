//! OS adapter: the handful of concurrency primitives the engine is built
//! from (millisecond clock, counting semaphore, bounded mailbox, thread
//! spawn). The spec treats these as an external port so the engine can run
//! on an RTOS; this crate is host-side, so it ships exactly one concrete,
//! `std`-backed implementation rather than a generic trait object — see
//! DESIGN.md for why a trait-object port was not worth the indirection here.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A counting semaphore, used for the producer/processor "sync" handshake
/// (single token: held by the producer from "bytes sent" to "terminator
/// observed") and for each request's completion signal.
pub struct Semaphore {
    count: Mutex<usize>,
    cv: Condvar,
}

impl Semaphore {
    pub fn new(initial: usize) -> Self {
        Self { count: Mutex::new(initial), cv: Condvar::new() }
    }

    pub fn signal(&self) {
        let mut count = self.count.lock().expect("semaphore lock poisoned");
        *count += 1;
        self.cv.notify_one();
    }

    /// Blocks until a token is available or `timeout` elapses, consuming a
    /// token on success. Returns `false` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut count = self.count.lock().expect("semaphore lock poisoned");
        let deadline = Instant::now() + timeout;
        while *count == 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, result) =
                self.cv.wait_timeout(count, deadline - now).expect("semaphore lock poisoned");
            count = guard;
            if result.timed_out() && *count == 0 {
                return false;
            }
        }
        *count -= 1;
        true
    }
}

/// A bounded multi-producer, single-consumer mailbox. Thin wrapper over
/// `std::sync::mpsc::sync_channel` giving the engine's request/process
/// queues a name that matches the spec's vocabulary.
pub struct Mbox<T> {
    tx: SyncSender<T>,
    rx: Mutex<Receiver<T>>,
}

pub enum MboxRecv<T> {
    Message(T),
    Timeout,
    Disconnected,
}

pub struct MboxSender<T>(SyncSender<T>);

impl<T> Clone for MboxSender<T> {
    fn clone(&self) -> Self {
        MboxSender(self.0.clone())
    }
}

impl<T> MboxSender<T> {
    /// Non-blocking post. Returns `Err(value)` if the mailbox is full or
    /// its receiver has been dropped (engine torn down).
    pub fn try_post(&self, value: T) -> Result<(), T> {
        match self.0.try_send(value) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(v)) | Err(TrySendError::Disconnected(v)) => Err(v),
        }
    }
}

impl<T> Mbox<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        Self { tx, rx: Mutex::new(rx) }
    }

    pub fn sender(&self) -> MboxSender<T> {
        MboxSender(self.tx.clone())
    }

    /// Blocks until a message arrives or `timeout` elapses.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.recv_bounded(timeout) {
            MboxRecv::Message(v) => Some(v),
            MboxRecv::Timeout | MboxRecv::Disconnected => None,
        }
    }

    /// Like [`Self::recv_timeout`], but distinguishes "nothing arrived
    /// before the deadline" from "every sender has been dropped" — a run
    /// loop that reschedules its own wakeups (see `producer::Producer::run`)
    /// needs that distinction to know when to actually stop.
    pub fn recv_bounded(&self, timeout: Duration) -> MboxRecv<T> {
        let rx = self.rx.lock().expect("mbox lock poisoned");
        match rx.recv_timeout(timeout) {
            Ok(v) => MboxRecv::Message(v),
            Err(RecvTimeoutError::Timeout) => MboxRecv::Timeout,
            Err(RecvTimeoutError::Disconnected) => MboxRecv::Disconnected,
        }
    }

    /// Blocks indefinitely until a message arrives.
    pub fn recv(&self) -> Option<T> {
        let rx = self.rx.lock().expect("mbox lock poisoned");
        rx.recv().ok()
    }
}

/// Milliseconds elapsed since an arbitrary but fixed epoch for this
/// process. Only deltas between two calls are meaningful.
pub fn now() -> Instant {
    Instant::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn semaphore_wait_timeout_returns_false_when_empty() {
        let sem = Semaphore::new(0);
        assert!(!sem.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn semaphore_signal_wakes_waiter() {
        let sem = Arc::new(Semaphore::new(0));
        let sem2 = sem.clone();
        let handle = thread::spawn(move || sem2.wait_timeout(Duration::from_secs(2)));
        thread::sleep(Duration::from_millis(20));
        sem.signal();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn mbox_delivers_in_order() {
        let mbox: Mbox<u32> = Mbox::new(4);
        let sender = mbox.sender();
        sender.try_post(1).unwrap();
        sender.try_post(2).unwrap();
        assert_eq!(mbox.recv_timeout(Duration::from_millis(10)), Some(1));
        assert_eq!(mbox.recv_timeout(Duration::from_millis(10)), Some(2));
    }

    #[test]
    fn mbox_try_post_fails_when_full() {
        let mbox: Mbox<u32> = Mbox::new(1);
        let sender = mbox.sender();
        sender.try_post(1).unwrap();
        assert_eq!(sender.try_post(2), Err(2));
    }
}
