#![macro_use]
#![allow(unused_macros)]

// The teacher crate this engine is descended from ran on `no_std` embedded
// targets and picked between `defmt` and `log` backends behind these same
// macro names so call sites never had to care which one was active. This
// crate runs host-side on top of `std`, so the shim collapses to a single
// `log`-only path, but we keep the macro names so the rest of the engine
// reads the same way it always has.

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::log::trace!($s $(, $x)*)
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::log::debug!($s $(, $x)*)
    };
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::log::info!($s $(, $x)*)
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::log::warn!($s $(, $x)*)
    };
}

macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        ::log::error!($s $(, $x)*)
    };
}
