//! Logging macro shims.
//!
//! The driver logs through `debug!`/`error!` regardless of which backend is
//! enabled. With the `defmt` feature the macros forward to `defmt`, with the
//! `log` feature to `log`, and with neither they evaluate their arguments
//! into a discarded `format_args!` so call sites stay warning-free.

#![allow(unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! debug {
            ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
        }
        macro_rules! error {
            ($($arg:tt)*) => { ::defmt::error!($($arg)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! debug {
            ($($arg:tt)*) => { ::log::debug!($($arg)*) };
        }
        macro_rules! error {
            ($($arg:tt)*) => { ::log::error!($($arg)*) };
        }
    } else {
        macro_rules! debug {
            ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
        }
        macro_rules! error {
            ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
        }
    }
}
