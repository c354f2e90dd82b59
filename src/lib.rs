//! USB link diagnostic for Raspberry Pi Pico boards.
//!
//! Samples the device controller's suspend status, the VBUS sense input and
//! the USB stack's enumeration state once a second, prints a status line to
//! the console and drives the on-board LED while the link is up. The
//! hardware-facing pieces live behind small traits so the whole decision
//! path runs on the host under `cargo test`.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod companion;
pub mod indicator;
pub mod monitor;
pub mod report;
pub mod signals;
pub mod verdict;
