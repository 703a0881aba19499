//! xenon-core: configuration model, wire encoders, and device transport.
//!
//! This crate turns a mouse configuration (DPI modes, button bindings,
//! macro, polling rate) into the three vendor buffers understood by the
//! SINOWEALTH Genesis Xenon 750 and sends them over USB control transfers.

pub mod buttons;
pub mod composite;
pub mod device;
pub mod dpi;
pub mod error;
#[cfg(test)]
mod integration_tests;
pub mod layout;
pub mod macros;
pub mod profile;
pub mod safety;
pub mod settings;
pub mod transport;

/// SINOWEALTH USB Vendor ID.
pub const VENDOR_ID: u16 = 0x258A;

/// Genesis Xenon 750 product ID.
pub const PRODUCT_ID: u16 = 0x1007;
