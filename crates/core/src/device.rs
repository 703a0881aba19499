//! Device discovery.

use crate::error::{Error, Result};
use crate::transport::CONTROL_INTERFACE;
use crate::{PRODUCT_ID, VENDOR_ID};
use tracing::{debug, info};

/// A HID interface of a connected Xenon 750.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vid: u16,
    pub pid: u16,
    pub interface: i32,
    pub path: String,
    pub serial: Option<String>,
}

impl DeviceInfo {
    /// Whether this interface accepts configuration requests.
    pub fn is_control_interface(&self) -> bool {
        self.interface == CONTROL_INTERFACE
    }
}

/// Whether a VID/PID pair identifies the supported mouse.
pub fn is_supported(vid: u16, pid: u16) -> bool {
    vid == VENDOR_ID && pid == PRODUCT_ID
}

/// Enumerate every HID interface belonging to a connected Xenon 750.
pub fn discover_devices(api: &hidapi::HidApi) -> Vec<DeviceInfo> {
    debug!("Starting HID device enumeration");
    let devices: Vec<DeviceInfo> = api
        .device_list()
        .filter(|info| is_supported(info.vendor_id(), info.product_id()))
        .map(|info| {
            let device = DeviceInfo {
                vid: info.vendor_id(),
                pid: info.product_id(),
                interface: info.interface_number(),
                path: info.path().to_string_lossy().into_owned(),
                serial: info.serial_number().map(|s| s.to_string()),
            };
            info!(
                vid = format_args!("0x{:04X}", device.vid),
                pid = format_args!("0x{:04X}", device.pid),
                interface = device.interface,
                path = %device.path,
                "Found Xenon 750 interface"
            );
            device
        })
        .collect();

    debug!(count = devices.len(), "Device enumeration complete");
    devices
}

/// Pick the control interface, optionally pinned to a device path.
pub fn select_control_interface(
    devices: &[DeviceInfo],
    path: Option<&str>,
) -> Result<DeviceInfo> {
    match path {
        Some(path) => {
            let device = devices
                .iter()
                .find(|d| d.path == path)
                .ok_or_else(|| Error::DeviceNotFound(format!("no Xenon 750 at {path}")))?;
            if !device.is_control_interface() {
                return Err(Error::DeviceNotFound(format!(
                    "{path} is interface {}, expected {CONTROL_INTERFACE}",
                    device.interface
                )));
            }
            Ok(device.clone())
        }
        None => devices
            .iter()
            .find(|d| d.is_control_interface())
            .cloned()
            .ok_or_else(|| {
                Error::DeviceNotFound(format!(
                    "no Xenon 750 (VID=0x{VENDOR_ID:04X} PID=0x{PRODUCT_ID:04X}) control interface"
                ))
            }),
    }
}
