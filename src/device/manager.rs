use std::sync::{Arc, Mutex};

use hidapi::{BusType, HidApi, HidDevice};
use log::{debug, info, warn};

use crate::device::constants::{
    is_dualsense, FLAG_COMPATIBLE_VIBRATION, FLAG_HAPTICS_SELECT, OUTPUT_REPORT_ID,
    OUTPUT_REPORT_SIZE,
};
use crate::device::types::{ConnectionType, MotorDevice};
use crate::error::DeviceError;

struct DeviceInner {
    api: Option<HidApi>,
    device: Option<HidDevice>,
    connection: ConnectionType,
}

/// Owns the single hid connection to the physical controller.
///
/// There is exactly one controller, so one manager is constructed at startup
/// and cloned (cheaply, shared inner) into everything that needs it: the
/// vibration engine writes motor values, the status poll connects and
/// reports. The manager never connects on its own; the status poll drives
/// reconnects.
#[derive(Clone)]
pub struct DeviceManager {
    inner: Arc<Mutex<DeviceInner>>,
}

// Rumble over Bluetooth needs the larger 0x31 report with a crc32 trailer,
// which the controller ignores from unpaired writers anyway. Only the USB
// report is produced here; the gui warns that Bluetooth connections have no
// haptic control.
fn build_rumble_report(left: u8, right: u8) -> [u8; OUTPUT_REPORT_SIZE] {
    let mut report = [0u8; OUTPUT_REPORT_SIZE];
    report[0] = OUTPUT_REPORT_ID;
    report[1] = FLAG_COMPATIBLE_VIBRATION | FLAG_HAPTICS_SELECT;
    report[3] = right;
    report[4] = left;
    report
}

impl DeviceManager {
    pub fn new() -> DeviceManager {
        DeviceManager {
            inner: Arc::new(Mutex::new(DeviceInner {
                api: None,
                device: None,
                connection: ConnectionType::None,
            })),
        }
    }

    pub fn connection_type(&self) -> ConnectionType {
        let inner = self.inner.lock().expect("Failed to lock DeviceManager inner");
        inner.connection
    }

    /// Attempts to find and open a DualSense on the hid bus. Returns true if
    /// a controller is connected afterwards; failures are logged, not
    /// raised. Blocking; call from a blocking-capable context.
    pub fn connect(&self) -> bool {
        let mut inner = self.inner.lock().expect("Failed to lock DeviceManager inner");
        if inner.device.is_some() {
            return true;
        }

        let DeviceInner { api, device, connection } = &mut *inner;

        let api = match api {
            Some(api) => {
                if let Err(err) = api.refresh_devices() {
                    warn!("Failed to refresh hid device list: {}", err);
                    return false;
                }
                api
            },
            None => match HidApi::new() {
                Ok(new_api) => api.insert(new_api),
                Err(err) => {
                    warn!("Failed to initialize hidapi: {}", err);
                    return false;
                },
            },
        };

        let found = api
            .device_list()
            .find(|info| is_dualsense(info.vendor_id(), info.product_id()));

        let Some(info) = found else {
            debug!("No controller found");
            return false;
        };

        let new_connection = match info.bus_type() {
            BusType::Bluetooth => ConnectionType::Bluetooth,
            _ => ConnectionType::Usb,
        };

        match info.open_device(api) {
            Ok(opened) => {
                info!(
                    "Connected to {} over {}",
                    info.product_string().unwrap_or("DualSense"),
                    new_connection,
                );
                *device = Some(opened);
                *connection = new_connection;
                true
            },
            Err(err) => {
                warn!("Failed to open controller: {}", err);
                false
            },
        }
    }

    pub fn disconnect(&self) {
        let mut inner = self.inner.lock().expect("Failed to lock DeviceManager inner");

        if let Some(device) = inner.device.take() {
            // leave the motors stopped; the handle is dropped either way
            if let Err(err) = device.write(&build_rumble_report(0, 0)) {
                debug!("Failed to stop motors while disconnecting: {}", err);
            }
            inner.connection = ConnectionType::None;
            info!("Controller disconnected");
        }
    }
}

impl MotorDevice for DeviceManager {
    fn is_connected(&self) -> bool {
        let inner = self.inner.lock().expect("Failed to lock DeviceManager inner");
        inner.device.is_some()
    }

    fn set_motors(&self, left: u8, right: u8) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock().expect("Failed to lock DeviceManager inner");

        let Some(device) = &inner.device else {
            // not connected is a policy no-op, not a fault
            return Ok(());
        };

        match device.write(&build_rumble_report(left, right)) {
            Ok(_) => Ok(()),
            Err(source) => {
                // a failed write usually means the controller was unplugged;
                // drop the stale handle so the status poll can reconnect
                inner.device = None;
                inner.connection = ConnectionType::None;
                Err(DeviceError::Hid { source })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rumble_report_layout() {
        let report = build_rumble_report(0x12, 0x34);

        assert_eq!(report.len(), OUTPUT_REPORT_SIZE);
        assert_eq!(report[0], OUTPUT_REPORT_ID);
        assert_eq!(report[1], FLAG_COMPATIBLE_VIBRATION | FLAG_HAPTICS_SELECT);
        assert_eq!(report[3], 0x34); // right
        assert_eq!(report[4], 0x12); // left
        assert!(report[5..].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn set_motors_without_a_controller_is_a_noop() {
        let manager = DeviceManager::new();

        assert!(!manager.is_connected());
        assert!(manager.set_motors(200, 200).is_ok());
        manager.stop_motors();
    }
}
