use crate::error::DeviceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    None,
    Usb,
    Bluetooth,
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            ConnectionType::None => "None",
            ConnectionType::Usb => "USB",
            ConnectionType::Bluetooth => "Bluetooth",
        };

        write!(f, "{}", result)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    Initial,
    Disconnected,
    Connected { connection: ConnectionType },
}

#[derive(Debug, Clone)]
pub enum DeviceEvent {
    StateChange(DeviceState),
}

/// The seam between the vibration engine and the physical controller.
///
/// The engine only ever writes motor values through this trait; connecting
/// and disconnecting belong to whoever owns the device.
pub trait MotorDevice: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Applies both motor levels together. A no-op (not an error) when the
    /// controller is not connected.
    fn set_motors(&self, left: u8, right: u8) -> Result<(), DeviceError>;

    /// Best effort; a failure while stopping is swallowed.
    fn stop_motors(&self) {
        let _ = self.set_motors(0, 0);
    }
}
