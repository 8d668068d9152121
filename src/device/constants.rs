/**
 * How often (milliseconds) to check the controller connection and attempt a
 * reconnect.
 */
pub const CONNECTION_CHECK_INTERVAL: u64 = 2000;

/**
 * Sony's USB vendor id.
 */
pub const SONY_VENDOR_ID: u16 = 0x054C;

/**
 * Product id of the DualSense controller.
 */
pub const DUALSENSE_PRODUCT_ID: u16 = 0x0CE5;

/**
 * Product id of the DualSense Edge controller.
 */
pub const DUALSENSE_EDGE_PRODUCT_ID: u16 = 0x0DF2;

/**
 * Report id of the output report carrying rumble values over USB.
 */
pub const OUTPUT_REPORT_ID: u8 = 0x02;

/**
 * Size (bytes) of the USB output report, including the report id.
 */
pub const OUTPUT_REPORT_SIZE: usize = 48;

/**
 * valid_flag0 bit: route the rumble bytes to the motors using the DualShock
 * compatible behaviour.
 */
pub const FLAG_COMPATIBLE_VIBRATION: u8 = 0x01;

/**
 * valid_flag0 bit: allow the report to select the haptics mode at all.
 */
pub const FLAG_HAPTICS_SELECT: u8 = 0x02;

pub fn is_dualsense(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == SONY_VENDOR_ID
        && (product_id == DUALSENSE_PRODUCT_ID || product_id == DUALSENSE_EDGE_PRODUCT_ID)
}
