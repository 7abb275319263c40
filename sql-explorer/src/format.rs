//! Human readable sizes for the database panel

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count with a binary (1024) unit, rounded to a whole number
pub fn bytes_to_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Byte".to_string();
    }

    let mut exponent = 0;
    while exponent + 1 < SIZE_UNITS.len() && bytes >= 1024_u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let value = (bytes as f64 / 1024_f64.powi(exponent as i32)).round();

    format!("{} {}", value, SIZE_UNITS[exponent])
}
