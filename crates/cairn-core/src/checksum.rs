//! CRC32C checksum for migration scripts.

/// Compute the checksum of a migration script.
///
/// Line endings are normalized to `\n` first, so checked-out line-ending
/// differences between platforms do not change the checksum. The checksum
/// covers the raw script text, before placeholder substitution.
pub fn script_checksum(script: &str) -> i32 {
    let normalized = script.replace("\r\n", "\n").replace('\r', "\n");
    crc32c::crc32c(normalized.as_bytes()) as i32
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
