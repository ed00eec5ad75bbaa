//! Command sequences emitted by the driver itself.
//!
//! Everything else (text styles, barcodes, QR codes, ...) is up to the caller.

/// Device control 2.
pub const DC2: u8 = 0x12;

/// Escape.
pub const ESC: u8 = 0x1B;

/// Group separator.
pub const GS: u8 = 0x1D;

/// Data link escape.
pub const DLE: u8 = 0x10;

/// End of transmission.
pub const EOT: u8 = 0x04;

/// Wakes the printer from sleep.
pub const WAKE: u8 = 0xFF;

/// Reset the printer to its power-on state.
pub const INITIALIZE: [u8; 2] = [ESC, b'@'];

/// Request the paper sensor status.
pub const PAPER_STATUS_REQUEST: [u8; 3] = [DLE, EOT, 4];

/// Make the printer drive its busy line.
pub const ENABLE_BUSY_OUTPUT: [u8; 3] = [GS, b'a', 1 << 5];

/// Feed the paper by a number of dot rows.
pub fn feed_rows(rows: u8) -> [u8; 3] {
	[ESC, b'J', rows]
}

/// Feed the paper by a number of text lines.
///
/// Requires the extended command set.
pub fn feed_lines(lines: u8) -> [u8; 3] {
	[ESC, b'd', lines]
}

/// Put the printer to sleep after the given number of seconds, 0 disables sleeping.
pub fn sleep_after(seconds: u16) -> [u8; 4] {
	let [low, high] = seconds.to_le_bytes();
	[ESC, b'8', low, high]
}

/// Like [`sleep_after`], for firmware without the extended command set.
pub fn sleep_after_legacy(seconds: u8) -> [u8; 3] {
	[ESC, b'8', seconds]
}

/// Header of a bitmap chunk of `height` rows of `row_bytes` bytes each.
pub fn bitmap_chunk_header(height: u8, row_bytes: u8) -> [u8; 4] {
	[DC2, b'*', height, row_bytes]
}

/// Header of a raster bitmap that is sent as a whole.
pub fn raster_bitmap_header(row_bytes: u16, height: u16) -> [u8; 8] {
	let [x_low, x_high] = row_bytes.to_le_bytes();
	let [y_low, y_high] = height.to_le_bytes();
	[GS, b'v', b'0', 0, x_low, x_high, y_low, y_high]
}
