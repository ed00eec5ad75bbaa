use crate::{Config, FlowControl};

/// Layout of a bitmap that is sent in chunks small enough for the receive buffer of the printer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ChunkPlan {
	/// Width of the bitmap in pixels.
	pub width: u16,

	/// Height of the bitmap in pixels.
	pub height: u16,

	/// Number of bytes per row in the source data.
	pub row_bytes: u16,

	/// Number of bytes per row that are sent to the printer.
	pub clipped_row_bytes: u8,

	/// Maximum number of rows per chunk.
	pub chunk_height_limit: u8,
}

impl ChunkPlan {
	/// Plan the transfer of a bitmap.
	///
	/// With a busy line the printer throttles the transfer itself, so chunks are only limited by the protocol.
	/// Otherwise a chunk must fit in the assumed receive buffer of the printer.
	pub fn new(width: u16, height: u16, flow_control: FlowControl, config: &Config) -> Self {
		let row_bytes = Self::row_bytes(width);
		let clipped_row_bytes = row_bytes.min(config.max_row_bytes.into()) as u8;
		let chunk_height_limit = match flow_control {
			FlowControl::HardwareSignal => FlowControl::MAX_CHUNK_HEIGHT,
			FlowControl::SoftwareTimeout => {
				let ceiling = config.max_chunk_height.max(1);
				match config.assumed_buffer_bytes.checked_div(clipped_row_bytes.into()) {
					Some(rows) => rows.clamp(1, ceiling.into()) as u8,
					None => ceiling,
				}
			},
		};
		Self {
			width,
			height,
			row_bytes,
			clipped_row_bytes,
			chunk_height_limit,
		}
	}

	/// Number of bytes needed for one row of `width` pixels.
	pub fn row_bytes(width: u16) -> u16 {
		((u32::from(width) + 7) / 8) as u16
	}

	/// Number of bytes of source data the bitmap consists of.
	pub fn data_len(&self) -> usize {
		usize::from(self.row_bytes) * usize::from(self.height)
	}

	/// Number of source bytes per row that are read but not sent.
	pub fn discarded_row_bytes(&self) -> usize {
		usize::from(self.row_bytes) - usize::from(self.clipped_row_bytes)
	}

	/// Iterate over the heights of the chunks, in order.
	pub fn chunks(&self) -> impl Iterator<Item = u8> {
		let limit = u16::from(self.chunk_height_limit.max(1));
		let height = self.height;
		(0..height)
			.step_by(limit.into())
			.map(move |start| (height - start).min(limit) as u8)
	}
}
