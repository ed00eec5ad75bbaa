use crate::Config;

/// How the driver decides that the printer can accept the next byte.
///
/// The mode is chosen once when the driver is created and never changes afterwards.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlowControl {
	/// Wait for the estimated completion time of previously written data.
	SoftwareTimeout,

	/// Wait for the busy line of the printer to be released.
	HardwareSignal,
}

impl FlowControl {
	/// The largest number of rows that can be sent in a single bitmap chunk.
	pub const MAX_CHUNK_HEIGHT: u8 = 255;

	/// Select the flow control mode for a configuration.
	pub fn from_config(config: &Config) -> Self {
		if config.busy_signal {
			Self::HardwareSignal
		} else {
			Self::SoftwareTimeout
		}
	}

	/// Check if deadlines are tracked in this mode.
	pub fn uses_deadlines(self) -> bool {
		self == Self::SoftwareTimeout
	}
}
