/// An error that can occur while draining the byte queue to the printer.
#[derive(Debug)]
pub enum DrainError<E> {
	/// Failed to write to the serial port.
	Write(E),

	/// Failed to read the busy line of the printer.
	ReadBusyLine(E),

	/// Failed to read a status reply from the serial port.
	ReadStatus(E),

	/// Failed to discard stale input before a status request.
	DiscardInput(E),
}

/// An error that can occur when printing a bitmap.
#[derive(Debug)]
pub enum BitmapError<E> {
	TooWide(BitmapTooWide),
	InsufficientCapacity(InsufficientCapacity),
	DataTooShort(BitmapDataTooShort),
	Drain(DrainError<E>),

	/// Failed to read bitmap data from the source.
	#[cfg(feature = "std")]
	ReadSource(std::io::Error),
}

/// The bitmap is wider than the printer supports.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BitmapTooWide {
	pub width: u16,
	pub max: u16,
}

/// The byte queue can not hold a bulk transfer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InsufficientCapacity {
	pub required: usize,
	pub available: usize,
}

/// The bitmap data is shorter than the dimensions of the bitmap require.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BitmapDataTooShort {
	pub actual: usize,
	pub expected: usize,
}

impl BitmapTooWide {
	pub fn check(width: u16, max: u16) -> Result<(), Self> {
		if width <= max {
			Ok(())
		} else {
			Err(Self { width, max })
		}
	}
}

impl InsufficientCapacity {
	pub fn check(required: usize, available: usize) -> Result<(), Self> {
		if required <= available {
			Ok(())
		} else {
			Err(Self { required, available })
		}
	}
}

impl BitmapDataTooShort {
	pub fn check(actual: usize, expected: usize) -> Result<(), Self> {
		if actual >= expected {
			Ok(())
		} else {
			Err(Self { actual, expected })
		}
	}
}

#[cfg(feature = "std")]
impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for DrainError<E> {}
#[cfg(feature = "std")]
impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for BitmapError<E> {}
#[cfg(feature = "std")]
impl std::error::Error for BitmapTooWide {}
#[cfg(feature = "std")]
impl std::error::Error for InsufficientCapacity {}
#[cfg(feature = "std")]
impl std::error::Error for BitmapDataTooShort {}

impl<E> From<DrainError<E>> for BitmapError<E> {
	fn from(other: DrainError<E>) -> Self {
		Self::Drain(other)
	}
}

impl<E> From<BitmapTooWide> for BitmapError<E> {
	fn from(other: BitmapTooWide) -> Self {
		Self::TooWide(other)
	}
}

impl<E> From<InsufficientCapacity> for BitmapError<E> {
	fn from(other: InsufficientCapacity) -> Self {
		Self::InsufficientCapacity(other)
	}
}

impl<E> From<BitmapDataTooShort> for BitmapError<E> {
	fn from(other: BitmapDataTooShort) -> Self {
		Self::DataTooShort(other)
	}
}

impl<E: core::fmt::Display> core::fmt::Display for DrainError<E> {
	fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
		match self {
			Self::Write(e) => write!(f, "failed to write to serial port: {}", e),
			Self::ReadBusyLine(e) => write!(f, "failed to read busy line: {}", e),
			Self::ReadStatus(e) => write!(f, "failed to read status reply: {}", e),
			Self::DiscardInput(e) => write!(f, "failed to discard input buffer: {}", e),
		}
	}
}

impl<E: core::fmt::Display> core::fmt::Display for BitmapError<E> {
	fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
		match self {
			Self::TooWide(e) => write!(f, "{}", e),
			Self::InsufficientCapacity(e) => write!(f, "{}", e),
			Self::DataTooShort(e) => write!(f, "{}", e),
			Self::Drain(e) => write!(f, "{}", e),
			#[cfg(feature = "std")]
			Self::ReadSource(e) => write!(f, "failed to read bitmap data: {}", e),
		}
	}
}

impl core::fmt::Display for BitmapTooWide {
	fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
		write!(f, "bitmap too wide, got {} pixels, printer supports at most {}", self.width, self.max)
	}
}

impl core::fmt::Display for InsufficientCapacity {
	fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
		write!(
			f,
			"insufficient queue capacity, transfer needs {} bytes, but only {} are available",
			self.required, self.available
		)
	}
}

impl core::fmt::Display for BitmapDataTooShort {
	fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
		write!(f, "bitmap data too short, expected {} bytes, got {}", self.expected, self.actual)
	}
}
