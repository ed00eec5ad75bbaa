//! Internal logging macros.
//!
//! With the `log` feature these forward to the `log` crate.
//! Without it the arguments are discarded at compile time.

#[cfg(feature = "log")]
#[allow(unused)]
#[macro_use]
mod forward {
	macro_rules! trace {
		($($args:tt)*) => { ::log::trace!(target: "thermal_printer", $($args)*) }
	}

	macro_rules! debug {
		($($args:tt)*) => { ::log::debug!(target: "thermal_printer", $($args)*) }
	}

	macro_rules! warn {
		($($args:tt)*) => { ::log::warn!(target: "thermal_printer", $($args)*) }
	}
}

#[cfg(not(feature = "log"))]
#[allow(unused)]
#[macro_use]
mod forward {
	macro_rules! trace {
		($($args:tt)*) => {{}};
	}

	macro_rules! debug {
		($($args:tt)*) => {{}};
	}

	macro_rules! warn {
		($($args:tt)*) => {{}};
	}
}
