//! Paced serial driver for TTL thermal receipt printers.
//!
//! These printers have a small receive buffer and no flow control on the data line.
//! Sending bytes faster than the mechanism can print or feed silently overruns the buffer.
//! This crate keeps an outgoing byte queue and releases it no faster than an estimate of
//! the physical completion time of every queued operation allows.
//!
//! The driver is cooperative and never spawns threads:
//! * call [`Printer::drain()`] from your idle loop to emit at most one byte per call, or
//! * call [`Printer::flush()`] to block until everything queued has been written.
//!
//! If the printer's busy output is wired to the host, enable [`Config::busy_signal`]
//! and the busy line gates transmission instead of the timing estimate.
//!
//! Encoding of formatting commands, barcodes and the like is left to the caller:
//! queue the bytes with [`Printer::enqueue()`] and register the physical cost of the
//! operation with [`Printer::settle()`] or [`Printer::set_deadline()`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[macro_use]
mod log;

pub mod commands;

mod bitmap;
pub use bitmap::ChunkPlan;

mod config;
pub use config::Config;

mod error;
pub use error::*;

mod flow_control;
pub use flow_control::FlowControl;

mod printer;
pub use printer::Printer;

mod queue;

pub mod serial_port;
pub use serial_port::SerialPort;

mod status;
pub use status::{PaperSensePolarity, PaperStatus, StatusPollState};

pub mod timing;
pub use timing::{Settle, TextMetrics, TextSize};
