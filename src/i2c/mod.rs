//! Byte-oriented access to the shared two-wire bus.
//!
//! The kernel's i2c-dev interface is the real transport: every `write` is a
//! complete write transfer to the selected slave, every `read` a complete
//! read transfer. Closing a channel is dropping it.

use std::io;
use std::path::Path;

mod linux;
#[cfg(test)]
pub(crate) mod sim;

pub use self::linux::{
	LinuxBus,
	LinuxChannel,
};

pub const DEFAULT_DEVICE: &str = "/dev/i2c-0";

pub trait Bus {
	type Channel: Channel;

	fn open(&self, path: &Path) -> io::Result<Self::Channel>;
}

pub trait Channel {
	/// `address` is the 7-bit slave address
	fn select_address(&mut self, address: u8) -> io::Result<()>;

	/// returns number of bytes actually written
	fn write(&mut self, data: &[u8]) -> io::Result<usize>;

	/// returns number of bytes actually read
	fn read(&mut self, target: &mut [u8]) -> io::Result<usize>;
}
