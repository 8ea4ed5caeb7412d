use std::io;
use std::sync::MutexGuard;

use super::BusManager;
use crate::chain::Chain;
use crate::error::{
	Result,
	VoltageError,
};
use crate::i2c::{
	Bus,
	Channel,
};
use crate::pic::commands::{
	PIC_COMMAND_1,
	PIC_COMMAND_2,
};

/// An open channel bound to one chain's controller.
///
/// Holds the chain's session lock; dropping the session closes the channel
/// first and then releases the lock.
pub struct Session<'a, B: Bus + 'a> {
	// field order matters: channel is closed before the chain lock is released
	channel: B::Channel,
	manager: &'a BusManager<B>,
	chain: Chain,
	_chain_guard: MutexGuard<'a, ()>,
}

fn write_all<C: Channel + ?Sized>(channel: &mut C, chain: Chain, step: &'static str, data: &[u8]) -> Result<()> {
	let transaction_error = |cause: io::Error| VoltageError::TransactionIo { chain, step, cause };
	// the controller takes each byte as a separate write transfer
	for byte in data {
		let l = channel.write(std::slice::from_ref(byte)).map_err(transaction_error)?;
		if l != 1 {
			return Err(transaction_error(io::Error::new(io::ErrorKind::WriteZero, "failed to write whole buffer")));
		}
	}
	Ok(())
}

impl<'a, B: Bus> Session<'a, B> {
	pub(super) fn new(manager: &'a BusManager<B>, chain: Chain, channel: B::Channel, guard: MutexGuard<'a, ()>) -> Self {
		Session {
			channel,
			manager,
			chain,
			_chain_guard: guard,
		}
	}

	pub fn chain(&self) -> Chain {
		self.chain
	}

	/// 8-bit bus address of the chain's controller
	pub fn address(&self) -> u8 {
		self.manager.table().address(self.chain)
	}

	pub fn manager(&self) -> &'a BusManager<B> {
		self.manager
	}

	/// Handshake preamble, `command`, then `response.len()` bytes read back,
	/// all while holding the bus lock.
	pub fn exchange(&mut self, command: &[u8], response: &mut [u8]) -> Result<()> {
		let chain = self.chain;
		let manager = self.manager;
		let _bus = manager.lock_bus();

		write_all(&mut self.channel, chain, "handshake", &[PIC_COMMAND_1, PIC_COMMAND_2])?;
		write_all(&mut self.channel, chain, "command", command)?;

		if !response.is_empty() {
			let l = self.channel.read(response).map_err(|cause| VoltageError::TransactionIo {
				chain,
				step: "response",
				cause,
			})?;
			if l != response.len() {
				return Err(VoltageError::TransactionIo {
					chain,
					step: "response",
					cause: io::Error::new(io::ErrorKind::UnexpectedEof, "failed to fill whole buffer"),
				});
			}
		}

		debug!("chain {}: exchange {:02x?} -> {:02x?}", chain, command, response);
		Ok(())
	}

	/// Closes the channel and releases the chain's session lock.
	pub fn close(self) {}
}

impl<'a, B: Bus> Drop for Session<'a, B> {
	fn drop(&mut self) {
		debug!("chain {}: session closed", self.chain);
	}
}
