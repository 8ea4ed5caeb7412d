//! Transaction layer: sessions bound to one chain and handshake-prefixed
//! byte exchanges on the shared bus.
//!
//! Two locks with different scopes:
//! - a per-chain session lock, held from `open_session` until the session is
//!   closed (or dropped);
//! - the global bus lock, held only around a single `exchange`.
//!
//! The per-chain lock is always taken first; the bus lock is never held
//! across more than one exchange, so sessions on different chains make
//! progress concurrently.

mod session;

use std::path::PathBuf;
use std::sync::{
	Mutex,
	MutexGuard,
	TryLockError,
};

use crate::chain::{
	CHAIN_COUNT,
	Chain,
	ChainTable,
};
use crate::error::{
	Result,
	VoltageError,
};
use crate::i2c::{
	Bus,
	Channel,
	LinuxBus,
};
use crate::pic::SettlingIntervals;

pub use self::session::Session;

/// Owns the bus transport, the chain table and both lock levels. Create one
/// per process and share it by reference.
#[derive(Debug)]
pub struct BusManager<B: Bus> {
	bus: B,
	device: PathBuf,
	table: ChainTable,
	settling: SettlingIntervals,
	bus_lock: Mutex<()>,
	chain_locks: [Mutex<()>; CHAIN_COUNT],
}

fn lock_ignore_poison(lock: &Mutex<()>) -> MutexGuard<()> {
	// guarded data is `()`, nothing to be inconsistent after a panic
	lock.lock().unwrap_or_else(|e| e.into_inner())
}

fn is_locked(lock: &Mutex<()>) -> bool {
	match lock.try_lock() {
		Ok(_) => false,
		Err(TryLockError::Poisoned(_)) => false,
		Err(TryLockError::WouldBlock) => true,
	}
}

impl BusManager<LinuxBus> {
	pub fn linux<P: Into<PathBuf>>(device: P) -> Self {
		BusManager::new(LinuxBus, device, ChainTable::default())
	}
}

impl<B: Bus> BusManager<B> {
	pub fn new<P: Into<PathBuf>>(bus: B, device: P, table: ChainTable) -> Self {
		BusManager {
			bus,
			device: device.into(),
			table,
			settling: SettlingIntervals::default(),
			bus_lock: Mutex::new(()),
			chain_locks: [Mutex::new(()), Mutex::new(()), Mutex::new(()), Mutex::new(())],
		}
	}

	pub fn with_settling(mut self, settling: SettlingIntervals) -> Self {
		self.settling = settling;
		self
	}

	pub fn table(&self) -> &ChainTable {
		&self.table
	}

	pub fn settling(&self) -> &SettlingIntervals {
		&self.settling
	}

	/// Blocks until no other session on `chain` is active, then opens the bus
	/// and selects the chain's controller.
	pub fn open_session(&self, chain: Chain) -> Result<Session<B>> {
		let guard = lock_ignore_poison(&self.chain_locks[chain.index()]);

		let mut channel = self.bus.open(&self.device).map_err(|cause| VoltageError::BusOpen {
			path: self.device.display().to_string(),
			cause,
		})?;

		let address = self.table.slave_address(chain);
		channel.select_address(address).map_err(|cause| VoltageError::AddressBind {
			chain,
			address: self.table.address(chain),
			cause,
		})?;

		debug!("chain {}: session opened on {} (address 0x{:02x})", chain, self.device.display(), self.table.address(chain));
		Ok(Session::new(self, chain, channel, guard))
	}

	pub(crate) fn lock_bus(&self) -> MutexGuard<()> {
		lock_ignore_poison(&self.bus_lock)
	}

	/// Whether a session on `chain` is currently open
	pub fn is_chain_busy(&self, chain: Chain) -> bool {
		is_locked(&self.chain_locks[chain.index()])
	}

	/// Whether an exchange is currently in flight on the bus
	pub fn is_bus_busy(&self) -> bool {
		is_locked(&self.bus_lock)
	}
}
