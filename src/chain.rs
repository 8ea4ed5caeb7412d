use std::fmt;
use std::str;

use crate::error::{
	Result,
	VoltageError,
};

pub const CHAIN_COUNT: usize = 4;

/// 8-bit (write) addresses of the controllers, one per chain
pub const DEFAULT_ADDRESSES: [u8; CHAIN_COUNT] = [0xa0, 0xa2, 0xa4, 0xa6];

/// One of the four voltage rails; index is 0-based, display is 1-based
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chain(u8);

impl Chain {
	pub fn new(index: usize) -> Result<Self> {
		if index >= CHAIN_COUNT {
			return Err(VoltageError::InvalidArgument(format!(
				"chain index {} out of range, valid range 0-{}", index, CHAIN_COUNT - 1,
			)));
		}
		Ok(Chain(index as u8))
	}

	pub fn all() -> impl Iterator<Item = Chain> {
		(0..CHAIN_COUNT as u8).map(Chain)
	}

	pub fn index(&self) -> usize {
		self.0 as usize
	}

	pub fn number(&self) -> usize {
		self.0 as usize + 1
	}
}

impl fmt::Debug for Chain {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_tuple("Chain").field(&self.0).finish()
	}
}

impl fmt::Display for Chain {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.number())
	}
}

// parses the 1-based selector ("1".."4") used on the command line
impl str::FromStr for Chain {
	type Err = VoltageError;

	fn from_str(s: &str) -> Result<Self> {
		let invalid = || VoltageError::InvalidArgument(format!("invalid chain #{:?}, valid range 1-{}", s, CHAIN_COUNT));
		let number = s.trim().parse::<usize>().map_err(|_| invalid())?;
		if number == 0 || number > CHAIN_COUNT {
			return Err(invalid());
		}
		Chain::new(number - 1)
	}
}

/// Fixed mapping from chain to bus address; immutable after construction
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChainTable {
	addresses: [u8; CHAIN_COUNT],
}

impl ChainTable {
	/// Addresses are 8-bit (write) addresses: even, non-zero and distinct.
	pub fn new(addresses: [u8; CHAIN_COUNT]) -> Result<Self> {
		for (i, &address) in addresses.iter().enumerate() {
			if address == 0 || address & 1 != 0 {
				return Err(VoltageError::InvalidArgument(format!(
					"chain {}: 0x{:02x} is not a valid 8-bit bus address", i + 1, address,
				)));
			}
			if addresses[..i].contains(&address) {
				return Err(VoltageError::InvalidArgument(format!(
					"chain {}: address 0x{:02x} already used by another chain", i + 1, address,
				)));
			}
		}
		Ok(ChainTable { addresses })
	}

	pub fn address(&self, chain: Chain) -> u8 {
		self.addresses[chain.index()]
	}

	/// 7-bit address as the kernel expects it for `I2C_SLAVE`
	pub fn slave_address(&self, chain: Chain) -> u8 {
		self.address(chain) >> 1
	}
}

impl Default for ChainTable {
	fn default() -> Self {
		ChainTable { addresses: DEFAULT_ADDRESSES }
	}
}

/// Raw value of the controller's voltage register; 0xff is reserved
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Voltage(u8);

impl Voltage {
	pub const MAX: u8 = 0xfe;

	pub fn new(value: u8) -> Result<Self> {
		if value > Self::MAX {
			return Err(VoltageError::InvalidArgument(format!(
				"invalid hex voltage 0x{:02x}, valid range 0x00-0x{:02x}", value, Self::MAX,
			)));
		}
		Ok(Voltage(value))
	}

	pub fn value(&self) -> u8 {
		self.0
	}
}

impl fmt::Display for Voltage {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

// hex, with or without "0x" prefix
impl str::FromStr for Voltage {
	type Err = VoltageError;

	fn from_str(s: &str) -> Result<Self> {
		let invalid = || VoltageError::InvalidArgument(format!(
			"invalid hex voltage {:?}, valid range 0x00-0x{:02x}", s, Voltage::MAX,
		));
		let s = s.trim();
		let digits = if s.starts_with("0x") || s.starts_with("0X") { &s[2..] } else { s };
		if digits.is_empty() {
			return Err(invalid());
		}
		let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
		if value > Voltage::MAX as u32 {
			return Err(invalid());
		}
		Ok(Voltage(value as u8))
	}
}
