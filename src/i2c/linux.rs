use std::ffi::CString;
use std::fs;
use std::io::{
	self,
	Read,
	Write,
};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{
	AsRawFd,
	FromRawFd,
};
use std::path::Path;

use libc::{
	O_CLOEXEC,
	O_RDWR,
	c_ulong,
	ioctl,
	open,
};

use super::{
	Bus,
	Channel,
};

// from <linux/i2c-dev.h>
const I2C_SLAVE: c_ulong = 0x0703;

/// i2c-dev character devices (`/dev/i2c-N`)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LinuxBus;

#[derive(Debug)]
pub struct LinuxChannel {
	file: fs::File,
}

impl Bus for LinuxBus {
	type Channel = LinuxChannel;

	fn open(&self, path: &Path) -> io::Result<LinuxChannel> {
		let path = CString::new(path.as_os_str().as_bytes())?;

		let fd = unsafe { open(path.as_ptr(), O_RDWR | O_CLOEXEC) };
		if -1 == fd {
			return Err(io::Error::last_os_error());
		}
		// now get fd managed to prevent resource leak
		let file = unsafe { fs::File::from_raw_fd(fd) };

		Ok(LinuxChannel { file })
	}
}

impl Channel for LinuxChannel {
	fn select_address(&mut self, address: u8) -> io::Result<()> {
		let res = unsafe { ioctl(self.file.as_raw_fd(), I2C_SLAVE as _, address as c_ulong) };
		if res < 0 {
			return Err(io::Error::last_os_error());
		}
		Ok(())
	}

	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		self.file.write(data)
	}

	fn read(&mut self, target: &mut [u8]) -> io::Result<usize> {
		self.file.read(target)
	}
}
