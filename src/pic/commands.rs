// handshake preamble, precedes every command
pub const PIC_COMMAND_1: u8 = 0x55;
pub const PIC_COMMAND_2: u8 = 0xaa;

pub const SET_VOLTAGE: u8 = 0x10; // followed by the register value
pub const GET_VOLTAGE: u8 = 0x18; // 1 byte response
pub const JUMP_FROM_LOADER_TO_APP: u8 = 0x06;
pub const RESET_PIC: u8 = 0x07;
pub const READ_PIC_SOFTWARE_VERSION: u8 = 0x17; // 1 byte response

/// the only firmware revision speaking this protocol
pub const EXPECTED_PIC_VERSION: u8 = 0x03;
