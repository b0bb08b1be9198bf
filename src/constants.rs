// HEAD is the byte that marks the beginning of any frame (command or reply).
pub const HEAD: u8 = 0xAA;

// TAIL is the byte that marks the end of any frame (command or reply).
pub const TAIL: u8 = 0xAB;

// COMMAND_ID is the byte that identifies a command frame sent to the sensor.
pub const COMMAND_ID: u8 = 0xB4;

// DATA_REPORT_ID tags a reply frame carrying a PM2.5/PM10 reading.
pub const DATA_REPORT_ID: u8 = 0xC0;

// REPLY_ID tags a reply frame acknowledging a command, or carrying the
// firmware identity when byte 2 is CMD_FIRMWARE.
pub const REPLY_ID: u8 = 0xC5;

// Broadcast address written after the payload of every command frame.
pub const BROADCAST_ID: [u8; 2] = [0xFF, 0xFF];

pub const CMD_MODE: u8 = 0x02;
pub const CMD_QUERY_DATA: u8 = 0x04;
pub const CMD_DEVICE_ID: u8 = 0x05;
pub const CMD_SLEEP: u8 = 0x06;
pub const CMD_FIRMWARE: u8 = 0x07;
pub const CMD_WORKING_PERIOD: u8 = 0x08;

// First payload byte of a set/query command pair.
pub const ACTION_QUERY: u8 = 0x00;
pub const ACTION_SET: u8 = 0x01;

pub const COMMAND_FRAME_LEN: usize = 19;
pub const REPLY_FRAME_LEN: usize = 10;
pub const MAX_PAYLOAD_LEN: usize = 12;

// A working period of zero means continuous sampling.
pub const PERIOD_CONTINUOUS: u8 = 0;
pub const MAX_WORKING_PERIOD: u8 = 30;
