use crate::checksum::sum256;
use crate::{
    ChecksumPolicy, FrameError, BROADCAST_ID, CMD_FIRMWARE, COMMAND_FRAME_LEN, COMMAND_ID,
    DATA_REPORT_ID, HEAD, MAX_PAYLOAD_LEN, REPLY_FRAME_LEN, REPLY_ID, TAIL,
};
use log::{trace, warn};

/// Represents a single data sample read from the SDS011 sensor.
///
/// Contains PM2.5 and PM10 particulate matter concentration values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sds011Data {
    /// PM2.5 concentration in µg/m³.
    pub pm2_5: f64,
    /// PM10 concentration in µg/m³.
    pub pm10: f64,
}

/// Firmware identity reported by the sensor.
///
/// The firmware date is given as `(year, month, day)` with a two-digit year,
/// so "15-10-21" reads as `year: 15, month: 10, day: 21`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareInfo {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    /// The sensor's current device ID.
    pub device_id: u16,
    /// Whether the reply checksum matched. Always `true` under [`ChecksumPolicy::Enforce`].
    pub checksum_ok: bool,
}

/// A decoded 10-byte reply frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    /// A PM2.5/PM10 reading (tag `0xC0`).
    Data(Sds011Data),
    /// The firmware identity (tag `0xC5`, command `0x07`).
    Firmware(FirmwareInfo),
    /// Acknowledgement of any other command (tag `0xC5`).
    ///
    /// `data` holds reply bytes 3 to 7, whose meaning depends on `command`.
    Ack { command: u8, data: [u8; 5] },
    /// A well-formed frame with a tag this driver does not know.
    Unknown { tag: u8 },
}

/// Builds a 19-byte command frame.
///
/// The payload is right-padded with zeros to 12 bytes and the frame is
/// addressed to every sensor on the line.
///
/// # Errors
///
/// * `FrameError::InvalidArgument` if `payload` is longer than 12 bytes.
pub fn encode_command(command: u8, payload: &[u8]) -> Result<[u8; COMMAND_FRAME_LEN], FrameError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        warn!(
            "Command {:02X} payload of {} bytes exceeds {}",
            command,
            payload.len(),
            MAX_PAYLOAD_LEN
        );
        return Err(FrameError::InvalidArgument);
    }

    let mut frame = [0u8; COMMAND_FRAME_LEN];
    frame[0] = HEAD;
    frame[1] = COMMAND_ID;
    frame[2] = command;
    frame[3..3 + payload.len()].copy_from_slice(payload);
    frame[15..17].copy_from_slice(&BROADCAST_ID);
    // Covers command, payload and address: bytes 2..=16
    frame[17] = sum256(&frame[2..17]);
    frame[18] = TAIL;

    trace!("Encoded command frame: {:02X?}", frame);
    Ok(frame)
}

/// Validates and decodes a reply frame, enforcing every checksum.
///
/// The head byte is assumed to have been matched by the synchronizer and is
/// not checked again.
pub fn decode_response(frame: &[u8; REPLY_FRAME_LEN]) -> Result<Reply, FrameError> {
    decode_response_with(frame, ChecksumPolicy::Enforce)
}

/// Validates and decodes a reply frame.
///
/// `policy` only affects firmware-identity replies. Every other reply with a
/// bad checksum is rejected.
///
/// # Errors
///
/// * `FrameError::MalformedFrame` if the last byte is not the tail byte.
/// * `FrameError::ChecksumMismatch` if bytes 2 to 7 do not sum to byte 8.
pub fn decode_response_with(
    frame: &[u8; REPLY_FRAME_LEN],
    policy: ChecksumPolicy,
) -> Result<Reply, FrameError> {
    if frame[9] != TAIL {
        warn!("Reply frame has no tail byte: {:02X?}", frame);
        return Err(FrameError::MalformedFrame);
    }

    let checksum = sum256(&frame[2..8]);
    let checksum_ok = checksum == frame[8];
    let is_firmware = frame[1] == REPLY_ID && frame[2] == CMD_FIRMWARE;

    if !checksum_ok {
        if is_firmware && policy == ChecksumPolicy::ReportOnly {
            warn!(
                "Firmware reply checksum mismatch (calculated {:02X}, received {:02X}), reporting only",
                checksum, frame[8]
            );
        } else {
            warn!(
                "Bad checksum: calculated {:02X}, received {:02X}. Frame: {:02X?}",
                checksum, frame[8], frame
            );
            return Err(FrameError::ChecksumMismatch);
        }
    }

    let reply = match frame[1] {
        DATA_REPORT_ID => Reply::Data(Sds011Data {
            pm2_5: f64::from(u16::from_le_bytes([frame[2], frame[3]])) / 10.0,
            pm10: f64::from(u16::from_le_bytes([frame[4], frame[5]])) / 10.0,
        }),
        REPLY_ID if is_firmware => Reply::Firmware(FirmwareInfo {
            year: frame[3],
            month: frame[4],
            day: frame[5],
            device_id: u16::from_le_bytes([frame[6], frame[7]]),
            checksum_ok,
        }),
        REPLY_ID => {
            let mut data = [0u8; 5];
            data.copy_from_slice(&frame[3..8]);
            Reply::Ack {
                command: frame[2],
                data,
            }
        }
        tag => {
            warn!("Reply frame has unknown tag {:02X}: {:02X?}", tag, frame);
            Reply::Unknown { tag }
        }
    };

    trace!("Decoded reply: {:?}", reply);
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::reply_frame as reply;
    use crate::{CMD_DEVICE_ID, CMD_MODE, CMD_QUERY_DATA};

    #[test]
    fn encode_query_data() {
        let frame = encode_command(CMD_QUERY_DATA, &[]).unwrap();
        assert_eq!(
            frame,
            [
                0xAA, 0xB4, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0xFF, 0xFF, 0x02, 0xAB
            ]
        );
    }

    #[test]
    fn encode_pads_payload_and_is_deterministic() {
        let first = encode_command(CMD_MODE, &[0x01, 0x01]).unwrap();
        let second = encode_command(CMD_MODE, &[0x01, 0x01]).unwrap();
        assert_eq!(first, second);
        assert_eq!(&first[3..5], &[0x01, 0x01]);
        assert!(first[5..15].iter().all(|&b| b == 0));
        // (1 + 1 + 2 - 2) mod 256
        assert_eq!(first[17], 0x02);
    }

    #[test]
    fn encode_checksum_wraps() {
        let frame = encode_command(CMD_DEVICE_ID, &[0xFF; 12]).unwrap();
        let expected = (12u32 * 0xFF + u32::from(CMD_DEVICE_ID) - 2) % 256;
        assert_eq!(u32::from(frame[17]), expected);
    }

    #[test]
    fn encode_rejects_long_payload() {
        assert_eq!(
            encode_command(CMD_QUERY_DATA, &[0u8; 13]),
            Err(FrameError::InvalidArgument)
        );
    }

    #[test]
    fn decode_data_reply() {
        let frame = reply(DATA_REPORT_ID, [0x70, 0x0D, 0xD0, 0x02, 0x00, 0x00]);
        assert_eq!(frame[8], 0x4F);
        assert_eq!(
            decode_response(&frame),
            Ok(Reply::Data(Sds011Data {
                pm2_5: 344.0,
                pm10: 72.0
            }))
        );
    }

    #[test]
    fn decode_rejects_any_flipped_body_byte() {
        let frame = reply(DATA_REPORT_ID, [0x70, 0x0D, 0xD0, 0x02, 0x00, 0x00]);
        for i in 2..8 {
            let mut corrupted = frame;
            corrupted[i] ^= 0x01;
            assert_eq!(
                decode_response(&corrupted),
                Err(FrameError::ChecksumMismatch),
                "byte {i}"
            );
        }
    }

    #[test]
    fn decode_rejects_missing_tail() {
        let mut frame = reply(DATA_REPORT_ID, [0x70, 0x0D, 0xD0, 0x02, 0x00, 0x00]);
        frame[9] = 0x00;
        assert_eq!(decode_response(&frame), Err(FrameError::MalformedFrame));
    }

    #[test]
    fn decode_firmware_reply() {
        let frame = reply(REPLY_ID, [CMD_FIRMWARE, 15, 7, 10, 0x12, 0x34]);
        assert_eq!(
            decode_response(&frame),
            Ok(Reply::Firmware(FirmwareInfo {
                year: 15,
                month: 7,
                day: 10,
                device_id: 0x3412,
                checksum_ok: true,
            }))
        );
    }

    #[test]
    fn firmware_checksum_policy() {
        let mut frame = reply(REPLY_ID, [CMD_FIRMWARE, 15, 7, 10, 0x12, 0x34]);
        frame[8] = frame[8].wrapping_add(1);

        assert_eq!(decode_response(&frame), Err(FrameError::ChecksumMismatch));

        match decode_response_with(&frame, ChecksumPolicy::ReportOnly) {
            Ok(Reply::Firmware(info)) => {
                assert!(!info.checksum_ok);
                assert_eq!(info.year, 15);
            }
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    #[test]
    fn report_only_still_enforces_data_checksum() {
        let mut frame = reply(DATA_REPORT_ID, [0x70, 0x0D, 0xD0, 0x02, 0x00, 0x00]);
        frame[8] = 0x00;
        assert_eq!(
            decode_response_with(&frame, ChecksumPolicy::ReportOnly),
            Err(FrameError::ChecksumMismatch)
        );
    }

    #[test]
    fn decode_ack() {
        let frame = reply(REPLY_ID, [CMD_MODE, 0x01, 0x01, 0x00, 0xA1, 0x60]);
        assert_eq!(
            decode_response(&frame),
            Ok(Reply::Ack {
                command: CMD_MODE,
                data: [0x01, 0x01, 0x00, 0xA1, 0x60]
            })
        );
    }

    #[test]
    fn decode_unknown_tag() {
        let frame = reply(0x99, [1, 2, 3, 4, 5, 6]);
        assert_eq!(decode_response(&frame), Ok(Reply::Unknown { tag: 0x99 }));
    }
}
