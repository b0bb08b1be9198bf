use crate::{Error, HEAD, REPLY_FRAME_LEN};
use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::Read;
use log::{debug, trace, warn};

/// A delay that never elapses.
///
/// Drivers built without a real delay use it, which leaves reply
/// synchronization unbounded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTimeout;

impl DelayNs for NoTimeout {
    async fn delay_ns(&mut self, _ns: u32) {
        core::future::pending::<()>().await
    }
}

/// Reads one raw reply frame from the serial port.
///
/// Bytes are discarded one at a time until the head byte shows up, then the
/// remaining nine bytes are read as-is. Nothing is validated here.
///
/// This waits for as long as the port does. Use [`read_frame_within`] to
/// bound it. Dropping the future mid-frame is safe: the next call scans for a
/// head byte again.
pub async fn read_frame<R: Read>(reader: &mut R) -> Result<[u8; REPLY_FRAME_LEN], Error<R::Error>> {
    let mut byte = [0u8; 1];
    let mut skipped = 0usize;

    loop {
        reader.read_exact(&mut byte).await?;
        if byte[0] == HEAD {
            break;
        }
        trace!("Discarding {:02X} while waiting for frame head", byte[0]);
        skipped += 1;
    }

    if skipped > 0 {
        debug!("Skipped {} bytes before frame head", skipped);
    }

    let mut frame = [0u8; REPLY_FRAME_LEN];
    frame[0] = HEAD;
    reader.read_exact(&mut frame[1..]).await?;

    trace!("Read from port: {:02X?}", frame);
    Ok(frame)
}

/// Like [`read_frame`], but gives up after `timeout_ms` milliseconds.
///
/// # Errors
///
/// * `Error::TransportTimeout` if no complete frame arrived in time. Any
///   partially read frame is abandoned.
pub async fn read_frame_within<R: Read, D: DelayNs>(
    reader: &mut R,
    delay: &mut D,
    timeout_ms: u32,
) -> Result<[u8; REPLY_FRAME_LEN], Error<R::Error>> {
    match select(read_frame(reader), delay.delay_ms(timeout_ms)).await {
        Either::First(result) => result,
        Either::Second(()) => {
            warn!("No reply frame within {} ms", timeout_ms);
            Err(Error::TransportTimeout)
        }
    }
}
