//! In-memory serial port for tests.

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
use std::collections::VecDeque;
use std::vec::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl embedded_io_async::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Serial port that serves queued bytes and records everything written.
#[derive(Debug, Default)]
pub struct MockSerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    fail_reads: bool,
    fail_writes: bool,
    hang_when_empty: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues bytes for the driver to read.
    pub fn queue(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn fail_reads(&mut self) {
        self.fail_reads = true;
    }

    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }

    /// Reads block forever once the queue is drained, instead of reporting EOF.
    pub fn hang_when_empty(&mut self) {
        self.hang_when_empty = true;
    }

    pub fn rx_is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn written(&self) -> &[u8] {
        &self.tx
    }
}

impl ErrorType for MockSerial {
    type Error = MockError;
}

impl Read for MockSerial {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(MockError);
        }
        if self.rx.is_empty() {
            if self.hang_when_empty {
                core::future::pending::<()>().await;
            }
            return Ok(0);
        }

        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MockSerial {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(MockError);
        }
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockError);
        }
        Ok(())
    }
}

/// Delay that elapses immediately.
#[derive(Debug, Default)]
pub struct InstantDelay;

impl DelayNs for InstantDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// Builds a valid reply frame around a six-byte body.
pub fn reply_frame(tag: u8, body: [u8; 6]) -> [u8; 10] {
    let mut frame = [crate::HEAD, tag, 0, 0, 0, 0, 0, 0, 0, crate::TAIL];
    frame[2..8].copy_from_slice(&body);
    frame[8] = crate::sum256(&body);
    frame
}

pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::max())
        .is_test(true)
        .try_init();
}
