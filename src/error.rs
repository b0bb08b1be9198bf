use core::fmt::{Display, Formatter};
use embedded_io_async::ReadExactError;

/// Failures detected while building or validating a frame.
///
/// These never involve the transport, so they carry no port error.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum FrameError {
    /// A command payload was longer than 12 bytes or an argument was out of range.
    InvalidArgument,
    /// The reply did not end with the tail byte.
    MalformedFrame,
    /// The reply checksum did not match its contents.
    ChecksumMismatch,
}

impl Display for FrameError {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::MalformedFrame => write!(f, "malformed frame"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
        }
    }
}

impl core::error::Error for FrameError {}

/// Error type for [`Sds011`](crate::Sds011) operations.
///
/// The generic parameter `E` is the error type of the serial port and is
/// passed through untouched in [`Error::Io`].
#[non_exhaustive]
#[derive(PartialEq, Eq, Debug)]
pub enum Error<E> {
    /// The caller supplied an invalid argument. No I/O was performed.
    InvalidArgument,
    /// The reply did not end with the tail byte.
    MalformedFrame,
    /// The reply checksum did not match its contents.
    ChecksumMismatch,
    /// No complete reply arrived within the configured synchronization timeout.
    TransportTimeout,
    /// A query command was answered with a reply that does not carry the queried value.
    UnexpectedReply,
    /// The port reached end-of-file in the middle of a frame.
    UnexpectedEof,
    /// A port-specific input/output error.
    Io(E),
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::MalformedFrame => write!(f, "malformed frame"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::TransportTimeout => write!(f, "timed out waiting for a reply frame"),
            Self::UnexpectedReply => write!(f, "unexpected reply"),
            Self::UnexpectedEof => write!(f, "unexpected end-of-file"),
            Self::Io(err) => write!(f, "input/output error: {err}"),
        }
    }
}

impl<E: core::error::Error> core::error::Error for Error<E> {}

impl<E> From<FrameError> for Error<E> {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::InvalidArgument => Self::InvalidArgument,
            FrameError::MalformedFrame => Self::MalformedFrame,
            FrameError::ChecksumMismatch => Self::ChecksumMismatch,
        }
    }
}

impl<E> From<ReadExactError<E>> for Error<E> {
    fn from(err: ReadExactError<E>) -> Self {
        match err {
            ReadExactError::UnexpectedEof => Self::UnexpectedEof,
            ReadExactError::Other(err) => Self::Io(err),
        }
    }
}
