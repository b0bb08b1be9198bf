/// Represents the reporting mode of the SDS011 sensor.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum DeviceMode {
    /// In Active mode, the sensor automatically reports data.
    Active,
    /// In Query mode, the sensor only reports data when queried.
    Query,
}

impl DeviceMode {
    /// Returns the byte the sensor uses for this mode on the wire.
    pub const fn as_byte(self) -> u8 {
        match self {
            DeviceMode::Active => 0x00,
            DeviceMode::Query => 0x01,
        }
    }

    /// Interprets a mode byte from a reply. Anything but zero reads as Query.
    pub const fn from_byte(byte: u8) -> DeviceMode {
        if byte == 0x00 {
            DeviceMode::Active
        } else {
            DeviceMode::Query
        }
    }
}

/// How a bad checksum on the firmware-identity reply is handled.
///
/// Data replies and acknowledgements always enforce their checksum.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ChecksumPolicy {
    /// Reject the reply with [`Error::ChecksumMismatch`](crate::Error::ChecksumMismatch).
    Enforce,
    /// Return the firmware identity anyway, with `checksum_ok` set to `false`.
    ReportOnly,
}

/// Configuration settings for the SDS011 driver.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// The reporting mode applied by `init` and assumed by `read_sample`.
    pub mode: DeviceMode,
    /// Checksum handling for firmware-identity replies.
    pub checksum_policy: ChecksumPolicy,
    /// Upper bound, in milliseconds, on waiting for a reply frame.
    ///
    /// `None` waits forever. Only effective when the driver was built with a delay.
    pub sync_timeout_ms: Option<u32>,
}

impl Config {
    /// Creates a new `Config` with the given mode and otherwise default settings.
    pub fn new(mode: DeviceMode) -> Config {
        Config {
            mode,
            ..Config::default()
        }
    }

    /// Sets the reporting mode for the configuration.
    pub fn mode(mut self, mode: DeviceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the firmware-identity checksum policy.
    pub fn checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }

    /// Bounds how long a single reply may take to arrive.
    ///
    /// # Arguments
    ///
    /// * `timeout_ms` - The timeout in milliseconds, or `None` to wait forever.
    pub fn sync_timeout_ms(mut self, timeout_ms: Option<u32>) -> Self {
        self.sync_timeout_ms = timeout_ms;
        self
    }
}

/// Provides default configuration values for the SDS011 driver.
impl Default for Config {
    /// The default configuration uses `Query` mode, enforces every checksum and
    /// has no synchronization timeout.
    fn default() -> Config {
        Config {
            mode: DeviceMode::Query,
            checksum_policy: ChecksumPolicy::Enforce,
            sync_timeout_ms: None,
        }
    }
}
