#![cfg_attr(not(test), no_std)]

use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use log::{debug, trace, warn};

mod checksum;
pub use checksum::sum256;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod frame;
pub use frame::*;

mod sync;
pub use sync::*;

#[cfg(test)]
mod mock;

/// An [`Sds011`] that several tasks can share.
///
/// The sensor answers with untagged frames, so two requests must never be in
/// flight on the same port. Holding the lock for a whole operation keeps one
/// command's write and read together.
pub type SharedSds011<M, S, D = NoTimeout> = Mutex<M, Sds011<S, D>>;

/// Represents an SDS011 air quality sensor.
///
/// Every operation writes one command frame and reads exactly one reply.
/// The driver keeps no knowledge of the device's mode or sleep state; it only
/// forwards what the sensor reports.
///
/// # Type Parameters
///
/// * `Serial`: The serial interface used to communicate with the sensor.
///   It must implement `embedded_io_async::Read` and `embedded_io_async::Write`.
/// * `Delay`: Time source for [`Config::sync_timeout_ms`]. Defaults to
///   [`NoTimeout`], which never expires.
pub struct Sds011<Serial, Delay = NoTimeout> {
    serial: Serial,
    delay: Delay,
    config: Config,
}

impl<S> Sds011<S, NoTimeout>
where
    S: Read + Write,
{
    /// Creates a new `Sds011` sensor instance without a time source.
    ///
    /// Waiting for a reply is unbounded even if `config` sets a timeout.
    /// Use [`Sds011::with_delay`] to bound it.
    pub fn new(serial: S, config: Config) -> Self {
        Self::with_delay(serial, NoTimeout, config)
    }
}

impl<S, D> Sds011<S, D>
where
    S: Read + Write,
    D: DelayNs,
{
    /// Creates a new `Sds011` sensor instance that measures
    /// [`Config::sync_timeout_ms`] with `delay`.
    pub fn with_delay(serial: S, delay: D, config: Config) -> Self {
        Self {
            serial,
            delay,
            config,
        }
    }

    /// Returns the driver configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Releases the serial interface and delay.
    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }

    /// Prepares the sensor according to the configured mode.
    ///
    /// This involves:
    /// - Setting the reporting mode (Active or Query).
    /// - If Query mode, putting the sensor to sleep until the next sample.
    /// - If Active mode, setting the working period to continuous.
    pub async fn init(&mut self) -> Result<(), Error<S::Error>> {
        let mode = self.config.mode;
        self.set_mode(mode).await.map_err(|e| {
            log::error!("Failed to set reporting mode to {:?} during init: {:?}", mode, e);
            e
        })?;

        if mode == DeviceMode::Query {
            self.set_sleep(true).await.map_err(|e| {
                log::error!("Failed to put sensor to sleep during init: {:?}", e);
                e
            })?;
        } else {
            self.set_working_period(PERIOD_CONTINUOUS)
                .await
                .map_err(|e| {
                    log::error!("Failed to set continuous working period during init: {:?}", e);
                    e
                })?;
        }

        debug!("SDS011 init sequence complete.");
        Ok(())
    }

    /// Reads a single sample.
    ///
    /// In Query mode the sensor is woken up, queried and put back to sleep.
    /// In Active mode it is just queried. The sensor needs some time after
    /// waking before readings settle; pacing is left to the caller.
    ///
    /// Returns `Ok(None)` when the sensor answered the query with something
    /// other than a reading.
    pub async fn read_sample(&mut self) -> Result<Option<Sds011Data>, Error<S::Error>> {
        let query_mode = self.config.mode == DeviceMode::Query;

        if query_mode {
            debug!("Waking up sensor (Query Mode)");
            self.set_sleep(false).await.map_err(|e| {
                log::error!("Failed to wake up sensor: {:?}", e);
                e
            })?;
        }

        let data = self.query_data().await.map_err(|e| {
            log::error!("Failed to query sensor data: {:?}", e);
            e
        })?;

        if query_mode {
            debug!("Putting sensor back to sleep (Query Mode)");
            self.set_sleep(true).await.map_err(|e| {
                log::error!("Failed to put sensor to sleep: {:?}", e);
                e
            })?;
        }

        Ok(data)
    }

    /// Sets the sensor's reporting mode.
    ///
    /// The acknowledgement is validated as a frame and then discarded; whether
    /// the sensor actually switched is not checked.
    pub async fn set_mode(&mut self, mode: DeviceMode) -> Result<(), Error<S::Error>> {
        debug!("Setting reporting mode to: {:?}", mode);
        self.send_setting(CMD_MODE, &[ACTION_SET, mode.as_byte()])
            .await
    }

    /// Queries the sensor's current reporting mode.
    ///
    /// # Errors
    ///
    /// * `Error::UnexpectedReply` if the reply does not report a mode.
    pub async fn get_mode(&mut self) -> Result<DeviceMode, Error<S::Error>> {
        let data = self.query_setting(CMD_MODE).await?;
        let mode = DeviceMode::from_byte(data[1]);
        debug!("Queried reporting mode: {:?}", mode);
        Ok(mode)
    }

    /// Queries a PM2.5/PM10 reading.
    ///
    /// Returns `Ok(None)` if the reply is well formed but not a data report,
    /// such as a late acknowledgement or an unknown frame.
    pub async fn query_data(&mut self) -> Result<Option<Sds011Data>, Error<S::Error>> {
        debug!("Querying sensor data");
        match self.transact(CMD_QUERY_DATA, &[]).await? {
            Reply::Data(data) => {
                debug!("PM2.5: {}, PM10: {}", data.pm2_5, data.pm10);
                Ok(Some(data))
            }
            other => {
                warn!("Query data answered without a reading: {:?}", other);
                Ok(None)
            }
        }
    }

    /// Puts the sensor to sleep (`true`) or wakes it up (`false`).
    pub async fn set_sleep(&mut self, sleep: bool) -> Result<(), Error<S::Error>> {
        debug!("Setting sleep to: {}", sleep);
        let work = if sleep { 0x00 } else { 0x01 };
        self.send_setting(CMD_SLEEP, &[ACTION_SET, work]).await
    }

    /// Queries whether the sensor is sleeping.
    pub async fn get_sleep(&mut self) -> Result<bool, Error<S::Error>> {
        let data = self.query_setting(CMD_SLEEP).await?;
        let sleeping = data[1] == 0x00;
        debug!("Queried sleep state: {}", sleeping);
        Ok(sleeping)
    }

    /// Sets the sensor's working period.
    ///
    /// - A value of `0` sets the sensor to continuous working mode.
    /// - Values from `1` to `30` make the sensor work for 30 seconds and then
    ///   sleep for the rest of each `period` minutes.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidArgument` if `period` is greater than 30. Nothing is sent.
    pub async fn set_working_period(&mut self, period: u8) -> Result<(), Error<S::Error>> {
        if period > MAX_WORKING_PERIOD {
            warn!(
                "Working period {} out of range (0-{})",
                period, MAX_WORKING_PERIOD
            );
            return Err(Error::InvalidArgument);
        }
        debug!("Setting working period to: {} minutes", period);
        self.send_setting(CMD_WORKING_PERIOD, &[ACTION_SET, period])
            .await
    }

    /// Queries the sensor's working period in minutes. `0` means continuous.
    pub async fn get_working_period(&mut self) -> Result<u8, Error<S::Error>> {
        let data = self.query_setting(CMD_WORKING_PERIOD).await?;
        debug!("Queried working period: {} minutes", data[1]);
        Ok(data[1])
    }

    /// Retrieves the firmware date and device ID.
    ///
    /// With [`ChecksumPolicy::ReportOnly`] a reply with a bad checksum is
    /// still returned, flagged through `checksum_ok`.
    ///
    /// Returns `Ok(None)` if the reply is well formed but not a firmware reply.
    pub async fn firmware_version(&mut self) -> Result<Option<FirmwareInfo>, Error<S::Error>> {
        debug!("Getting firmware version");
        match self.transact(CMD_FIRMWARE, &[]).await? {
            Reply::Firmware(info) => {
                debug!(
                    "Firmware version: 20{:02}-{:02}-{:02}, ID: {:04X}, checksum {}",
                    info.year,
                    info.month,
                    info.day,
                    info.device_id,
                    if info.checksum_ok { "OK" } else { "NOK" }
                );
                Ok(Some(info))
            }
            other => {
                warn!("Firmware query answered with: {:?}", other);
                Ok(None)
            }
        }
    }

    /// Sets the device ID of the sensor.
    pub async fn set_device_id(&mut self, id: u16) -> Result<(), Error<S::Error>> {
        debug!("Setting device ID to: {:04X}", id);
        let [low, high] = id.to_le_bytes();
        let mut payload = [0u8; MAX_PAYLOAD_LEN];
        payload[10] = low;
        payload[11] = high;
        self.send_setting(CMD_DEVICE_ID, &payload).await
    }

    // Sends a set command and drops the acknowledgement once it decodes.
    async fn send_setting(&mut self, command: u8, payload: &[u8]) -> Result<(), Error<S::Error>> {
        let reply = self.transact(command, payload).await?;
        debug!("Command {:02X} acknowledged with {:?}", command, reply);
        Ok(())
    }

    // Sends the query form of a set command and returns the reply data bytes.
    async fn query_setting(&mut self, command: u8) -> Result<[u8; 5], Error<S::Error>> {
        match self.transact(command, &[ACTION_QUERY]).await? {
            Reply::Ack { command: c, data } if c == command && data[0] == ACTION_QUERY => {
                Ok(data)
            }
            other => {
                warn!("Query {:02X}: unexpected reply {:?}", command, other);
                Err(Error::UnexpectedReply)
            }
        }
    }

    // One request/response round trip. Encoding happens before any I/O.
    async fn transact(&mut self, command: u8, payload: &[u8]) -> Result<Reply, Error<S::Error>> {
        let frame = encode_command(command, payload)?;
        self.write(&frame).await?;
        let raw = self.read().await?;
        Ok(decode_response_with(&raw, self.config.checksum_policy)?)
    }

    async fn write(&mut self, frame: &[u8]) -> Result<(), Error<S::Error>> {
        trace!("Write to port: {:02X?}", frame);
        self.serial.write_all(frame).await.map_err(Error::Io)?;
        self.serial.flush().await.map_err(Error::Io)
    }

    async fn read(&mut self) -> Result<[u8; REPLY_FRAME_LEN], Error<S::Error>> {
        match self.config.sync_timeout_ms {
            Some(timeout_ms) => read_frame_within(&mut self.serial, &mut self.delay, timeout_ms).await,
            None => read_frame(&mut self.serial).await,
        }
    }
}
