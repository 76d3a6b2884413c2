//! Async implementation of the clock controller.
//!
//! This module provides an async interface to the DS1307/DS3231 family
//! using `embedded-hal-async` traits. It is only available when the `async`
//! feature is enabled and mirrors the synchronous [`crate::Ds130x`] surface
//! and state machine exactly.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds130x::asynch::Ds130x;
//! use ds130x::DEVICE_ADDRESS;
//!
//! let mut rtc = Ds130x::new(i2c, DEVICE_ADDRESS);
//! rtc.initialize().await?;
//! let now = rtc.datetime().await?;
//! ```

use embedded_hal_async::i2c::I2c;

use crate::registers::{RegAddr, Seconds};
use crate::{DateTime, DeviceStatus, Error};

/// DS1307/DS3231 async clock controller.
///
/// Constructed unprobed; [`initialize`](Self::initialize) must succeed once
/// before any other operation.
pub struct Ds130x<I2C> {
    i2c: I2C,
    address: u8,
    initialized: bool,
    status: DeviceStatus,
}

impl<I2C: I2c> Ds130x<I2C> {
    /// Creates an unprobed controller owning the async bus handle.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            initialized: false,
            status: DeviceStatus::NotFound,
        }
    }

    /// Outcome of the most recent operation.
    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    /// Probes the device address and marks the controller ready.
    pub async fn initialize(&mut self) -> Result<(), Error<I2C::Error>> {
        debug!("ds130x: probing address {}", self.address);
        if self.i2c.write(self.address, &[]).await.is_err() {
            self.status = DeviceStatus::NotFound;
            return Err(Error::DeviceAbsent);
        }
        self.initialized = true;
        self.status = DeviceStatus::Ok;
        Ok(())
    }

    /// Returns whether the clock oscillator is running.
    ///
    /// Updates the status to `Ok` or `NotRunning` accordingly; a bus failure
    /// leaves the status untouched.
    pub async fn is_running(&mut self) -> Result<bool, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
            .await
            .map_err(Error::Bus)?;
        let running = !Seconds(data[0]).clock_halt();
        self.status = if running {
            DeviceStatus::Ok
        } else {
            DeviceStatus::NotRunning
        };
        Ok(running)
    }

    /// Reads and decodes the current device time without altering the
    /// status.
    pub async fn datetime(&mut self) -> Result<DateTime, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let raw = self.read_raw_datetime().await?;
        Ok(DateTime::from_registers(raw)?)
    }

    /// Writes the given calendar value to all seven registers in one block,
    /// clearing the clock-halt flag.
    pub async fn set_datetime(&mut self, datetime: &DateTime) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        debug!("ds130x: setting time to {:?}", datetime);
        let data = datetime.to_registers();
        self.i2c
            .write(
                self.address,
                &[
                    RegAddr::Seconds as u8,
                    data[0],
                    data[1],
                    data[2],
                    data[3],
                    data[4],
                    data[5],
                    data[6],
                ],
            )
            .await
            .map_err(Error::Bus)?;
        self.status = DeviceStatus::Ok;
        Ok(())
    }

    /// Sets the clock to `build_time` if the oscillator is halted.
    pub async fn set_build_time_if_stopped(
        &mut self,
        build_time: &DateTime,
    ) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        if self.is_running().await? {
            return Ok(());
        }
        debug!("ds130x: oscillator halted, loading build time");
        self.set_datetime(build_time).await?;
        self.status = DeviceStatus::SetFromBuildTime;
        Ok(())
    }

    /// Shifts the device time by a signed number of seconds, clamping
    /// negative deltas at the epoch floor.
    pub async fn adjust_seconds(&mut self, delta: i32) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        let now = DateTime::from_registers(self.read_raw_datetime().await?)?;
        self.set_datetime(&now.offset_by_seconds(delta)).await
    }

    /// Shifts the device time by a signed number of minutes.
    pub async fn adjust_minutes(&mut self, delta: i16) -> Result<(), Error<I2C::Error>> {
        self.adjust_seconds(i32::from(delta) * 60).await
    }

    fn ensure_initialized(&mut self) -> Result<(), Error<I2C::Error>> {
        if self.initialized {
            Ok(())
        } else {
            self.status = DeviceStatus::NotFound;
            Err(Error::NotInitialized)
        }
    }

    async fn read_raw_datetime(&mut self) -> Result<[u8; 7], Error<I2C::Error>> {
        let mut data = [0; 7];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
            .await
            .map_err(Error::Bus)?;
        Ok(data)
    }
}
