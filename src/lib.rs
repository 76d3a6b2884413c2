//! Platform-agnostic driver for the DS1307/DS3231 family of battery-backed
//! real-time clocks.
//!
//! The driver speaks the seven time-keeping registers the two chips share
//! and keeps a device-independent calendar value, [`DateTime`], covering
//! 2000-2099. It detects whether the clock oscillator is running, can
//! initialize a stopped clock from the firmware build timestamp, and
//! supports drift correction by adding or subtracting seconds.
//!
//! The bus is any [`embedded_hal::i2c::I2c`] implementation handed to the
//! controller at construction, so independent clock instances and test
//! doubles need no globals. An async controller with the same surface lives
//! in [`asynch`] behind the `async` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds130x::{DateTime, Ds130x, DEVICE_ADDRESS};
//!
//! let mut rtc = Ds130x::new(i2c, DEVICE_ADDRESS);
//! rtc.initialize()?;
//!
//! // Start a stopped clock from the build timestamp.
//! let built = DateTime::from_build_timestamp("Jan 15 2024", "10:30:00")?;
//! rtc.set_build_time_if_stopped(&built)?;
//!
//! // Drift correction: the clock runs two minutes fast.
//! rtc.adjust_minutes(-2)?;
//!
//! let now = rtc.datetime()?;
//! ```
//!
//! # Status reporting
//!
//! Every operation returns a `Result`; [`DeviceStatus`] additionally records
//! the outcome of the most recent operation as advisory telemetry. It is not
//! an error channel: [`Ds130x::is_running`] reports `NotRunning` for a
//! halted oscillator, which is a legitimate state, so hard failure detection
//! must use the returned `Result`s.

#![no_std]

#[macro_use]
mod fmt;

#[cfg(feature = "async")]
pub mod asynch;
mod datetime;
pub mod registers;

use embedded_hal::i2c::I2c;

pub use crate::datetime::{DateTime, DateTimeError, UNIX_EPOCH_2000, UNIX_WINDOW_END};
use crate::registers::{RegAddr, Seconds};

/// Fixed 7-bit bus address shared by the DS1307/DS3231 family.
pub const DEVICE_ADDRESS: u8 = 0x68;

/// Outcome of the most recent controller operation.
///
/// Advisory telemetry only; see the crate-level notes on status reporting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceStatus {
    /// The last operation completed normally
    Ok,
    /// The device did not respond to a probe, or no probe has succeeded yet
    NotFound,
    /// The clock oscillator is halted
    NotRunning,
    /// The clock was initialized from the build timestamp
    SetFromBuildTime,
}

/// Errors reported by the clock controller.
#[derive(Debug)]
pub enum Error<E> {
    /// An operation was attempted before a successful [`Ds130x::initialize`]
    NotInitialized,
    /// The device did not acknowledge the address probe
    DeviceAbsent,
    /// A register read or write did not complete as requested
    Bus(E),
    /// The device returned registers that do not decode to a real date
    InvalidDateTime(DateTimeError),
}

impl<E> From<DateTimeError> for Error<E> {
    fn from(e: DateTimeError) -> Self {
        Error::InvalidDateTime(e)
    }
}

/// DS1307/DS3231 clock controller.
///
/// Constructed unprobed; [`initialize`](Self::initialize) must succeed once
/// before any other operation. All operations are synchronous and perform at
/// most two bus transactions.
pub struct Ds130x<I2C> {
    i2c: I2C,
    address: u8,
    initialized: bool,
    status: DeviceStatus,
}

impl<I2C: I2c> Ds130x<I2C> {
    /// Creates an unprobed controller owning the bus handle.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `address` - The device address ([`DEVICE_ADDRESS`] for this family)
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
    ///
    /// Safe to call repeatedly; once a probe has succeeded the controller
    /// stays ready for its lifetime.
    pub fn initialize(&mut self) -> Result<(), Error<I2C::Error>> {
        debug!("ds130x: probing address {}", self.address);
        // a zero-length write carries just the address byte
        if self.i2c.write(self.address, &[]).is_err() {
            self.status = DeviceStatus::NotFound;
            return Err(Error::DeviceAbsent);
        }
        self.initialized = true;
        self.status = DeviceStatus::Ok;
        Ok(())
    }

    /// Returns whether the clock oscillator is running.
    ///
    /// Updates the status to `Ok` or `NotRunning` accordingly, so this query
    /// is not side-effect-free. A bus failure leaves the status untouched.
    pub fn is_running(&mut self) -> Result<bool, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
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
    pub fn datetime(&mut self) -> Result<DateTime, Error<I2C::Error>> {
        self.ensure_initialized()?;
        let raw = self.read_raw_datetime()?;
        Ok(DateTime::from_registers(raw)?)
    }

    /// Writes the given calendar value to all seven registers in one block.
    ///
    /// The write clears the clock-halt flag, so it also restarts a halted
    /// oscillator. A bus failure leaves the status untouched.
    pub fn set_datetime(&mut self, datetime: &DateTime) -> Result<(), Error<I2C::Error>> {
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
            .map_err(Error::Bus)?;
        self.status = DeviceStatus::Ok;
        Ok(())
    }

    /// Sets the clock to `build_time` if the oscillator is halted.
    ///
    /// A running clock is left untouched with status `Ok`; a halted clock is
    /// written and the status becomes `SetFromBuildTime`. Unlike the status,
    /// failures of the inner read and write are propagated.
    pub fn set_build_time_if_stopped(
        &mut self,
        build_time: &DateTime,
    ) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        if self.is_running()? {
            return Ok(());
        }
        debug!("ds130x: oscillator halted, loading build time");
        self.set_datetime(build_time)?;
        self.status = DeviceStatus::SetFromBuildTime;
        Ok(())
    }

    /// Shifts the device time by a signed number of seconds.
    ///
    /// Negative deltas clamp at the epoch floor (2000-01-01T00:00:00)
    /// instead of wrapping. A failed read or write aborts without altering
    /// the status.
    pub fn adjust_seconds(&mut self, delta: i32) -> Result<(), Error<I2C::Error>> {
        self.ensure_initialized()?;
        let now = DateTime::from_registers(self.read_raw_datetime()?)?;
        self.set_datetime(&now.offset_by_seconds(delta))
    }

    /// Shifts the device time by a signed number of minutes.
    pub fn adjust_minutes(&mut self, delta: i16) -> Result<(), Error<I2C::Error>> {
        self.adjust_seconds(i32::from(delta) * 60)
    }

    fn ensure_initialized(&mut self) -> Result<(), Error<I2C::Error>> {
        if self.initialized {
            Ok(())
        } else {
            self.status = DeviceStatus::NotFound;
            Err(Error::NotInitialized)
        }
    }

    fn read_raw_datetime(&mut self) -> Result<[u8; 7], Error<I2C::Error>> {
        let mut data = [0; 7];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
            .map_err(Error::Bus)?;
        Ok(data)
    }
}
