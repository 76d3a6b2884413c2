//! Calendar value type and codec for the DS1307/DS3231 time registers.
//!
//! This module is the pure conversion core of the driver: it maps between a
//! validated calendar value ([`DateTime`]), the packed BCD layout of the
//! seven on-wire registers, and a unix-style absolute-seconds count used for
//! drift correction. It performs no I/O and keeps no state.
//!
//! # Supported window
//!
//! The chips store a two-digit year, so the codec covers 2000-01-01T00:00:00
//! through 2099-12-31T23:59:59. [`UNIX_EPOCH_2000`] is the unix timestamp of
//! the window's first instant and acts as the floor for drift adjustments.
//!
//! # Error Handling
//!
//! Construction and register decoding are validated and report
//! [`DateTimeError`]; the arithmetic conversions are total over the window.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Unix timestamp of 2000-01-01T00:00:00, the epoch floor of the supported
/// calendar window.
pub const UNIX_EPOCH_2000: u32 = 946_684_800;

/// Unix timestamp of 2099-12-31T23:59:59, the last representable instant.
pub const UNIX_WINDOW_END: u32 = 4_102_444_799;

/// Drops the clock-halt flag carried in bit 7 of the seconds register.
const SECONDS_MASK: u8 = 0x7F;
/// Drops the 12/24-hour mode bit; hours are always interpreted as 24-hour.
const HOURS_MASK: u8 = 0x3F;
/// Month occupies bits 0-4; upper bits are reserved (century on the DS3231).
const MONTH_MASK: u8 = 0x1F;

/// Fixed value written to the unused day-of-week register.
const DAY_OF_WEEK_PLACEHOLDER: u8 = 1;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Packs a two-digit value into BCD, tens digit in the high nibble.
///
/// Inputs above 99 are outside the supported domain.
pub(crate) fn bcd_encode(value: u8) -> u8 {
    (value / 10) << 4 | (value % 10)
}

/// Unpacks a BCD byte back into its two-digit value.
pub(crate) fn bcd_decode(raw: u8) -> u8 {
    10 * (raw >> 4) + (raw & 0x0F)
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_IN_MONTH[usize::from(month) - 1]
    }
}

/// A validated calendar instant within the 2000-2099 window.
///
/// Values always represent a real date: the constructor checks field ranges
/// including month lengths and leap days, and the decoding conversions
/// either validate ([`DateTime::from_registers`]) or derive the fields
/// arithmetically ([`DateTime::from_unix_seconds`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

/// Errors that can occur during calendar validation or register decoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// A field is out of range or the date does not exist
    InvalidDateTime,
    /// The year is before 2000, the start of the supported window
    YearNotAfter1999,
    /// The year is past 2099, the end of the supported window
    YearNotBefore2100,
}

impl DateTime {
    /// Creates a calendar value, validating every field.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DateTimeError> {
        if year < 2000 {
            error!("year {} is before the supported window", year);
            return Err(DateTimeError::YearNotAfter1999);
        }
        if year > 2099 {
            error!("year {} is past the supported window", year);
            return Err(DateTimeError::YearNotBefore2100);
        }
        if month < 1 || month > 12 {
            return Err(DateTimeError::InvalidDateTime);
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(DateTimeError::InvalidDateTime);
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(DateTimeError::InvalidDateTime);
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Parses the C toolchain build timestamp strings.
    ///
    /// `date` follows the `__DATE__` format `"Mmm dd yyyy"` (single-digit
    /// days padded with a space) and `time` follows the `__TIME__` format
    /// `"hh:mm:ss"`.
    pub fn from_build_timestamp(date: &str, time: &str) -> Result<Self, DateTimeError> {
        fn digit(b: u8) -> Result<u8, DateTimeError> {
            if b.is_ascii_digit() {
                Ok(b - b'0')
            } else {
                Err(DateTimeError::InvalidDateTime)
            }
        }

        let d = date.as_bytes();
        let t = time.as_bytes();
        if d.len() != 11 || d[3] != b' ' || d[6] != b' ' {
            return Err(DateTimeError::InvalidDateTime);
        }
        if t.len() != 8 || t[2] != b':' || t[5] != b':' {
            return Err(DateTimeError::InvalidDateTime);
        }

        let month = match &d[0..3] {
            b"Jan" => 1,
            b"Feb" => 2,
            b"Mar" => 3,
            b"Apr" => 4,
            b"May" => 5,
            b"Jun" => 6,
            b"Jul" => 7,
            b"Aug" => 8,
            b"Sep" => 9,
            b"Oct" => 10,
            b"Nov" => 11,
            b"Dec" => 12,
            _ => return Err(DateTimeError::InvalidDateTime),
        };
        let day = if d[4] == b' ' {
            digit(d[5])?
        } else {
            10 * digit(d[4])? + digit(d[5])?
        };
        let year = 1000 * u16::from(digit(d[7])?)
            + 100 * u16::from(digit(d[8])?)
            + 10 * u16::from(digit(d[9])?)
            + u16::from(digit(d[10])?);
        let hour = 10 * digit(t[0])? + digit(t[1])?;
        let minute = 10 * digit(t[3])? + digit(t[4])?;
        let second = 10 * digit(t[6])? + digit(t[7])?;

        Self::new(year, month, day, hour, minute, second)
    }

    /// Year in 2000-2099.
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Month in 1-12.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Day of month in 1-31, valid for the month and year.
    pub fn day(&self) -> u8 {
        self.day
    }

    /// Hour in 0-23.
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute in 0-59.
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Second in 0-59.
    pub fn second(&self) -> u8 {
        self.second
    }

    /// Encodes the value into the seven on-wire registers.
    ///
    /// Bit 7 of the seconds byte is left clear, so writing the result
    /// restarts a halted oscillator. Hours are encoded in 24-hour form and
    /// the day-of-week register gets a fixed placeholder.
    pub fn to_registers(&self) -> [u8; 7] {
        [
            bcd_encode(self.second) & SECONDS_MASK,
            bcd_encode(self.minute),
            bcd_encode(self.hour),
            DAY_OF_WEEK_PLACEHOLDER,
            bcd_encode(self.day),
            bcd_encode(self.month),
            bcd_encode(self.year.saturating_sub(2000) as u8),
        ]
    }

    /// Decodes the seven on-wire registers, masking the clock-halt flag,
    /// the 12/24-hour mode bit and the reserved month bits.
    pub fn from_registers(raw: [u8; 7]) -> Result<Self, DateTimeError> {
        Self::new(
            2000 + u16::from(bcd_decode(raw[6])),
            bcd_decode(raw[5] & MONTH_MASK),
            bcd_decode(raw[4]),
            bcd_decode(raw[2] & HOURS_MASK),
            bcd_decode(raw[1]),
            bcd_decode(raw[0] & SECONDS_MASK),
        )
    }

    /// Seconds since the unix epoch (1970-01-01T00:00:00).
    pub fn to_unix_seconds(&self) -> u32 {
        let mut days: u32 = 0;
        for year in 2000..self.year {
            days += if is_leap_year(year) { 366 } else { 365 };
        }
        for month in 1..self.month {
            days += u32::from(days_in_month(self.year, month));
        }
        days += u32::from(self.day) - 1;
        days * 86_400
            + u32::from(self.hour) * 3_600
            + u32::from(self.minute) * 60
            + u32::from(self.second)
            + UNIX_EPOCH_2000
    }

    /// The exact inverse of [`to_unix_seconds`](Self::to_unix_seconds) over
    /// the supported window. Timestamps outside the window are clamped to
    /// its nearest end.
    pub fn from_unix_seconds(timestamp: u32) -> Self {
        let since_epoch = timestamp.clamp(UNIX_EPOCH_2000, UNIX_WINDOW_END) - UNIX_EPOCH_2000;
        let mut days = since_epoch / 86_400;
        let rem = since_epoch % 86_400;

        let mut year: u16 = 2000;
        loop {
            let in_year = if is_leap_year(year) { 366 } else { 365 };
            if days < in_year {
                break;
            }
            days -= in_year;
            year += 1;
        }
        let mut month: u8 = 1;
        loop {
            let in_month = u32::from(days_in_month(year, month));
            if days < in_month {
                break;
            }
            days -= in_month;
            month += 1;
        }

        Self {
            year,
            month,
            day: days as u8 + 1,
            hour: (rem / 3_600) as u8,
            minute: (rem % 3_600 / 60) as u8,
            second: (rem % 60) as u8,
        }
    }

    /// Shifts the instant by a signed number of seconds.
    ///
    /// Negative deltas clamp at the epoch floor instead of wrapping;
    /// positive deltas saturate at the end of the window.
    pub fn offset_by_seconds(&self, delta: i32) -> Self {
        let timestamp = self.to_unix_seconds();
        let shifted = if delta.is_negative() {
            timestamp
                .saturating_sub(delta.unsigned_abs())
                .max(UNIX_EPOCH_2000)
        } else {
            timestamp.saturating_add(delta.unsigned_abs())
        };
        Self::from_unix_seconds(shifted)
    }
}

impl From<DateTime> for NaiveDateTime {
    fn from(value: DateTime) -> Self {
        NaiveDate::from_ymd_opt(
            i32::from(value.year),
            u32::from(value.month),
            u32::from(value.day),
        )
        .and_then(|date| {
            date.and_hms_opt(
                u32::from(value.hour),
                u32::from(value.minute),
                u32::from(value.second),
            )
        })
        .expect("DateTime is validated on construction")
    }
}

impl TryFrom<NaiveDateTime> for DateTime {
    type Error = DateTimeError;

    fn try_from(value: NaiveDateTime) -> Result<Self, Self::Error> {
        let year = u16::try_from(value.year()).map_err(|_| DateTimeError::YearNotAfter1999)?;
        Self::new(
            year,
            value.month() as u8,
            value.day() as u8,
            value.hour() as u8,
            value.minute() as u8,
            value.second() as u8,
        )
    }
}
