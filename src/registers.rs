//! Register map for the DS1307/DS3231 shared time-keeping registers.
//!
//! Both chips store the calendar in seven consecutive BCD-encoded registers
//! starting at offset 0x00. Only this shared base map is modelled here;
//! chip-specific registers (alarms, control, temperature) are out of scope.

use bitfield::bitfield;

/// Register addresses shared by the DS1307/DS3231 family.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59, bit 7 is the clock-halt flag)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (0-23, bit 6 selects 12-hour mode)
    Hours = 0x02,
    /// Day of week register (1-7, unused by this driver)
    Day = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12, upper bits reserved)
    Month = 0x05,
    /// Year register (0-99, offset from 2000)
    Year = 0x06,
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Raw seconds register with the clock-halt flag.
    ///
    /// On the DS1307 bit 7 halts the oscillator when set; the DS3231 keeps
    /// the bit reserved-as-zero, so a set bit always means "not running".
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Clock-halt flag (oscillator stopped when set)
    pub clock_halt, set_clock_halt: 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

#[cfg(feature = "defmt")]
impl defmt::Format for Seconds {
    fn format(&self, f: defmt::Formatter) {
        let seconds = 10 * self.ten_seconds() + self.seconds();
        defmt::write!(f, "Seconds({}s", seconds);
        if self.clock_halt() {
            defmt::write!(f, ", halted");
        }
        defmt::write!(f, ")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_register_conversions() {
        let seconds = Seconds::from(0x59);
        assert_eq!(seconds.ten_seconds(), 5);
        assert_eq!(seconds.seconds(), 9);
        assert!(!seconds.clock_halt());
        assert_eq!(u8::from(seconds), 0x59);

        let seconds = Seconds::from(0x00);
        assert_eq!(seconds.ten_seconds(), 0);
        assert_eq!(seconds.seconds(), 0);
        assert_eq!(u8::from(seconds), 0x00);
    }

    #[test]
    fn test_clock_halt_flag_does_not_disturb_digits() {
        let halted = Seconds::from(0xB0); // halt flag + 30 seconds
        assert!(halted.clock_halt());
        assert_eq!(halted.ten_seconds(), 3);
        assert_eq!(halted.seconds(), 0);

        let running = Seconds::from(0x30);
        assert!(!running.clock_halt());
        assert_eq!(running.ten_seconds(), halted.ten_seconds());
        assert_eq!(running.seconds(), halted.seconds());
    }

    #[test]
    fn test_seconds_register_bitfield_operations() {
        let mut seconds = Seconds::default();
        seconds.set_seconds(5);
        seconds.set_ten_seconds(3);
        seconds.set_clock_halt(true);
        assert_eq!(seconds.seconds(), 5);
        assert_eq!(seconds.ten_seconds(), 3);
        assert!(seconds.clock_halt());
        assert_eq!(u8::from(seconds), 0xB5);
    }

    #[test]
    fn test_register_addresses_match_the_base_map() {
        assert_eq!(RegAddr::Seconds as u8, 0x00);
        assert_eq!(RegAddr::Minutes as u8, 0x01);
        assert_eq!(RegAddr::Hours as u8, 0x02);
        assert_eq!(RegAddr::Day as u8, 0x03);
        assert_eq!(RegAddr::Date as u8, 0x04);
        assert_eq!(RegAddr::Month as u8, 0x05);
        assert_eq!(RegAddr::Year as u8, 0x06);
    }
}
