//! Per-chip GPIO limits used when checking pin assignments.

/// Chip the firmware is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip {
    Esp32,
    Esp32C3,
    Esp32S3,
}

/// GPIO constraints of a target board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareLimits {
    /// Highest GPIO number the chip exposes
    pub max_gpio: u8,
    /// Pins wired to the SPI flash; driving them bricks the boot
    pub reserved_gpio: &'static [u8],
}

impl HardwareLimits {
    pub const ESP32: Self = Self {
        max_gpio: 39,
        reserved_gpio: &[6, 7, 8, 9, 10, 11],
    };

    pub const ESP32_C3: Self = Self {
        max_gpio: 21,
        reserved_gpio: &[12, 13, 14, 15, 16, 17],
    };

    pub const ESP32_S3: Self = Self {
        max_gpio: 48,
        reserved_gpio: &[26, 27, 28, 29, 30, 31, 32],
    };

    pub fn is_usable(&self, gpio: u8) -> bool {
        gpio <= self.max_gpio && !self.reserved_gpio.contains(&gpio)
    }
}

impl Chip {
    pub const fn limits(self) -> HardwareLimits {
        match self {
            Chip::Esp32 => HardwareLimits::ESP32,
            Chip::Esp32C3 => HardwareLimits::ESP32_C3,
            Chip::Esp32S3 => HardwareLimits::ESP32_S3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_pins_are_not_usable() {
        let limits = Chip::Esp32.limits();
        assert!(limits.is_usable(21));
        assert!(!limits.is_usable(6));
        assert!(!limits.is_usable(11));
        assert!(!limits.is_usable(40));
    }

    #[test]
    fn c3_has_fewer_pins() {
        let limits = Chip::Esp32C3.limits();
        assert!(limits.is_usable(8));
        assert!(!limits.is_usable(22));
        assert!(!limits.is_usable(12));
    }
}
