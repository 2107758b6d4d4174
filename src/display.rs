//! Display parameters handed to the OLED driver.
//!
//! Integer sentinels from `cfg.toml` (`-1` for "board default" or
//! "disabled", `0xFF` for "scan the bus") are turned into tagged variants
//! here so the driver never has to guess what a negative pin means.

use crate::config::CONFIG;

/// Length of the static back buffer, taken from the compiled-in configuration.
pub const BACKBUFFER_LEN: usize = CONFIG.frame_buffer.size_bytes;

/// I2C address of the display controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cAddress {
    /// Let the driver scan the usual controller addresses
    AutoDetect,
    Explicit(u8),
}

impl I2cAddress {
    /// Raw value used by the ss_oled family of drivers for auto-detection
    pub const AUTO_DETECT_RAW: i32 = 0xFF;

    /// Maps `-1` and `0xFF` to [`I2cAddress::AutoDetect`]. Values that do
    /// not fit in a byte return `None`.
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            -1 | Self::AUTO_DETECT_RAW => Some(I2cAddress::AutoDetect),
            0..=0xFE => Some(I2cAddress::Explicit(raw as u8)),
            _ => None,
        }
    }
}

/// GPIO selection for one display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinSelect {
    Explicit(u8),
    /// Use the bus default pins of the board
    UseDefault,
    /// Line not connected
    Disabled,
}

impl PinSelect {
    /// Negative raw values map to `sentinel`; values above 255 return `None`.
    pub const fn from_raw(raw: i32, sentinel: PinSelect) -> Option<Self> {
        if raw < 0 {
            Some(sentinel)
        } else if raw <= u8::MAX as i32 {
            Some(PinSelect::Explicit(raw as u8))
        } else {
            None
        }
    }

    pub const fn gpio(self) -> Option<u8> {
        match self {
            PinSelect::Explicit(gpio) => Some(gpio),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    pub sda: PinSelect,
    pub scl: PinSelect,
    pub reset: PinSelect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayGeometry {
    pub width: u16,
    pub height: u16,
    pub address: I2cAddress,
    /// Rotate the picture by 180 degrees
    pub flip_180: bool,
    /// Invert every pixel
    pub invert: bool,
}

impl DisplayGeometry {
    pub fn pixel_count(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }
}

/// Whether the driver renders into a RAM back buffer before pushing it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBufferPolicy {
    pub enabled: bool,
    pub size_bytes: usize,
}

impl FrameBufferPolicy {
    /// Bytes needed to hold `geometry` at one bit per pixel.
    pub fn expected_size(geometry: &DisplayGeometry) -> usize {
        geometry.pixel_count().div_ceil(8) as usize
    }

    pub fn matches(&self, geometry: &DisplayGeometry) -> bool {
        !self.enabled || self.size_bytes == Self::expected_size(geometry)
    }
}

/// How the I2C bus is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusMode {
    /// Dedicated I2C peripheral
    Hardware,
    /// Software I2C toggling GPIOs
    BitBang,
}

/// Panel families supported by the display driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Oled128x128,
    Oled128x32,
    Oled128x64,
    Oled132x64,
    Oled64x32,
    Oled96x16,
    Oled72x40,
}

impl PanelKind {
    /// Native (width, height) in pixels
    pub const fn native_size(self) -> (u16, u16) {
        match self {
            PanelKind::Oled128x128 => (128, 128),
            PanelKind::Oled128x32 => (128, 32),
            PanelKind::Oled128x64 => (128, 64),
            PanelKind::Oled132x64 => (132, 64),
            PanelKind::Oled64x32 => (64, 32),
            PanelKind::Oled96x16 => (96, 16),
            PanelKind::Oled72x40 => (72, 40),
        }
    }

    pub fn fits(self, geometry: &DisplayGeometry) -> bool {
        self.native_size() == (geometry.width, geometry.height)
    }
}
