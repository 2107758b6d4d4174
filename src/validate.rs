//! Start-up validation of the compiled-in configuration.
//!
//! [`validate`] checks the type and range rules of every field and reports
//! all violations at once, so a bad `cfg.toml` can be fixed in a single
//! pass. It is pure: no logging, no I/O, same answer on every call.
//!
//! [`lint`] flags wiring that passes those rules but is unlikely to drive
//! a panel; the firmware logs its findings and boots anyway.

use core::fmt;

use heapless::Vec;

use crate::config::ConfigBundle;
use crate::constants::{
    MAX_CONFIG_ERRORS, MAX_CONFIG_WARNINGS, MAX_HOST_LEN, MAX_I2C_ADDRESS, MAX_PASSPHRASE_LEN,
    MAX_SSID_LEN, MIN_PASSPHRASE_LEN,
};
use crate::display::{FrameBufferPolicy, I2cAddress, PinSelect};
use crate::target::HardwareLimits;

/// Display line a pin violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    Sda,
    Scl,
    Reset,
}

/// A configuration value outside its allowed type or range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPort,
    InvalidAddress,
    InvalidSSID,
    MissingCredential,
    BufferSizeMismatch,
    InvalidPassphrase,
    InvalidHost,
    InvalidGeometry,
    InvalidPin(PinRole),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => f.write_str("api_port must be in 1..=65535"),
            ConfigError::InvalidAddress => {
                f.write_str("display address must be a 7-bit I2C address or auto-detect")
            }
            ConfigError::InvalidSSID => f.write_str("wifi_ssid must be 1 to 32 bytes"),
            ConfigError::MissingCredential => f.write_str("api_key is empty"),
            ConfigError::BufferSizeMismatch => {
                f.write_str("backbuffer_size must equal width * height / 8")
            }
            ConfigError::InvalidPassphrase => {
                f.write_str("wifi_psk must be empty or 8 to 63 bytes")
            }
            ConfigError::InvalidHost => {
                f.write_str("api_host must be a bare hostname without scheme or path")
            }
            ConfigError::InvalidGeometry => f.write_str("display width and height must be > 0"),
            ConfigError::InvalidPin(role) => write!(f, "{:?} pin is not usable on this chip", role),
        }
    }
}

/// Every violation found by one [`validate`] run. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors {
    errors: Vec<ConfigError, MAX_CONFIG_ERRORS>,
}

impl ConfigErrors {
    pub fn contains(&self, error: &ConfigError) -> bool {
        self.errors.contains(error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn first(&self) -> Option<&ConfigError> {
        self.errors.first()
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Valid but suspicious wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Width and height differ from the panel's native resolution
    PanelMismatch,
    /// SDA and SCL on the same GPIO
    PinConflict,
    /// A bus line marked as not connected
    BusPinDisabled(PinRole),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::PanelMismatch => {
                f.write_str("display width and height do not match the panel")
            }
            ConfigWarning::PinConflict => f.write_str("SDA and SCL share the same GPIO"),
            ConfigWarning::BusPinDisabled(role) => {
                write!(f, "{:?} pin is disabled, the bus cannot run", role)
            }
        }
    }
}

#[derive(Default)]
struct Collector {
    errors: Vec<ConfigError, MAX_CONFIG_ERRORS>,
}

impl Collector {
    fn check(&mut self, ok: bool, error: ConfigError) {
        if !ok && !self.errors.contains(&error) {
            // capacity covers every distinct variant
            self.errors.push(error).ok();
        }
    }

    fn finish(self) -> Result<(), ConfigErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigErrors {
                errors: self.errors,
            })
        }
    }
}

/// Validates `bundle` against the GPIO limits of its own chip.
pub fn validate(bundle: &ConfigBundle) -> Result<(), ConfigErrors> {
    validate_with(bundle, &bundle.chip.limits())
}

/// Validates `bundle` against caller-supplied hardware limits.
pub fn validate_with(bundle: &ConfigBundle, limits: &HardwareLimits) -> Result<(), ConfigErrors> {
    let mut c = Collector::default();

    c.check(
        !bundle.identity.api_key.is_empty(),
        ConfigError::MissingCredential,
    );

    let network = &bundle.network;
    c.check(
        (1..=MAX_SSID_LEN).contains(&network.ssid.len()),
        ConfigError::InvalidSSID,
    );
    c.check(
        network.is_open()
            || (MIN_PASSPHRASE_LEN..=MAX_PASSPHRASE_LEN).contains(&network.passphrase.len()),
        ConfigError::InvalidPassphrase,
    );

    c.check(is_bare_host(bundle.endpoint.host), ConfigError::InvalidHost);
    c.check(
        (1..=u32::from(u16::MAX)).contains(&bundle.endpoint.port),
        ConfigError::InvalidPort,
    );

    let geometry = &bundle.geometry;
    c.check(
        geometry.width > 0 && geometry.height > 0,
        ConfigError::InvalidGeometry,
    );

    c.check(
        match geometry.address {
            I2cAddress::AutoDetect => true,
            I2cAddress::Explicit(address) => address <= MAX_I2C_ADDRESS,
        },
        ConfigError::InvalidAddress,
    );

    let pins = &bundle.pins;
    c.check(pin_ok(pins.sda, limits), ConfigError::InvalidPin(PinRole::Sda));
    c.check(pin_ok(pins.scl, limits), ConfigError::InvalidPin(PinRole::Scl));
    c.check(
        pin_ok(pins.reset, limits),
        ConfigError::InvalidPin(PinRole::Reset),
    );

    c.check(
        bundle.frame_buffer.matches(geometry),
        ConfigError::BufferSizeMismatch,
    );

    c.finish()
}

/// Wiring problems that [`validate`] accepts. Empty when nothing looks off.
pub fn lint(bundle: &ConfigBundle) -> Vec<ConfigWarning, MAX_CONFIG_WARNINGS> {
    let mut warnings = Vec::new();
    let pins = &bundle.pins;

    // capacity covers every variant
    if !bundle.panel.fits(&bundle.geometry) {
        warnings.push(ConfigWarning::PanelMismatch).ok();
    }
    if matches!((pins.sda.gpio(), pins.scl.gpio()), (Some(sda), Some(scl)) if sda == scl) {
        warnings.push(ConfigWarning::PinConflict).ok();
    }
    for (pin, role) in [(pins.sda, PinRole::Sda), (pins.scl, PinRole::Scl)] {
        if pin == PinSelect::Disabled {
            warnings.push(ConfigWarning::BusPinDisabled(role)).ok();
        }
    }

    warnings
}

// Sentinels are always acceptable; explicit GPIOs must exist on the chip.
fn pin_ok(pin: PinSelect, limits: &HardwareLimits) -> bool {
    pin.gpio().map_or(true, |gpio| limits.is_usable(gpio))
}

fn is_bare_host(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= MAX_HOST_LEN
        && !host.contains("://")
        && !host.contains('/')
        && !host.chars().any(char::is_whitespace)
}

/// Size the back buffer must have for `bundle`, if it uses one.
pub fn required_buffer_size(bundle: &ConfigBundle) -> Option<usize> {
    bundle
        .frame_buffer
        .enabled
        .then(|| FrameBufferPolicy::expected_size(&bundle.geometry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoardIdentity, NetworkCredentials, RemoteEndpoint};
    use crate::display::{BusMode, DisplayGeometry, PanelKind, PinAssignment};
    use crate::target::Chip;

    fn valid() -> ConfigBundle {
        ConfigBundle {
            chip: Chip::Esp32,
            identity: BoardIdentity {
                api_key: "board-api-key",
            },
            network: NetworkCredentials {
                ssid: "wifi-name",
                passphrase: "wifi-password",
            },
            endpoint: RemoteEndpoint {
                host: "sensy32.io",
                port: 443,
            },
            geometry: DisplayGeometry {
                width: 128,
                height: 64,
                address: I2cAddress::AutoDetect,
                flip_180: false,
                invert: false,
            },
            panel: PanelKind::Oled128x64,
            bus: BusMode::Hardware,
            pins: PinAssignment {
                sda: PinSelect::UseDefault,
                scl: PinSelect::UseDefault,
                reset: PinSelect::Disabled,
            },
            frame_buffer: FrameBufferPolicy {
                enabled: true,
                size_bytes: 1024,
            },
        }
    }

    fn only(bundle: &ConfigBundle, expected: ConfigError) {
        let errors = validate(bundle).unwrap_err();
        assert_eq!(errors.len(), 1, "unexpected errors: {}", errors);
        assert_eq!(errors.first(), Some(&expected));
    }

    #[test]
    fn valid_bundle_passes() {
        assert_eq!(validate(&valid()), Ok(()));
        assert!(lint(&valid()).is_empty());
    }

    #[test]
    fn port_out_of_range() {
        let mut bundle = valid();
        bundle.endpoint.port = 0;
        only(&bundle, ConfigError::InvalidPort);

        bundle.endpoint.port = 65536;
        only(&bundle, ConfigError::InvalidPort);

        bundle.endpoint.port = 65535;
        assert!(validate(&bundle).is_ok());
    }

    #[test]
    fn ssid_length() {
        let mut bundle = valid();
        bundle.network.ssid = "";
        only(&bundle, ConfigError::InvalidSSID);

        bundle.network.ssid = "abcdefghijklmnopqrstuvwxyz0123456";
        only(&bundle, ConfigError::InvalidSSID);

        bundle.network.ssid = "abcdefghijklmnopqrstuvwxyz012345";
        assert!(validate(&bundle).is_ok());
    }

    #[test]
    fn empty_api_key() {
        let mut bundle = valid();
        bundle.identity.api_key = "";
        only(&bundle, ConfigError::MissingCredential);
    }

    #[test]
    fn passphrase_length() {
        let mut bundle = valid();
        bundle.network.passphrase = "short12";
        only(&bundle, ConfigError::InvalidPassphrase);

        bundle.network.passphrase = "";
        assert!(validate(&bundle).is_ok());
    }

    #[test]
    fn buffer_size_must_match_geometry() {
        let mut bundle = valid();
        bundle.frame_buffer.size_bytes = 1023;
        only(&bundle, ConfigError::BufferSizeMismatch);

        bundle.frame_buffer.enabled = false;
        assert!(validate(&bundle).is_ok());
        assert_eq!(required_buffer_size(&bundle), None);

        bundle.frame_buffer.enabled = true;
        bundle.frame_buffer.size_bytes = 1024;
        assert_eq!(required_buffer_size(&bundle), Some(1024));
    }

    #[test]
    fn zero_width_panel_reports_buffer_mismatch_too() {
        let mut bundle = valid();
        bundle.geometry.width = 0;

        let errors = validate(&bundle).unwrap_err();
        assert_eq!(errors.len(), 2, "unexpected errors: {}", errors);
        assert!(errors.contains(&ConfigError::InvalidGeometry));
        assert!(errors.contains(&ConfigError::BufferSizeMismatch));
    }

    #[test]
    fn address_range() {
        let mut bundle = valid();
        bundle.geometry.address = I2cAddress::from_raw(0xFF).unwrap();
        assert!(validate(&bundle).is_ok());

        bundle.geometry.address = I2cAddress::Explicit(0x3C);
        assert!(validate(&bundle).is_ok());

        bundle.geometry.address = I2cAddress::Explicit(0x80);
        only(&bundle, ConfigError::InvalidAddress);
    }

    #[test]
    fn host_must_be_bare() {
        let mut bundle = valid();
        bundle.endpoint.host = "https://sensy32.io";
        only(&bundle, ConfigError::InvalidHost);

        bundle.endpoint.host = "";
        only(&bundle, ConfigError::InvalidHost);
    }

    #[test]
    fn pins_checked_against_chip() {
        let mut bundle = valid();
        bundle.pins.sda = PinSelect::Explicit(21);
        bundle.pins.scl = PinSelect::Explicit(22);
        bundle.pins.reset = PinSelect::Explicit(16);
        assert!(validate(&bundle).is_ok());

        bundle.pins.sda = PinSelect::Explicit(6);
        only(&bundle, ConfigError::InvalidPin(PinRole::Sda));

        bundle.chip = Chip::Esp32C3;
        bundle.pins.sda = PinSelect::Explicit(8);
        bundle.pins.reset = PinSelect::Disabled;
        only(&bundle, ConfigError::InvalidPin(PinRole::Scl));
    }

    #[test]
    fn custom_limits() {
        let mut bundle = valid();
        bundle.pins.reset = PinSelect::Explicit(4);

        let limits = HardwareLimits {
            max_gpio: 29,
            reserved_gpio: &[4],
        };
        let errors = validate_with(&bundle, &limits).unwrap_err();
        assert!(errors.contains(&ConfigError::InvalidPin(PinRole::Reset)));
    }

    #[test]
    fn shared_bus_pin_is_valid_but_linted() {
        let mut bundle = valid();
        bundle.pins.sda = PinSelect::Explicit(21);
        bundle.pins.scl = PinSelect::Explicit(21);

        assert_eq!(validate(&bundle), Ok(()));
        assert_eq!(lint(&bundle).as_slice(), &[ConfigWarning::PinConflict]);
    }

    #[test]
    fn off_panel_geometry_is_valid_but_linted() {
        let mut bundle = valid();
        bundle.geometry.height = 32;
        bundle.frame_buffer.size_bytes = 512;

        assert_eq!(validate(&bundle), Ok(()));
        assert_eq!(lint(&bundle).as_slice(), &[ConfigWarning::PanelMismatch]);
    }

    #[test]
    fn disabled_bus_line_is_valid_but_linted() {
        let mut bundle = valid();
        bundle.pins.scl = PinSelect::Disabled;

        assert_eq!(validate(&bundle), Ok(()));
        assert_eq!(
            lint(&bundle).as_slice(),
            &[ConfigWarning::BusPinDisabled(PinRole::Scl)]
        );
    }

    #[test]
    fn reports_every_violation() {
        let mut bundle = valid();
        bundle.identity.api_key = "";
        bundle.network.ssid = "";
        bundle.endpoint.port = 0;
        bundle.geometry.address = I2cAddress::Explicit(0x80);
        bundle.frame_buffer.size_bytes = 1023;

        let errors = validate(&bundle).unwrap_err();
        assert_eq!(errors.len(), 5);
        for expected in [
            ConfigError::MissingCredential,
            ConfigError::InvalidSSID,
            ConfigError::InvalidPort,
            ConfigError::InvalidAddress,
            ConfigError::BufferSizeMismatch,
        ] {
            assert!(errors.contains(&expected), "missing {:?}", expected);
        }
        assert_eq!(errors.first(), Some(&ConfigError::MissingCredential));
    }

    #[test]
    fn display_joins_violations() {
        let mut bundle = valid();
        bundle.identity.api_key = "";
        bundle.endpoint.port = 0;

        let errors = validate(&bundle).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "api_key is empty; api_port must be in 1..=65535"
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let mut bundle = valid();
        assert_eq!(validate(&bundle), validate(&bundle));

        bundle.endpoint.port = 0;
        bundle.network.ssid = "";
        assert_eq!(validate(&bundle), validate(&bundle));
    }
}
