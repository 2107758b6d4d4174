use core::fmt::{self, Write};

use heapless::String;

use crate::constants::{BASE_URL_CAPACITY, HTTPS_PORT};
use crate::display::{
    BusMode, DisplayGeometry, FrameBufferPolicy, I2cAddress, PanelKind, PinAssignment, PinSelect,
};
use crate::target::Chip;

/// Credential identifying the board towards the remote API.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoardIdentity {
    // Bearer token sent with every API request
    pub api_key: &'static str,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NetworkCredentials {
    // Wi-Fi SSID to connect to
    pub ssid: &'static str,

    // Wi-Fi pre-shared key, empty for an open network
    pub passphrase: &'static str,
}

impl NetworkCredentials {
    pub fn is_open(&self) -> bool {
        self.passphrase.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteEndpoint {
    // API hostname, without scheme or path
    pub host: &'static str,

    // API port (443 for https)
    pub port: u32,
}

impl RemoteEndpoint {
    /// Renders `https://host`, appending `:port` unless it is the https default.
    /// Returns `None` if the result does not fit the URL buffer.
    pub fn base_url(&self) -> Option<String<BASE_URL_CAPACITY>> {
        let mut url = String::new();
        write!(url, "https://{}", self.host).ok()?;
        if self.port != HTTPS_PORT {
            write!(url, ":{}", self.port).ok()?;
        }
        Some(url)
    }
}

/// Every value the firmware needs at start-up, fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigBundle {
    pub chip: Chip,
    pub identity: BoardIdentity,
    pub network: NetworkCredentials,
    pub endpoint: RemoteEndpoint,
    pub geometry: DisplayGeometry,
    pub panel: PanelKind,
    pub bus: BusMode,
    pub pins: PinAssignment,
    pub frame_buffer: FrameBufferPolicy,
}

/// What the HTTPS client needs: where to connect and which key to present.
#[derive(Debug, Clone, Copy)]
pub struct HttpsSlice<'a> {
    pub endpoint: &'a RemoteEndpoint,
    pub identity: &'a BoardIdentity,
}

/// What the OLED driver needs to bring up the bus and the panel.
#[derive(Debug, Clone, Copy)]
pub struct DisplaySlice<'a> {
    pub geometry: &'a DisplayGeometry,
    pub pins: &'a PinAssignment,
    pub frame_buffer: &'a FrameBufferPolicy,
    pub bus: BusMode,
    pub panel: PanelKind,
}

impl ConfigBundle {
    pub fn network(&self) -> &NetworkCredentials {
        &self.network
    }

    pub fn https(&self) -> HttpsSlice<'_> {
        HttpsSlice {
            endpoint: &self.endpoint,
            identity: &self.identity,
        }
    }

    pub fn display(&self) -> DisplaySlice<'_> {
        DisplaySlice {
            geometry: &self.geometry,
            pins: &self.pins,
            frame_buffer: &self.frame_buffer,
            bus: self.bus,
            panel: self.panel,
        }
    }
}

impl fmt::Debug for BoardIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardIdentity")
            .field("api_key", &"***")
            .finish()
    }
}

impl fmt::Debug for NetworkCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passphrase = if self.is_open() { "" } else { "***" };
        f.debug_struct("NetworkCredentials")
            .field("ssid", &self.ssid)
            .field("passphrase", &passphrase)
            .finish()
    }
}

// Raw cfg.toml integers go through the same mapping the library exposes;
// a value that fits no variant stops const evaluation, i.e. the build.
const fn address(raw: i32) -> I2cAddress {
    match I2cAddress::from_raw(raw) {
        Some(address) => address,
        None => panic!("display address in cfg.toml does not fit in a byte"),
    }
}

const fn pin(raw: i32, sentinel: PinSelect) -> PinSelect {
    match PinSelect::from_raw(raw, sentinel) {
        Some(pin) => pin,
        None => panic!("pin in cfg.toml is neither -1 nor a GPIO number"),
    }
}

// config values are generated at compile time
include!(concat!(env!("OUT_DIR"), "/config.rs"));

static BUNDLE: ConfigBundle = CONFIG;

/// Returns the compiled-in configuration. There is no I/O and nothing to
/// fail at runtime; a `cfg.toml` missing a required key does not build.
pub fn load() -> &'static ConfigBundle {
    log::debug!(
        "Loaded configuration for {:?}, endpoint {}:{}",
        BUNDLE.chip,
        BUNDLE.endpoint.host,
        BUNDLE.endpoint.port
    );
    &BUNDLE
}
