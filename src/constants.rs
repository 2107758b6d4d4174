/// Current firmware version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of the heap in DRAM (internal memory)
pub const HEAP_SIZE: usize = 72 * 1024;

/// Maximum SSID length in bytes (IEEE 802.11)
pub const MAX_SSID_LEN: usize = 32;
/// Minimum WPA2 passphrase length in bytes
pub const MIN_PASSPHRASE_LEN: usize = 8;
/// Maximum WPA2 passphrase length in bytes
pub const MAX_PASSPHRASE_LEN: usize = 63;

/// Longest DNS name accepted as the API host
pub const MAX_HOST_LEN: usize = 253;
/// Capacity of the rendered `https://host:port` base URL
pub const BASE_URL_CAPACITY: usize = 272;
/// Port implied by the https scheme
pub const HTTPS_PORT: u32 = 443;

/// Highest 7-bit I2C address
pub const MAX_I2C_ADDRESS: u8 = 0x7F;

/// Upper bound on distinct violations reported by one validation run
pub const MAX_CONFIG_ERRORS: usize = 16;
/// Upper bound on wiring warnings reported by one lint run
pub const MAX_CONFIG_WARNINGS: usize = 4;

/// Delay before re-trying to join the Wi-Fi network
pub const WIFI_RECONNECT_DELAY_MS: u64 = 5000;
/// Timeout for a single Wi-Fi association attempt
pub const WIFI_CONNECT_TIMEOUT_SECS: u64 = 30;
