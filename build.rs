use std::{env, error::Error, fs, path::Path};

use serde::Deserialize;

const CONFIG_FILE: &str = "cfg.toml";
const EXAMPLE_CONFIG_FILE: &str = "cfg.toml.example";

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_chip")]
    chip: String,
    api_key: String,
    wifi_ssid: String,
    #[serde(default)]
    wifi_psk: String,
    api_host: String,
    #[serde(default = "default_port")]
    api_port: u32,
    display: RawDisplay,
}

#[derive(Deserialize)]
struct RawDisplay {
    panel: String,
    width: u16,
    height: u16,
    #[serde(default = "sentinel")]
    address: i32,
    #[serde(default)]
    flip_180: bool,
    #[serde(default)]
    invert: bool,
    #[serde(default = "default_true")]
    use_hw_i2c: bool,
    #[serde(default = "sentinel")]
    sda_pin: i32,
    #[serde(default = "sentinel")]
    scl_pin: i32,
    #[serde(default = "sentinel")]
    reset_pin: i32,
    #[serde(default = "default_true")]
    use_backbuffer: bool,
    backbuffer_size: Option<usize>,
}

fn default_chip() -> String {
    "esp32".into()
}

fn default_port() -> u32 {
    443
}

fn default_true() -> bool {
    true
}

fn sentinel() -> i32 {
    -1
}

fn chip_variant(name: &str) -> Result<&'static str, Box<dyn Error>> {
    match name.to_ascii_lowercase().as_str() {
        "esp32" => Ok("Chip::Esp32"),
        "esp32c3" | "esp32-c3" => Ok("Chip::Esp32C3"),
        "esp32s3" | "esp32-s3" => Ok("Chip::Esp32S3"),
        other => Err(format!("unknown chip {other:?} in {CONFIG_FILE}").into()),
    }
}

fn panel_variant(name: &str) -> Result<&'static str, Box<dyn Error>> {
    match name.to_ascii_lowercase().trim_start_matches("oled_") {
        "128x128" => Ok("PanelKind::Oled128x128"),
        "128x32" => Ok("PanelKind::Oled128x32"),
        "128x64" => Ok("PanelKind::Oled128x64"),
        "132x64" => Ok("PanelKind::Oled132x64"),
        "64x32" => Ok("PanelKind::Oled64x32"),
        "96x16" => Ok("PanelKind::Oled96x16"),
        "72x40" => Ok("PanelKind::Oled72x40"),
        other => Err(format!("unknown display panel {other:?} in {CONFIG_FILE}").into()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Tell Cargo to rerun if toml changes
    println!("cargo:rerun-if-changed={CONFIG_FILE}");
    println!("cargo:rerun-if-changed={EXAMPLE_CONFIG_FILE}");

    let source = if Path::new(CONFIG_FILE).exists() {
        CONFIG_FILE
    } else {
        println!(
            "cargo:warning={CONFIG_FILE} not found, building with {EXAMPLE_CONFIG_FILE} placeholders"
        );
        EXAMPLE_CONFIG_FILE
    };

    // Read and parse; a missing api_key, wifi_ssid or api_host fails here
    let toml_str = fs::read_to_string(source)?;
    let raw: RawConfig = toml::from_str(&toml_str)?;
    let display = &raw.display;

    let size_bytes = display.backbuffer_size.unwrap_or_else(|| {
        (u32::from(display.width) * u32::from(display.height)).div_ceil(8) as usize
    });

    // Generate Rust code
    let code = format!(
        r#"
        pub const CONFIG: ConfigBundle = ConfigBundle {{
            chip: {chip},
            identity: BoardIdentity {{
                api_key: {key:?},
            }},
            network: NetworkCredentials {{
                ssid: {ssid:?},
                passphrase: {psk:?},
            }},
            endpoint: RemoteEndpoint {{
                host: {host:?},
                port: {port},
            }},
            geometry: DisplayGeometry {{
                width: {width},
                height: {height},
                address: address({address}),
                flip_180: {flip},
                invert: {invert},
            }},
            panel: {panel},
            bus: {bus},
            pins: PinAssignment {{
                sda: pin({sda}, PinSelect::UseDefault),
                scl: pin({scl}, PinSelect::UseDefault),
                reset: pin({reset}, PinSelect::Disabled),
            }},
            frame_buffer: FrameBufferPolicy {{
                enabled: {fb_enabled},
                size_bytes: {fb_size},
            }},
        }};
    "#,
        chip = chip_variant(&raw.chip)?,
        key = raw.api_key,
        ssid = raw.wifi_ssid,
        psk = raw.wifi_psk,
        host = raw.api_host,
        port = raw.api_port,
        width = display.width,
        height = display.height,
        address = display.address,
        flip = display.flip_180,
        invert = display.invert,
        panel = panel_variant(&display.panel)?,
        bus = if display.use_hw_i2c {
            "BusMode::Hardware"
        } else {
            "BusMode::BitBang"
        },
        sda = display.sda_pin,
        scl = display.scl_pin,
        reset = display.reset_pin,
        fb_enabled = display.use_backbuffer,
        fb_size = size_bytes,
    );

    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("config.rs");
    fs::write(dest_path, code)?;
    Ok(())
}
