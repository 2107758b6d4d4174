#![no_std]
#![no_main]

use static_cell::StaticCell;

use embassy_executor::Spawner;
use embassy_net::Stack;
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{self as hal};
use esp_println::logger::init_logger;

use hal::{rng::Rng, timer::timg::TimerGroup};

extern crate alloc;

mod wifi;

use sensor_board::config::{self, ConfigBundle, DisplaySlice};
use sensor_board::constants::{HEAP_SIZE, VERSION};
use sensor_board::display::BACKBUFFER_LEN;
use sensor_board::validate::{lint, validate};
use wifi::Wifi;

esp_bootloader_esp_idf::esp_app_desc!();

static BACKBUFFER: StaticCell<[u8; BACKBUFFER_LEN]> = StaticCell::new();

const STATUS_INTERVAL_SECS: u64 = 60;

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    init_logger(log::LevelFilter::Info);
    log::info!("Sensor board firmware v{}", VERSION);

    // Nothing touches the radio or the bus until the configuration is known good
    let config = config::load();
    if let Err(errors) = validate(config) {
        for error in errors.iter() {
            log::error!("cfg.toml: {}", error);
        }
        panic!("invalid configuration, {} violation(s)", errors.len());
    }
    for warning in lint(config) {
        log::warn!("cfg.toml: {}", warning);
    }

    let peripherals = esp_hal::init(esp_hal::Config::default());

    let rng = Rng::new(peripherals.RNG);

    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let timg1 = TimerGroup::new(peripherals.TIMG1);

    esp_hal_embassy::init(timg0.timer0);

    // possibly high transient required at init
    // https://github.com/esp-rs/esp-hal/issues/1626
    Timer::after(Duration::from_millis(1000)).await;

    let wifi = Wifi::new(
        peripherals.WIFI,
        timg1.timer0,
        peripherals.RADIO_CLK,
        rng,
        spawner,
        config.network(),
    )
    .await
    .unwrap();

    wifi.connect().await.unwrap();

    let https = config.https();
    match https.endpoint.base_url() {
        Some(url) => log::info!("API endpoint {} ({:?})", url, https.identity),
        None => log::warn!("API endpoint does not fit the URL buffer"),
    }

    let backbuffer = reserve_backbuffer(config);
    describe_display(&config.display(), backbuffer.as_deref());

    spawner.spawn(main_task(wifi.stack)).ok();
}

fn reserve_backbuffer(config: &ConfigBundle) -> Option<&'static mut [u8]> {
    if !config.frame_buffer.enabled {
        log::info!("Back buffer disabled, drawing straight to the panel");
        return None;
    }
    Some(BACKBUFFER.init([0; BACKBUFFER_LEN]).as_mut_slice())
}

fn describe_display(display: &DisplaySlice<'_>, backbuffer: Option<&[u8]>) {
    log::info!(
        "Display {:?} {}x{} at {:?} over {:?} I2C, flip={} invert={}",
        display.panel,
        display.geometry.width,
        display.geometry.height,
        display.geometry.address,
        display.bus,
        display.geometry.flip_180,
        display.geometry.invert,
    );
    log::info!(
        "Display pins sda={:?} scl={:?} reset={:?}, back buffer {} bytes",
        display.pins.sda,
        display.pins.scl,
        display.pins.reset,
        backbuffer.map_or(0, <[u8]>::len),
    );
}

#[embassy_executor::task]
async fn main_task(stack: Stack<'static>) {
    loop {
        match stack.config_v4() {
            Some(config) if stack.is_link_up() => log::info!("Online as {}", config.address),
            _ => log::warn!("Network link down, waiting for reconnect"),
        }

        Timer::after(Duration::from_secs(STATUS_INTERVAL_SECS)).await;
    }
}
