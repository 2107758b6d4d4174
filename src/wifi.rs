use embassy_executor::Spawner;
use embassy_net::{Runner, Stack, StackResources};
use embassy_time::{with_timeout, Duration, Timer};

use esp_hal::{
    peripherals::{RADIO_CLK, WIFI},
    rng::Rng,
};
use esp_wifi::{
    wifi::{
        AuthMethod, ClientConfiguration, Configuration, WifiController, WifiDevice, WifiEvent,
        WifiState,
    },
    EspWifiController, EspWifiTimerSource,
};

use core::str::FromStr;
use heapless::String;
use log::info;
use static_cell::StaticCell;

use sensor_board::config::NetworkCredentials;
use sensor_board::constants::{VERSION, WIFI_CONNECT_TIMEOUT_SECS, WIFI_RECONNECT_DELAY_MS};

static RESOURCES: StaticCell<StackResources<5>> = StaticCell::new();
static CONTROLLER: StaticCell<EspWifiController<'static>> = StaticCell::new();

const HOSTNAME: &str = "sensor-board";

pub struct Wifi {
    pub stack: Stack<'static>,
}

#[derive(Debug)]
pub enum Error {
    WifiInitFailed,
    HostnameTooLong,
    SpawnFailed,
}

impl Wifi {
    pub async fn new(
        wifi: WIFI<'static>,
        timer: impl EspWifiTimerSource + 'static,
        radio_clk: RADIO_CLK<'static>,
        mut rng: Rng,
        spawner: Spawner,
        credentials: &'static NetworkCredentials,
    ) -> Result<Self, Error> {
        let seed = (rng.random() as u64) << 32 | rng.random() as u64;

        let init = esp_wifi::init(timer, rng, radio_clk).map_err(|_| Error::WifiInitFailed)?;
        let init = CONTROLLER.init(init);

        let (controller, interfaces) =
            esp_wifi::wifi::new(init, wifi).map_err(|_| Error::WifiInitFailed)?;

        let mut dhcp_config = embassy_net::DhcpConfig::default();
        dhcp_config.hostname =
            Some(String::<32>::from_str(HOSTNAME).map_err(|_| Error::HostnameTooLong)?);

        let config = embassy_net::Config::dhcpv4(dhcp_config);

        let resources = RESOURCES.init(StackResources::new());
        let (stack, runner) = embassy_net::new(interfaces.sta, config, resources, seed);

        spawner
            .spawn(connection(controller, credentials))
            .map_err(|_| Error::SpawnFailed)?;
        spawner
            .spawn(net_task(runner))
            .map_err(|_| Error::SpawnFailed)?;

        info!("Wi-Fi stack ready (firmware v{})", VERSION);

        Ok(Self { stack })
    }

    pub async fn connect(&self) -> Result<(), Error> {
        info!("Waiting for network stack to be ready...");
        loop {
            if self.stack.is_link_up() && self.stack.is_config_up() {
                break;
            }
            Timer::after(Duration::from_millis(500)).await;
        }

        info!("Waiting to get IP address...");
        loop {
            if let Some(config) = self.stack.config_v4() {
                info!("Got IP: {}", config.address);
                break;
            }
            Timer::after(Duration::from_millis(500)).await;
        }

        Ok(())
    }
}

fn client_configuration(credentials: &NetworkCredentials) -> Configuration {
    let auth_method = if credentials.is_open() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    Configuration::Client(ClientConfiguration {
        ssid: credentials.ssid.into(),
        password: credentials.passphrase.into(),
        auth_method,
        ..Default::default()
    })
}

#[embassy_executor::task]
async fn connection(
    mut controller: WifiController<'static>,
    credentials: &'static NetworkCredentials,
) {
    info!(
        "Start connection task, device capabilities: {:?}",
        controller.capabilities()
    );
    loop {
        if esp_wifi::wifi::wifi_state() == WifiState::StaConnected {
            // wait until we're no longer connected
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await
        }

        if !matches!(controller.is_started(), Ok(true)) {
            info!("Joining {:?}", credentials);
            if let Err(e) = controller.set_configuration(&client_configuration(credentials)) {
                log::error!("Failed to set Wi-Fi config: {:?}. Retrying...", e);
                Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await;
                continue;
            }
            info!("Starting wifi");
            if let Err(e) = controller.start_async().await {
                log::error!("Failed to start Wi-Fi: {:?}. Retrying...", e);
                Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await;
                continue;
            }
            info!("Wifi started!");
        }

        info!("About to connect to {:?}...", credentials.ssid);
        match with_timeout(
            Duration::from_secs(WIFI_CONNECT_TIMEOUT_SECS),
            controller.connect_async(),
        )
        .await
        {
            Ok(Ok(_)) => info!("Wifi connected!"),
            Ok(Err(e)) => {
                info!("Failed to connect to wifi: {e:?}");
                Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await
            }
            Err(_) => {
                info!("Wifi connection timed out");
                Timer::after(Duration::from_millis(WIFI_RECONNECT_DELAY_MS)).await
            }
        }
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
