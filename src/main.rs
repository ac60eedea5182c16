#[cfg(target_os = "espidf")]
mod http_client;
#[cfg(target_os = "espidf")]
mod oled;
#[cfg(target_os = "espidf")]
mod sensor;
#[cfg(target_os = "espidf")]
mod server;
#[cfg(target_os = "espidf")]
mod time_sync;
#[cfg(target_os = "espidf")]
mod wifi;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!(
        "smart-tube v{} is firmware for ESP32 (target_os = \"espidf\"); \
         run `cargo test` on the host for the display logic.",
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(target_os = "espidf")]
mod firmware {
    use std::thread;
    use std::time::Duration;

    use anyhow::Result;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::Hertz;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::timer::EspTaskTimerService;
    use log::info;

    use smart_tube::clock::Timebase;
    use smart_tube::config::Config;
    use smart_tube::connectivity::wait_for_link;
    use smart_tube::device::{Device, Hardware};
    use smart_tube::framebuffer::Framebuffer;

    use crate::http_client::EspHttpGet;
    use crate::oled::OledPanel;
    use crate::sensor::AdcSensor;
    use crate::server::TemperatureServer;
    use crate::time_sync::SntpTimeSource;
    use crate::wifi::WifiLink;

    const I2C_FREQ_HZ: u32 = 400_000;

    /// Milliseconds since boot from the ESP high-resolution timer.
    #[derive(Default)]
    struct EspTimebase;

    impl Timebase for EspTimebase {
        fn now_ms(&self) -> u32 {
            // Truncation wraps every ~49 days; all consumers use wrapping math.
            (unsafe { esp_idf_sys::esp_timer_get_time() } / 1000) as u32
        }

        fn delay_ms(&mut self, ms: u32) {
            thread::sleep(Duration::from_millis(ms as u64));
        }
    }

    pub fn run() -> Result<()> {
        esp_idf_sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();

        info!("BOOT smart-tube v{}", env!("CARGO_PKG_VERSION"));

        // ── 1. Config ──
        let cfg = Config::default();
        cfg.validate()?;
        cfg.log_summary();

        // ── 2. Peripherals ──
        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;

        // ── 3. Display on I2C0 (SDA 21, SCL 22) ──
        let i2c_config = I2cConfig::new().baudrate(Hertz(I2C_FREQ_HZ));
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio21,
            peripherals.pins.gpio22,
            &i2c_config,
        )?;
        let mut panel = OledPanel::new(i2c, cfg.display_i2c_address)?;

        // ── 4. WiFi, blocking on the connecting screen ──
        let mut link = WifiLink::new(peripherals.modem, sysloop, &cfg.wifi_ssid, &cfg.wifi_pass)?;
        let mut timebase = EspTimebase;
        let mut fb = Framebuffer::new();
        wait_for_link(&mut link, &mut panel, &mut fb, &mut timebase);

        // ── 5. Temperature service ──
        let server = TemperatureServer::start(cfg.service_port)?;

        // ── 6. Sensor, time, weather ──
        let sensor = AdcSensor::new(peripherals.adc1, peripherals.pins.gpio36)?;
        let time = SntpTimeSource::new()?;

        let mut device = Device::new(
            &cfg,
            Hardware {
                sensor: Box::new(sensor),
                time: Box::new(time),
                http: Box::new(EspHttpGet),
                panel: Box::new(panel),
                publisher: Box::new(server),
                timebase: Box::new(timebase),
            },
        );

        // ── 7. Initial refresh, then arm the periodic timer ──
        device.start();

        let due = device.due_flag();
        let timer_service = EspTaskTimerService::new()?;
        let refresh_timer = timer_service.timer(move || due.raise())?;
        refresh_timer.every(Duration::from_secs(cfg.update_interval_secs as u64))?;
        info!("Refresh timer armed every {}s", cfg.update_interval_secs);

        // `link` and `refresh_timer` must outlive the loop.
        let _keep = (link, refresh_timer);
        loop {
            device.tick();
        }
    }
}
