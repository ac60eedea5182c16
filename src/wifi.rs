use anyhow::Result;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use smart_tube::connectivity::Link;

/// Polls between connect retries while the station is down (10 s at the
/// connecting screen's pace).
const RECONNECT_EVERY_POLLS: u32 = 20;

/// Station-mode WiFi. Connecting is non-blocking; `is_connected` is polled
/// by the connecting screen and re-issues the connect while down.
pub struct WifiLink {
    wifi: Box<EspWifi<'static>>,
    polls: u32,
    reported: bool,
}

/// Log association state from ESP-IDF internals.
fn log_wifi_diag(label: &str) {
    unsafe {
        let mut ap_info: esp_idf_sys::wifi_ap_record_t = core::mem::zeroed();
        let ap_rc = esp_idf_sys::esp_wifi_sta_get_ap_info(&mut ap_info);
        if ap_rc == esp_idf_sys::ESP_OK {
            let ssid = core::str::from_utf8(&ap_info.ssid)
                .unwrap_or("?")
                .trim_end_matches('\0');
            info!(
                "WiFi [{}]: assoc=YES rssi={} ch={} ssid={}",
                label, ap_info.rssi, ap_info.primary, ssid
            );
        } else {
            info!("WiFi [{}]: assoc=NO (ap_info err={})", label, ap_rc);
        }
    }
}

impl WifiLink {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        ssid: &str,
        password: &str,
    ) -> Result<Self> {
        let mut esp_wifi = EspWifi::new(modem, sysloop, None)?;

        let auth = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let mut wifi_ssid = heapless::String::<32>::new();
        let mut wifi_pass = heapless::String::<64>::new();
        if wifi_ssid.push_str(ssid).is_err() {
            warn!("SSID longer than 32 bytes, truncated");
        }
        if wifi_pass.push_str(password).is_err() {
            warn!("WiFi password longer than 64 bytes, truncated");
        }

        esp_wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: wifi_ssid,
            password: wifi_pass,
            auth_method: auth,
            ..Default::default()
        }))?;

        esp_wifi.start()?;
        info!("WiFi started, connecting to '{}'", ssid);
        if let Err(e) = esp_wifi.connect() {
            warn!("WiFi connect request failed: {:?}", e);
        }

        Ok(Self {
            wifi: Box::new(esp_wifi),
            polls: 0,
            reported: false,
        })
    }

    pub fn ip_address(&self) -> Option<String> {
        self.wifi
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|ip| ip.ip.to_string())
    }
}

impl Link for WifiLink {
    fn is_connected(&mut self) -> bool {
        let up = self.wifi.is_up().unwrap_or(false);
        if up {
            if !self.reported {
                log_wifi_diag("connected");
                info!("IP address: {}", self.ip_address().unwrap_or_default());
                self.reported = true;
            }
            self.polls = 0;
            return true;
        }

        self.reported = false;
        self.polls += 1;
        if self.polls % RECONNECT_EVERY_POLLS == 0 {
            log_wifi_diag("retry");
            if let Err(e) = self.wifi.connect() {
                warn!("WiFi reconnect failed: {:?}", e);
            }
        }
        false
    }
}
