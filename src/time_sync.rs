use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Result};
use esp_idf_svc::sntp::{EspSntp, OperatingMode, SntpConf, SyncMode, SyncStatus};
use log::info;

use smart_tube::clock::{SyncGate, TimeSource};

const SNTP_SERVER: &str = "pool.ntp.org";
const SYNC_TIMEOUT_MS: u32 = 10_000;
const POLL_INTERVAL_MS: u32 = 250;
/// Anything earlier means the RTC was never set.
const MIN_VALID_EPOCH: i64 = 1_000_000_000;

/// SNTP-backed UTC source. The client keeps re-syncing in the background
/// for as long as this value lives; only the first refresh waits for it.
pub struct SntpTimeSource {
    sntp: EspSntp<'static>,
    gate: SyncGate,
}

impl SntpTimeSource {
    pub fn new() -> Result<Self> {
        let conf = SntpConf {
            servers: [SNTP_SERVER, "time.nist.gov"],
            sync_mode: SyncMode::Immediate,
            operating_mode: OperatingMode::Poll,
        };

        info!("Starting SNTP with {}", SNTP_SERVER);
        let sntp = EspSntp::new_with_callback(&conf, |_| {
            info!("SNTP sync callback triggered");
        })?;
        Ok(Self {
            sntp,
            gate: SyncGate::new(),
        })
    }
}

impl TimeSource for SntpTimeSource {
    fn update_time(&mut self) -> Result<i64> {
        let sntp = &self.sntp;
        self.gate.wait(
            || sntp.get_sync_status() == SyncStatus::Completed,
            |ms| thread::sleep(Duration::from_millis(ms as u64)),
            SYNC_TIMEOUT_MS,
            POLL_INTERVAL_MS,
        );
        let epoch = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
        if epoch < MIN_VALID_EPOCH {
            bail!("system clock not set (epoch {})", epoch);
        }
        Ok(epoch)
    }
}
