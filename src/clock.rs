//! Wall clock kept by the loop between network syncs.

use anyhow::Result;
use log::{info, warn};

/// Network time source. Returns the current Unix epoch in seconds.
pub trait TimeSource {
    fn update_time(&mut self) -> Result<i64>;
}

/// Monotonic millisecond counter plus a blocking delay. The counter wraps.
pub trait Timebase {
    fn now_ms(&self) -> u32;
    fn delay_ms(&mut self, ms: u32);
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Broken-down time for `epoch` already shifted into the local zone.
pub(crate) fn civil(epoch: i64) -> libc::tm {
    let t = epoch as libc::time_t;
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    unsafe {
        libc::gmtime_r(&t, &mut tm);
    }
    tm
}

pub(crate) fn weekday_abbrev(tm: &libc::tm) -> &'static str {
    WEEKDAYS[tm.tm_wday.rem_euclid(7) as usize]
}

#[derive(Debug, Clone)]
pub struct Clock {
    utc_offset_secs: i64,
    /// Last sync: (UTC epoch seconds, loop ms at that moment).
    synced: Option<(i64, u32)>,
}

impl Clock {
    pub fn new(utc_offset_secs: i64) -> Self {
        Self {
            utc_offset_secs,
            synced: None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.synced.is_some()
    }

    pub fn utc_offset_secs(&self) -> i64 {
        self.utc_offset_secs
    }

    /// Pull the time from the network. On failure the previous sync stays.
    pub fn update_time<S>(&mut self, source: &mut S, now_ms: u32) -> Result<()>
    where
        S: TimeSource + ?Sized,
    {
        let epoch = source.update_time()?;
        self.set(epoch, now_ms);
        Ok(())
    }

    pub fn set(&mut self, epoch: i64, now_ms: u32) {
        self.synced = Some((epoch, now_ms));
    }

    /// UTC epoch at loop time `now_ms`.
    pub fn epoch_at(&self, now_ms: u32) -> Option<i64> {
        self.synced
            .map(|(epoch, at)| epoch + (now_ms.wrapping_sub(at) / 1000) as i64)
    }

    fn local_tm(&self, now_ms: u32) -> Option<libc::tm> {
        self.epoch_at(now_ms)
            .map(|e| civil(e + self.utc_offset_secs))
    }

    /// `HH:MM:SS`, or `--:--:--` before the first sync.
    pub fn formatted_time(&self, now_ms: u32) -> String {
        match self.local_tm(now_ms) {
            Some(tm) => format!("{:02}:{:02}:{:02}", tm.tm_hour, tm.tm_min, tm.tm_sec),
            None => "--:--:--".to_string(),
        }
    }

    /// `HH:MM` for the overlay header.
    pub fn short_time(&self, now_ms: u32) -> String {
        match self.local_tm(now_ms) {
            Some(tm) => format!("{:02}:{:02}", tm.tm_hour, tm.tm_min),
            None => "--:--".to_string(),
        }
    }

    /// `Mon Oct 19 2026`, or empty before the first sync.
    pub fn formatted_date(&self, now_ms: u32) -> String {
        match self.local_tm(now_ms) {
            Some(tm) => format!(
                "{} {} {:02} {}",
                weekday_abbrev(&tm),
                MONTHS[tm.tm_mon.rem_euclid(12) as usize],
                tm.tm_mday,
                tm.tm_year + 1900
            ),
            None => String::new(),
        }
    }
}

/// Blocks for the first network sync only. Sync sources that report
/// completion once and then reset keep background-syncing on their own, so
/// later refreshes read the system clock without waiting.
#[derive(Debug, Default)]
pub struct SyncGate {
    synced: bool,
}

impl SyncGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Poll `completed` every `poll_ms` for up to `timeout_ms`, sleeping
    /// with `sleep`. Returns immediately once a sync has been seen.
    pub fn wait<C, S>(&mut self, mut completed: C, mut sleep: S, timeout_ms: u32, poll_ms: u32) -> bool
    where
        C: FnMut() -> bool,
        S: FnMut(u32),
    {
        if self.synced {
            return true;
        }
        let mut elapsed_ms = 0u32;
        loop {
            if completed() {
                info!("Time synchronized after {}ms", elapsed_ms);
                self.synced = true;
                return true;
            }
            if elapsed_ms >= timeout_ms {
                warn!(
                    "Time sync not completed within {}s, using system time",
                    timeout_ms / 1000
                );
                return false;
            }
            sleep(poll_ms);
            elapsed_ms += poll_ms.max(1);
        }
    }
}
