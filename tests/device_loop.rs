//! Drives `Device` against fake hardware on the host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{bail, Result};
use smart_tube::clock::{TimeSource, Timebase};
use smart_tube::config::Config;
use smart_tube::connectivity::{wait_for_link, Link, CONNECT_POLL_MS};
use smart_tube::device::{Device, Hardware};
use smart_tube::framebuffer::{Framebuffer, Panel};
use smart_tube::sampler::AnalogInput;
use smart_tube::scheduler::{RefreshStep, DONE_LABEL, DONE_PROGRESS};
use smart_tube::service::TemperaturePublisher;
use smart_tube::ui::FrameState;
use smart_tube::views::status;
use smart_tube::weather::HttpGet;

// 2026-10-19 02:30:05 UTC.
const EPOCH: i64 = 1_792_377_005;

const CONDITIONS: &str = r#"{
    "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
    "main": {"temp": 18.4},
    "name": "Nanjing"
}"#;

fn forecast_body() -> String {
    // Mon 00:00 at +8h, two days of 3-hourly entries.
    let list: Vec<String> = (0..16)
        .map(|i| {
            let dt = 1_792_339_200i64 + i * 3 * 3600;
            format!(
                r#"{{"dt":{dt},"main":{{"temp":12.0,"temp_min":9.0,"temp_max":15.0}},"weather":[{{"id":800}}]}}"#
            )
        })
        .collect();
    format!(
        r#"{{"cod":"200","list":[{}],"city":{{"name":"Nanjing","timezone":28800}}}}"#,
        list.join(",")
    )
}

/// State shared between the fakes and the test body.
#[derive(Default)]
struct Rig {
    now: Cell<u32>,
    online: Cell<bool>,
    raw: Cell<u16>,
    events: RefCell<Vec<String>>,
    reads_at: RefCell<Vec<u32>>,
    published: RefCell<Vec<i32>>,
}

impl Rig {
    fn new() -> Rc<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        let rig = Rc::new(Self::default());
        rig.online.set(true);
        rig.raw.set(341);
        rig
    }

    fn log(&self, event: impl Into<String>) {
        self.events.borrow_mut().push(event.into());
    }

    fn take_events(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

struct FakeTimebase(Rc<Rig>);

impl Timebase for FakeTimebase {
    fn now_ms(&self) -> u32 {
        self.0.now.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.now.set(self.0.now.get().wrapping_add(ms));
    }
}

struct FakeTime(Rc<Rig>);

impl TimeSource for FakeTime {
    fn update_time(&mut self) -> Result<i64> {
        self.0.log("time");
        if !self.0.online.get() {
            bail!("ntp unreachable");
        }
        Ok(EPOCH)
    }
}

struct FakeHttp(Rc<Rig>);

impl HttpGet for FakeHttp {
    fn get(&mut self, url: &str) -> Result<String> {
        let endpoint = if url.contains("/forecast?") {
            "forecast"
        } else {
            "weather"
        };
        self.0.log(format!("GET {endpoint}"));
        if !self.0.online.get() {
            bail!("connection refused");
        }
        Ok(match endpoint {
            "forecast" => forecast_body(),
            _ => CONDITIONS.to_string(),
        })
    }
}

struct FakeSensor(Rc<Rig>);

impl AnalogInput for FakeSensor {
    fn read_raw(&mut self) -> u16 {
        self.0.log("sample");
        self.0.reads_at.borrow_mut().push(self.0.now.get());
        self.0.raw.get()
    }
}

struct FakePublisher(Rc<Rig>);

impl TemperaturePublisher for FakePublisher {
    fn set_temperature(&mut self, celsius: i32) {
        self.0.published.borrow_mut().push(celsius);
    }
}

/// Tags presented frames that match a progress page.
struct FakePanel {
    rig: Rc<Rig>,
    pages: Vec<(u8, Vec<u8>)>,
}

impl FakePanel {
    fn new(rig: Rc<Rig>) -> Self {
        let mut labels: Vec<(u8, &str)> = RefreshStep::ORDER
            .iter()
            .map(|s| (s.progress(), s.label()))
            .collect();
        labels.push((DONE_PROGRESS, DONE_LABEL));
        let pages = labels
            .into_iter()
            .map(|(pct, label)| {
                let mut fb = Framebuffer::new();
                status::draw_progress(&mut fb, pct, label);
                (pct, fb.as_bytes().to_vec())
            })
            .collect();
        Self { rig, pages }
    }
}

impl Panel for FakePanel {
    fn present(&mut self, fb: &Framebuffer) -> Result<()> {
        match self.pages.iter().find(|(_, bytes)| bytes == fb.as_bytes()) {
            Some((pct, _)) => self.rig.log(format!("progress {pct}")),
            None => self.rig.log("frame"),
        }
        Ok(())
    }
}

fn device(rig: &Rc<Rig>) -> Device {
    Device::new(
        &Config::default(),
        Hardware {
            sensor: Box::new(FakeSensor(rig.clone())),
            time: Box::new(FakeTime(rig.clone())),
            http: Box::new(FakeHttp(rig.clone())),
            panel: Box::new(FakePanel::new(rig.clone())),
            publisher: Box::new(FakePublisher(rig.clone())),
            timebase: Box::new(FakeTimebase(rig.clone())),
        },
    )
}

fn run_until(device: &mut Device, rig: &Rig, until_ms: u32) {
    while rig.now.get() < until_ms {
        device.tick();
    }
}

#[test]
fn start_runs_every_step_in_order_with_progress() {
    let rig = Rig::new();
    let mut dev = device(&rig);
    dev.start();

    assert_eq!(
        rig.take_events(),
        vec![
            "progress 10",
            "time",
            "progress 30",
            "GET weather",
            "progress 50",
            "GET forecast",
            "progress 80",
            "sample",
            "progress 100",
        ]
    );
    assert_eq!(dev.scheduler().refresh_count(), 1);
    assert_eq!(dev.scheduler().last_update(), "10:30:05");
    assert_eq!(dev.scheduler().last_full_refresh_ms(), Some(0));
    assert!(dev.clock().is_set());
    assert!(dev.weather().current().is_some());
    assert!(!dev.weather().forecast().is_empty());
    assert_eq!(rig.now.get(), 100, "done page is held briefly");
}

#[test]
fn first_tick_after_refresh_redraws_the_carousel() {
    let rig = Rig::new();
    let mut dev = device(&rig);
    dev.start();
    rig.take_events();

    let budget = dev.tick();
    assert_eq!(budget, dev.carousel().frame_period_ms());
    assert_eq!(rig.take_events(), vec!["frame"]);
}

#[test]
fn failed_fetches_keep_previous_data() {
    let rig = Rig::new();
    let mut dev = device(&rig);
    dev.start();
    let before = dev.weather().current().cloned();
    let days_before = dev.weather().forecast().len();
    let time_before = dev.clock().formatted_time(rig.now.get());

    rig.online.set(false);
    dev.run_full_refresh();

    assert_eq!(dev.weather().current().cloned(), before);
    assert_eq!(dev.weather().forecast().len(), days_before);
    assert_eq!(dev.clock().formatted_time(rig.now.get() - 100), time_before);
    assert_eq!(dev.scheduler().refresh_count(), 2);
    // All four steps were still attempted.
    let events = rig.take_events();
    for step in ["time", "GET weather", "GET forecast", "sample"] {
        assert!(events.iter().any(|e| e == step), "{step} missing: {events:?}");
    }
}

#[test]
fn temperature_is_resampled_every_ten_seconds() {
    let rig = Rig::new();
    let mut dev = device(&rig);
    dev.start();
    run_until(&mut dev, &rig, 25_000);

    let reads = rig.reads_at.borrow().clone();
    assert_eq!(reads.len(), 3, "{reads:?}");
    for pair in reads.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= 10_000, "{reads:?}");
        assert!(gap < 10_000 + dev.carousel().frame_period_ms() + 1, "{reads:?}");
    }
}

#[test]
fn constant_reading_of_341_publishes_100() {
    let rig = Rig::new();
    let mut dev = device(&rig);
    dev.start();
    run_until(&mut dev, &rig, 35_000);

    let published = rig.published.borrow();
    assert!(published.len() >= 4);
    assert!(published.iter().all(|t| *t == 100), "{published:?}");
    assert_eq!(dev.sampler().current(), Some(100));
}

#[test]
fn refresh_request_waits_for_transition_to_end() {
    let rig = Rig::new();
    let mut dev = device(&rig);
    dev.start();

    let mut guard = 0;
    while dev.carousel().state() != FrameState::InTransition {
        dev.tick();
        guard += 1;
        assert!(guard < 1_000, "carousel never started a transition");
    }

    dev.due_flag().raise();
    let mut deferred = 0;
    while dev.scheduler().refresh_count() == 1 {
        let state = dev.carousel().state();
        dev.tick();
        if state == FrameState::InTransition {
            assert_eq!(dev.scheduler().refresh_count(), 1);
            deferred += 1;
        }
        guard += 1;
        assert!(guard < 1_000, "refresh never ran");
    }

    assert!(deferred > 0);
    assert_eq!(dev.scheduler().refresh_count(), 2);
    assert!(!dev.due_flag().is_raised());
}

#[test]
fn request_without_transition_runs_on_next_tick() {
    let rig = Rig::new();
    let mut dev = device(&rig);
    dev.start();
    dev.tick();
    rig.take_events();

    dev.due_flag().raise();
    dev.tick();
    let events = rig.take_events();
    assert_eq!(events.first().map(String::as_str), Some("progress 10"));
    assert_eq!(dev.scheduler().refresh_count(), 2);
}

struct LinkAfter(Rc<Rig>, u32);

impl Link for LinkAfter {
    fn is_connected(&mut self) -> bool {
        self.0.log("poll");
        if self.1 == 0 {
            return true;
        }
        self.1 -= 1;
        false
    }
}

#[test]
fn boot_waits_for_link_before_first_refresh() {
    let rig = Rig::new();
    let mut panel = FakePanel::new(rig.clone());
    let mut timebase = FakeTimebase(rig.clone());
    let polls = wait_for_link(
        &mut LinkAfter(rig.clone(), 4),
        &mut panel,
        &mut Framebuffer::new(),
        &mut timebase,
    );
    assert_eq!(polls, 4);
    assert_eq!(rig.now.get(), 4 * CONNECT_POLL_MS);

    let mut dev = device(&rig);
    dev.start();
    let events = rig.take_events();
    let first_fetch = events.iter().position(|e| e == "time");
    let last_poll = events.iter().rposition(|e| e == "poll");
    assert!(last_poll < first_fetch, "{events:?}");
}
