//! Indoor temperature sampling and smoothing.
//!
//! One analog reading every resample period is converted to degrees and
//! pushed into a fixed-size moving-average window. The published value is
//! the rounded mean of the window.

use log::debug;

use crate::service::TemperaturePublisher;

/// Full scale of the raw analog reading (10-bit).
pub const RAW_FULL_SCALE: f32 = 1023.0;

/// Raw analog source. Reads never fail; whatever comes back is used.
pub trait AnalogInput {
    /// Raw reading in `0..=1023`.
    fn read_raw(&mut self) -> u16;
}

/// `raw / 1023 * 3 * 100`, kept exactly as the sensor board was calibrated.
pub fn raw_to_celsius(raw: u16) -> f32 {
    raw as f32 / RAW_FULL_SCALE * 3.0 * 100.0
}

/// Fixed-capacity circular window; the mean is always over the current
/// contents.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    buf: Vec<f32>,
    idx: usize,
    count: usize,
}

impl MovingAverage {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity.max(1)],
            idx: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_primed(&self) -> bool {
        self.count == self.buf.len()
    }

    /// Push one value (dropping the oldest once full) and return the mean.
    pub fn process(&mut self, value: f32) -> f32 {
        let cap = self.buf.len();
        self.buf[self.idx] = value;
        self.idx = (self.idx + 1) % cap;
        if self.count < cap {
            self.count += 1;
        }
        self.mean().unwrap_or(value)
    }

    /// Fill the whole window with `value`.
    pub fn fill(&mut self, value: f32) -> f32 {
        for _ in 0..self.buf.len() {
            self.process(value);
        }
        value
    }

    pub fn mean(&self) -> Option<f32> {
        if self.count == 0 {
            return None;
        }
        let sum: f32 = self.iter().sum();
        Some(sum / self.count as f32)
    }

    /// Samples oldest → newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let cap = self.buf.len();
        let start = if self.count < cap { 0 } else { self.idx };
        (0..self.count).map(move |i| self.buf[(start + i) % cap])
    }
}

#[derive(Debug, Clone)]
pub struct TemperatureSampler {
    window: MovingAverage,
    current: Option<i32>,
}

impl TemperatureSampler {
    pub fn new(window: usize) -> Self {
        Self {
            window: MovingAverage::new(window),
            current: None,
        }
    }

    /// Latest published value, `None` before the first sample.
    pub fn current(&self) -> Option<i32> {
        self.current
    }

    pub fn window(&self) -> &MovingAverage {
        &self.window
    }

    /// Read, smooth, publish. The first call primes the whole window with
    /// the first reading so the published value never starts skewed.
    pub fn sample<A, P>(&mut self, input: &mut A, publisher: &mut P) -> i32
    where
        A: AnalogInput + ?Sized,
        P: TemperaturePublisher + ?Sized,
    {
        let raw = input.read_raw();
        let temp = raw_to_celsius(raw);
        let mean = if self.current.is_none() {
            self.window.fill(temp)
        } else {
            self.window.process(temp)
        };
        let rounded = mean.round() as i32;
        self.current = Some(rounded);
        publisher.set_temperature(rounded);
        debug!("Temperature: raw={} {:.2} / {}", raw, temp, rounded);
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::TemperatureService;

    struct Scripted {
        values: Vec<u16>,
        next: usize,
    }

    impl Scripted {
        fn new(values: &[u16]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl AnalogInput for Scripted {
        fn read_raw(&mut self) -> u16 {
            let v = self.values[self.next.min(self.values.len() - 1)];
            self.next += 1;
            v
        }
    }

    #[test]
    fn conversion_is_literal() {
        assert_eq!(raw_to_celsius(0), 0.0);
        assert!((raw_to_celsius(1023) - 300.0).abs() < 1e-3);
        assert!((raw_to_celsius(341) - 100.0).abs() < 1e-3);
        assert!((raw_to_celsius(82) - 24.047).abs() < 1e-2);
    }

    #[test]
    fn moving_average_keeps_only_the_last_n() {
        let mut ma = MovingAverage::new(4);
        assert_eq!(ma.mean(), None);
        assert_eq!(ma.process(4.0), 4.0);
        assert_eq!(ma.process(8.0), 6.0);
        ma.process(0.0);
        ma.process(0.0);
        assert!(ma.is_primed());
        // 4.0 and 8.0 fall out
        ma.process(12.0);
        ma.process(12.0);
        assert_eq!(ma.iter().collect::<Vec<_>>(), vec![0.0, 0.0, 12.0, 12.0]);
        assert_eq!(ma.mean(), Some(6.0));
    }

    #[test]
    fn fill_primes_the_whole_window() {
        let mut ma = MovingAverage::new(18);
        ma.fill(21.5);
        assert!(ma.is_primed());
        assert_eq!(ma.len(), 18);
        assert_eq!(ma.mean(), Some(21.5));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut ma = MovingAverage::new(0);
        assert_eq!(ma.capacity(), 1);
        ma.process(3.0);
        assert_eq!(ma.process(5.0), 5.0);
    }

    #[test]
    fn primed_mean_is_the_last_eighteen_samples() {
        let mut ma = MovingAverage::new(18);
        let values: Vec<f32> = (0..50).map(|i| (i * 7 % 23) as f32).collect();
        for (n, v) in values.iter().enumerate() {
            let mean = ma.process(*v);
            let start = (n + 1).saturating_sub(18);
            let window = &values[start..=n];
            let expected = window.iter().sum::<f32>() / window.len() as f32;
            assert!((mean - expected).abs() < 1e-4, "sample {n}");
        }
    }

    #[test]
    fn first_sample_is_published_unskewed() {
        let mut sampler = TemperatureSampler::new(18);
        let mut service = TemperatureService::new();
        let mut input = Scripted::new(&[82, 0]);

        assert_eq!(sampler.current(), None);
        assert_eq!(sampler.sample(&mut input, &mut service), 24);
        assert!(sampler.window().is_primed());
        assert_eq!(service.temperature(), Some(24));

        // One zero among eighteen 24.05s only nudges the mean.
        assert_eq!(sampler.sample(&mut input, &mut service), 23);
    }

    #[test]
    fn constant_341_publishes_100() {
        let mut sampler = TemperatureSampler::new(18);
        let mut service = TemperatureService::new();
        let mut input = Scripted::new(&[341]);
        for _ in 0..40 {
            assert_eq!(sampler.sample(&mut input, &mut service), 100);
        }
        assert_eq!(service.temperature(), Some(100));
        assert_eq!(service.update_count(), 40);
    }

    #[test]
    fn published_value_tracks_rounded_window_mean() {
        let raws: Vec<u16> = (0..60).map(|i| 60 + (i * 13 % 40) as u16).collect();
        let mut sampler = TemperatureSampler::new(18);
        let mut service = TemperatureService::new();
        let mut input = Scripted::new(&raws);

        for n in 0..raws.len() {
            let published = sampler.sample(&mut input, &mut service);
            let mean = sampler.window().mean().unwrap();
            assert_eq!(published, mean.round() as i32, "sample {n}");
            if n >= 17 {
                let expected = raws[n + 1 - 18..=n]
                    .iter()
                    .map(|r| raw_to_celsius(*r) as f64)
                    .sum::<f64>()
                    / 18.0;
                assert!((mean as f64 - expected).abs() < 1e-3, "sample {n}");
            }
        }
    }
}
