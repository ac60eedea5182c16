use anyhow::Result;
use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::adc::ADC1;
use esp_idf_hal::gpio::Gpio36;
use log::warn;

use smart_tube::sampler::AnalogInput;

/// ESP32 oneshot reads are 12-bit; the sampler expects 10-bit counts.
const ADC_SHIFT: u32 = 2;

/// Analog temperature probe on ADC1 channel 0 (GPIO36).
pub struct AdcSensor {
    channel: AdcChannelDriver<'static, Gpio36, AdcDriver<'static, ADC1>>,
    last: u16,
}

impl AdcSensor {
    pub fn new(adc: ADC1, pin: Gpio36) -> Result<Self> {
        let driver = AdcDriver::new(adc)?;
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(driver, pin, &config)?;
        Ok(Self { channel, last: 0 })
    }
}

impl AnalogInput for AdcSensor {
    fn read_raw(&mut self) -> u16 {
        match self.channel.read_raw() {
            Ok(raw) => {
                self.last = raw >> ADC_SHIFT;
                self.last
            }
            Err(e) => {
                warn!("ADC read failed, reusing last value: {:?}", e);
                self.last
            }
        }
    }
}
