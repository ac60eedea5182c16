use anyhow::{anyhow, Result};
use embedded_graphics::{
    image::{Image, ImageRaw},
    pixelcolor::BinaryColor,
    prelude::*,
};
use esp_idf_hal::i2c::I2cDriver;
use log::info;
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

use smart_tube::framebuffer::{Framebuffer, Panel};

type Display = Ssd1306<
    I2CInterface<I2cDriver<'static>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// SSD1306 128x64 on I2C, mounted upside down.
pub struct OledPanel {
    display: Display,
}

impl OledPanel {
    pub fn new(i2c: I2cDriver<'static>, address: u8) -> Result<Self> {
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate180)
            .into_buffered_graphics_mode();
        display
            .init()
            .map_err(|e| anyhow!("display init: {:?}", e))?;
        display
            .set_brightness(Brightness::BRIGHTEST)
            .map_err(|e| anyhow!("display contrast: {:?}", e))?;
        display.clear_buffer();
        display
            .flush()
            .map_err(|e| anyhow!("display flush: {:?}", e))?;
        info!("OLED initialized at 0x{:02X}", address);
        Ok(Self { display })
    }
}

impl Panel for OledPanel {
    fn present(&mut self, fb: &Framebuffer) -> Result<()> {
        self.display.clear_buffer();
        let raw = ImageRaw::<BinaryColor>::new(fb.as_bytes(), fb.width());
        Image::new(&raw, Point::zero())
            .draw(&mut self.display)
            .map_err(|e| anyhow!("display draw: {:?}", e))?;
        self.display
            .flush()
            .map_err(|e| anyhow!("display flush: {:?}", e))
    }
}
