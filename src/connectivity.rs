//! Blocking wait for the network, with the connecting animation.

use log::{info, warn};

use crate::clock::Timebase;
use crate::framebuffer::{Framebuffer, Panel};
use crate::views::status;

/// Redraw period of the connecting screen.
pub const CONNECT_POLL_MS: u32 = 500;

/// Network association state.
pub trait Link {
    /// Poll the link; implementations may re-issue a connect while down.
    fn is_connected(&mut self) -> bool;
}

/// Block until `link` is up, animating the connecting screen. There is no
/// timeout: without a network the device stays here. Returns the number of
/// waits.
pub fn wait_for_link<L, P, T>(
    link: &mut L,
    panel: &mut P,
    fb: &mut Framebuffer,
    timebase: &mut T,
) -> u32
where
    L: Link + ?Sized,
    P: Panel + ?Sized,
    T: Timebase + ?Sized,
{
    let mut counter: u32 = 0;
    while !link.is_connected() {
        timebase.delay_ms(CONNECT_POLL_MS);
        status::draw_connecting(fb, counter);
        if let Err(e) = panel.present(fb) {
            warn!("connecting screen: {:?}", e);
        }
        if counter % 10 == 0 {
            info!("Waiting for WiFi... ({} polls)", counter);
        }
        counter = counter.wrapping_add(1);
    }
    info!("WiFi connected after {} polls", counter);
    counter
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};

    struct UpAfter(u32);

    impl Link for UpAfter {
        fn is_connected(&mut self) -> bool {
            if self.0 == 0 {
                true
            } else {
                self.0 -= 1;
                false
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<u8>>,
        fail: bool,
    }

    impl Panel for Recorder {
        fn present(&mut self, fb: &Framebuffer) -> Result<()> {
            self.frames.push(fb.as_bytes().to_vec());
            if self.fail {
                bail!("bus error");
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Sleeps(Vec<u32>);

    impl Timebase for Sleeps {
        fn now_ms(&self) -> u32 {
            self.0.iter().sum()
        }

        fn delay_ms(&mut self, ms: u32) {
            self.0.push(ms);
        }
    }

    #[test]
    fn connected_link_returns_immediately() {
        let mut panel = Recorder::default();
        let mut sleeps = Sleeps::default();
        let waits = wait_for_link(&mut UpAfter(0), &mut panel, &mut Framebuffer::new(), &mut sleeps);
        assert_eq!(waits, 0);
        assert!(panel.frames.is_empty());
        assert!(sleeps.0.is_empty());
    }

    #[test]
    fn animates_every_half_second_until_up() {
        let mut panel = Recorder::default();
        let mut sleeps = Sleeps::default();
        let waits = wait_for_link(&mut UpAfter(7), &mut panel, &mut Framebuffer::new(), &mut sleeps);
        assert_eq!(waits, 7);
        assert_eq!(sleeps.0, vec![CONNECT_POLL_MS; 7]);
        assert_eq!(panel.frames.len(), 7);
        // Three distinct animation phases, repeating.
        assert_eq!(panel.frames[0], panel.frames[3]);
        assert_ne!(panel.frames[0], panel.frames[1]);
        assert_ne!(panel.frames[1], panel.frames[2]);
    }

    #[test]
    fn panel_errors_do_not_stop_the_wait() {
        let mut panel = Recorder {
            fail: true,
            ..Default::default()
        };
        let waits = wait_for_link(
            &mut UpAfter(3),
            &mut panel,
            &mut Framebuffer::new(),
            &mut Sleeps::default(),
        );
        assert_eq!(waits, 3);
        assert_eq!(panel.frames.len(), 3);
    }
}
