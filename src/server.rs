use anyhow::Result;
use embedded_svc::http::Method;
use embedded_svc::io::Write;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use log::info;

use smart_tube::service::{TemperaturePublisher, TemperatureService};

/// Read-only HTTP endpoint for the smoothed indoor temperature.
///
/// The ESP-IDF server runs its own task, so the main loop has nothing to
/// poll.
pub struct TemperatureServer {
    service: TemperatureService,
    _server: EspHttpServer<'static>,
}

impl TemperatureServer {
    pub fn start(port: u16) -> Result<Self> {
        let service = TemperatureService::new();
        let conf = Configuration {
            http_port: port,
            stack_size: 8 * 1024,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&conf)?;

        for path in ["/", "/temperature"] {
            let service = service.clone();
            server.fn_handler::<anyhow::Error, _>(path, Method::Get, move |req| {
                let body = service.status_json()?;
                req.into_response(200, Some("OK"), &[("Content-Type", "application/json")])?
                    .write_all(body.as_bytes())?;
                Ok(())
            })?;
        }

        info!("Temperature service listening on port {}", port);
        Ok(Self {
            service,
            _server: server,
        })
    }
}

impl TemperaturePublisher for TemperatureServer {
    fn set_temperature(&mut self, celsius: i32) {
        self.service.set_temperature(celsius);
    }
}
