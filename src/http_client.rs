use anyhow::{bail, Result};
use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::info;

use smart_tube::weather::HttpGet;

const TIMEOUT_MS: u64 = 15_000;
/// OpenWeatherMap forecast bodies run to roughly 16 KB.
const MAX_BODY_BYTES: usize = 48 * 1024;

/// HTTPS GET over the ESP-IDF client with the certificate bundle.
#[derive(Default)]
pub struct EspHttpGet;

/// Hide the API key when logging a request URL.
fn redact(url: &str) -> String {
    match url.find("appid=") {
        Some(i) => format!("{}appid=***", &url[..i]),
        None => url.to_string(),
    }
}

impl HttpGet for EspHttpGet {
    fn get(&mut self, url: &str) -> Result<String> {
        let config = Configuration {
            timeout: Some(std::time::Duration::from_millis(TIMEOUT_MS)),
            use_global_ca_store: true,
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        };

        let connection = EspHttpConnection::new(&config)?;
        let mut client = Client::wrap(connection);

        let request = client.request(Method::Get, url, &[])?.submit()?;

        let status = request.status();
        info!("HTTP GET {} -> status {}", redact(url), status);

        if status == 429 {
            bail!("API rate limited (HTTP 429)");
        }
        // OpenWeatherMap puts its error message in the JSON body, let the
        // parser report it.
        if status != 200 && status != 401 && status != 404 {
            bail!("HTTP error: status {}", status);
        }

        let mut body: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        let mut reader = request;
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&buf[..n]);
            if body.len() > MAX_BODY_BYTES {
                bail!("Response too large (>{} bytes)", MAX_BODY_BYTES);
            }
        }

        let text = String::from_utf8(body)?;
        if !text.trim_start().starts_with('{') {
            bail!("Response is not JSON");
        }

        Ok(text)
    }
}
