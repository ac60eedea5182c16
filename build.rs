fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=wifi.local.rs");
    emit_local_secrets_from_wifi_local();
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}

/// Secrets live in an untracked `wifi.local.rs` next to Cargo.toml:
///
/// ```text
/// pub const WIFI_SSID: &str = "...";
/// pub const WIFI_PASS: &str = "...";
/// pub const WEATHER_API_KEY: &str = "...";
/// ```
fn emit_local_secrets_from_wifi_local() {
    let path = std::path::Path::new("wifi.local.rs");
    let Ok(src) = std::fs::read_to_string(path) else {
        return;
    };

    for (name, env) in [
        ("WIFI_SSID", "LOCAL_WIFI_SSID"),
        ("WIFI_PASS", "LOCAL_WIFI_PASS"),
        ("WEATHER_API_KEY", "LOCAL_WEATHER_API_KEY"),
    ] {
        if let Some(v) = extract_rust_str_const(&src, name) {
            println!("cargo:rustc-env={}={}", env, v);
        }
    }
}

fn extract_rust_str_const(src: &str, name: &str) -> Option<String> {
    for line in src.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("//") {
            continue;
        }
        let needle = format!("pub const {}:", name);
        if !trimmed.starts_with(&needle) {
            continue;
        }
        let start = trimmed.find('"')?;
        let end = trimmed[start + 1..].find('"')? + start + 1;
        return Some(trimmed[start + 1..end].to_string());
    }
    None
}
