use anyhow::{bail, Context, Result};
use std::{env, fs, path::Path};

fn main() -> Result<()> {
    let out_dir = env::var_os("OUT_DIR").context("unable to access OUT_DIR")?;
    let constants_rs = Path::new(&out_dir).join("constants.rs");

    let extension_protocol = var_or("EXTENSION_PROTOCOL", "chrome-extension:");
    if !extension_protocol.ends_with(':') {
        bail!(
            "extension protocol '{}' must end with ':' like `location.protocol`",
            extension_protocol
        );
    }

    let generated_background_page =
        var_or("GENERATED_BACKGROUND_PAGE", "/_generated_background_page.html");
    if !generated_background_page.starts_with('/') {
        bail!(
            "generated background page '{}' must be an absolute path",
            generated_background_page
        );
    }

    let badge_color = var_or("DEFAULT_BADGE_COLOR", "#209CEE");
    parse_hex_color(&badge_color)
        .with_context(|| format!("failed to parse '{}' as a badge color", badge_color))?;

    let log_level = match var_or("LOG_LEVEL", "debug").to_ascii_lowercase().as_str() {
        "error" => "Error",
        "warn" => "Warn",
        "info" => "Info",
        "debug" => "Debug",
        "trace" => "Trace",
        other => bail!("unsupported log level {}", other),
    };

    fs::write(
        &constants_rs,
        &format!(
            r#"
pub const EXTENSION_PROTOCOL: &str = {:?};
pub const GENERATED_BACKGROUND_PAGE: &str = {:?};
pub const DEFAULT_BADGE_COLOR: &str = {:?};
pub const LOG_LEVEL: log::Level = log::Level::{};
"#,
            extension_protocol, generated_background_page, badge_color, log_level
        ),
    )
    .context("failed to write constants.rs file")?;

    Ok(())
}

fn var_or(name: &str, default: &str) -> String {
    println!("cargo:rerun-if-env-changed={}", name);

    env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn parse_hex_color(color: &str) -> Result<u32> {
    let digits = match color.strip_prefix('#') {
        Some(digits) if digits.len() == 6 => digits,
        _ => bail!("expected a color of the form #RRGGBB"),
    };

    Ok(u32::from_str_radix(digits, 16)?)
}
