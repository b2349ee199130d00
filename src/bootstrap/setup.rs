//! Startup tasks: logger and folder initialization.

use anyhow::{Context, Result};
use env_logger::fmt::style::{AnsiColor, Style};
use env_logger::{Builder, Env, WriteStyle};
use log::kv::Key;
use std::io::Write;
use std::path::Path;

// ────────────────────────────────────────────────────────────────
// Folder Initialization
// ────────────────────────────────────────────────────────────────

/// Create the folder that holds the database file.
pub fn initialize_folder(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────
// Logger Initialization
// ────────────────────────────────────────────────────────────────

/// Format a `duration` key-value to 2 decimal places, e.g. "12.35 ms".
fn format_duration(raw: &str) -> String {
    if let Some(idx) = raw.find(|c: char| c.is_alphabetic() || c == 'µ') {
        let (num, unit) = (&raw[..idx], &raw[idx..]);
        if let Ok(val) = num.parse::<f32>() {
            return format!("{:.2} {}", val, unit);
        }
    }
    raw.to_string()
}

/// Log to stderr. INFO+ globally, WARN+ for Rocket; `RUST_LOG` overrides.
pub fn initialize_logger() {
    let grey = Style::new().fg_color(Some(AnsiColor::BrightBlack.into()));
    let cyan = Style::new().fg_color(Some(AnsiColor::Cyan.into()));

    let _ = Builder::new()
        .write_style(WriteStyle::Auto)
        .filter(None, log::LevelFilter::Info)
        .filter(Some("rocket"), log::LevelFilter::Warn)
        .parse_env(Env::default())
        .format(move |buf, record| {
            let level_style = buf.default_level_style(record.level());

            let dur_raw = record
                .key_values()
                .get(Key::from("duration"))
                .map(|v| format_duration(&v.to_string()))
                .unwrap_or_default();

            // Right-align the duration field to width 10
            let dur = if dur_raw.is_empty() {
                " ".repeat(10)
            } else {
                format!("{cyan}{:>10}{cyan:#}", dur_raw)
            };

            writeln!(
                buf,
                "{grey}{}{grey:#} {level_style}{}{level_style:#} {grey}{}{grey:#}",
                buf.timestamp(),
                record.level(),
                record.target()
            )?;

            let message = format!("{}", record.args());
            let subsequent_indent = " ".repeat(11);
            let mut lines = message.lines();
            if let Some(first_line) = lines.next() {
                writeln!(buf, "{} {}", dur, first_line)?;
            }
            for line in lines {
                writeln!(buf, "{}{}", subsequent_indent, line)?;
            }
            Ok(())
        })
        .target(env_logger::Target::Stderr)
        .try_init();
}
