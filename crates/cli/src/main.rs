//! xenon CLI: apply a configuration file to a Genesis Xenon 750 mouse.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use xenon_core::error::Error;
use xenon_core::profile::Profile;
use xenon_core::settings::{EncodedBuffers, MouseSettings};
use xenon_core::transport::{ControlTransport, Selector};

struct CliHidTransport {
    device: hidapi::HidDevice,
    interrupted: Arc<AtomicBool>,
}

impl CliHidTransport {
    fn open(path: Option<&str>, interrupted: Arc<AtomicBool>) -> Result<Self> {
        let api = hidapi::HidApi::new().map_err(|e| anyhow::anyhow!("hidapi init: {e}"))?;
        let devices = xenon_core::device::discover_devices(&api);
        let target = xenon_core::device::select_control_interface(&devices, path)?;

        let c_path = CString::new(target.path.clone())
            .with_context(|| format!("invalid device path {}", target.path))?;
        let device = api
            .open_path(&c_path)
            .map_err(|e| anyhow::anyhow!("open HID device {}: {e}", target.path))?;
        info!(path = %target.path, "Opened control interface");

        Ok(Self {
            device,
            interrupted,
        })
    }
}

impl ControlTransport for CliHidTransport {
    fn send_feature_report(&self, selector: Selector, data: &[u8]) -> xenon_core::error::Result<()> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Err(Error::Interrupted);
        }
        self.device
            .send_feature_report(data)
            .map_err(|e| Error::Hid(format!("send_feature_report ({selector}): {e}")))
    }
}

#[derive(Parser)]
#[command(
    name = "xenon",
    version,
    about = "Configure a SINOWEALTH Genesis Xenon 750 mouse"
)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected Xenon 750 HID interfaces.
    ListDevices,
    /// Apply a JSON configuration file to the mouse.
    Apply {
        /// Configuration file.
        config: PathBuf,
        /// Use this HID device node instead of the first one found.
        #[arg(long)]
        path: Option<String>,
        /// Fail before writing if any configuration entry was skipped.
        #[arg(long)]
        strict: bool,
        /// Print the encoded buffers instead of sending them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the encoded buffers for a configuration (factory defaults if omitted).
    Dump {
        /// Configuration file.
        config: Option<PathBuf>,
    },
}

fn load_settings(config: &Path, strict: bool) -> Result<MouseSettings> {
    let profile = Profile::load(config)?;
    let (settings, report) = MouseSettings::from_profile(&profile)?;
    if !report.is_clean() {
        if strict {
            anyhow::bail!(
                "{} configuration entries were skipped (first: {})",
                report.skipped.len(),
                report.skipped[0]
            );
        }
        warn!(
            skipped = report.skipped.len(),
            "Some configuration entries were skipped"
        );
    }
    Ok(settings)
}

/// Fail if Ctrl-C arrived, including during the last transfer.
fn ensure_not_interrupted(interrupted: &AtomicBool) -> Result<()> {
    if interrupted.load(Ordering::SeqCst) {
        return Err(Error::Interrupted.into());
    }
    Ok(())
}

fn print_buffers(buffers: &EncodedBuffers) {
    for (selector, data) in buffers.frames() {
        println!("{selector} ({} bytes):", data.len());
        for (row, chunk) in data.chunks(16).enumerate() {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
            println!("  {:04X}: {}", row * 16, hex.join(" "));
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::ListDevices => {
            let api = hidapi::HidApi::new().map_err(|e| anyhow::anyhow!("hidapi init: {e}"))?;
            let devices = xenon_core::device::discover_devices(&api);
            if devices.is_empty() {
                println!("No Xenon 750 found.");
                println!("Ensure the mouse is connected and you can access its hidraw nodes.");
            } else {
                for dev in &devices {
                    let marker = if dev.is_control_interface() {
                        " [control]"
                    } else {
                        ""
                    };
                    println!(
                        "Xenon 750 (VID: 0x{:04X}, PID: 0x{:04X}, interface: {}, path: {}){marker}",
                        dev.vid, dev.pid, dev.interface, dev.path
                    );
                }
            }
        }
        Commands::Apply {
            config,
            path,
            strict,
            dry_run,
        } => {
            let buffers = load_settings(&config, strict)?.encode();
            if dry_run {
                print_buffers(&buffers);
                return Ok(());
            }

            let interrupted = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&interrupted);
            ctrlc::set_handler(move || {
                warn!("Interrupt received, releasing device");
                flag.store(true, Ordering::SeqCst);
            })
            .context("install Ctrl-C handler")?;

            let transport = CliHidTransport::open(path.as_deref(), Arc::clone(&interrupted))?;
            xenon_core::transport::transfer_settings(&transport, &buffers)?;
            ensure_not_interrupted(&interrupted)?;
            println!("Configuration applied.");
        }
        Commands::Dump { config } => {
            let settings = match config {
                Some(config) => load_settings(&config, false)?,
                None => MouseSettings::default(),
            };
            print_buffers(&settings.encode());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn interrupt_after_last_transfer_fails_run() {
        let flag = AtomicBool::new(false);
        assert!(ensure_not_interrupted(&flag).is_ok());

        flag.store(true, Ordering::SeqCst);
        let err = ensure_not_interrupted(&flag).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Interrupted)
        ));
    }

    #[test]
    fn apply_parses_flags() {
        let cli = Cli::parse_from([
            "xenon", "apply", "mouse.json", "--path", "/dev/hidraw4", "--strict",
        ]);
        match cli.command {
            Commands::Apply {
                config,
                path,
                strict,
                dry_run,
            } => {
                assert_eq!(config, PathBuf::from("mouse.json"));
                assert_eq!(path.as_deref(), Some("/dev/hidraw4"));
                assert!(strict);
                assert!(!dry_run);
            }
            _ => panic!("expected apply"),
        }
    }
}
