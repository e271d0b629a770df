mod config;

use std::{fs, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    event_channel, fetch_build_version,
    session::{ACCESS_TOKEN_KEY, DEVICE_ID_KEY, REFRESH_TOKEN_KEY},
    ClientEvent, Notice, PanelController, RecoveryFile, RecoveryFlowController, Severity,
    SessionContext,
};
use serde::Deserialize;
use shared::domain::PrinterDescriptor;
use tokio::sync::broadcast;

use crate::config::{load_settings, prepare_database_url};

const NO_FILE_PLACEHOLDER: &str = "no file selected";
const REDIRECT_WAIT: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(
    name = "lab-desk",
    about = "Desktop companion for the lab platform backend"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Restore account access with a super-password.
    RecoverCode {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    /// Restore account access with a recovery file.
    RecoverFile {
        #[arg(long)]
        email: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// List configured devices the way the panel suggests them.
    Devices,
    /// Scan a document on a configured scanner and save the image.
    Scan {
        #[arg(long)]
        ip: String,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long, default_value = "scan.jpg")]
        output: PathBuf,
    },
    /// Send label content to the label printer.
    Print {
        #[arg(long)]
        content: String,
    },
    /// Show the backend build version.
    Version,
    /// Show which session values are stored.
    Status,
    /// Clear the stored session values.
    Logout,
}

#[derive(Debug, Deserialize)]
struct DeviceInventory {
    #[serde(default)]
    printers: Vec<PrinterDescriptor>,
}

fn load_device_inventory(path: &str) -> Result<Vec<PrinterDescriptor>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read device inventory '{path}'"))?;
    let inventory: DeviceInventory =
        toml::from_str(&raw).with_context(|| format!("invalid device inventory '{path}'"))?;
    Ok(inventory.printers)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = load_settings();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = storage::Storage::new(&database_url).await?;
    tracing::info!(database_url = %database_url, "desktop: session store ready");
    let session = SessionContext::new(Arc::new(storage.clone()));
    let http = reqwest::Client::new();
    let (events, rx) = event_channel();

    match args.command {
        Command::RecoverCode { email, code } => {
            let mut recovery = RecoveryFlowController::new(
                http,
                &settings.server_url,
                session,
                events,
                NO_FILE_PLACEHOLDER,
            )?;
            recovery.open_modal();
            recovery.choose_super_password();
            let outcome = recovery.submit(&email, Some(&code)).await;
            present_events(rx, outcome.is_ok()).await;
            outcome?;
        }
        Command::RecoverFile { email, file } => {
            let bytes = fs::read(&file)
                .with_context(|| format!("failed to read recovery file '{}'", file.display()))?;
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "recovery.bin".to_string());

            let mut recovery = RecoveryFlowController::new(
                http,
                &settings.server_url,
                session,
                events,
                NO_FILE_PLACEHOLDER,
            )?;
            recovery.open_modal();
            recovery.choose_recovery_file();
            recovery.attach_file(RecoveryFile { filename, bytes });
            println!("attached: {}", recovery.file_label());
            let outcome = recovery.submit(&email, None).await;
            present_events(rx, outcome.is_ok()).await;
            outcome?;
        }
        Command::Devices => {
            let mut panel = PanelController::new(http, &settings.server_url, session, events)?;
            panel.load_devices(load_device_inventory(&settings.devices_path)?);
            for suggestion in panel.suggestions() {
                println!("{}", suggestion.label);
            }
        }
        Command::Scan { ip, port, output } => {
            let mut panel = PanelController::new(http, &settings.server_url, session, events)?;
            panel.set_scanner_port(port.unwrap_or(settings.scanner_port));
            panel.load_devices(load_device_inventory(&settings.devices_path)?);
            panel.select(&ip);
            let outcome = panel.scan().await;
            present_events(rx, false).await;
            outcome?;

            let preview = panel.preview().context("scan succeeded without a preview")?;
            fs::write(&output, &preview.bytes)
                .with_context(|| format!("failed to write scan image '{}'", output.display()))?;
            println!("saved {} bytes to {}", preview.bytes.len(), output.display());
        }
        Command::Print { content } => {
            let mut panel = PanelController::new(http, &settings.server_url, session, events)?;
            let outcome = panel.send_label(&content).await;
            present_events(rx, false).await;
            let report = outcome?;
            if !report.succeeded() {
                anyhow::bail!("label print reported failure");
            }
        }
        Command::Version => {
            let version = fetch_build_version(&http, &settings.server_url).await;
            println!("{version}");
        }
        Command::Status => {
            for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, DEVICE_ID_KEY] {
                match storage.entry(key).await? {
                    Some(entry) => println!("{key}: set (updated {})", entry.updated_at),
                    None => println!("{key}: not set"),
                }
            }
        }
        Command::Logout => {
            session.clear().await?;
            println!("session cleared");
        }
    }

    Ok(())
}

/// Prints everything the controllers emitted for this action. The redirect
/// event trails the success notice by a fixed delay, so it is awaited
/// separately when the action succeeded.
async fn present_events(mut rx: broadcast::Receiver<ClientEvent>, wait_for_redirect: bool) {
    use tokio::sync::broadcast::error::TryRecvError;

    loop {
        match rx.try_recv() {
            Ok(event) => render_event(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    if wait_for_redirect {
        if let Ok(Ok(event)) = tokio::time::timeout(REDIRECT_WAIT, rx.recv()).await {
            render_event(event);
        }
    }
}

fn render_event(event: ClientEvent) {
    match event {
        ClientEvent::Notice(notice) => render_notice(notice),
        ClientEvent::RedirectRequested { url } => println!("-> continue at {url}"),
        ClientEvent::ScanPreviewUpdated => {}
    }
}

fn render_notice(notice: Notice) {
    match notice.severity {
        Severity::Error => eprintln!("error: {}", notice.text),
        Severity::Success | Severity::Pending | Severity::Info => println!("{}", notice.text),
    }
}
