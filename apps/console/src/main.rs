use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{CsvUpload, InventoryView, Severity, Status, ViewController};
use shared::protocol::DeviceFormFields;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hvac-console", about = "Terminal frontend for the HVAC device inventory")]
struct Cli {
    /// Base URL of the inventory backend.
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a CSV of devices, then show the refreshed list.
    Upload { path: PathBuf },
    /// Add a single device from field=value pairs, then show the refreshed
    /// list.
    Add {
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Fetch and print the device list.
    List,
}

struct TerminalView;

#[async_trait]
impl InventoryView for TerminalView {
    async fn set_upload_status(&self, status: Status) {
        print_status("upload", &status);
    }

    async fn set_add_device_status(&self, status: Status) {
        print_status("add-device", &status);
    }

    async fn show_device_list(&self, entries: Vec<String>) {
        for entry in entries {
            println!("{entry}");
        }
    }

    async fn show_list_error(&self, message: String) {
        println!("{message}");
    }

    async fn clear_add_device_form(&self) {}
}

fn print_status(region: &str, status: &Status) {
    let (Some(text), Some(severity)) = (status.text(), status.severity()) else {
        return;
    };
    let tag = match severity {
        Severity::Success => "ok",
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    println!("[{region}] {tag}: {text}");
}

fn parse_fields(raw: &[String]) -> Result<DeviceFormFields> {
    let mut fields = DeviceFormFields::new();
    for pair in raw {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("expected field=value, got '{pair}'"))?;
        if key.is_empty() {
            bail!("empty field name in '{pair}'");
        }
        fields.insert(key.to_string(), value.to_string());
    }
    Ok(fields)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();
    tracing::debug!(server_url = %cli.server_url, "console starting");

    let controller = ViewController::new(&cli.server_url, Arc::new(TerminalView))?;
    match cli.command {
        Command::Upload { path } => {
            let contents = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("upload.csv")
                .to_string();
            controller
                .submit_upload(Some(CsvUpload { filename, contents }))
                .await;
        }
        Command::Add { fields } => {
            let fields = parse_fields(&fields)?;
            controller.submit_add_device(fields).await;
        }
        Command::List => controller.initialize().await,
    }

    Ok(())
}
