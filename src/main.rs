//! # Tarazu CLI
//!
//! Command-line interface for a parcel station: a serial scale feeding the
//! weight field of a shipping label, and a TSPL label printer.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP control surface
//! tarazu serve --config station.toml
//!
//! # List serial ports
//! tarazu ports
//!
//! # Show the TSPL program for a label file
//! tarazu encode --label parcel.json --size 100x80
//!
//! # Print a label file
//! tarazu print --label parcel.json --device /dev/ttyUSB1
//!
//! # Follow what a scale sends
//! tarazu watch --device /dev/ttyUSB0 --baud 9600
//! ```
//!
//! Label files are flat JSON objects of field name to value, the same shape
//! `PATCH /api/label` takes.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tarazu::{
    TarazuError,
    config::StationConfig,
    error::Result,
    events::{self, DeviceStatus},
    label::{LabelRecord, LabelStore, encode_with, parse_updates},
    printer::{LabelSize, PrinterSession},
    scale::{ScaleSession, encoding_for},
    server,
    transport::{BaudRate, PortProvider, SerialProvider},
};
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tarazu - scale-to-label station utility
#[derive(Parser, Debug)]
#[command(name = "tarazu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Station config file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP control surface
    Serve {
        /// Address to listen on
        #[arg(long)]
        listen: Option<String>,

        /// Scale device to open at startup
        #[arg(long)]
        scale: Option<String>,

        /// Printer device to open at startup
        #[arg(long)]
        printer: Option<String>,
    },

    /// List serial ports that can be opened
    Ports,

    /// Print the TSPL program for a label file to stdout
    Encode {
        /// Label file (JSON object of field name to value)
        #[arg(long, value_name = "FILE")]
        label: PathBuf,

        /// Label stock, e.g. 100x80
        #[arg(long)]
        size: Option<LabelSize>,

        /// Number of copies
        #[arg(long)]
        copies: Option<u32>,
    },

    /// Encode a label file and send it to the printer
    Print {
        /// Label file (JSON object of field name to value)
        #[arg(long, value_name = "FILE")]
        label: PathBuf,

        /// Printer device path
        #[arg(long)]
        device: Option<String>,

        /// Printer baud rate
        #[arg(long)]
        baud: Option<BaudRate>,

        /// Label stock, e.g. 100x80
        #[arg(long)]
        size: Option<LabelSize>,

        /// Number of copies
        #[arg(long)]
        copies: Option<u32>,
    },

    /// Connect to a scale and print every event until Ctrl-C
    Watch {
        /// Scale device path
        #[arg(long)]
        device: Option<String>,

        /// Scale baud rate
        #[arg(long)]
        baud: Option<BaudRate>,

        /// Charset the scale sends (WHATWG label)
        #[arg(long)]
        encoding: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tarazu=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tarazu=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => StationConfig::from_file(path)?,
        None => StationConfig::default(),
    };
    let provider: Arc<dyn PortProvider> = Arc::new(SerialProvider);

    match cli.command {
        Commands::Serve {
            listen,
            scale,
            printer,
        } => {
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            if scale.is_some() {
                config.scale.device = scale;
            }
            if printer.is_some() {
                config.printer.device = printer;
            }
            config.validate()?;
            server::serve(config, provider).await
        }

        Commands::Ports => {
            let ports = provider.list_ports().await?;
            if ports.is_empty() {
                println!("No serial ports found.");
            }
            for port in ports {
                println!("{:<24} {}", port.path, port.kind);
            }
            Ok(())
        }

        Commands::Encode {
            label,
            size,
            copies,
        } => {
            let record = load_label(&config, &label)?;
            let mut options = config.printer.encode_options();
            if let Some(copies) = copies {
                options.copies = copies.max(1);
            }
            let size = size.unwrap_or(config.printer.label_size);
            print!("{}", encode_with(&record, size, &options).to_tspl());
            Ok(())
        }

        Commands::Print {
            label,
            device,
            baud,
            size,
            copies,
        } => {
            let record = load_label(&config, &label)?;
            let device = device
                .or(config.printer.device.clone())
                .ok_or_else(|| TarazuError::Config("no printer device given".to_string()))?;
            let mut options = config.printer.encode_options();
            if let Some(copies) = copies {
                options.copies = copies.max(1);
            }
            let size = size.unwrap_or(config.printer.label_size);

            let printer = PrinterSession::new(provider, events::channel())
                .with_baud_rate(baud.unwrap_or(config.printer.baud_rate))
                .with_encoding(config.printer_encoding()?);
            printer.connect(&device).await?;
            let result = printer.print_label(&record, size, &options).await;
            printer.disconnect().await?;

            let bytes = result?;
            println!("Sent {} bytes to {}", bytes, device);
            Ok(())
        }

        Commands::Watch {
            device,
            baud,
            encoding,
        } => {
            let device = device
                .or(config.scale.device.clone())
                .ok_or_else(|| TarazuError::Config("no scale device given".to_string()))?;
            let encoding = match encoding {
                Some(label) => encoding_for(&label)?,
                None => config.scale_encoding()?,
            };

            let events = events::channel();
            let store = Arc::new(LabelStore::default());
            let scale = ScaleSession::new(provider, store.clone(), events.clone())
                .with_baud_rate(baud.unwrap_or(config.scale.baud_rate))
                .with_encoding(encoding);

            let mut rx = events.subscribe();
            let mut status = scale.subscribe_status();
            scale.connect(&device).await?;
            println!("Watching {} (Ctrl-C to stop)", device);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = status.changed() => {
                        let current = *status.borrow_and_update();
                        if changed.is_err() || matches!(current, DeviceStatus::Disconnected | DeviceStatus::Error) {
                            break;
                        }
                    }
                    event = rx.recv() => match event {
                        Ok(event) => println!("{}", event),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            println!("({} events skipped)", n)
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }

            scale.disconnect().await?;
            let weight = store.snapshot().await.weight;
            if !weight.is_empty() {
                println!("Last weight: {}", weight);
            }
            Ok(())
        }
    }
}

/// Fresh record from the config defaults with the file's fields applied.
fn load_label(config: &StationConfig, path: &Path) -> Result<LabelRecord> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TarazuError::Config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let fields: HashMap<String, String> = serde_json::from_str(&content)
        .map_err(|e| TarazuError::Config(format!("Invalid label file {}: {}", path.display(), e)))?;

    let mut record = config.label.record_at(Local::now());
    for (field, value) in parse_updates(fields)? {
        record.set(field, value);
    }
    Ok(record)
}
