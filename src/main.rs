use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use serial_bridge::error::BridgeError;
use serial_bridge::port::{
    DataBits, FlowControl, Parity, SerialLineSource, SerialSettings, StopBits,
};

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Expose one serial device's line stream to many TCP clients.",
    long_about = "Reads newline-terminated records from a serial device and broadcasts each \
                  one, unmodified, to every connected TCP client. Clients that disconnect are \
                  dropped without disturbing the rest; Ctrl+C or SIGTERM shuts the bridge down \
                  cleanly."
)]
struct Args {
    /// Serial device to read from (e.g. /dev/ttyUSB0).
    #[arg(
        short,
        long,
        value_parser = clap::builder::NonEmptyStringValueParser::new(),
        required_unless_present = "list_ports"
    )]
    device: Option<String>,

    /// TCP port to expose to clients.
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u16).range(1..),
        required_unless_present = "list_ports"
    )]
    port: Option<u16>,

    /// Baud rate for the serial device.
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Number of data bits per character.
    #[arg(long, value_enum, default_value = "8")]
    data_bits: DataBits,

    /// Parity checking mode.
    #[arg(long, value_enum, default_value = "none")]
    parity: Parity,

    /// Number of stop bits.
    #[arg(long, value_enum, default_value = "1")]
    stop_bits: StopBits,

    /// Flow control mode.
    #[arg(long, value_enum, default_value = "none")]
    flow_control: FlowControl,

    /// List detected serial devices and exit.
    #[arg(long)]
    list_ports: bool,
}

// --- Main Application Entry Point ---
#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if args.list_ports {
        if let Err(err) = list_ports() {
            error!(error = %err, "failed to enumerate serial devices");
            std::process::exit(1);
        }
        return;
    }

    if let Err(err) = start(args).await {
        error!(error = %err, "bridge terminated");
        std::process::exit(1);
    }
}

/// Open the device, bind the listener, and run the bridge to completion.
async fn start(args: Args) -> Result<(), BridgeError> {
    // clap enforces both outside --list-ports mode.
    let device = args.device.expect("device argument is required");
    let port = args.port.expect("port argument is required");

    let settings = SerialSettings {
        baud_rate: args.baud,
        data_bits: args.data_bits,
        flow_control: args.flow_control,
        parity: args.parity,
        stop_bits: args.stop_bits,
    };

    let source = SerialLineSource::open(&device, &settings)?;
    info!(%device, baud = settings.baud_rate, "serial device opened");

    let addr = SocketAddr::new(args.bind, port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| BridgeError::bind(addr, err))?;
    info!(%addr, "listening for clients");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    serial_bridge::run(source, listener, shutdown).await
}

/// Print the serial devices visible on this system.
fn list_ports() -> Result<(), serialport::Error> {
    let ports = serialport::available_ports()?;
    if ports.is_empty() {
        println!("No serial devices detected.");
        return Ok(());
    }
    for port in ports {
        println!("{}\t{:?}", port.port_name, port.port_type);
    }
    Ok(())
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}
