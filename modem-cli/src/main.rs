// modem-cli -- drive a Quectel, SIMCom or Huawei modem from the command line.
//
// Usage:
//   modem-cli                                   network status dump
//   modem-cli --port /dev/ttyUSB3 --gnss        read positions every 5 s
//   modem-cli --hologram-send "hello" --devicekey KEY
//   modem-cli --hologram-receive                listen on TCP 2020
//   modem-cli --sms-receive
//   modem-cli --sms-send "hello" --number +15551234567
//
// Logging goes to stderr and is controlled with RUST_LOG (default: warn).

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use cellmodem::cloud::{self, HOLOGRAM_APN, HOLOGRAM_RECEIVE_PORT};
use cellmodem::{
    bind, identify, network_info, send_sms, AtChannel, CancellationToken, Error, GnssPoller,
    Identification, Modem, ModemBuilder, ModemEvent, SmsReceiver, TcpReceiver,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Cellular modem AT-command demo.
#[derive(Parser)]
#[command(name = "modem-cli", version, about)]
#[command(group(
    ArgGroup::new("mode")
        .args(["gnss", "hologram_send", "hologram_receive", "sms_receive", "sms_send"])
        .multiple(false)
))]
struct Cli {
    /// Modem AT port.
    #[arg(long, default_value = "/dev/ttyUSB2")]
    port: String,

    /// Serial baud rate.
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Per-line reply timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 1000)]
    timeout_ms: u64,

    /// Configure GNSS and print a position every few seconds.
    #[arg(long, visible_alias = "gps")]
    gnss: bool,

    /// Send MESSAGE to the Hologram cloud.
    #[arg(long, value_name = "MESSAGE", requires = "devicekey")]
    hologram_send: Option<String>,

    /// Hologram device key for --hologram-send.
    #[arg(long, value_name = "KEY")]
    devicekey: Option<String>,

    /// Listen for Hologram cloud messages on TCP port 2020.
    #[arg(long)]
    hologram_receive: bool,

    /// Print incoming SMS messages.
    #[arg(long)]
    sms_receive: bool,

    /// Send MESSAGE as an SMS.
    #[arg(long, value_name = "MESSAGE", requires = "number")]
    sms_send: Option<String>,

    /// Destination number for --sms-send.
    #[arg(long)]
    number: Option<String>,
}

/// What the process was asked to do.
enum Mode {
    NetworkInfo,
    Gnss,
    HologramSend { message: String, key: String },
    HologramReceive,
    SmsReceive,
    SmsSend { message: String, number: String },
}

impl Cli {
    fn mode(&self) -> Result<Mode> {
        if self.gnss {
            return Ok(Mode::Gnss);
        }
        if let Some(message) = &self.hologram_send {
            let key = self.devicekey.clone().unwrap_or_default();
            if message.is_empty() {
                bail!("No message given for --hologram-send");
            }
            if key.is_empty() {
                bail!("No device key specified");
            }
            return Ok(Mode::HologramSend {
                message: message.clone(),
                key,
            });
        }
        if self.hologram_receive {
            return Ok(Mode::HologramReceive);
        }
        if self.sms_receive {
            return Ok(Mode::SmsReceive);
        }
        if let Some(message) = &self.sms_send {
            let number = self.number.clone().unwrap_or_default();
            if number.is_empty() {
                bail!("No destination number given for --sms-send");
            }
            return Ok(Mode::SmsSend {
                message: message.clone(),
                number,
            });
        }
        Ok(Mode::NetworkInfo)
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

fn print_event(event: ModemEvent) {
    match event {
        ModemEvent::Warning(failure) => println!("{failure}"),
        ModemEvent::Position(fix) => println!("{fix}"),
        ModemEvent::PositionError(error) => println!("{error}"),
        ModemEvent::Listening(address) => println!("Server started at local IP: {address}"),
        ModemEvent::Data(data) => match data.peer {
            Some(peer) => println!("{}, {peer}", data.payload),
            None => println!("{}", data.payload),
        },
        ModemEvent::SocketClosed { socket } => println!("Socket {socket} closed"),
        ModemEvent::Sms(message) => {
            println!("message received: {}", message.sender);
            println!("{}", message.body);
        }
        ModemEvent::SmsError(error) => println!("{error}"),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

fn require_driver(
    ident: &Identification,
    channel: AtChannel,
    builder: &ModemBuilder,
) -> Result<Box<dyn Modem>> {
    let Some(vendor) = ident.vendor else {
        bail!("No Compatible Modem recognised");
    };
    Ok(bind(vendor, channel, builder.pacing())?)
}

async fn run_gnss(
    mut modem: Box<dyn Modem>,
    builder: &ModemBuilder,
    cancel: &CancellationToken,
) -> Result<AtChannel> {
    let poller = GnssPoller::new(builder.delay_source(), builder.session_timing().clone());
    let mut sink = print_event;
    poller.configure(modem.as_mut(), &mut sink).await?;
    println!("Reading GNSS data:");
    poller.poll(modem.as_mut(), cancel, &mut sink).await?;
    Ok(modem.into_channel())
}

async fn run_hologram_receive(
    mut modem: Box<dyn Modem>,
    builder: &ModemBuilder,
    cancel: &CancellationToken,
) -> Result<AtChannel> {
    let mut receiver = TcpReceiver::new(builder.delay_source(), builder.session_timing().clone());
    let mut sink = print_event;
    receiver
        .start(modem.as_mut(), HOLOGRAM_APN, HOLOGRAM_RECEIVE_PORT, &mut sink)
        .await
        .context("failed to start TCP server")?;
    receiver.run(modem.as_mut(), cancel, &mut sink).await?;
    Ok(modem.into_channel())
}

async fn run_sms_receive(
    channel: &mut AtChannel,
    builder: &ModemBuilder,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut receiver = SmsReceiver::new(builder.delay_source(), builder.session_timing().clone());
    for failure in receiver.start(channel).await? {
        println!("{failure}");
    }
    receiver.run(channel, cancel, &mut print_event).await?;
    Ok(())
}

async fn run_mode(
    mode: Mode,
    ident: &Identification,
    mut channel: AtChannel,
    builder: &ModemBuilder,
    cancel: &CancellationToken,
) -> Result<AtChannel> {
    match mode {
        Mode::NetworkInfo => {
            for entry in network_info(&mut channel).await? {
                println!("{entry}");
            }
        }
        Mode::Gnss => {
            let modem = require_driver(ident, channel, builder)?;
            channel = run_gnss(modem, builder, cancel).await?;
        }
        Mode::HologramSend { message, key } => {
            let mut modem = require_driver(ident, channel, builder)?;
            for report in cloud::send_message(modem.as_mut(), &key, &message).await? {
                println!("{report}");
            }
            channel = modem.into_channel();
        }
        Mode::HologramReceive => {
            let modem = require_driver(ident, channel, builder)?;
            channel = run_hologram_receive(modem, builder, cancel).await?;
        }
        Mode::SmsReceive => run_sms_receive(&mut channel, builder, cancel).await?,
        Mode::SmsSend { message, number } => {
            let report = send_sms(&mut channel, &number, &message).await?;
            println!("{}", report.prompt);
            println!("{report}");
        }
    }
    Ok(channel)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    // Validate before touching the port.
    let mode = cli.mode()?;

    let builder = ModemBuilder::new()
        .serial_port(&cli.port)
        .baud_rate(cli.baud)
        .command_timeout(Duration::from_millis(cli.timeout_ms));
    let mut channel = builder
        .open()
        .await
        .with_context(|| format!("Failed to initialize device: {}", cli.port))?;

    let ident = match identify(&mut channel).await {
        Ok(ident) => ident,
        Err(Error::Timeout) => bail!("Modem is not responding"),
        Err(e) => return Err(e).context("identification failed"),
    };
    println!("Modem information:\n{}", ident.text);

    // Vendor setup runs for every mode once the modem is recognised.
    let channel = match ident.vendor {
        Some(vendor) => {
            let mut modem = bind(vendor, channel, builder.pacing())?;
            for failure in modem.prepare().await? {
                println!("{failure}");
            }
            modem.into_channel()
        }
        None => channel,
    };

    let cancel = CancellationToken::new();
    let work = run_mode(mode, &ident, channel, &builder, &cancel);
    tokio::pin!(work);
    let mut channel = tokio::select! {
        result = &mut work => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            cancel.cancel();
            work.await?
        }
    };

    shutdown(&mut channel).await;
    Ok(())
}

/// Release the port. A failure here only affects cleanup, so it is logged.
async fn shutdown(channel: &mut AtChannel) {
    if let Err(e) = channel.close().await {
        tracing::warn!(error = %e, "failed to close modem port");
    }
}
