//! smartmeter-influx - export Wiener Netze smart meter readings as InfluxDB
//! line protocol.

use std::io::{self, BufWriter, Write};
use std::net::TcpStream;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use smartmeter_auth::{Credentials, ProviderConfig};
use smartmeter_client::SmartMeterClient;

mod export;
mod line_protocol;

const STDOUT: &str = "stdout";

const AFTER_HELP: &str = "\
Pulls 15 minute consumption data for every smart meter in the account and
writes it as InfluxDB line protocol.

Each point has a single field 'value' (consumption in Wh for the interval
ending at the point's timestamp) and the tags meterID, deviceID, equipmentID
and customLabel. Data covers the first reading on the start day through the
last reading on the end day, in UTC.";

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Export Wiener Netze smart meter readings as InfluxDB line protocol
#[derive(Parser)]
#[command(name = "smartmeter-influx")]
#[command(version, about, long_about = None, after_help = AFTER_HELP)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("SMARTMETER_BUILD_INFO"), ")"))]
struct Cli {
    /// First day to export (YYYY-MM-DD, UTC)
    #[arg(long)]
    start: NaiveDate,

    /// Last day to export, inclusive (YYYY-MM-DD, UTC)
    #[arg(long)]
    end: NaiveDate,

    /// Measurement name of the emitted points
    #[arg(long, default_value = "smartmeter")]
    metric_name: String,

    /// <host>:<port> to push points to over TCP, or "stdout"
    #[arg(long, default_value = STDOUT)]
    to_host: String,

    /// log.wien username
    #[arg(long, env = "SMARTMETER_USERNAME", hide_env_values = true)]
    username: String,

    /// log.wien password
    #[arg(long, env = "SMARTMETER_PASSWORD", hide_env_values = true)]
    password: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Start of the start day through the last microsecond of the end day.
    fn range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        if self.start > self.end {
            bail!("start ({}) is after end ({})", self.start, self.end);
        }
        let start = self.start.and_time(NaiveTime::MIN).and_utc();
        let end = self
            .end
            .succ_opt()
            .context("end date out of range")?
            .and_time(NaiveTime::MIN)
            .and_utc()
            - Duration::microseconds(1);
        Ok((start, end))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (start, end) = cli.range()?;

    let credentials = Credentials::new(cli.username.as_str(), cli.password.as_str());
    let client = SmartMeterClient::login(ProviderConfig::wiener_netze(), &credentials)
        .await
        .context("login failed")?;

    let meters = client
        .stadtwerke()
        .meters()
        .await
        .context("failed to list meters")?;
    tracing::debug!(meters = meters.len(), "Listed meters");

    let mut out = open_output(&cli.to_host)?;

    tracing::info!(
        start = %start.to_rfc3339(),
        end = %end.to_rfc3339(),
        "Export -- start: {start}, end: {end}"
    );

    let mut count = 0;
    let result = export::export_meters(
        &client,
        &meters,
        (start, end),
        &cli.metric_name,
        &mut out,
        &mut count,
    )
    .await
    .and_then(|()| out.flush().context("failed to flush output"));

    tracing::info!(points = count, output = %cli.to_host, "Exported {count} points to {}", cli.to_host);
    result
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let default = if verbose {
        "smartmeter_influx=debug,smartmeter_client=debug,smartmeter_auth=debug,info"
    } else {
        "smartmeter_influx=info,smartmeter_client=info,smartmeter_auth=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_writer(io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn open_output(to_host: &str) -> Result<Box<dyn Write>> {
    if to_host == STDOUT {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }
    let stream =
        TcpStream::connect(to_host).with_context(|| format!("failed to connect to {to_host}"))?;
    tracing::debug!(peer = to_host, "Connected");
    Ok(Box::new(BufWriter::new(stream)))
}
