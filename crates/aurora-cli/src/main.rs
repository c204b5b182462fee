//! `aurora`: command-line control of an Aurora link core.
//!
//! ```text
//! USAGE:
//!   aurora --uio /dev/uio0 --size 0x800 <command>
//!   aurora --sim <command>
//!
//! COMMANDS:
//!   info                          Compat number, core and channel counts
//!   status                        Lane, link, error and clock-lock flags
//!   counters                      Packet, overflow and CRC error counters
//!   fc [--pause-count N] ...      Show or set native flow control
//!   enable|disable [--channel C]  Start or stop the TX datapath
//!   stop-policy [--channel C] [drop|buffer]
//!   enqueue-ts <TICKS> [--channel C]
//!   ts-queue [--channel C]        Timestamp queue fullness/capacity
//!   init                          Reset and load default flow control
//!   reset [--tx-only]
//!   prop get|set|list             Key/value property access
//!   wait-link [--timeout SECS]    Poll until the link comes up
//! ```
//!
//! Commands attach to the running core and leave its state alone; only
//! `init` and `reset` reinitialize it.

use anyhow::{bail, Context, Result};
use aurora_driver::chip::StopPolicy;
use aurora_driver::{
    select_backend, AuroraBlock, BackendSelection, BlockConfig, ChannelSelect,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Interval between link status polls in `wait-link`.
const LINK_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "aurora", about = "Aurora link core control", version)]
struct Cli {
    /// Register window to map (UIO node or PCIe resource file).
    #[arg(long, global = true, conflicts_with = "sim")]
    uio: Option<PathBuf>,

    /// Register window size in bytes (decimal or 0x-prefixed hex).
    #[arg(long, global = true, value_parser = parse_u64)]
    size: Option<u64>,

    /// Run against a simulated core.
    #[arg(long, global = true)]
    sim: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print compat number, core and channel counts.
    Info,
    /// Print the core status word, decoded.
    Status,
    /// Print the four hardware counters.
    Counters,
    /// Show native flow control, setting any parameter given.
    Fc {
        /// Pause count in cycles (0 or >= 10).
        #[arg(long)]
        pause_count: Option<u8>,
        /// XOFF threshold.
        #[arg(long)]
        pause_threshold: Option<u16>,
        /// XON threshold.
        #[arg(long)]
        resume_threshold: Option<u16>,
    },
    /// Start the TX datapath.
    Enable {
        /// Channel index; all channels if omitted.
        #[arg(long)]
        channel: Option<usize>,
    },
    /// Stop the TX datapath.
    Disable {
        /// Channel index; all channels if omitted.
        #[arg(long)]
        channel: Option<usize>,
    },
    /// Show the stop policy, or set it if a policy is given.
    StopPolicy {
        /// Channel index; all channels if omitted.
        #[arg(long)]
        channel: Option<usize>,
        /// `drop` or `buffer`.
        policy: Option<StopPolicy>,
    },
    /// Queue a start timestamp (in ticks).
    EnqueueTs {
        /// Timestamp in ticks (decimal or 0x-prefixed hex).
        #[arg(value_parser = parse_u64)]
        ticks: u64,
        /// Channel index; all channels if omitted.
        #[arg(long)]
        channel: Option<usize>,
    },
    /// Show timestamp queue fullness and capacity.
    TsQueue {
        /// Channel index; all channels if omitted.
        #[arg(long)]
        channel: Option<usize>,
    },
    /// Reset the core and push the default flow-control values.
    Init,
    /// Reset the core (or only its TX datapath).
    Reset {
        /// Reset only the TX datapath.
        #[arg(long)]
        tx_only: bool,
    },
    /// Key/value property access.
    Prop {
        #[command(subcommand)]
        action: PropCmd,
    },
    /// Poll link status until it comes up.
    WaitLink {
        /// Give up after this many seconds.
        #[arg(long, default_value_t = 10.0)]
        timeout: f64,
    },
}

#[derive(Subcommand)]
enum PropCmd {
    /// Print one property.
    Get {
        /// Property key.
        key: String,
    },
    /// Write one property.
    Set {
        /// Property key.
        key: String,
        /// New value.
        value: String,
    },
    /// Print every property with its current value.
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut block = open_block(&cli)?;

    match cli.command {
        Cmd::Info => cmd_info(&block),
        Cmd::Status => cmd_status(&mut block)?,
        Cmd::Counters => cmd_counters(&mut block)?,
        Cmd::Fc {
            pause_count,
            pause_threshold,
            resume_threshold,
        } => cmd_fc(&mut block, pause_count, pause_threshold, resume_threshold)?,
        Cmd::Enable { channel } => cmd_enable(&mut block, true, channel.into())?,
        Cmd::Disable { channel } => cmd_enable(&mut block, false, channel.into())?,
        Cmd::StopPolicy { channel, policy } => cmd_stop_policy(&mut block, channel, policy)?,
        Cmd::EnqueueTs { ticks, channel } => {
            let select = ChannelSelect::from(channel);
            block.tx_datapath_enqueue_timestamp(ticks, select)?;
            println!("Queued start timestamp {ticks} on {select}");
        }
        Cmd::TsQueue { channel } => cmd_ts_queue(&mut block, channel)?,
        Cmd::Init => {
            let config = BlockConfig::default();
            block.init(config.flow_control)?;
            info!("Initialized with {:?}", config.flow_control);
            println!("Core initialized");
        }
        Cmd::Reset { tx_only } => {
            if tx_only {
                block.reset_tx()?;
                println!("TX datapath reset");
            } else {
                block.reset()?;
                println!("Core reset");
            }
        }
        Cmd::Prop { action } => cmd_prop(&mut block, action)?,
        Cmd::WaitLink { timeout } => cmd_wait_link(&mut block, timeout)?,
    }

    Ok(())
}

fn open_block(cli: &Cli) -> Result<AuroraBlock> {
    let selection = match (&cli.uio, cli.sim) {
        (Some(path), _) => BackendSelection::Mmap {
            path: path.clone(),
            size: cli
                .size
                .map(usize::try_from)
                .transpose()
                .context("--size does not fit in usize")?,
        },
        (None, true) => BackendSelection::Simulated,
        (None, false) => bail!("no register window given (pass --uio PATH or --sim)"),
    };

    let regs = select_backend(&selection).context("Failed to open register backend")?;
    debug!("Attaching to {} backend", regs.backend_type());
    AuroraBlock::attach(regs, BlockConfig::default()).context("Failed to open Aurora block")
}

fn cmd_info(block: &AuroraBlock) {
    let config = block.core_config();
    println!("Compat       : {}", block.compat());
    println!("Cores        : {}", config.num_cores);
    println!("Channels     : {}", config.num_channels);
    println!("Channel list : {:?}", block.channels());
}

fn cmd_status(block: &mut AuroraBlock) -> Result<()> {
    let status = block.get_status()?;
    println!("{status}");
    for (lane, up) in status.lane_status.iter().enumerate() {
        println!("  lane {lane}: {}", if *up { "up" } else { "down" });
    }
    println!("Healthy: {}", status.is_healthy());
    Ok(())
}

fn cmd_counters(block: &mut AuroraBlock) -> Result<()> {
    let counters = block.get_counters()?;
    println!("RX packets : {}", counters.rx_packets);
    println!("TX packets : {}", counters.tx_packets);
    println!("Overflows  : {}", counters.overflows);
    println!("CRC errors : {}", counters.crc_errors);
    Ok(())
}

fn cmd_fc(
    block: &mut AuroraBlock,
    pause_count: Option<u8>,
    pause_threshold: Option<u16>,
    resume_threshold: Option<u16>,
) -> Result<()> {
    if let Some(count) = pause_count {
        block.set_fc_pause_count(count)?;
    }
    if let Some(threshold) = pause_threshold {
        block.set_fc_pause_threshold(threshold)?;
    }
    if let Some(threshold) = resume_threshold {
        block.set_fc_resume_threshold(threshold)?;
    }

    let fc = block.get_flow_control()?;
    println!("Pause count      : {}", fc.pause_count);
    println!("Pause threshold  : {}", fc.pause_threshold);
    println!("Resume threshold : {}", fc.resume_threshold);
    Ok(())
}

fn cmd_enable(block: &mut AuroraBlock, on: bool, select: ChannelSelect) -> Result<()> {
    block.tx_datapath_enable(on, select)?;
    println!(
        "TX datapath {} on {select}",
        if on { "started" } else { "stopped" }
    );
    Ok(())
}

fn cmd_stop_policy(
    block: &mut AuroraBlock,
    channel: Option<usize>,
    policy: Option<StopPolicy>,
) -> Result<()> {
    if let Some(policy) = policy {
        block.set_channel_stop_policy(policy, channel)?;
    }

    match channel {
        Some(channel) => {
            println!("channel {channel}: {}", block.get_channel_stop_policy(channel)?);
        }
        None => {
            for (channel, policy) in block.get_channel_stop_policies()?.iter().enumerate() {
                println!("channel {channel}: {policy}");
            }
        }
    }
    Ok(())
}

fn cmd_ts_queue(block: &mut AuroraBlock, channel: Option<usize>) -> Result<()> {
    let channels = ChannelSelect::from(channel).resolve(block.num_channels())?;
    for channel in channels {
        let status = block.get_timestamp_queue_status(channel)?;
        println!("channel {channel}: {status}");
    }
    Ok(())
}

fn cmd_prop(block: &mut AuroraBlock, action: PropCmd) -> Result<()> {
    match action {
        PropCmd::Get { key } => {
            let value = block.get_property(&key)?;
            println!("{key} = {value}");
        }
        PropCmd::Set { key, value } => {
            let kind = block.property_record(&key)?.value.kind();
            let parsed = kind
                .parse(&value)
                .with_context(|| format!("'{value}' is not a valid {} for {key}", kind.name()))?;
            block.set_property(&key, parsed)?;
            println!("{key} = {parsed}");
        }
        PropCmd::List => {
            let keys: Vec<_> = block.property_keys().collect();
            for key in keys {
                let value = block.get_property(key)?;
                let access = if block.is_property_writable(key)? { "rw" } else { "ro" };
                println!("{key:<22} {access}  {value}");
            }
        }
    }
    Ok(())
}

fn cmd_wait_link(block: &mut AuroraBlock, timeout: f64) -> Result<()> {
    let timeout = Duration::try_from_secs_f64(timeout).context("invalid --timeout")?;
    let start = Instant::now();

    println!("Waiting for link...");
    while !block.get_link_status()? {
        if start.elapsed() >= timeout {
            bail!("link did not come up within {timeout:?}");
        }
        debug!("Link down, polling again in {LINK_POLL_INTERVAL:?}");
        std::thread::sleep(LINK_POLL_INTERVAL);
    }
    println!("Link up after {:.1} s", start.elapsed().as_secs_f64());
    Ok(())
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}': {e}"))
}
