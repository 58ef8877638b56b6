// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use aligncheck_config::BoardProfile;
use aligncheck_core::bus::SystemBus;
use aligncheck_core::peripherals::uart::UartDevice;
use aligncheck_core::svmem::{self, Disassembly, DEFAULT_MEMORY_NAME, DEFAULT_MEM_WIDTH};
use aligncheck_core::verify::{verify_probe, ProbeReport};
use aligncheck_hal::{probe, Bounded, Heartbeat, Uart, UartError, UartStatus};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

const EXIT_PASS: u8 = 0;
const EXIT_CHECK_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "aligncheck - MMIO alignment and polled UART harness for soft-core boards",
    long_about = None
)]
struct Cli {
    /// Enable debug-level tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the alignment probe on the simulated board and verify the readback
    Probe(ProbeArgs),
    /// Drive the simulated UART through the polled driver
    Uart(UartArgs),
    /// Run the idle-loop heartbeat for a number of beats
    Heartbeat(HeartbeatArgs),
    /// Convert a firmware binary into SystemVerilog memory initialization
    Bin2sv(Bin2svArgs),
}

#[derive(Args, Debug)]
struct BoardArg {
    /// Path to the board profile (YAML); defaults to the built-in soft-core board
    #[arg(short, long)]
    board: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    #[command(flatten)]
    board: BoardArg,

    /// Base address handed to the probe (defaults to the board's test base)
    #[arg(long, value_parser = parse_addr)]
    base: Option<u64>,

    /// Run the probe a second time and require identical memory
    #[arg(long)]
    twice: bool,

    /// Byte to paint memory with before probing
    #[arg(long, default_value = "0", value_parser = parse_byte)]
    fill: u8,

    /// Write the JSON report to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UartArgs {
    #[command(flatten)]
    board: BoardArg,

    /// Text to transmit
    #[arg(short, long)]
    send: String,

    /// Bytes the remote end has already sent us
    #[arg(long)]
    rx: Option<String>,

    /// Give up on a full TX FIFO after this many status polls (default: wait forever)
    #[arg(long)]
    max_polls: Option<u32>,

    /// Do not mirror transmitted bytes to stdout
    #[arg(long)]
    no_uart_stdout: bool,
}

#[derive(Args, Debug)]
struct HeartbeatArgs {
    #[command(flatten)]
    board: BoardArg,

    /// Number of idle-loop iterations
    #[arg(long, default_value = "10")]
    beats: u32,
}

#[derive(Args, Debug)]
struct Bin2svArgs {
    /// Firmware image (.bin)
    input: PathBuf,

    /// SystemVerilog file to write
    output: PathBuf,

    /// objdump-style listing used to annotate each word with its instructions
    opcodes: Option<PathBuf>,

    /// Name of the memory instance
    #[arg(short = 'm', long, default_value = DEFAULT_MEMORY_NAME)]
    memory_name: String,

    /// Width of each memory word in bits
    #[arg(short = 'x', long, default_value_t = DEFAULT_MEM_WIDTH)]
    mem_width: u32,
}

fn parse_addr(s: &str) -> Result<u64, String> {
    let s = s.trim().replace('_', "");
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let value = parse_addr(s)?;
    u8::try_from(value).map_err(|_| format!("{:#x} does not fit in a byte", value))
}

#[derive(Serialize)]
struct ProbeRun<'a> {
    status: &'static str,
    board: &'a str,
    clock_mhz: u32,
    idempotent: Option<bool>,
    #[serde(flatten)]
    report: &'a ProbeReport,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let outcome = match cli.command {
        Command::Probe(args) => run_probe(args),
        Command::Uart(args) => run_uart(args),
        Command::Heartbeat(args) => run_heartbeat(args),
        Command::Bin2sv(args) => run_bin2sv(args),
    };

    match outcome {
        Ok(true) => ExitCode::from(EXIT_PASS),
        Ok(false) => ExitCode::from(EXIT_CHECK_FAIL),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn load_board(path: Option<&Path>) -> Result<BoardProfile> {
    match path {
        Some(path) => {
            info!("Loading board profile: {:?}", path);
            BoardProfile::from_file(path)
        }
        None => {
            info!("Using default board profile");
            Ok(BoardProfile::default_board())
        }
    }
}

fn run_probe(args: ProbeArgs) -> Result<bool> {
    let profile = load_board(args.board.board.as_deref())?;
    let map = profile.memory_map()?;
    let mut bus = SystemBus::from_profile(&profile)?;
    bus.ram.fill(args.fill);

    let base = args.base.unwrap_or(map.test_base as u64);
    info!("Probing board '{}' at base {:#x}", profile.name, base);

    probe::run(&mut bus.window(base));
    let mut report = verify_probe(&mut bus, base);

    let idempotent = if args.twice {
        probe::run(&mut bus.window(base));
        let second = verify_probe(&mut bus, base);
        let same = second.region == report.region;
        if !same {
            warn!("Second probe run changed the test region");
        }
        report = second;
        Some(same)
    } else {
        None
    };

    let passed = report.passed() && idempotent.unwrap_or(true);
    info!(
        "Results: A={} B={} C={} D={}",
        report.results.a, report.results.b, report.results.c, report.results.d
    );
    info!("Region digest: {}", report.digest);
    info!(
        "Probe {}: {} mismatch(es), {} bus fault(s)",
        if passed { "PASSED" } else { "FAILED" },
        report.mismatches.len(),
        report.faults.len()
    );

    if let Some(path) = &args.json {
        let run = ProbeRun {
            status: if passed { "pass" } else { "fail" },
            board: &profile.name,
            clock_mhz: profile.clock_mhz,
            idempotent,
            report: &report,
        };
        let json = serde_json::to_string_pretty(&run)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Report written to {:?}", path);
    }

    Ok(passed)
}

fn run_uart(args: UartArgs) -> Result<bool> {
    let profile = load_board(args.board.board.as_deref())?;
    let map = profile.memory_map()?;
    let device = UartDevice::new(&profile.uart).with_stdout_echo(!args.no_uart_stdout);
    let mut bus = SystemBus::from_map(&map, device);

    if let Some(rx) = &args.rx {
        bus.uart_mut()
            .context("Board has no UART")?
            .inject_rx(rx.as_bytes());
    }

    let base = map.uart_base as u64;
    let sent = match args.max_polls {
        Some(limit) => Uart::with_policy(bus.window(base), Bounded::new(limit)).send_string(&args.send),
        None => Uart::new(bus.window(base)).send_string(&args.send),
    };
    if let Err(e) = &sent {
        warn!("Transmit stopped: {}", e);
    }

    let mut uart = Uart::new(bus.window(base));
    let mut received = Vec::new();
    loop {
        match uart.receive() {
            Ok(byte) => received.push(byte),
            Err(UartError::Empty) => break,
            Err(e) => return Err(e.into()),
        }
    }
    if uart.status().contains(UartStatus::IRQ_PENDING) {
        uart.clear_irq();
        info!("Cleared pending UART interrupt");
    }
    drop(uart);

    let irqs = bus.pending_irqs.len();
    let dev = bus.uart_mut().context("Board has no UART")?;
    dev.flush();
    if !args.no_uart_stdout {
        println!();
    }

    info!(
        "Transmitted {} byte(s): {:?}",
        dev.transmitted().len(),
        String::from_utf8_lossy(dev.transmitted())
    );
    info!(
        "Received {} byte(s): {:?}",
        received.len(),
        String::from_utf8_lossy(&received)
    );
    if dev.overruns() > 0 {
        warn!("{} byte(s) lost to TX overrun", dev.overruns());
    }
    info!("{} UART interrupt(s) raised during the session", irqs);

    Ok(sent.is_ok() && dev.overruns() == 0)
}

fn run_heartbeat(args: HeartbeatArgs) -> Result<bool> {
    let profile = load_board(args.board.board.as_deref())?;
    let mut bus = SystemBus::from_profile(&profile)?;
    let map = profile.memory_map()?;

    let mut heartbeat = Heartbeat::new(bus.window(map.heartbeat as u64));
    heartbeat.reset();
    let mut last = 0;
    for _ in 0..args.beats {
        last = heartbeat.beat();
    }
    drop(heartbeat);

    info!(
        "Heartbeat at {:#x} = {} after {} beat(s)",
        map.heartbeat, last, args.beats
    );
    Ok(bus.faults.is_empty() && last == (args.beats % 256) as u8)
}

fn run_bin2sv(args: Bin2svArgs) -> Result<bool> {
    let image = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read image {:?}", args.input))?;
    let disassembly = match &args.opcodes {
        Some(path) => {
            let listing = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read listing {:?}", path))?;
            svmem::parse_disassembly(&listing)?
        }
        None => Disassembly::new(),
    };
    debug!(
        "Memory width {} bits, {} instruction(s) from listing",
        args.mem_width,
        disassembly.len()
    );

    let text = svmem::render(&image, &disassembly, &args.memory_name, args.mem_width)?;
    std::fs::write(&args.output, text)
        .with_context(|| format!("Failed to write {:?}", args.output))?;
    info!(
        "SystemVerilog memory initialization written to {:?}",
        args.output
    );
    Ok(true)
}
