use std::error::Error as _;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edq_common::{DEFAULT_QUEUE_PATH, PAGE_SIZE, QUEUE_BASE_OFFSET};
use edq_core::error::HarnessError;
use edq_dev::{CharQueue, SimQueue};
use edq_harness::{RunConfig, RunReport, run};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stress an eDMA queue character device.
    Run {
        #[arg(long, default_value = DEFAULT_QUEUE_PATH)]
        device: String,
        #[arg(long, default_value_t = 16 * PAGE_SIZE)]
        total: usize,
        #[arg(long, default_value_t = PAGE_SIZE)]
        chunk: usize,
        #[arg(long, default_value_t = QUEUE_BASE_OFFSET)]
        offset: u64,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
    },
    /// Stress the in-memory queue model; no hardware required.
    Sim {
        #[arg(long, default_value_t = 16 * PAGE_SIZE)]
        total: usize,
        #[arg(long, default_value_t = 256)]
        chunk: usize,
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Inject a short transfer on the nth write.
        #[arg(long)]
        short_write_on: Option<u64>,
        /// Inject a short transfer on the nth read.
        #[arg(long)]
        short_read_on: Option<u64>,
        /// Inject a failure on the nth seek.
        #[arg(long)]
        fail_seek_on: Option<u64>,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            device,
            total,
            chunk,
            offset,
            seed,
        } => {
            println!("EDMA QUEUE STRESS");
            println!("Device: {device}");
            println!("Target: {total} bytes, chunks < {chunk}");
            println!("-------------------------------");

            let dev = CharQueue::open(&device)
                .with_context(|| format!("failed to open queue device {device}"))?;
            let cfg = RunConfig {
                total,
                max_chunk: chunk,
                base_offset: offset,
                seed,
            };
            finish(run(dev, cfg))
        }
        Commands::Sim {
            total,
            chunk,
            seed,
            short_write_on,
            short_read_on,
            fail_seek_on,
        } => {
            println!("EDMA QUEUE STRESS (simulated)");
            println!("Target: {total} bytes, chunks < {chunk}");
            println!("-------------------------------");

            let mut dev = SimQueue::new();
            if let Some(nth) = short_write_on {
                dev = dev.short_write_on(nth);
            }
            if let Some(nth) = short_read_on {
                dev = dev.short_read_on(nth);
            }
            if let Some(nth) = fail_seek_on {
                dev = dev.fail_seek_on(nth);
            }
            let cfg = RunConfig {
                total,
                max_chunk: chunk,
                base_offset: QUEUE_BASE_OFFSET,
                seed,
            };
            finish(run(dev, cfg))
        }
    }
}

fn finish(outcome: Result<RunReport, HarnessError>) -> Result<()> {
    match outcome {
        Ok(report) => {
            println!("write and read mirrors are identical");
            report.print_report();
            Ok(())
        }
        Err(err) => {
            eprintln!("fatal: {err}");
            let mut cause = err.source();
            while let Some(inner) = cause {
                eprintln!("  caused by: {inner}");
                cause = inner.source();
            }
            process::exit(err.exit_code());
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(env_filter).try_init();
}
