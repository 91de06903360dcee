//! tracefile CLI - demo workload and trace inspection

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracefile_core::prelude::*;

#[derive(Parser)]
#[command(name = "tracefile")]
#[command(about = "Chrome trace-event recorder tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a two-thread workload and record it
    Demo {
        /// Enable tracing
        #[arg(long, env = "TRACEFILE_ENABLED")]
        tracing_enable: bool,

        /// File that trace events are written to
        #[arg(long, env = "TRACEFILE_FILE")]
        tracing_file: Option<PathBuf>,

        /// Number of events buffered before writing to the file
        #[arg(long, env = "TRACEFILE_BUFFER_SIZE", default_value_t = tracefile_core::config::DEFAULT_BUFFER_SIZE)]
        tracing_buffer_size: usize,

        /// Outer loop iterations per thread
        #[arg(long, default_value_t = 10)]
        iterations: usize,
    },
    /// Print a summary of a trace file
    Inspect {
        /// Trace file to read
        file: PathBuf,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Version information
    Version,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("tracefile {}", env!("CARGO_PKG_VERSION"));
            println!("tracefile-core {}", tracefile_core::VERSION);
        }
        Commands::Demo {
            tracing_enable,
            tracing_file,
            tracing_buffer_size,
            iterations,
        } => {
            let mut builder = TraceConfig::builder()
                .enabled(tracing_enable)
                .buffer_size(tracing_buffer_size);
            if let Some(file) = tracing_file {
                builder = builder.file(file);
            }
            let config = builder.build()?;
            run_demo(&config, iterations)?;
        }
        Commands::Inspect { file, json } => {
            let events = read_trace(&file)
                .with_context(|| format!("Failed to read trace {}", file.display()))?;
            let summary = TraceSummary::from_events(&events);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Trace: {}", file.display());
                println!("{}", summary.to_text());
            }
        }
    }

    Ok(())
}

fn run_demo(config: &TraceConfig, iterations: usize) -> Result<()> {
    let guard = global::install(config)?;
    if guard.is_none() {
        tracing::info!("Tracing disabled; running workload without recording");
    }

    {
        let _scope = global::scope("main");
        let basic = thread::spawn(move || loop_basic(iterations));
        let scoped = thread::spawn(move || loop_scoped(iterations));
        basic
            .join()
            .map_err(|_| anyhow::anyhow!("explicit begin/end worker panicked"))?;
        scoped
            .join()
            .map_err(|_| anyhow::anyhow!("scoped worker panicked"))?;
    }

    if let Some(stats) = guard.and_then(TracerGuard::finish) {
        println!(
            "Wrote {} events in {} flushes to {}",
            stats.events_written,
            stats.flushes,
            config.file.display()
        );
    }
    Ok(())
}

fn fast_function() {
    global::event("fast_function", TraceEvent::BEGIN);
    thread::sleep(Duration::from_millis(33));
    global::event("fast_function", TraceEvent::END);
}

fn slow_function() {
    global::event("slow_function", TraceEvent::BEGIN);
    for _ in 0..3 {
        fast_function();
    }
    thread::sleep(Duration::from_millis(10));
    global::event("slow_function", TraceEvent::END);
}

fn fast_function_scoped() {
    let _scope = global::scope("fast_function_scoped");
    thread::sleep(Duration::from_millis(33));
}

fn slow_function_scoped(iteration: usize) {
    let _scope = global::scope(format!("slow_function_scoped #{}", iteration));
    for _ in 0..3 {
        fast_function_scoped();
    }
    thread::sleep(Duration::from_millis(10));
}

fn loop_basic(iterations: usize) {
    for _ in 0..iterations {
        slow_function();
    }
}

fn loop_scoped(iterations: usize) {
    for i in 0..iterations {
        slow_function_scoped(i);
    }
}
