//! Gridkey CLI - answer keys for grid arithmetic questions
//!
//! # Main Commands
//!
//! ```bash
//! gridkey serve                     # Start HTTP server (port 3000)
//! gridkey answer questions.json    # Compute answer keys for a batch file
//! gridkey check questions.json     # Schema-check a batch file
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! gridkey compute --operation addition --layout grid-1 --n1 48 --n2 27 --top F --result FB --show-carry
//! gridkey example                  # Print an example batch file
//! ```

use clap::{Args, Parser, Subcommand};
use gridkey::{
    batch::example_batch, compute_answer, engine::MaskSet, execute_values, load_records, validation::validate_batch,
    AnswerRequest, AnswerResponse, Layout, Operation, ServerConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "gridkey")]
#[command(about = "Compute answer keys for grid arithmetic questions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute answer keys for a JSON array of question records
    Answer {
        /// Input JSON file (array of records)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate question records against the schema without computing
    Check {
        /// Input JSON file (array of records)
        input: PathBuf,
    },

    /// Compute a single answer key from command-line operands
    Compute(ComputeArgs),

    /// Print an example batch file
    Example,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: GRIDKEY_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Maximum records per request (default: GRIDKEY_MAX_BATCH or 5000)
        #[arg(long)]
        max_batch: Option<usize>,
    },
}

#[derive(Args)]
struct ComputeArgs {
    /// Operation (addition, subtraction, multiplication, division)
    #[arg(long)]
    operation: String,

    /// Question layout (Grid-1 or Fib)
    #[arg(long, default_value = "Grid-1")]
    layout: String,

    /// First operand (grid_fib_n1)
    #[arg(long)]
    n1: String,

    /// Second operand (grid_fib_n2)
    #[arg(long)]
    n2: String,

    /// Carry / regroup mask (grid1_pre_fills_top)
    #[arg(long)]
    top: Option<String>,

    /// Result mask (grid1_pre_fills_result)
    #[arg(long)]
    result: Option<String>,

    /// Partial-products mask (grid1_multiply_intermediate_steps_prefills)
    #[arg(long)]
    multiply_steps: Option<String>,

    /// Long-division steps mask (grid1_div_intermediate_steps_prefills)
    #[arg(long)]
    division_steps: Option<String>,

    /// Quotient mask (grid1_pre_fills_quotient)
    #[arg(long)]
    quotient: Option<String>,

    /// Remainder mask (grid1_pre_fills_remainder)
    #[arg(long)]
    remainder: Option<String>,

    /// Show the carry row
    #[arg(long)]
    show_carry: bool,

    /// Show the regroup row
    #[arg(long)]
    show_regroup: bool,

    /// Fill-in-the-blank answer shape
    #[arg(long)]
    fib_type: Option<String>,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Answer { input, output } => cmd_answer(&input, output.as_deref()),

        Commands::Check { input } => cmd_check(&input),

        Commands::Compute(args) => cmd_compute(args),

        Commands::Example => cmd_example(),

        Commands::Serve { port, max_batch } => cmd_serve(port, max_batch).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_answer(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Computing answer keys: {}", input.display());

    let rows = load_records(input)?;
    let report = execute_values(&rows, Uuid::new_v4());
    let failed = !report.is_ok();

    if failed {
        eprintln!("\n⚠️  {} record(s) failed:", report.failures.len());
        for failure in report.failures.iter().take(5) {
            eprintln!("   - #{} [{:?}] {}", failure.index, failure.kind, failure.message);
        }
    }

    let response = AnswerResponse::from(report);
    let json = serde_json::to_string_pretty(&response)?;
    write_output(&json, output)?;

    if failed {
        std::process::exit(1);
    }
    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let rows = load_records(input)?;
    let failures = validate_batch(&rows);

    for (index, errors) in failures.iter().take(5) {
        eprintln!("\n❌ Record {} invalid:", index);
        for err in errors.iter().take(3) {
            eprintln!("   - {}", err);
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", rows.len() - failures.len(), failures.len());

    if !failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_compute(args: ComputeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let operation =
        Operation::from_code(&args.operation).ok_or_else(|| format!("Unknown operation: {}", args.operation))?;
    let layout = Layout::from_code(&args.layout).ok_or_else(|| format!("Unknown question layout: {}", args.layout))?;

    let mut request = AnswerRequest::new(operation, layout, args.n1, args.n2)
        .with_show_carry(args.show_carry)
        .with_show_regroup(args.show_regroup);
    request.masks = MaskSet {
        top: args.top,
        result: args.result,
        multiply_steps: args.multiply_steps,
        division_steps: args.division_steps,
        quotient: args.quotient,
        remainder: args.remainder,
    };
    request.fib.fib_type = args.fib_type;

    let key = compute_answer(&request)?;
    println!("{}", serde_json::to_string_pretty(&key)?);
    Ok(())
}

fn cmd_example() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&example_batch())?);
    Ok(())
}

async fn cmd_serve(port: Option<u16>, max_batch: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(max_batch) = max_batch {
        config = config.with_max_batch(max_batch);
    }
    gridkey::server::start_server(config).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
