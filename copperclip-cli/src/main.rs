//! Copperclip CLI - inspect and check board clipboard payloads from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use copperclip::clipboard::{media_type, ClipboardSummary};
use copperclip::{BoardClipboardData, ClipboardOptions, CopperclipCore};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "copperclip")]
#[command(about = "Board clipboard inspection tool for PCB copper networks", long_about = None)]
#[command(version)]
struct Cli {
    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a clipboard payload and print a summary
    Inspect {
        /// Path to a clipboard payload file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Check that clipboard payloads decode and are self-contained
    Validate {
        /// Paths to clipboard payload files
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Rewrite a clipboard payload in canonical form
    Fmt {
        /// Path to a clipboard payload file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Print the clipboard media type
    MimeType {
        /// Application version to put into the media type
        #[arg(long, value_name = "VERSION")]
        app_version: Option<String>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripts
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Inspect { file, format } => handle_inspect(&file, format),
        Commands::Validate { files } => handle_validate(&files),
        Commands::Fmt { file, output } => handle_fmt(&file, output.as_deref()),
        Commands::MimeType { app_version } => {
            let version = app_version.unwrap_or_else(|| ClipboardOptions::default().app_version);
            println!("{}", media_type(&version));
            0
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(file: &Path) -> Result<BoardClipboardData, i32> {
    debug!(file = %file.display(), "Reading clipboard payload");
    CopperclipCore::read_clipboard_file(file).map_err(|e| {
        eprintln!("Error: {}: {}", file.display(), e);
        1
    })
}

fn handle_inspect(file: &Path, format: OutputFormat) -> i32 {
    let data = match load(file) {
        Ok(data) => data,
        Err(code) => return code,
    };
    let summary = data.summary();
    match format {
        OutputFormat::Human => {
            output_human(file, &summary);
            0
        }
        OutputFormat::Json => output_json(file, &summary),
    }
}

fn output_human(file: &Path, summary: &ClipboardSummary) {
    println!("\nFile: {}", file.display());
    println!("{}", "─".repeat(60));
    println!("  Board:        {}", summary.board);
    println!("  Cursor:       {}", summary.cursor);

    println!("\n  Copper:");
    println!("    Net segments: {}", summary.net_segments);
    println!("    Vias:         {}", summary.vias);
    println!("    Junctions:    {}", summary.junctions);
    println!("    Traces:       {}", summary.traces);
    println!("    Planes:       {}", summary.planes);

    println!("\n  Other:");
    println!("    Polygons:     {}", summary.polygons);
    println!("    Stroke texts: {}", summary.stroke_texts);
    println!("    Holes:        {}", summary.holes);

    if !summary.nets.is_empty() {
        println!("\n  Nets:");
        for net in &summary.nets {
            println!("    - {}", net);
        }
    }
}

fn output_json(file: &Path, summary: &ClipboardSummary) -> i32 {
    let output = serde_json::json!({
        "file": file.display().to_string(),
        "summary": summary,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_validate(files: &[PathBuf]) -> i32 {
    let mut failed = 0;
    for file in files {
        match load(file) {
            Ok(data) => {
                let summary = data.summary();
                println!(
                    "ok: {} ({} net segments, {} traces)",
                    file.display(),
                    summary.net_segments,
                    summary.traces
                );
            }
            Err(_) => failed += 1,
        }
    }
    if failed > 0 {
        eprintln!("{} of {} files are malformed", failed, files.len());
        1
    } else {
        0
    }
}

fn handle_fmt(file: &Path, output: Option<&Path>) -> i32 {
    let data = match load(file) {
        Ok(data) => data,
        Err(code) => return code,
    };
    match output {
        Some(out) => match CopperclipCore::write_clipboard_file(out, &data) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {}: {}", out.display(), e);
                1
            }
        },
        None => {
            print!("{}", data.to_text());
            0
        }
    }
}
