use clap::Parser;
use macbin::extract::{unpack_all, UnpackOptions};
use macbin::ErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for a malformed command line.  Kept outside the error-code
/// range so it never reads as an unpack failure.
const USAGE_EXIT_CODE: u8 = 64;

#[derive(Parser)]
#[command(name = "macbin", about = "Split MacBinary files into data fork, resource fork and comment")]
struct Cli {
    /// MacBinary files to unpack, in order.  Stops at the first failure.
    paths: Vec<PathBuf>,
    /// Write artifacts here instead of next to each source file
    #[arg(short = 'C', long)]
    output_dir: Option<PathBuf>,
    /// Keep a partially written artifact when copying fails
    #[arg(long)]
    keep_partial: bool,
}

/// `--help` and `--version` are successes; anything else is a usage error.
fn parse_failure_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { USAGE_EXIT_CODE } else { 0 }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_failure_code(&e));
        }
    };

    if cli.paths.is_empty() {
        eprintln!("need at least one path as source");
        return ExitCode::from(ErrorKind::NoSuchFile.code());
    }

    let opts = UnpackOptions {
        output_dir:   cli.output_dir,
        keep_partial: cli.keep_partial,
    };

    match unpack_all(&cli.paths, &opts) {
        Ok(done) => {
            for u in &done {
                for out in &u.outputs {
                    println!("  wrote  {}", out.display());
                }
            }
            println!("Unpack OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.code())
        }
    }
}
