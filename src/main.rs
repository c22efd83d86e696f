//! Command-line entry point

use std::path::PathBuf;
use std::process;

use clap::Parser;

use cjkfont::{ConvertOptions, DEFAULT_FONT, convert};

/// Apply an East Asian font to every CJK character in a .docx file.
///
/// Latin text, symbols and all other formatting are left untouched; only
/// the East Asian font slot of runs containing CJK text is rewritten.
#[derive(Parser)]
#[command(name = "cjkfont", version, about)]
struct Cli {
    /// Path to the source .docx file
    input: PathBuf,

    /// East Asian font name to apply
    #[arg(long, default_value = DEFAULT_FONT)]
    font: String,

    /// Output path (defaults to <input>_modified.docx beside the input)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let options = ConvertOptions {
        font_name: cli.font.clone(),
        output: cli.output,
    };

    println!("Opening:  {}", cli.input.display());
    match convert(&cli.input, &options) {
        Ok(report) => {
            println!("Saved:    {}", report.output_path.display());
            println!(
                "Runs updated: {} ({} split, font: {})",
                report.runs_updated, report.runs_split, cli.font
            );
        }
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}
