//! pdfnote CLI - annotated PDF to Markdown notes

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfnote::{
    convert_file, statistics_for_file, BatchConverter, BatchOptions, DocumentStatus, ErrorMode,
    OverwritePolicy, PageSelection, ParseOptions,
};

#[derive(Parser)]
#[command(name = "pdfnote")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert annotated PDFs to Markdown notes", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PDF files and folders to Markdown
    Convert {
        /// Input PDF files or folders (scanned recursively)
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (next to each input if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// JSON batch configuration file
        #[arg(long, value_name = "FILE", env = "PDFNOTE_CONFIG")]
        config: Option<PathBuf>,

        /// Do not write images
        #[arg(long)]
        no_images: bool,

        /// Ignore highlights and comments
        #[arg(long)]
        no_annotations: bool,

        /// Keep existing output files
        #[arg(long)]
        skip_existing: bool,

        /// Roll output to a new file past this many bytes
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<usize>,

        /// Convert at most this many files
        #[arg(long, value_name = "N")]
        max_files: Option<usize>,

        /// Skip files larger than this many megabytes
        #[arg(long, value_name = "MB")]
        max_size_mb: Option<u64>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Convert documents in parallel
        #[arg(long)]
        parallel: bool,

        /// Skip pages that fail to decode
        #[arg(long)]
        lenient: bool,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert one PDF to Markdown on stdout
    #[command(alias = "md")]
    Markdown {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show the layout statistics of a document
    Stats {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Command-line overrides applied on top of the batch configuration.
struct ConvertArgs {
    config: Option<PathBuf>,
    no_images: bool,
    no_annotations: bool,
    skip_existing: bool,
    chunk_size: Option<usize>,
    max_files: Option<usize>,
    max_size_mb: Option<u64>,
    pages: Option<String>,
    parallel: bool,
    lenient: bool,
}

impl ConvertArgs {
    fn batch_options(&self) -> Result<BatchOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => BatchOptions::from_file(path)?,
            None => BatchOptions::default(),
        };
        if self.no_images {
            options.extract_images = false;
        }
        if self.no_annotations {
            options.extract_annotations = false;
        }
        if self.skip_existing {
            options.overwrite = OverwritePolicy::Skip;
        }
        if let Some(bytes) = self.chunk_size {
            options.chunk_size_bytes = bytes;
        }
        if let Some(n) = self.max_files {
            options.max_files = n;
        }
        if let Some(mb) = self.max_size_mb {
            options.max_file_size_mb = mb;
        }
        if let Some(pages) = &self.pages {
            options.pages = PageSelection::parse(pages)?;
        }
        if self.parallel {
            options.parallel = true;
        }
        if self.lenient {
            options.error_mode = ErrorMode::Lenient;
        }
        Ok(options)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            inputs,
            output,
            config,
            no_images,
            no_annotations,
            skip_existing,
            chunk_size,
            max_files,
            max_size_mb,
            pages,
            parallel,
            lenient,
            json,
        }) => {
            let args = ConvertArgs {
                config,
                no_images,
                no_annotations,
                skip_existing,
                chunk_size,
                max_files,
                max_size_mb,
                pages,
                parallel,
                lenient,
            };
            cmd_convert(&inputs, output.as_deref(), &args, json)
        }
        Some(Commands::Markdown {
            input,
            output,
            pages,
        }) => cmd_markdown(&input, output.as_deref(), pages.as_deref()),
        Some(Commands::Stats { input, json }) => cmd_stats(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                let args = ConvertArgs {
                    config: None,
                    no_images: false,
                    no_annotations: false,
                    skip_existing: false,
                    chunk_size: None,
                    max_files: None,
                    max_size_mb: None,
                    pages: None,
                    parallel: false,
                    lenient: true,
                };
                cmd_convert(&[input], cli.output.as_deref(), &args, false)
            } else {
                println!("{}", "Usage: pdfnote <FILE> [OUTPUT]".yellow());
                println!("       pdfnote --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    args: &ConvertArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter = BatchConverter::new(args.batch_options()?);
    let files = converter.collect_inputs(inputs)?;
    if files.is_empty() {
        println!("{}", "No PDF files found".yellow());
        return Ok(());
    }
    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    if json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let report = converter.run_with_progress(&files, output, |outcome| {
        pb.set_message(outcome.input.display().to_string());
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for outcome in &report.documents {
        let name = outcome.input.display();
        match &outcome.status {
            DocumentStatus::Converted => {
                for path in &outcome.outputs {
                    println!("{} {} {} {}", "✓".green(), name, "→".dimmed(), path.display());
                }
            }
            DocumentStatus::Skipped(reason) => {
                println!("{} {} ({})", "-".yellow(), name, reason.dimmed());
            }
            DocumentStatus::Failed(reason) => {
                println!("{} {}: {}", "✗".red(), name, reason);
            }
            DocumentStatus::Cancelled => {
                println!("{} {} (cancelled)", "-".yellow(), name);
            }
        }
    }

    let total = report.total_stats();
    println!();
    println!(
        "{} {} converted, {} skipped, {} failed",
        "Done!".green().bold(),
        report.converted(),
        report.skipped(),
        report.failed()
    );
    println!(
        "  {} pages, {} highlights, {} footnotes, {} images",
        total.page_count, total.highlight_count, total.footnote_count, total.image_count
    );

    if report.failed() > 0 {
        return Err(format!("{} documents failed", report.failed()).into());
    }
    Ok(())
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    pages: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };

    // Images need a folder to land in; stdout output is text only
    let options = ParseOptions::new()
        .lenient()
        .with_images(false)
        .with_pages(page_selection);
    let markdown = convert_file(input, options)?;

    if let Some(path) = output {
        fs::write(path, &markdown)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", markdown);
    }

    Ok(())
}

fn cmd_stats(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stats = statistics_for_file(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Layout Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {:.2} .. {:.2}",
        "Line spacing band".bold(),
        stats.line_spacing_max,
        stats.line_spacing_min
    );
    println!("{}: {:.1}", "Left margin (odd)".bold(), stats.left_margin_odd);
    println!("{}: {:.1}", "Left margin (even)".bold(), stats.left_margin_even);
    println!("{}: {:.2}", "Mean glyph height".bold(), stats.mean_glyph_height);
    println!("{}: {:.2}", "Modal glyph height".bold(), stats.modal_glyph_height);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfnote".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Annotated PDF to Markdown notes");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pdfnote".dimmed());
    println!("License: MIT");
}
