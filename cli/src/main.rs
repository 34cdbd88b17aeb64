//! sanction-notice CLI - sanction notice extraction tool
//!
//! A command-line tool for turning sanction-notice text files into records.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sanction_notice::classify::assess_with;
use sanction_notice::source::{extract_path, is_ocr_path, PlainTextSource};
use sanction_notice::{
    extract_incidents, normalize, quality_report, render, sanction_layout, section,
    ClassifierConfig, ExtractOptions, Extractor, RenderOptions, SanctionDocument,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Structured extraction of Korean regulatory sanction notices
#[derive(Parser)]
#[command(
    name = "sanction-notice",
    author = "iyulab",
    version,
    about = "Extract structured records from sanction notice text",
    long_about = "sanction-notice - Extraction of Korean financial sanction notices.\n\n\
                  Reads text produced from notice PDFs (text layer or OCR) and extracts\n\
                  the institution, sanction date, target/sanction pairs and incidents.\n\n\
                  Files named *.ocr.txt are treated as OCR output.\n\n\
                  Usage:\n  \
                  sanction-notice extract <file>        Record as JSON\n  \
                  sanction-notice batch <files...>      Many files in parallel\n  \
                  sanction-notice md <file>             Markdown report"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logs (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one notice to JSON
    Extract {
        /// Input text file
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat the text as OCR output
        #[arg(long)]
        ocr: bool,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// Output the full document instead of the flattened record
        #[arg(long)]
        raw: bool,

        /// Output one row per incident
        #[arg(long, conflicts_with = "raw")]
        rows: bool,

        /// Parse the text as given, without normalization
        #[arg(long)]
        no_normalize: bool,
    },

    /// Extract many notices in parallel
    Batch {
        /// Input text files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (default: all cores)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Treat every input as OCR output
        #[arg(long)]
        ocr: bool,
    },

    /// Classify the sanction block layout
    Classify {
        /// Input text file
        input: PathBuf,

        /// Score needed for a tabular verdict
        #[arg(long)]
        threshold: Option<u32>,

        /// Lines shorter than this count as table cells
        #[arg(long)]
        max_line_chars: Option<usize>,

        /// Consecutive short lines needed for the short-line signal
        #[arg(long)]
        min_run: Option<usize>,
    },

    /// List the incidents of a notice
    Incidents {
        /// Input text file
        input: PathBuf,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Print normalized text
    Normalize {
        /// Input text file
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a notice as a Markdown report
    #[command(visible_alias = "md")]
    Markdown {
        /// Input text file
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include YAML frontmatter with metadata
        #[arg(short, long)]
        frontmatter: bool,

        /// Include the raw sanction-table rows
        #[arg(long)]
        details: bool,

        /// Append the quality report
        #[arg(long)]
        quality: bool,

        /// Incident titles only
        #[arg(long)]
        no_bodies: bool,

        /// Incident heading level (1-6, default: 3)
        #[arg(long, default_value = "3")]
        heading_level: u8,
    },

    /// Show extracted metadata, counts and quality warnings
    Info {
        /// Input text file
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("sanction_notice=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Extract {
            input,
            output,
            ocr,
            compact,
            raw,
            rows,
            no_normalize,
        } => {
            let pb = create_spinner("Extracting document...");

            let mut options = ExtractOptions::new();
            if ocr {
                options = options.ocr();
            }
            if no_normalize {
                options = options.without_normalization();
            }
            let doc = Extractor::with_options(options).extract_file(&input)?;

            pb.set_message("Rendering to JSON...");
            let json = if raw {
                to_json(&doc, compact)?
            } else if rows {
                to_json(&render::rows(&doc), compact)?
            } else {
                to_json(&doc.to_record(), compact)?
            };

            pb.finish_and_clear();
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!("{} Extracted to JSON: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Batch {
            inputs,
            output,
            threads,
            ocr,
        } => {
            run_batch(&inputs, output.as_deref(), threads, ocr)?;
        }

        Commands::Classify {
            input,
            threshold,
            max_line_chars,
            min_run,
        } => {
            let text = normalize(&read_text(&input)?);
            let block = section::sanction_block(&text);

            let mut config = ClassifierConfig::new();
            if let Some(threshold) = threshold {
                config = config.with_threshold(threshold);
            }
            if let Some(chars) = max_line_chars {
                config = config.with_short_line_max_chars(chars);
            }
            if let Some(run) = min_run {
                config = config.with_min_short_run(run);
            }
            let assessment = assess_with(block.unwrap_or(&text), &config);

            println!("{}", "Format Classification".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Layout".bold(), assessment.layout);
            println!("{}: {}", "Score".bold(), assessment.score);
            println!(
                "{}: {}",
                "Scope".bold(),
                if block.is_some() { "section 3" } else { "whole text" }
            );
            if assessment.narrative_marker {
                println!("{}: {}", "Narrative marker".bold(), "yes".yellow());
            }
            println!("{}: {}", "Longest short-line run".bold(), assessment.longest_short_run);
            for signal in &assessment.signals {
                println!("  {} {:?} (+{})", "✓".green(), signal, signal.weight());
            }
        }

        Commands::Incidents { input, compact } => {
            let text = normalize(&read_text(&input)?);
            let incidents = extract_incidents(&text);
            write_output(None, &to_json(&incidents, compact)?)?;
        }

        Commands::Normalize { input, output } => {
            let text = normalize(&read_text(&input)?);
            write_output(output.as_ref(), &text)?;

            if let Some(path) = output {
                println!("{} Normalized text: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Markdown {
            input,
            output,
            frontmatter,
            details,
            quality,
            no_bodies,
            heading_level,
        } => {
            let pb = create_spinner("Extracting document...");

            let doc = Extractor::new().extract_file(&input)?;
            pb.set_message("Rendering to Markdown...");

            let mut options = RenderOptions::new().with_incident_heading_level(heading_level);
            if frontmatter {
                options = options.with_frontmatter();
            }
            if details {
                options = options.with_details();
            }
            if quality {
                options = options.with_quality_report();
            }
            if no_bodies {
                options = options.without_bodies();
            }

            let markdown = render::render_markdown(&doc, &options);

            pb.finish_and_clear();
            write_output(output.as_ref(), &markdown)?;

            if let Some(path) = output {
                println!("{} Converted to Markdown: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing document...");
            let doc = Extractor::new().extract_file(&input)?;
            pb.finish_and_clear();
            print_info(&input, &doc);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn run_batch(
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    threads: Option<usize>,
    ocr: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
    }

    let mut extractor = Extractor::new();
    if ocr {
        extractor = extractor.ocr();
    }
    if let Some(threads) = threads {
        extractor = extractor.with_threads(threads);
    }

    let pb = create_progress_bar(inputs.len() as u64);
    let results = extractor.extract_files_with(inputs, |_, _| pb.inc(1))?;
    pb.finish_and_clear();

    let mut written = 0;
    let mut failed = 0;
    let mut flagged = 0;
    let mut ocr_count = 0;

    for (input, result) in inputs.iter().zip(results) {
        let doc = match result {
            Ok(doc) => doc,
            Err(e) => {
                failed += 1;
                eprintln!("  {} {}: {}", "✗".red(), input.display(), e);
                continue;
            }
        };

        if doc.source.is_ocr() {
            ocr_count += 1;
        }
        if !quality_report(&doc).issues.is_empty() {
            flagged += 1;
        }

        let json_path = json_path_for(input, output_dir);
        fs::write(&json_path, serde_json::to_string_pretty(&doc.to_record())?)?;
        written += 1;
    }

    println!("{}", "Batch Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Inputs".bold(), inputs.len());
    println!("  {} {} extracted", "✓".green(), written);
    if ocr_count > 0 {
        println!("  {} {} from OCR", "·".blue(), ocr_count);
    }
    if flagged > 0 {
        println!("  {} {} with quality warnings", "!".yellow().bold(), flagged);
    }
    if failed > 0 {
        println!("  {} {} failed", "✗".red(), failed);
    }
    if let Some(dir) = output_dir {
        println!("{}: {}", "Output".bold(), dir.display());
    }

    Ok(())
}

/// `<stem>.json` in the output directory, or next to the input.
fn json_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let name = input
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let stem = name
        .strip_suffix(".ocr.txt")
        .or_else(|| name.strip_suffix(".txt"))
        .unwrap_or(&name);
    let dir = output_dir.unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")));
    dir.join(format!("{}.json", stem))
}

fn print_info(input: &Path, doc: &SanctionDocument) {
    println!("{}", "Notice Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}: {}", "Source".bold(), doc.source);
    println!("{}: {}", "Institution".bold(), or_dash(&doc.institution));
    println!("{}: {}", "Sanction date".bold(), or_dash(&doc.sanction_date));
    println!("{}: {}", "Layout".bold(), doc.layout);
    println!("{}: {}", "Subjects".bold(), doc.subjects_field());

    println!("\n{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Pairs".bold(), doc.pairs.len());
    println!("{}: {}", "Incidents".bold(), doc.incidents.len());
    println!(
        "{}: {}",
        "Detail rows".bold(),
        doc.sanction_details.lines().count()
    );

    let report = quality_report(doc);
    println!("\n{}", "Quality".cyan().bold());
    println!("{}", "─".repeat(40));
    if report.is_clean() {
        println!("  {} no issues", "✓".green());
        return;
    }
    if !report.missing_fields.is_empty() {
        println!(
            "  {} missing: {}",
            "!".yellow().bold(),
            report.missing_fields.join(", ")
        );
    }
    for issue in &report.issues {
        println!("  {} {}", "!".yellow().bold(), issue);
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Reads a text file through the plain-text source.
fn read_text(input: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let source = PlainTextSource {
        assume_ocr: is_ocr_path(input),
    };
    let extracted = extract_path(&source, input)?;
    if extracted.is_failure() {
        tracing::warn!(path = %input.display(), "input holds a failure marker");
    }
    tracing::debug!(layout = %sanction_layout(&extracted.text), method = %extracted.method, "text read");
    Ok(extracted.text)
}

fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

fn print_version() {
    println!("{} {}", "sanction-notice".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Structured extraction of Korean financial sanction notices");
    println!();
    println!("Input: UTF-8 text from PDF text layers or OCR (*.ocr.txt)");
    println!("Repository: https://github.com/iyulab/sanction-notice");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message("extracting");
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
