//! pdf-outline CLI - title and heading extraction for PDF files

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

use pdf_outline::analysis::OutlineAnalyzer;
use pdf_outline::batch::{find_pdfs, BatchProcessor, FileOutcome};
use pdf_outline::render::{self, JsonFormat};
use pdf_outline::{DocumentOutline, OutlineConfig, ParseOptions, PdfParser};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(version)]
#[command(about = "Extract the title and H1-H3 outline of PDF documents", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Configuration file (JSON)
    #[arg(
        long = "config",
        value_name = "FILE",
        global = true,
        env = "PDF_OUTLINE_CONFIG"
    )]
    config_file: Option<PathBuf>,

    /// Use the file name as the title when none is found
    #[arg(long, global = true)]
    filename_title: bool,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of one PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Fail on the first unreadable page instead of skipping it
        #[arg(long)]
        strict: bool,

        /// Only read the first N pages (0 = all)
        #[arg(long, default_value = "0")]
        max_pages: u32,
    },

    /// Extract outlines for every PDF in a directory
    Batch {
        /// Directory containing PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory for the JSON files
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,

        /// Number of worker threads (0 = one per core)
        #[arg(short, long, default_value = "0")]
        jobs: usize,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Warn when the batch takes longer than this many seconds
        #[arg(long, value_name = "SECONDS")]
        time_budget: Option<f64>,
    },

    /// Show metadata, font profile and heading candidates
    Inspect {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Check that a JSON file has the outline shape
    Validate {
        /// Outline JSON file
        #[arg(value_name = "JSON")]
        input: PathBuf,
    },

    /// Print the default configuration
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Outline JSON
    Json,
    /// Indented table of contents
    Text,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = load_config(cli.config_file.as_deref(), cli.filename_title).and_then(|config| {
        match cli.command {
            Some(Commands::Extract {
                input,
                output,
                format,
                compact,
                strict,
                max_pages,
            }) => {
                let mut options = ParseOptions::new().with_max_pages(max_pages);
                if strict {
                    options = options.strict();
                }
                cmd_extract(&input, output.as_deref(), format, compact, options, config)
            }
            Some(Commands::Batch {
                input,
                output,
                jobs,
                compact,
                time_budget,
            }) => cmd_batch(&input, &output, jobs, compact, time_budget, config),
            Some(Commands::Inspect { input }) => cmd_inspect(&input, config),
            Some(Commands::Validate { input }) => cmd_validate(&input),
            Some(Commands::Config { output }) => cmd_config(output.as_deref(), &config),
            None => {
                // Default behavior: extract if input is provided
                if let Some(input) = cli.input {
                    cmd_extract(
                        &input,
                        cli.output.as_deref(),
                        OutputFormat::Json,
                        cli.compact,
                        ParseOptions::default(),
                        config,
                    )
                } else {
                    println!("{}", "Usage: pdf-outline <FILE> [-o OUTPUT]".yellow());
                    println!("       pdf-outline --help for more information");
                    Ok(())
                }
            }
        }
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("lopdf", LevelFilter::Warn)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_config(
    path: Option<&Path>,
    filename_title: bool,
) -> Result<OutlineConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => OutlineConfig::from_file(path)?,
        None => OutlineConfig::default(),
    };
    if filename_title {
        config = config.with_filename_title(true);
    }
    config.validate()?;
    Ok(config)
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    compact: bool,
    options: ParseOptions,
    config: OutlineConfig,
) -> CliResult {
    let doc = PdfParser::open_with_options(input, options)?.parse()?;
    let outline = OutlineAnalyzer::new(config).analyze(&doc);

    let rendered = match format {
        OutputFormat::Json => render::to_json(&outline, json_format(compact))?,
        OutputFormat::Text => render::to_text(&outline),
    };

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!(
            "{} {} ({} headings)",
            "Saved to".green(),
            path.display(),
            outline.len()
        );
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    jobs: usize,
    compact: bool,
    time_budget: Option<f64>,
    config: OutlineConfig,
) -> CliResult {
    let files = find_pdfs(input)?;
    if files.is_empty() {
        println!("{} {}", "No PDF files found in".yellow(), input.display());
        return Ok(());
    }

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    let processor = BatchProcessor::new(config).with_format(json_format(compact));

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = pool.install(|| {
        processor.process_files(&files, output, |outcome: &FileOutcome| {
            let name = outcome
                .input
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            pb.set_message(name);
            pb.inc(1);
        })
    })?;
    pb.finish_and_clear();

    println!("{}", "Batch Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Files".bold(), report.outcomes.len());
    println!("{}: {}", "Processed".bold(), report.processed().to_string().green());
    if report.failed() > 0 {
        println!("{}: {}", "Failed".bold(), report.failed().to_string().red());
    } else {
        println!("{}: 0", "Failed".bold());
    }
    println!("{}: {}", "Headings".bold(), report.total_headings());
    println!("{}: {:.2?}", "Total time".bold(), report.elapsed);
    println!("{}: {:.2?}", "Average time".bold(), report.average_time());

    for failure in report.failures() {
        if let Err(e) = &failure.result {
            println!("  {} {}: {}", "✗".red(), failure.input.display(), e);
        }
    }

    if let Some(budget) = time_budget {
        let budget = Duration::from_secs_f64(budget.max(0.0));
        if report.elapsed > budget {
            println!(
                "{} batch took {:.2?}, over the {:.2?} budget",
                "Warning:".yellow().bold(),
                report.elapsed,
                budget
            );
        }
    }

    Ok(())
}

fn cmd_inspect(input: &Path, config: OutlineConfig) -> CliResult {
    let tolerance = config.size_tolerance;
    let doc = PdfParser::open(input)?.parse()?;
    let analysis = OutlineAnalyzer::new(config).analyze_detailed(&doc);

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if doc.metadata.encrypted { "Yes" } else { "No" }
    );
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Metadata title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref producer) = doc.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }

    println!();
    println!("{}", "Font Profile".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let profile = &analysis.profile;
    println!("{}: {:.1}pt", "Body size".bold(), profile.body_size);
    for &size in &profile.distinct_sizes_desc {
        let marker = if profile.is_body_size(size, tolerance) {
            " (body)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {:>6.1}pt  {:>6} fragments{}", size, profile.count(size), marker);
    }

    println!();
    println!("{}", "Title".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{} ({:?})", analysis.title.text, analysis.title.source);

    println!();
    println!("{}", "Headings".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for heading in &analysis.headings {
        let candidate = &heading.candidate;
        println!(
            "{} p.{:<3} {:>5.1}pt {:<14} {:.2} {}",
            heading.level.to_string().bold(),
            candidate.page,
            candidate.font_size,
            format!("{:?}", candidate.basis),
            candidate.confidence,
            candidate.text
        );
    }

    let stats = &analysis.stats;
    println!();
    println!("{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Fragments".bold(), stats.fragments);
    println!("{}: {}", "Skipped fragments".bold(), stats.skipped_fragments);
    println!("{}: {}", "Candidates".bold(), stats.candidates);
    println!("{}: {}", "Rejected (length)".bold(), stats.rejected_length);
    println!("{}: {}", "Rejected (noise)".bold(), stats.rejected_noise);
    println!("{}: {}", "Suppressed".bold(), stats.suppressed);
    println!("{}: {}", "Duplicates removed".bold(), stats.duplicates_removed);
    println!("{}: {}", "Outline entries".bold(), analysis.outline.len());

    Ok(())
}

fn cmd_validate(input: &Path) -> CliResult {
    let content = fs::read_to_string(input)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    render::validate_outline_json(&value)
        .map_err(|e| format!("{}: {}", input.display(), e))?;

    let outline: DocumentOutline = serde_json::from_value(value)?;
    println!(
        "{} {} ({} headings)",
        "Valid".green().bold(),
        input.display(),
        outline.len()
    );
    Ok(())
}

fn cmd_config(output: Option<&Path>, config: &OutlineConfig) -> CliResult {
    if let Some(path) = output {
        config.save(path)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(config)?);
    }
    Ok(())
}
