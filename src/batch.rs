//! Directory batch processing.
//!
//! Every PDF in an input directory is turned into `<stem>.json` in an output
//! directory. Files are processed in parallel on the current rayon pool; a
//! failing file is reported in its [`FileOutcome`] and never stops the batch.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::analysis::OutlineAnalyzer;
use crate::config::OutlineConfig;
use crate::detect::is_pdf_file;
use crate::error::Result;
use crate::model::DocumentOutline;
use crate::parser::{ParseOptions, PdfParser};
use crate::render::{to_json, JsonFormat};

/// Result of processing a single file.
#[derive(Debug)]
pub struct FileOutcome {
    /// Input PDF
    pub input: PathBuf,
    /// Where the JSON was (or would have been) written
    pub output: PathBuf,
    /// Wall-clock time spent on this file
    pub elapsed: Duration,
    /// The outline, or why it could not be produced
    pub result: Result<DocumentOutline>,
}

impl FileOutcome {
    /// Whether the file produced an outline.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-file outcomes, in input order
    pub outcomes: Vec<FileOutcome>,
    /// Wall-clock time for the whole batch
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of files that produced an outline.
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.processed()
    }

    /// Failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// Mean per-file time, zero for an empty batch.
    pub fn average_time(&self) -> Duration {
        if self.outcomes.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.outcomes.iter().map(|o| o.elapsed).sum();
        total / self.outcomes.len() as u32
    }

    /// Total headings across all successful files.
    pub fn total_headings(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(DocumentOutline::len)
            .sum()
    }
}

/// List the PDF files directly inside `dir`, sorted by path.
pub fn find_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_pdf_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Output path for `input`: `<output_dir>/<stem>.json`.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Processes files into outline JSON.
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    analyzer: OutlineAnalyzer,
    options: ParseOptions,
    format: JsonFormat,
}

impl BatchProcessor {
    /// Create a processor with the given configuration.
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            analyzer: OutlineAnalyzer::new(config),
            ..Self::default()
        }
    }

    /// Set extraction options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the JSON format of output files.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Extract the outline of one file without writing anything.
    pub fn outline(&self, input: &Path) -> Result<DocumentOutline> {
        let doc = PdfParser::open_with_options(input, self.options.clone())?.parse()?;
        Ok(self.analyzer.analyze(&doc))
    }

    /// Process one file and write its JSON into `output_dir`.
    pub fn process_file(&self, input: &Path, output_dir: &Path) -> FileOutcome {
        let start = Instant::now();
        let output = output_path(input, output_dir);

        let result = self.outline(input).and_then(|outline| {
            fs::write(&output, to_json(&outline, self.format)?)?;
            Ok(outline)
        });

        match &result {
            Ok(outline) => log::debug!(
                "{} -> {} ({} headings)",
                input.display(),
                output.display(),
                outline.len()
            ),
            Err(e) => log::warn!("Failed to process {}: {}", input.display(), e),
        }

        FileOutcome {
            input: input.to_path_buf(),
            output,
            elapsed: start.elapsed(),
            result,
        }
    }

    /// Process `files` in parallel, calling `on_done` as each one finishes.
    pub fn process_files<F>(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        on_done: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&FileOutcome) + Sync,
    {
        let start = Instant::now();
        fs::create_dir_all(output_dir)?;

        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .map(|input| {
                let outcome = self.process_file(input, output_dir);
                on_done(&outcome);
                outcome
            })
            .collect();

        let report = BatchReport {
            outcomes,
            elapsed: start.elapsed(),
        };
        log::info!(
            "Batch finished: {} processed, {} failed in {:.2?}",
            report.processed(),
            report.failed(),
            report.elapsed
        );
        Ok(report)
    }

    /// Process every PDF in `input_dir`.
    pub fn process_dir(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        let files = find_pdfs(input_dir)?;
        if files.is_empty() {
            log::warn!("No PDF files found in {}", input_dir.display());
        }
        self.process_files(&files, output_dir, |_| {})
    }
}
