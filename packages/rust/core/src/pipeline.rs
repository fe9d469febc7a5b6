//! End-to-end `enrich` pipeline: CSV → decode → parse → per-row lookup → CSV.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use contactscout_lookup::{EmailLookup, LookupError, LookupOutcome};
use contactscout_shared::{ContactScoutError, EMAIL_COLUMN, Result, RowWindow, WindowPosition};

use crate::decode::{self, TextEncoding};
use crate::pacing::Pacer;
use crate::table::{OutputLayout, RowSink, Table};

/// Configuration for the `enrich_csv` pipeline.
#[derive(Debug, Clone)]
pub struct EnrichRequest {
    /// CSV to read.
    pub input: PathBuf,
    /// CSV to write (created or truncated).
    pub output: PathBuf,
    /// Rows that receive a lookup.
    pub window: RowWindow,
    /// Encodings tried in order when decoding `input`.
    pub encodings: Vec<TextEncoding>,
}

/// Result of the `enrich_csv` pipeline.
#[derive(Debug, Clone)]
pub struct EnrichSummary {
    /// Path of the written CSV.
    pub output: PathBuf,
    /// Encoding the input was decoded with.
    pub encoding: TextEncoding,
    /// Data rows in the input.
    pub rows_read: usize,
    /// Data rows written to the output.
    pub rows_written: usize,
    /// Rows before the window, written without a lookup.
    pub passed_through: usize,
    /// Active rows with no resolvable company name.
    pub skipped_no_company: usize,
    /// Lookup calls made.
    pub lookups: usize,
    pub emails_found: usize,
    /// Lookups where the model answered `Not Found`.
    pub not_found: usize,
    /// Lookups that failed (transport, service, or unparseable reply).
    pub lookup_failures: usize,
    /// First row cut off by the window end, if the run stopped early.
    pub stopped_at: Option<usize>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the number of data rows is known.
    fn rows_total(&self, total: usize);
    /// Called after each row is written.
    fn row_done(&self, current: usize, total: usize, detail: &str);
    /// Called when the pipeline completes.
    fn done(&self, summary: &EnrichSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn rows_total(&self, _total: usize) {}
    fn row_done(&self, _current: usize, _total: usize, _detail: &str) {}
    fn done(&self, _summary: &EnrichSummary) {}
}

/// Run the full `enrich` pipeline.
///
/// 1. Decode the input with the first encoding that fits
/// 2. Parse the header and rows
/// 3. Create the output and write the extended header
/// 4. Walk the rows: pass through, look up, or stop at the window end
///
/// Steps 1 and 2 fail before the output file is created. After that, lookup
/// problems only ever empty the row's `EMAIL`; the only remaining errors are
/// output I/O failures.
#[instrument(skip_all, fields(input = %request.input.display(), window = %request.window))]
pub async fn enrich_csv<L, P>(
    request: &EnrichRequest,
    lookup: &L,
    pacer: &P,
    progress: &dyn ProgressReporter,
) -> Result<EnrichSummary>
where
    L: EmailLookup,
    P: Pacer,
{
    let start = Instant::now();

    // --- Phase 1: Decode ---
    progress.phase("Decoding input");
    let decoded = decode::read_input(&request.input, &request.encodings)?;

    // --- Phase 2: Parse ---
    progress.phase("Reading rows");
    let table = Table::parse(&decoded.text)?;
    let layout = OutputLayout::new(&table.headers);
    let total = table.records.len();
    progress.rows_total(total);

    info!(
        encoding = %decoded.encoding,
        rows = total,
        columns = table.headers.len(),
        email_column_added = layout.email_appended(),
        "input parsed"
    );

    // --- Phase 3: Output ---
    let file = File::create(&request.output)
        .map_err(|e| ContactScoutError::io(&request.output, e))?;
    let mut sink = RowSink::new(file, &layout)?;

    let mut summary = EnrichSummary {
        output: request.output.clone(),
        encoding: decoded.encoding,
        rows_read: total,
        rows_written: 0,
        passed_through: 0,
        skipped_no_company: 0,
        lookups: 0,
        emails_found: 0,
        not_found: 0,
        lookup_failures: 0,
        stopped_at: None,
        elapsed: std::time::Duration::ZERO,
    };

    // --- Phase 4: Rows ---
    progress.phase("Looking up emails");
    for (idx, record) in table.records.iter().enumerate() {
        let row = idx + 1;

        match request.window.position(row) {
            WindowPosition::Before => {
                let existing = table.value(record, EMAIL_COLUMN);
                sink.write_row(&layout.project(record, existing))?;
                summary.passed_through += 1;
                progress.row_done(row, total, "skipped (before start row)");
            }
            WindowPosition::After => {
                info!(row, end_row = ?request.window.end(), "reached end row, stopping");
                summary.stopped_at = Some(row);
                break;
            }
            WindowPosition::Active => {
                let Some(company) = table.resolve_company(record) else {
                    info!(row, "skipping row: no company name under any known header");
                    sink.write_row(&layout.project(record, ""))?;
                    summary.skipped_no_company += 1;
                    progress.row_done(row, total, "no company name");
                    continue;
                };

                debug!(row, %company, "looking up email");
                summary.lookups += 1;
                let email = match lookup.lookup(&company).await {
                    Ok(LookupOutcome::Found(email)) => {
                        summary.emails_found += 1;
                        email
                    }
                    Ok(LookupOutcome::NotFound) => {
                        summary.not_found += 1;
                        String::new()
                    }
                    Err(e) => {
                        summary.lookup_failures += 1;
                        report_lookup_failure(row, &company, &e);
                        String::new()
                    }
                };

                sink.write_row(&layout.project(record, &email))?;
                progress.row_done(row, total, &company);

                pacer.pause().await;
            }
        }
    }

    summary.rows_written = sink.written();
    sink.finish()?;
    summary.elapsed = start.elapsed();

    info!(
        rows_written = summary.rows_written,
        lookups = summary.lookups,
        emails_found = summary.emails_found,
        not_found = summary.not_found,
        failures = summary.lookup_failures,
        skipped = summary.skipped_no_company,
        output = %summary.output.display(),
        "enrichment complete"
    );

    progress.done(&summary);
    Ok(summary)
}

/// Log a failed lookup at a level matching how actionable it is.
fn report_lookup_failure(row: usize, company: &str, err: &LookupError) {
    if err.is_critical() {
        error!(row, company, error = %err, "lookup failed, check Gemini credentials and access");
    } else {
        warn!(row, company, error = %err, "lookup failed, leaving email empty");
    }
}
