//! LHR - audit report result tool
//!
//! The `lhr` command validates, scores, converts and inspects audit report
//! results in either wire form.
//!
//! ## Commands
//!
//! - `validate`: Decode a record and list structural defects
//! - `score`: Recompute category scores, optionally explaining each ref
//! - `convert`: Transcode between JSON and the compact binary form
//! - `inspect`: Summarize a record
//! - `upgrade`: Back-fill superseding fields from deprecated ones

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use lhr_model::{
    codec, compat, finalize_category_scores, score_breakdown, validate_structure, Exclusion,
    Lhr, RefContribution, RunOutcome, ScoreReading, StructureReport, WireFormat,
};

#[derive(Parser)]
#[command(name = "lhr")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect, score and convert audit report results", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "LHR_VERBOSE")]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true, env = "LHR_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a record and report structural defects
    Validate {
        /// Record file (JSON or binary)
        file: PathBuf,
    },

    /// Recompute category scores from audit results
    Score {
        /// Record file (JSON or binary)
        file: PathBuf,

        /// Show each audit ref's contribution
        #[arg(long)]
        explain: bool,

        /// Write the rescored record back to the file
        #[arg(long)]
        write: bool,
    },

    /// Transcode a record between wire forms
    Convert {
        /// Input record (form detected automatically)
        input: PathBuf,

        /// Output path
        output: PathBuf,

        /// Output form
        #[arg(long, value_enum)]
        to: OutputFormat,

        /// Indent JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print a summary of a record
    Inspect {
        /// Record file (JSON or binary)
        file: PathBuf,
    },

    /// Back-fill superseding fields from deprecated ones
    Upgrade {
        /// Input record
        input: PathBuf,

        /// Output path (written in the input's form)
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Binary,
}

impl From<OutputFormat> for WireFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => WireFormat::Json,
            OutputFormat::Binary => WireFormat::Binary,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    lhr_model::init_tracing(cli.json, level);

    match cli.command {
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Score {
            file,
            explain,
            write,
        } => cmd_score(&file, explain, write),
        Commands::Convert {
            input,
            output,
            to,
            pretty,
        } => cmd_convert(&input, &output, to.into(), pretty),
        Commands::Inspect { file } => cmd_inspect(&file),
        Commands::Upgrade { input, output } => cmd_upgrade(&input, &output),
    }
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

fn read_record(path: &Path) -> Result<(Lhr, WireFormat)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read record: {:?}", path))?;
    let format = WireFormat::detect(&bytes);
    let lhr = codec::decode(&bytes)
        .with_context(|| format!("Failed to decode {} record: {:?}", format, path))?;
    Ok((lhr, format))
}

fn write_record(path: &Path, lhr: &Lhr, format: WireFormat, pretty: bool) -> Result<()> {
    let bytes = match format {
        WireFormat::Json if pretty => codec::to_json_pretty(lhr)?.into_bytes(),
        other => codec::encode(lhr, other)?,
    };
    std::fs::write(path, bytes).with_context(|| format!("Failed to write record: {:?}", path))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_validate(path: &Path) -> Result<()> {
    let (lhr, format) = read_record(path)?;
    let report = validate_structure(&lhr);
    println!("{}", render_structure_report(path, format, &report));
    if !report.is_sound() {
        anyhow::bail!(
            "{} structural defect(s) in {:?}",
            report.defects.len(),
            path
        );
    }
    Ok(())
}

fn cmd_score(path: &Path, explain: bool, write: bool) -> Result<()> {
    let (mut lhr, format) = read_record(path)?;
    let summary = finalize_category_scores(&mut lhr);
    if summary.skipped_for_runtime_error {
        println!("Run failed; stored scores are best-effort and were not recomputed.");
    }

    if explain {
        println!("{}", render_score_explanation(&lhr));
    } else {
        println!("{}", render_score_table(&lhr));
    }

    if write && !summary.skipped_for_runtime_error {
        write_record(path, &lhr, format, false)?;
        info!(path = ?path, scored = summary.scored, "wrote rescored record");
        println!("Wrote {:?}", path);
    }
    Ok(())
}

fn cmd_convert(input: &Path, output: &Path, to: WireFormat, pretty: bool) -> Result<()> {
    let (lhr, from) = read_record(input)?;
    write_record(output, &lhr, to, pretty)?;
    println!("Converted {:?} ({}) -> {:?} ({})", input, from, output, to);
    Ok(())
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let (lhr, format) = read_record(path)?;
    println!("{}", render_inspect(&lhr, format)?);
    Ok(())
}

fn cmd_upgrade(input: &Path, output: &Path) -> Result<()> {
    let (mut lhr, format) = read_record(input)?;
    let notes = compat::upgrade(&mut lhr);
    write_record(output, &lhr, format, false)?;

    if notes.is_empty() {
        println!("Nothing to upgrade.");
    } else {
        for note in &notes {
            println!("  {}", note);
        }
    }
    println!("Wrote {:?}", output);
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn render_reading(reading: ScoreReading) -> String {
    match reading {
        ScoreReading::Authoritative(v) => format_score(Some(v)),
        ScoreReading::BestEffort(v) => format!("{} (best-effort)", format_score(v)),
        ScoreReading::Absent => format_score(None),
    }
}

fn render_structure_report(path: &Path, format: WireFormat, report: &StructureReport) -> String {
    let mut out = format!("{:?} ({})\n", path, format);
    if report.is_sound() {
        out.push_str("OK: no structural defects");
    } else {
        for defect in &report.defects {
            out.push_str(&format!("  - {}\n", defect));
        }
        out.push_str(&format!("{} defect(s)", report.defects.len()));
    }
    out
}

fn render_score_table(lhr: &Lhr) -> String {
    let width = lhr.categories.keys().map(String::len).max().unwrap_or(0).max(8);
    let mut out = format!("{:<width$}  SCORE\n", "CATEGORY", width = width);
    for id in lhr.categories.keys() {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            id,
            render_reading(lhr.category_score(id)),
            width = width
        ));
    }
    out.trim_end().to_string()
}

fn render_exclusion(exclusion: &Exclusion) -> String {
    match exclusion {
        Exclusion::MissingAudit => "excluded: audit missing".to_string(),
        Exclusion::NonCountableMode { mode } => format!("excluded: {} mode", mode),
        Exclusion::ZeroWeight => "excluded: weight 0".to_string(),
        Exclusion::InvalidWeight => "excluded: invalid weight".to_string(),
        Exclusion::NotScored => "excluded: no score".to_string(),
    }
}

fn render_score_explanation(lhr: &Lhr) -> String {
    let mut out = String::new();
    for (id, category) in &lhr.categories {
        let breakdown = score_breakdown(category, &lhr.audits);
        out.push_str(&format!(
            "{} = {} ({}/{} refs counted)\n",
            id,
            render_reading(lhr.category_score(id)),
            breakdown.counted(),
            breakdown.contributions.len()
        ));
        for contribution in &breakdown.contributions {
            let line = match contribution {
                RefContribution::Counted {
                    audit_id,
                    weight,
                    score,
                } => format!("  {:<32} weight {:>6}  score {:.2}", audit_id, weight, score),
                RefContribution::Excluded {
                    audit_id,
                    exclusion,
                } => format!("  {:<32} {}", audit_id, render_exclusion(exclusion)),
            };
            out.push_str(&line);
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}

fn render_inspect(lhr: &Lhr, format: WireFormat) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("Requested URL: {}\n", lhr.requested_url));
    out.push_str(&format!(
        "Main document: {}\n",
        compat::effective_main_document_url(lhr)
    ));
    out.push_str(&format!("Fetched:       {}\n", lhr.fetch_time.to_rfc3339()));
    out.push_str(&format!("Tool version:  {}\n", lhr.tool_version));
    out.push_str(&format!(
        "Form factor:   {}\n",
        compat::effective_form_factor(&lhr.config_settings)
    ));
    out.push_str(&format!("Gather mode:   {}\n", lhr.gather_mode));
    out.push_str(&format!("Wire form:     {}\n", format));
    match lhr.outcome() {
        RunOutcome::Completed => out.push_str("Outcome:       completed\n"),
        RunOutcome::Failed(err) => {
            out.push_str(&format!("Outcome:       failed ({})\n", err));
        }
    }
    out.push_str(&format!(
        "Audits:        {}\nCategories:    {}\n",
        lhr.audits.len(),
        lhr.categories.len()
    ));
    for warning in lhr.warnings() {
        out.push_str(&format!("Warning:       {}\n", warning));
    }
    for id in lhr.categories.keys() {
        out.push_str(&format!(
            "  {:<16} {}\n",
            id,
            render_reading(lhr.category_score(id))
        ));
    }
    let digest = lhr.digest().context("Failed to compute record digest")?;
    out.push_str(&format!("Digest:        {}", digest));
    Ok(out)
}
