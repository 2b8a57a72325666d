use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use ts_hoist::config::HoistConfig;
use ts_hoist::diff::{print_diff, print_summary_diff, DiffStats};
use ts_hoist::editor::TypeScriptEditor;
use ts_hoist::error::HoistError;
use ts_hoist::operations::FindingReport;
use ts_hoist::plugin::{META, VISITED_KINDS};
use ts_hoist::state::*;
use ts_hoist::syntax::Dialect;

#[derive(Parser)]
#[command(name = "ts-hoist")]
#[command(about = "Hoist multiline inline object types in TypeScript into named type aliases")]
#[command(long_about = "Finds object-type literals that span several lines and sit directly in a
type annotation (variables, parameters, class properties, return types), and rewrites
them into a `type` alias declared just before the enclosing statement.

  let myConfig: {               type MyConfigType = {
    host: string;        =>       host: string;
  };                            };

                                let myConfig: MyConfigType;

Type alias and interface bodies are never touched.")]
#[command(after_help = "Examples:
  ts-hoist check --paths src
  ts-hoist fix --paths src --format diff
  ts-hoist fix --paths src --apply
  ts-hoist revert <RUN_ID>")]
#[command(version)]
struct Cli {
    /// Use project-local state directory (.ts-hoist) instead of the user data directory
    #[arg(long, global = true)]
    local_state: bool,

    /// Config file (defaults to ./ts-hoist.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Exclude paths matching these patterns (can be used multiple times)
    #[arg(long, global = true, num_args = 0..)]
    exclude: Vec<String>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CheckFormat {
    Default,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FixFormat {
    Default,
    Diff,
    Summary,
}

#[derive(Subcommand)]
enum Commands {
    /// Report multiline inline type literals (exit status 1 when any are found)
    Check {
        /// Files, directories or glob patterns to analyse
        #[arg(short, long, num_args = 1.., required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = CheckFormat::Default)]
        format: CheckFormat,
    },

    /// Hoist multiline inline type literals into type aliases (dry-run by default)
    Fix {
        /// Files, directories or glob patterns to fix
        #[arg(short, long, num_args = 1.., required = true)]
        paths: Vec<PathBuf>,

        /// Write the fixed source here instead of in place (single input file only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = FixFormat::Default)]
        format: FixFormat,

        /// Show summary statistics after diff output
        #[arg(long)]
        summary: bool,

        /// Apply changes (default is dry-run)
        #[arg(long)]
        apply: bool,
    },

    /// Show history of ts-hoist runs
    History {
        /// Number of recent runs to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Revert a specific run
    Revert {
        /// Run ID to revert (from history)
        run_id: String,

        /// Force revert even if files changed since
        #[arg(long)]
        force: bool,
    },

    /// Clean old state data
    Clean {
        /// Keep runs from last N days
        #[arg(long, default_value = "30")]
        keep_days: u32,
    },

    /// Print the rule metadata as JSON
    Rule,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { ref paths, format } => {
            let config = HoistConfig::discover(cli.config.as_deref())?;
            let files = collect_files_with_exclusions(paths, &config, &cli.exclude)?;
            let findings = run_check(&files, &config, format)?;
            if findings > 0 {
                return Ok(ExitCode::from(1));
            }
        }

        Commands::Fix { ref paths, ref output, format, summary, apply } => {
            let config = HoistConfig::discover(cli.config.as_deref())?;
            let files = collect_files_with_exclusions(paths, &config, &cli.exclude)?;
            // Only in-place writes are recorded for revert
            let recorder = if apply && output.is_none() {
                Some(RunRecorder::new(get_state_dir(cli.local_state)?))
            } else {
                None
            };
            run_fix(&files, &config, apply, output.as_ref(), recorder, format, summary)?;
        }

        Commands::History { limit } => {
            let state_dir = get_state_dir(cli.local_state)?;
            show_history(limit, &state_dir)?;
        }

        Commands::Revert { ref run_id, force } => {
            let state_dir = get_state_dir(cli.local_state)?;
            revert_run(run_id, force, &state_dir)?;
        }

        Commands::Clean { keep_days } => {
            let state_dir = get_state_dir(cli.local_state)?;
            let cleaned = clean_old_state(keep_days, &state_dir)?;
            println!("✓ Cleaned {} old run(s)", cleaned);
        }

        Commands::Rule => {
            let messages: BTreeMap<_, _> = META
                .messages
                .iter()
                .map(|message| (message.id(), message.text()))
                .collect();
            let rule = serde_json::json!({
                "name": META.name,
                "description": META.description,
                "fixable": META.fixable,
                "messages": messages,
                "visits": VISITED_KINDS,
            });
            println!("{}", serde_json::to_string_pretty(&rule)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

fn collect_files_with_exclusions(
    paths: &[PathBuf],
    config: &HoistConfig,
    extra_excludes: &[String],
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        let path_str = path.to_string_lossy();

        if is_glob(&path_str) {
            for entry in glob(&path_str).context("Failed to parse glob pattern")? {
                match entry {
                    Ok(file_path) => {
                        if file_path.is_file() && config.accepts_extension(&file_path) {
                            files.push(file_path);
                        }
                    }
                    Err(e) => warn!("error reading glob entry: {}", e),
                }
            }
        } else if path.is_file() {
            if config.accepts_extension(path) {
                files.push(path.clone());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && config.accepts_extension(e.path()))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            warn!(path = %path.display(), "path does not exist");
        }
    }

    let exclude_patterns: Vec<&String> = config.files.exclude.iter().chain(extra_excludes).collect();
    if !exclude_patterns.is_empty() {
        files.retain(|file| {
            let file_str = file.to_string_lossy();
            !exclude_patterns.iter().any(|pattern| {
                if is_glob(pattern) {
                    glob::Pattern::new(pattern)
                        .map(|p| p.matches(&file_str))
                        .unwrap_or(false)
                } else {
                    file_str.contains(pattern.as_str())
                }
            })
        });
    }

    files.sort();
    files.dedup();
    debug!(files = files.len(), "collected source files");
    Ok(files)
}

/// Read a source file and pick its grammar; `None` for extensions the parser
/// has no grammar for.
fn read_source(path: &Path) -> Result<Option<(String, Dialect)>> {
    let Some(dialect) = Dialect::from_path(path) else {
        warn!(path = %path.display(), "no TypeScript grammar for this extension; skipping");
        return Ok(None);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some((content, dialect)))
}

fn run_check(files: &[PathBuf], config: &HoistConfig, format: CheckFormat) -> Result<usize> {
    let mut reports = Vec::new();
    let mut total = 0;
    let mut fixable = 0;
    let mut files_with_findings = 0;

    for file_path in files {
        let Some((content, dialect)) = read_source(file_path)? else {
            continue;
        };
        let editor = TypeScriptEditor::new(&content, dialect)
            .with_context(|| format!("Failed to parse {}", file_path.display()))?;
        if editor.has_errors() {
            warn!(path = %file_path.display(), "file has syntax errors; findings may be incomplete");
        }

        let findings = editor.findings(&config.rule);
        if findings.is_empty() {
            continue;
        }
        files_with_findings += 1;
        total += findings.len();
        fixable += findings.iter().filter(|f| f.is_fixable()).count();

        for finding in &findings {
            match format {
                CheckFormat::Default => {
                    let location = finding.location();
                    let status = match &finding.fix {
                        Ok(_) => "fixable".to_string(),
                        Err(reason) => format!("no fix: {}", reason),
                    };
                    println!(
                        "{}:{}:{}  {} ({})",
                        file_path.display(),
                        location.line,
                        location.column,
                        finding.message.text(),
                        status
                    );
                }
                CheckFormat::Json => {
                    reports.push(FindingReport::new(file_path.clone(), META.name, finding));
                }
            }
        }
    }

    match format {
        CheckFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        CheckFormat::Default if total == 0 => {
            println!("✓ No multiline inline type literals in {} file(s)", files.len());
        }
        CheckFormat::Default => {
            println!(
                "\nFound {} multiline inline type literal(s) in {} file(s), {} fixable",
                total, files_with_findings, fixable
            );
            if fixable > 0 {
                println!("💡 Run 'ts-hoist fix --paths <PATHS> --apply' to hoist them");
            }
        }
    }

    Ok(total)
}

/// Where `fix --apply` records backups, and the run they belong to.
struct RunRecorder {
    state_dir: PathBuf,
    run: RunMetadata,
}

impl RunRecorder {
    fn new(state_dir: PathBuf) -> Self {
        let command = std::env::args().collect::<Vec<_>>().join(" ");
        Self {
            state_dir,
            run: RunMetadata::new(generate_run_id(), command, META.name),
        }
    }
}

#[derive(Default)]
struct FixTotals {
    stats: DiffStats,
    fixes: usize,
    files: usize,
}

/// Fix every file. A file that fails is reported and skipped; the run is
/// still recorded for the files already rewritten before the error is
/// returned.
fn run_fix(
    files: &[PathBuf],
    config: &HoistConfig,
    apply: bool,
    output: Option<&PathBuf>,
    mut recorder: Option<RunRecorder>,
    format: FixFormat,
    show_summary: bool,
) -> Result<()> {
    if output.is_some() && files.len() != 1 {
        bail!("--output requires exactly one input file, got {}", files.len());
    }

    let mut totals = FixTotals::default();
    let mut failed = 0;

    for file_path in files {
        if let Err(e) = fix_file(file_path, config, apply, output, recorder.as_mut(), format, &mut totals) {
            warn!(path = %file_path.display(), error = %format!("{e:#}"), "file not fixed");
            eprintln!("✗ {}: {:#}", file_path.display(), e);
            failed += 1;
        }
    }

    if show_summary && format != FixFormat::Default {
        totals.stats.print_summary();
    }

    if let Some(RunRecorder { state_dir, run }) = recorder.filter(|r| !r.run.files_modified.is_empty()) {
        save_run_metadata(&run, &state_dir)?;
        info!(run_id = %run.run_id, files = totals.files, fixes = totals.fixes, "recorded run");
        println!("\n📝 Run ID: {} (use 'ts-hoist revert {}' to undo)", run.run_id, run.run_id);
    } else if totals.fixes == 0 {
        println!("No changes made - no fixable multiline inline type literals found");
    } else if !apply && output.is_none() {
        println!(
            "\n💡 Dry run: {} fix(es) in {} file(s). Re-run with --apply to write changes.",
            totals.fixes, totals.files
        );
    }

    if failed > 0 {
        bail!("{} file(s) could not be fixed", failed);
    }
    Ok(())
}

fn fix_file(
    file_path: &Path,
    config: &HoistConfig,
    apply: bool,
    output: Option<&PathBuf>,
    recorder: Option<&mut RunRecorder>,
    format: FixFormat,
    totals: &mut FixTotals,
) -> Result<()> {
    let Some((content, dialect)) = read_source(file_path)? else {
        return Ok(());
    };
    let mut editor = TypeScriptEditor::new(&content, dialect)
        .with_context(|| format!("Failed to parse {}", file_path.display()))?;

    let outcome = match editor.fix_all(&config.rule, config.fix.max_passes) {
        Ok(outcome) => outcome,
        Err(HoistError::SourceHasErrors) => {
            warn!(path = %file_path.display(), "file has syntax errors; not fixing");
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to fix {}", file_path.display()));
        }
    };

    for finding in outcome.remaining.iter() {
        let location = finding.location();
        let reason = match &finding.fix {
            Err(reason) => reason.to_string(),
            Ok(_) => format!("pass limit ({}) reached", config.fix.max_passes),
        };
        eprintln!(
            "⚠️  {}:{}:{}  not fixed: {}",
            file_path.display(),
            location.line,
            location.column,
            reason
        );
    }

    if outcome.applied == 0 {
        return Ok(());
    }
    totals.fixes += outcome.applied;
    totals.files += 1;
    let new_content = editor.content();

    match format {
        FixFormat::Diff => totals.stats.add(&print_diff(file_path, &content, new_content)),
        FixFormat::Summary => {
            totals.stats.add(&print_summary_diff(file_path, &content, new_content, &outcome.aliases))
        }
        FixFormat::Default => {}
    }

    if let Some(output_path) = output {
        std::fs::write(output_path, new_content)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!("✓ Written: {}", output_path.display());
        return Ok(());
    }

    if !apply {
        if format == FixFormat::Default {
            println!(
                "Would hoist {} type literal(s) in {}: {}",
                outcome.applied,
                file_path.display(),
                outcome.aliases.join(", ")
            );
        }
        return Ok(());
    }

    if let Some(RunRecorder { state_dir, run }) = recorder {
        let absolute = std::fs::canonicalize(file_path)
            .with_context(|| format!("Failed to resolve {}", file_path.display()))?;
        let backup = save_backup(&absolute, &content, &run.run_id, state_dir)?;

        // Recorded before the write so a failed write can still be reverted.
        run.files_modified.push(FileModification {
            path: absolute,
            hash_before: hash_content(content.as_bytes()),
            hash_after: hash_content(new_content.as_bytes()),
            backup,
            fixes_applied: outcome.applied,
        });
    }

    std::fs::write(file_path, new_content)
        .with_context(|| format!("Failed to write {}", file_path.display()))?;

    info!(path = %file_path.display(), fixes = outcome.applied, passes = outcome.passes, "fixed file");
    if format != FixFormat::Diff {
        println!("✓ Modified: {}", file_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_is_recorded_when_a_later_file_fails() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let state_dir = temp_dir.path().join("state");
        let good = temp_dir.path().join("a.ts");
        let bad = temp_dir.path().join("b.ts");
        let original = "let cfg: {\n  a: string;\n};\n";
        fs::write(&good, original)?;
        fs::write(&bad, b"\xff\xfe\x00\x80")?;

        let recorder = RunRecorder::new(state_dir.clone());
        let run_id = recorder.run.run_id.clone();
        let files = vec![good.clone(), bad];
        let result = run_fix(&files, &HoistConfig::default(), true, None, Some(recorder), FixFormat::Default, false);

        assert!(result.is_err());
        assert!(fs::read_to_string(&good)?.starts_with("type CfgType = {"));

        let index = RunsIndex::load(&state_dir)?;
        let run = index.get_run(&run_id).expect("run recorded");
        assert_eq!(run.files_modified.len(), 1);

        revert_run(&run_id, false, &state_dir)?;
        assert_eq!(fs::read_to_string(&good)?, original);
        Ok(())
    }

    #[test]
    fn test_dry_run_writes_nothing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("a.ts");
        let original = "let cfg: {\n  a: string;\n};\n";
        fs::write(&file, original)?;

        run_fix(&[file.clone()], &HoistConfig::default(), false, None, None, FixFormat::Default, false)?;
        assert_eq!(fs::read_to_string(&file)?, original);
        Ok(())
    }
}
