use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a short unique run ID (7 characters, like git)
pub fn generate_run_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let counter = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = blake3::Hasher::new();
    hasher.update(&timestamp.to_le_bytes());
    hasher.update(&counter.to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    hasher.finalize().to_hex().as_str()[..7].to_string()
}

/// Get the state directory path
///
/// Priority order:
/// 1. Environment variable TS_HOIST_STATE_DIR (highest priority)
/// 2. --local-state flag (uses ./.ts-hoist)
/// 3. Global default (uses system data directory)
pub fn get_state_dir(local: bool) -> Result<PathBuf> {
    if let Ok(custom_dir) = std::env::var("TS_HOIST_STATE_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }

    if local {
        let current_dir = std::env::current_dir()?;
        Ok(current_dir.join(".ts-hoist"))
    } else {
        let proj_dirs = ProjectDirs::from("com", "ts-hoist", "ts-hoist")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }
}

/// Compute blake3 hash of a file
pub fn hash_file(path: &Path) -> Result<String> {
    let content = fs::read(path)
        .with_context(|| format!("Failed to read file for hashing: {}", path.display()))?;
    Ok(hash_content(&content))
}

pub fn hash_content(content: &[u8]) -> String {
    blake3::hash(content).to_hex().to_string()
}

/// One file rewritten by a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileModification {
    pub path: PathBuf,
    pub hash_before: String,
    pub hash_after: String,
    /// Backup file name inside the run's directory.
    pub backup: String,
    pub fixes_applied: usize,
}

/// Status of a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Applied,
    Reverted,
}

/// Metadata about a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub command: String,
    pub rule: String,
    pub files_modified: Vec<FileModification>,
    pub status: RunStatus,
    pub can_revert: bool,
}

impl RunMetadata {
    pub fn new(run_id: String, command: String, rule: &str) -> Self {
        Self {
            run_id,
            timestamp: Utc::now(),
            command,
            rule: rule.to_string(),
            files_modified: Vec::new(),
            status: RunStatus::Applied,
            can_revert: true,
        }
    }

    pub fn fixes_applied(&self) -> usize {
        self.files_modified.iter().map(|f| f.fixes_applied).sum()
    }
}

/// Index of all runs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunsIndex {
    pub runs: HashMap<String, RunMetadata>,
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = fs::File::create(&temp_path)
        .with_context(|| format!("Failed to create {}", temp_path.display()))?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move {} into place", temp_path.display()))?;
    Ok(())
}

impl RunsIndex {
    pub fn load(state_dir: &Path) -> Result<Self> {
        let index_path = state_dir.join("runs.json");
        if !index_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&index_path)
            .context("Failed to read runs index")?;

        let index: RunsIndex = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse runs index: {}", e))?;
        Ok(index)
    }

    /// Load index, or start a fresh one if the stored index has an
    /// incompatible format. The old index is moved to `runs.json.bak`.
    pub fn load_or_reset(state_dir: &Path) -> Result<Self> {
        match Self::load(state_dir) {
            Ok(index) => Ok(index),
            Err(e) if e.to_string().contains("missing field") => {
                let index_path = state_dir.join("runs.json");
                let moved_to = state_dir.join("runs.json.bak");
                warn!(
                    index = %index_path.display(),
                    moved_to = %moved_to.display(),
                    "incompatible runs index from a previous version; starting a new one"
                );
                fs::rename(&index_path, &moved_to)
                    .with_context(|| format!("Failed to move aside {}", index_path.display()))?;
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(&state_dir.join("runs.json"), content.as_bytes())
    }

    pub fn add_run(&mut self, run: RunMetadata) {
        self.runs.insert(run.run_id.clone(), run);
    }

    pub fn get_run(&self, run_id: &str) -> Option<&RunMetadata> {
        self.runs.get(run_id)
    }

    pub fn get_run_mut(&mut self, run_id: &str) -> Option<&mut RunMetadata> {
        self.runs.get_mut(run_id)
    }

    pub fn get_sorted_runs(&self) -> Vec<&RunMetadata> {
        let mut runs: Vec<_> = self.runs.values().collect();
        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        runs
    }
}

/// Backup file name for `file_path`: the blake3 hash of the whole path,
/// keeping the extension. Distinct paths never share a backup.
fn backup_name(file_path: &Path) -> String {
    let hash = hash_content(file_path.as_os_str().as_encoded_bytes());
    match file_path.extension() {
        Some(ext) => format!("{hash}.{}", ext.to_string_lossy()),
        None => hash,
    }
}

/// Save a verbatim copy of a file's content before it is rewritten.
///
/// Returns the backup's name inside the run directory.
pub fn save_backup(file_path: &Path, original: &str, run_id: &str, state_dir: &Path) -> Result<String> {
    let backup_dir = state_dir.join(run_id);
    fs::create_dir_all(&backup_dir)?;

    let name = backup_name(file_path);
    fs::write(backup_dir.join(&name), original)
        .with_context(|| format!("Failed to back up {}", file_path.display()))?;
    Ok(name)
}

fn restore_backup(file: &FileModification, run_id: &str, state_dir: &Path) -> Result<()> {
    let backup_path = state_dir.join(run_id).join(&file.backup);
    let original = fs::read_to_string(&backup_path)
        .with_context(|| format!("Failed to read backup: {}", backup_path.display()))?;
    fs::write(&file.path, original)
        .with_context(|| format!("Failed to write restored file: {}", file.path.display()))?;
    Ok(())
}

/// Save run metadata
pub fn save_run_metadata(run: &RunMetadata, state_dir: &Path) -> Result<()> {
    fs::create_dir_all(state_dir)?;
    let content = serde_json::to_string_pretty(run)?;
    write_atomic(&state_dir.join(format!("{}.json", run.run_id)), content.as_bytes())?;

    let mut index = RunsIndex::load(state_dir)?;
    index.add_run(run.clone());
    index.save(state_dir)?;

    Ok(())
}

/// Load run metadata
pub fn load_run_metadata(run_id: &str, state_dir: &Path) -> Result<RunMetadata> {
    let metadata_path = state_dir.join(format!("{}.json", run_id));

    if !metadata_path.exists() {
        bail!("Run {} not found", run_id);
    }

    let content = fs::read_to_string(&metadata_path)
        .context("Failed to read run metadata")?;
    let metadata: RunMetadata = serde_json::from_str(&content)
        .context("Failed to parse run metadata")?;
    Ok(metadata)
}

/// Revert a run
pub fn revert_run(run_id: &str, force: bool, state_dir: &Path) -> Result<()> {
    let mut run = load_run_metadata(run_id, state_dir)?;

    if run.status == RunStatus::Reverted {
        bail!("Run {} has already been reverted", run_id);
    }

    if !run.can_revert {
        bail!("Run {} cannot be reverted", run_id);
    }

    // Verify files haven't changed (unless --force)
    if !force {
        for file in &run.files_modified {
            if !file.path.exists() {
                bail!("File {} no longer exists (use --force to ignore)", file.path.display());
            }

            let current_hash = hash_file(&file.path)?;
            if current_hash != file.hash_after {
                bail!(
                    "File {} has changed since run {} (use --force to ignore)\nExpected hash: {}\nCurrent hash: {}",
                    file.path.display(),
                    run_id,
                    file.hash_after,
                    current_hash
                );
            }
        }
    }

    println!("Reverting {} file(s)...", run.files_modified.len());
    for file in &run.files_modified {
        restore_backup(file, run_id, state_dir)?;
        println!("  ✓ Restored: {}", file.path.display());
    }

    run.status = RunStatus::Reverted;
    run.can_revert = false;
    save_run_metadata(&run, state_dir)?;

    info!(run_id, files = run.files_modified.len(), "run reverted");
    println!("✓ Run {} reverted successfully", run_id);
    Ok(())
}

/// Display run history
pub fn show_history(limit: usize, state_dir: &Path) -> Result<()> {
    let index = RunsIndex::load_or_reset(state_dir)?;
    let runs = index.get_sorted_runs();

    if runs.is_empty() {
        println!("No runs found");
        return Ok(());
    }

    println!("Recent runs (showing up to {}):\n", limit);

    for run in runs.iter().take(limit) {
        let status_str = match run.status {
            RunStatus::Applied => if run.can_revert { "[can revert]" } else { "[applied]" },
            RunStatus::Reverted => "[reverted]",
        };

        let files_str = if run.files_modified.len() == 1 {
            "1 file".to_string()
        } else {
            format!("{} files", run.files_modified.len())
        };

        println!(
            "{}  {}  {:24}  {:10}  {:>3} fixes  {}",
            run.run_id,
            run.timestamp.format("%Y-%m-%d %H:%M"),
            truncate_str(&run.rule, 24),
            files_str,
            run.fixes_applied(),
            status_str
        );
    }

    Ok(())
}

/// Clean old state data
pub fn clean_old_state(keep_days: u32, state_dir: &Path) -> Result<usize> {
    let index = RunsIndex::load_or_reset(state_dir)?;
    let cutoff = Utc::now() - Duration::days(i64::from(keep_days));

    let mut cleaned = 0;
    let mut new_index = RunsIndex::default();

    for run in index.runs.values() {
        if run.timestamp < cutoff {
            let backup_dir = state_dir.join(&run.run_id);
            if backup_dir.exists() {
                fs::remove_dir_all(&backup_dir)?;
            }

            let metadata_path = state_dir.join(format!("{}.json", run.run_id));
            if metadata_path.exists() {
                fs::remove_file(&metadata_path)?;
            }

            cleaned += 1;
        } else {
            new_index.add_run(run.clone());
        }
    }

    new_index.save(state_dir)?;
    Ok(cleaned)
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
