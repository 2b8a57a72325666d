use std::path::Path;
use similar::{ChangeTag, TextDiff};

/// Represents statistics about a diff
#[derive(Debug, Default)]
pub struct DiffStats {
    pub files_changed: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl DiffStats {
    pub fn add(&mut self, other: &DiffStats) {
        self.files_changed += other.files_changed;
        self.lines_added += other.lines_added;
        self.lines_removed += other.lines_removed;
    }

    pub fn print_summary(&self) {
        println!("\nSummary:");
        println!("Files changed: {}", self.files_changed);
        println!("Lines added: {}", self.lines_added);
        println!("Lines removed: {}", self.lines_removed);
    }
}

fn count_changes<'a>(diff: &TextDiff<'a, 'a, 'a, str>) -> DiffStats {
    let mut stats = DiffStats::default();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => stats.lines_added += 1,
            ChangeTag::Delete => stats.lines_removed += 1,
            ChangeTag::Equal => {}
        }
    }
    if stats.lines_added > 0 || stats.lines_removed > 0 {
        stats.files_changed = 1;
    }
    stats
}

/// Generate a unified diff between original and fixed content
///
/// Returns the unified diff string and statistics about the changes.
///
/// # Arguments
/// * `path` - The file path (used in diff headers)
/// * `original` - The original file content
/// * `modified` - The fixed file content
/// * `context_lines` - Number of context lines to show
pub fn generate_unified_diff(
    path: &Path,
    original: &str,
    modified: &str,
    context_lines: usize,
) -> (String, DiffStats) {
    let diff = TextDiff::from_lines(original, modified);
    let stats = count_changes(&diff);

    let path_str = path.display().to_string();
    let mut output = format!("--- {path_str}\n+++ {path_str}\n");
    output.push_str(
        &diff
            .unified_diff()
            .context_radius(context_lines)
            .to_string(),
    );

    (output, stats)
}

/// Print a unified diff to stdout and return its statistics.
pub fn print_diff(path: &Path, original: &str, modified: &str) -> DiffStats {
    let (diff_output, stats) = generate_unified_diff(path, original, modified, 3);

    // Only print if there are actual changes
    if stats.files_changed > 0 {
        print!("{}", diff_output);
    }

    stats
}

/// Print one line per changed file: `path (+added -removed)`, followed by
/// the aliases the fixer introduced.
pub fn print_summary_diff(path: &Path, original: &str, modified: &str, aliases: &[String]) -> DiffStats {
    let stats = count_changes(&TextDiff::from_lines(original, modified));
    if stats.files_changed > 0 {
        println!(
            "{} (+{} -{})",
            path.display(),
            stats.lines_added,
            stats.lines_removed
        );
        for alias in aliases {
            println!("  + type {alias}");
        }
    }
    stats
}
