//! Surgical edit module for making minimal, targeted changes to source code.
//!
//! Every edit addresses byte offsets of the ORIGINAL source, so the fixes of
//! different findings never depend on the order in which they are applied.
//! Formatting, comments and whitespace outside the edited regions are kept
//! byte-for-byte.

use crate::error::{HoistError, Result};
use crate::operations::Fix;

/// A single textual change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert `text` at `offset` without removing anything.
    Insert { offset: usize, text: String },
    /// Replace the bytes in `start..end` with `text`.
    Replace { start: usize, end: usize, text: String },
}

impl Edit {
    pub fn start(&self) -> usize {
        match self {
            Edit::Insert { offset, .. } => *offset,
            Edit::Replace { start, .. } => *start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Edit::Insert { offset, .. } => *offset,
            Edit::Replace { end, .. } => *end,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Edit::Insert { text, .. } | Edit::Replace { text, .. } => text,
        }
    }

    // Insertions sort before a replacement starting at the same offset.
    fn rank(&self) -> u8 {
        match self {
            Edit::Insert { .. } => 0,
            Edit::Replace { .. } => 1,
        }
    }

    /// Whether applying both edits would touch the same bytes.
    ///
    /// Insertions never conflict with each other, and an insertion only
    /// conflicts with a replacement when it lands strictly inside it.
    pub fn overlaps(&self, other: &Edit) -> bool {
        match (self, other) {
            (Edit::Insert { .. }, Edit::Insert { .. }) => false,
            (Edit::Insert { offset, .. }, Edit::Replace { start, end, .. })
            | (Edit::Replace { start, end, .. }, Edit::Insert { offset, .. }) => {
                start < offset && offset < end
            }
            (
                Edit::Replace { start: a_start, end: a_end, .. },
                Edit::Replace { start: b_start, end: b_end, .. },
            ) => a_start < b_end && b_start < a_end,
        }
    }
}

/// Fixes split into those applied this pass and those that collided with an
/// earlier fix and must wait for a re-lint.
#[derive(Debug, Default)]
pub struct FixSelection<'a> {
    pub accepted: Vec<&'a Fix>,
    pub deferred: Vec<&'a Fix>,
}

impl FixSelection<'_> {
    /// Edits of all accepted fixes, in acceptance order.
    pub fn edits(&self) -> Vec<Edit> {
        self.accepted
            .iter()
            .flat_map(|fix| fix.edits.iter().cloned())
            .collect()
    }
}

/// Accept fixes in report order, all-or-nothing per fix.
pub fn select_fixes<'a>(fixes: impl IntoIterator<Item = &'a Fix>) -> FixSelection<'a> {
    let mut selection = FixSelection::default();
    let mut claimed: Vec<&Edit> = Vec::new();

    for fix in fixes {
        let collides = fix
            .edits
            .iter()
            .any(|edit| claimed.iter().any(|taken| edit.overlaps(taken)));

        if collides {
            selection.deferred.push(fix);
        } else {
            claimed.extend(fix.edits.iter());
            selection.accepted.push(fix);
        }
    }

    selection
}

/// Apply surgical edits to source code, preserving all formatting.
///
/// Edits are sorted by offset (stable, so insertions at the same offset keep
/// their given order). Overlapping or out-of-bounds edits are rejected.
///
/// # Example
/// ```
/// use ts_hoist::surgical::{apply_surgical_edits, Edit};
///
/// let source = "let x: { a: string } = v;";
/// let edits = vec![
///     Edit::Replace { start: 7, end: 20, text: "XType".to_string() },
///     Edit::Insert { offset: 0, text: "type XType = { a: string };\n\n".to_string() },
/// ];
///
/// let result = apply_surgical_edits(source, edits).unwrap();
/// assert_eq!(result, "type XType = { a: string };\n\nlet x: XType = v;");
/// ```
pub fn apply_surgical_edits(original_source: &str, mut edits: Vec<Edit>) -> Result<String> {
    if edits.is_empty() {
        return Ok(original_source.to_string());
    }

    edits.sort_by_key(|edit| (edit.start(), edit.rank()));

    let len = original_source.len();
    let mut result = String::with_capacity(len + edits.iter().map(|e| e.text().len()).sum::<usize>());
    let mut cursor = 0usize;

    for edit in &edits {
        let (start, end) = (edit.start(), edit.end());
        if start > end
            || end > len
            || !original_source.is_char_boundary(start)
            || !original_source.is_char_boundary(end)
        {
            return Err(HoistError::EditOutOfBounds { start, end, len });
        }
        if start < cursor {
            return Err(HoistError::OverlappingEdits { offset: start });
        }

        // Copy unchanged text up to this edit
        result.push_str(&original_source[cursor..start]);
        result.push_str(edit.text());
        cursor = end;
    }

    // Copy remaining text after all edits
    result.push_str(&original_source[cursor..]);

    Ok(result)
}
