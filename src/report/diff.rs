//! Line-level diff between source and translated SQL.
//!
//! Produces two parallel columns of classified lines for side-by-side
//! rendering. Classification follows the classic longest-common-subsequence
//! edit script: common lines land in both columns, source-only lines in the
//! left column as removed, target-only lines in the right column as added.
//! Within a replaced block, removals are emitted before additions.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLine {
    Unchanged(String),
    Removed(String),
}

impl SourceLine {
    pub fn content(&self) -> &str {
        match self {
            SourceLine::Unchanged(text) | SourceLine::Removed(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetLine {
    Unchanged(String),
    Added(String),
}

impl TargetLine {
    pub fn content(&self) -> &str {
        match self {
            TargetLine::Unchanged(text) | TargetLine::Added(text) => text,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffColumns {
    pub source: Vec<SourceLine>,
    pub target: Vec<TargetLine>,
}

/// Diff two text blocks line by line.
///
/// Empty target text yields an empty target column. Every input line
/// appears exactly once in its column, in edit-script order.
pub fn diff_lines(source_text: &str, target_text: &str) -> DiffColumns {
    let source: Vec<&str> = source_text.lines().collect();
    let target: Vec<&str> = target_text.lines().collect();

    let table = lcs_table(&source, &target);
    let mut columns = DiffColumns::default();

    let (mut i, mut j) = (0usize, 0usize);
    while i < source.len() && j < target.len() {
        if source[i] == target[j] {
            columns
                .source
                .push(SourceLine::Unchanged(source[i].to_string()));
            columns
                .target
                .push(TargetLine::Unchanged(target[j].to_string()));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            // Removal wins ties so replaced blocks list removals first.
            columns.source.push(SourceLine::Removed(source[i].to_string()));
            i += 1;
        } else {
            columns.target.push(TargetLine::Added(target[j].to_string()));
            j += 1;
        }
    }
    while i < source.len() {
        columns.source.push(SourceLine::Removed(source[i].to_string()));
        i += 1;
    }
    while j < target.len() {
        columns.target.push(TargetLine::Added(target[j].to_string()));
        j += 1;
    }

    columns
}

/// LCS lengths with `table[i][j]` = LCS of `a[i..]` and `b[j..]`, so the
/// emit walk can run forward through both inputs.
fn lcs_table(a: &[&str], b: &[&str]) -> Vec<Vec<u32>> {
    let mut table = vec![vec![0u32; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    table
}
