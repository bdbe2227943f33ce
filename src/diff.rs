// src/diff.rs

use std::{
    collections::HashMap,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, LazyLock},
};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use similar::{ChangeTag, DiffTag, TextDiff};
use uuid::Uuid;

use crate::{
    error::WorkbenchError,
    layout::{LayoutFlag, LayoutFlags},
    render::{RenderTarget, TargetFactory},
    sanitizers::panic_message,
    utils::{html, pretty},
};

/// Reformats HTML before diffing.
pub trait Canonicalize: Send + Sync {
    fn canonicalize(&self, html: &str) -> Result<String, String>;
}

/// Leaves markup untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Canonicalize for Identity {
    fn canonicalize(&self, html: &str) -> Result<String, String> {
        Ok(html.to_string())
    }
}

/// One tag or text run per line, indented by depth. See [`pretty::pretty_html`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyHtml;

impl Canonicalize for PrettyHtml {
    fn canonicalize(&self, html: &str) -> Result<String, String> {
        pretty::pretty_html(html)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Equal,
    Delete,
    Insert,
    /// Removed on one side and added verbatim elsewhere on the other.
    Moved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub changed: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    /// 1-based line number on its side.
    pub number: usize,
    pub kind: LineKind,
    pub segments: Vec<Segment>,
}

impl DiffLine {
    fn whole(number: usize, kind: LineKind, text: &str) -> Self {
        Self {
            number,
            kind,
            segments: vec![Segment {
                changed: kind != LineKind::Equal,
                text: text.to_string(),
            }],
        }
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// One row of the split view. A missing side is rendered as a blank cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRow {
    pub left: Option<DiffLine>,
    pub right: Option<DiffLine>,
}

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|\s+|[^\w\s]").expect("word pattern is valid"));

/// Splits a line into words, whitespace runs and single punctuation marks,
/// so `<p>a</p>` yields `<`, `p`, `>`, `a`, `<`, `/`, `p`, `>`.
fn tokenize(line: &str) -> Vec<&str> {
    WORD_RE.find_iter(line).map(|m| m.as_str()).collect()
}

fn push_segment(segments: &mut Vec<Segment>, changed: bool, text: &str) {
    match segments.last_mut() {
        Some(last) if last.changed == changed => last.text.push_str(text),
        _ => segments.push(Segment {
            changed,
            text: text.to_string(),
        }),
    }
}

/// Word-level comparison of two lines that replaced each other.
fn word_diff(old: &str, new: &str) -> (Vec<Segment>, Vec<Segment>) {
    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);
    let diff = TextDiff::from_slices(old_tokens.as_slice(), new_tokens.as_slice());

    let mut left = Vec::new();
    let mut right = Vec::new();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                push_segment(&mut left, false, change.value());
                push_segment(&mut right, false, change.value());
            }
            ChangeTag::Delete => push_segment(&mut left, true, change.value()),
            ChangeTag::Insert => push_segment(&mut right, true, change.value()),
        }
    }
    (left, right)
}

fn strip_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Line-aligned split diff with word-level emphasis inside replaced lines.
pub fn diff_rows(before: &str, after: &str) -> Vec<DiffRow> {
    let diff = TextDiff::from_lines(before, after);
    let old_lines: Vec<&str> = diff.old_slices().iter().map(|l| strip_newline(l)).collect();
    let new_lines: Vec<&str> = diff.new_slices().iter().map(|l| strip_newline(l)).collect();

    let mut rows = Vec::new();
    for op in diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                for (o, n) in old_range.zip(new_range) {
                    rows.push(DiffRow {
                        left: Some(DiffLine::whole(o + 1, LineKind::Equal, old_lines[o])),
                        right: Some(DiffLine::whole(n + 1, LineKind::Equal, new_lines[n])),
                    });
                }
            }
            DiffTag::Delete => {
                for o in old_range {
                    rows.push(DiffRow {
                        left: Some(DiffLine::whole(o + 1, LineKind::Delete, old_lines[o])),
                        right: None,
                    });
                }
            }
            DiffTag::Insert => {
                for n in new_range {
                    rows.push(DiffRow {
                        left: None,
                        right: Some(DiffLine::whole(n + 1, LineKind::Insert, new_lines[n])),
                    });
                }
            }
            DiffTag::Replace => {
                let pairs = old_range.len().max(new_range.len());
                for k in 0..pairs {
                    let o = Some(old_range.start + k).filter(|i| old_range.contains(i));
                    let n = Some(new_range.start + k).filter(|i| new_range.contains(i));
                    let row = match (o, n) {
                        (Some(o), Some(n)) => {
                            let (left, right) = word_diff(old_lines[o], new_lines[n]);
                            DiffRow {
                                left: Some(DiffLine {
                                    number: o + 1,
                                    kind: LineKind::Delete,
                                    segments: left,
                                }),
                                right: Some(DiffLine {
                                    number: n + 1,
                                    kind: LineKind::Insert,
                                    segments: right,
                                }),
                            }
                        }
                        (Some(o), None) => DiffRow {
                            left: Some(DiffLine::whole(o + 1, LineKind::Delete, old_lines[o])),
                            right: None,
                        },
                        (None, Some(n)) => DiffRow {
                            left: None,
                            right: Some(DiffLine::whole(n + 1, LineKind::Insert, new_lines[n])),
                        },
                        (None, None) => continue,
                    };
                    rows.push(row);
                }
            }
        }
    }

    mark_moves(&mut rows);
    rows
}

/// Pairs deleted and inserted lines with identical non-blank text and marks
/// both as moved.
fn mark_moves(rows: &mut [DiffRow]) {
    let mut inserted: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        if let Some(line) = row.right.as_ref().filter(|l| l.kind == LineKind::Insert) {
            let text = line.text();
            if !text.trim().is_empty() {
                inserted.entry(text.trim().to_string()).or_default().push(idx);
            }
        }
    }

    let mut moves = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        if let Some(line) = row.left.as_ref().filter(|l| l.kind == LineKind::Delete) {
            let text = line.text();
            if let Some(candidates) = inserted.get_mut(text.trim()) {
                if let Some(target) = candidates.pop() {
                    moves.push((idx, target));
                }
            }
        }
    }

    for &(from, to) in &moves {
        if let Some(line) = rows[from].left.as_mut() {
            *line = DiffLine::whole(line.number, LineKind::Moved, &line.text());
        }
        if let Some(line) = rows[to].right.as_mut() {
            *line = DiffLine::whole(line.number, LineKind::Moved, &line.text());
        }
    }

    // Word emphasis only makes sense against the replaced partner, which is gone.
    for (from, to) in moves {
        for idx in [from, to] {
            let row = &mut rows[idx];
            for line in [row.left.as_mut(), row.right.as_mut()].into_iter().flatten() {
                if line.kind != LineKind::Moved {
                    *line = DiffLine::whole(line.number, line.kind, &line.text());
                }
            }
        }
    }
}

/// Renders rows as a two-column table.
pub fn render_split_html(rows: &[DiffRow]) -> String {
    let mut out = String::from("<table class=\"diff split\">\n<tbody>\n");
    for row in rows {
        out.push_str("<tr>");
        render_cell(&mut out, row.left.as_ref(), "del");
        render_cell(&mut out, row.right.as_ref(), "ins");
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn render_cell(out: &mut String, line: Option<&DiffLine>, emphasis: &str) {
    let Some(line) = line else {
        out.push_str("<td class=\"line-number\"></td><td class=\"empty\"></td>");
        return;
    };
    let class = match line.kind {
        LineKind::Equal => "equal",
        LineKind::Delete => "delete",
        LineKind::Insert => "insert",
        LineKind::Moved => "moved",
    };
    out.push_str(&format!(
        "<td class=\"line-number\">{}</td><td class=\"{class}\"><pre>",
        line.number
    ));
    for segment in &line.segments {
        let text = html::escape(&segment.text);
        if segment.changed && line.kind != LineKind::Moved {
            out.push_str(&format!("<{emphasis}>{text}</{emphasis}>"));
        } else {
            out.push_str(&text);
        }
    }
    out.push_str("</pre></td>");
}

/// Prefix of diff surface ids.
pub const DIFF_SURFACE_PREFIX: &str = "diffViewer-";
/// Prefix of diff container ids.
pub const DIFF_CONTAINER_PREFIX: &str = "diffContainer-";

/// A one-off comparison rendered into its own surface.
pub struct DiffView {
    id: Uuid,
    created_at: DateTime<Utc>,
    before: String,
    after: String,
    outcome: Result<Vec<DiffRow>, String>,
    target: Box<dyn RenderTarget>,
    layout: LayoutFlags,
}

impl DiffView {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn surface_id(&self) -> String {
        format!("{DIFF_SURFACE_PREFIX}{}", self.id)
    }

    pub fn container_id(&self) -> String {
        format!("{DIFF_CONTAINER_PREFIX}{}", self.id)
    }

    pub fn before(&self) -> &str {
        &self.before
    }

    pub fn after(&self) -> &str {
        &self.after
    }

    /// Rows of the diff, or the canonicalization error shown instead.
    pub fn outcome(&self) -> Result<&[DiffRow], &str> {
        match &self.outcome {
            Ok(rows) => Ok(rows),
            Err(err) => Err(err),
        }
    }

    pub fn target(&self) -> &dyn RenderTarget {
        self.target.as_ref()
    }

    pub fn layout(&self) -> &LayoutFlags {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutFlags {
        &mut self.layout
    }

    pub fn summary(&self) -> DiffSummary {
        let (rows, error) = match &self.outcome {
            Ok(rows) => (rows.clone(), None),
            Err(err) => (Vec::new(), Some(err.clone())),
        };
        DiffSummary {
            id: self.id,
            created_at: self.created_at,
            surface_id: self.surface_id(),
            container_id: self.container_id(),
            before: self.before.clone(),
            after: self.after.clone(),
            rows,
            error,
            layout: self.layout.clone(),
            content: self.target.content(),
        }
    }
}

impl std::fmt::Debug for DiffView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffView")
            .field("id", &self.id)
            .field("failed", &self.outcome.is_err())
            .finish_non_exhaustive()
    }
}

/// API view of a [`DiffView`].
#[derive(Debug, Serialize)]
pub struct DiffSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub surface_id: String,
    pub container_id: String,
    pub before: String,
    pub after: String,
    pub rows: Vec<DiffRow>,
    pub error: Option<String>,
    pub layout: LayoutFlags,
    pub content: String,
}

/// Canonicalizes pairs of documents and renders their diff.
#[derive(Clone)]
pub struct DiffViewer {
    canonicalizer: Arc<dyn Canonicalize>,
}

impl DiffViewer {
    pub fn new(canonicalizer: Arc<dyn Canonicalize>) -> Self {
        Self { canonicalizer }
    }

    /// Runs the canonicalizer; a panic counts as a failure.
    fn canonicalize(&self, html: &str) -> Result<String, WorkbenchError> {
        match catch_unwind(AssertUnwindSafe(|| self.canonicalizer.canonicalize(html))) {
            Ok(outcome) => outcome.map_err(WorkbenchError::CanonicalizationFailure),
            Err(panic) => Err(WorkbenchError::CanonicalizationFailure(panic_message(
                panic.as_ref(),
            ))),
        }
    }

    fn canonicalize_pair(&self, before: &str, after: &str) -> Result<(String, String), WorkbenchError> {
        Ok((self.canonicalize(before)?, self.canonicalize(after)?))
    }

    /// Builds a new diff view with a fresh id and renders it once into a
    /// surface made by `make_target`. A canonicalization failure is rendered
    /// as an inline error.
    pub fn show_diff(&self, before: &str, after: &str, make_target: &TargetFactory) -> DiffView {
        let id = Uuid::new_v4();
        let mut target = make_target(&format!("{DIFF_SURFACE_PREFIX}{id}"));
        let (before, after, outcome) = match self.canonicalize_pair(before, after) {
            Ok((before, after)) => {
                let rows = diff_rows(&before, &after);
                (before, after, Ok(rows))
            }
            Err(err) => {
                tracing::warn!(diff = %id, "Diff canonicalization failed: {}", err);
                (before.to_string(), after.to_string(), Err(err.to_string()))
            }
        };

        target.reset();
        match &outcome {
            Ok(rows) => target.write(&render_split_html(rows)),
            Err(err) => target.write(&format!(
                "<div class=\"diff-error\" role=\"alert\">{}</div>",
                html::escape(err)
            )),
        }

        DiffView {
            id,
            created_at: Utc::now(),
            before,
            after,
            outcome,
            target,
            layout: LayoutFlags::with(LayoutFlag::Maximize),
        }
    }
}

impl std::fmt::Debug for DiffViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffViewer").finish_non_exhaustive()
    }
}
