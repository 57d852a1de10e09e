//! Line-level view of unified diff text.
//!
//! Splits a patch into typed lines and tracks the head-file line each one
//! sits at, so detectors can work on "added" and "removed" lines without
//! re-implementing prefix handling.

use std::sync::LazyLock;

use regex::Regex;

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid hunk header regex")
});

/// Kind of a single patch line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `+++ b/path` / `--- a/path` before the first hunk.
    FileHeader,
    /// `@@ -a,b +c,d @@`
    HunkHeader,
    Added,
    Removed,
    Context,
    /// `\ No newline at end of file`
    Marker,
}

/// One line of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchLine<'a> {
    /// 1-based position within the patch text.
    pub index: u32,
    pub kind: LineKind,
    /// Line text without the diff prefix.
    pub content: &'a str,
    /// Head-file line this patch line is anchored to, once a hunk header has
    /// been seen. Removed lines anchor to the head line that now occupies
    /// their position, clamped to the last head line of the hunk.
    pub head_line: Option<u32>,
    /// Nothing but whitespace and comment text remains on the line, with
    /// block comments followed across lines of the same side of the diff.
    pub comment_or_blank: bool,
}

impl PatchLine<'_> {
    /// Whether this line is an addition or a removal.
    pub fn is_change(&self) -> bool {
        matches!(self.kind, LineKind::Added | LineKind::Removed)
    }

    /// Blank lines and lines that only hold a comment.
    pub fn is_comment_or_blank(&self) -> bool {
        self.comment_or_blank
    }
}

/// Terminator of a block comment left open on a previous line.
type OpenBlock = Option<&'static str>;

const BLOCK_COMMENTS: [(&str, &str); 2] = [("/*", "*/"), ("<!--", "-->")];

/// Start of a `//` comment. Requires line start or whitespace before it so
/// `http://` inside a string stays code.
fn line_comment_start(text: &str) -> Option<usize> {
    text.match_indices("//")
        .map(|(i, _)| i)
        .find(|&i| i == 0 || text[..i].ends_with(char::is_whitespace))
}

/// Code left on `text` once comments are removed. `open` is the block
/// comment carried in from the previous line and is updated for the next.
fn strip_comments(text: &str, open: &mut OpenBlock) -> String {
    let mut code = String::new();
    let mut rest = text;

    // A close with no visible opener ends a block that began above the hunk.
    if open.is_none() {
        if let Some(after) = rest.trim_start().strip_prefix("*/") {
            rest = after;
        }
    }

    loop {
        if let Some(end) = *open {
            match rest.find(end) {
                Some(i) => {
                    rest = &rest[i + end.len()..];
                    *open = None;
                }
                None => return code,
            }
            continue;
        }

        let line = line_comment_start(rest);
        let block = BLOCK_COMMENTS
            .iter()
            .filter_map(|&(start, end)| rest.find(start).map(|i| (i, start, end)))
            .min_by_key(|&(i, _, _)| i);

        match (line, block) {
            (Some(l), Some((b, _, _))) if l < b => {
                code.push_str(&rest[..l]);
                return code;
            }
            (Some(l), None) => {
                code.push_str(&rest[..l]);
                return code;
            }
            (_, Some((b, start, end))) => {
                code.push_str(&rest[..b]);
                code.push(' ');
                rest = &rest[b + start.len()..];
                *open = Some(end);
            }
            (None, None) => {
                code.push_str(rest);
                return code;
            }
        }
    }
}

fn is_comment_or_blank(text: &str, open: &mut OpenBlock) -> bool {
    let code = strip_comments(text, open);
    let code = code.trim();
    code.is_empty() || code == "#" || code.starts_with("# ")
}

/// Parse patch text into typed lines.
pub fn parse_patch(patch: &str) -> Vec<PatchLine<'_>> {
    let mut lines = Vec::new();
    let mut in_hunk = false;
    let mut next_head: Option<u32> = None;
    let mut head_end: Option<u32> = None;
    let mut old_block: OpenBlock = None;
    let mut new_block: OpenBlock = None;

    for (i, raw) in patch.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let index = u32::try_from(i + 1).unwrap_or(u32::MAX);

        if let Some(caps) = HUNK_HEADER.captures(raw) {
            in_hunk = true;
            next_head = caps.get(3).and_then(|m| m.as_str().parse().ok());
            let count: u32 = caps
                .get(4)
                .map_or(Some(1), |m| m.as_str().parse().ok())
                .unwrap_or(1);
            head_end = next_head.map(|start: u32| match count {
                0 => start.max(1),
                n => start.saturating_add(n - 1),
            });
            old_block = None;
            new_block = None;
            lines.push(PatchLine {
                index,
                kind: LineKind::HunkHeader,
                content: raw,
                head_line: None,
                comment_or_blank: false,
            });
            continue;
        }

        if !in_hunk && (raw.starts_with("+++ ") || raw.starts_with("--- ")) {
            lines.push(PatchLine {
                index,
                kind: LineKind::FileHeader,
                content: raw,
                head_line: None,
                comment_or_blank: false,
            });
            continue;
        }

        let (kind, content) = if let Some(rest) = raw.strip_prefix('+') {
            (LineKind::Added, rest)
        } else if let Some(rest) = raw.strip_prefix('-') {
            (LineKind::Removed, rest)
        } else if raw.starts_with('\\') {
            (LineKind::Marker, raw)
        } else {
            (LineKind::Context, raw.strip_prefix(' ').unwrap_or(raw))
        };

        let comment_or_blank = match kind {
            LineKind::Added => is_comment_or_blank(content, &mut new_block),
            LineKind::Removed => is_comment_or_blank(content, &mut old_block),
            LineKind::Context => {
                is_comment_or_blank(content, &mut old_block);
                is_comment_or_blank(content, &mut new_block)
            }
            _ => false,
        };

        let head_line = match kind {
            LineKind::Marker => None,
            // A hunk at `+0,0` (file deleted) anchors removals at line 1.
            LineKind::Removed => next_head.map(|n| head_end.map_or(n, |end| n.min(end)).max(1)),
            _ => {
                let current = next_head;
                next_head = next_head.map(|n| n.saturating_add(1));
                current
            }
        };

        lines.push(PatchLine {
            index,
            kind,
            content,
            head_line,
            comment_or_blank,
        });
    }

    lines
}

/// Lines of the given kind, skipping blank and comment-only lines.
pub fn code_lines(patch: &str, kind: LineKind) -> impl Iterator<Item = PatchLine<'_>> {
    parse_patch(patch)
        .into_iter()
        .filter(move |line| line.kind == kind && !line.is_comment_or_blank())
}
