use crate::parse::meta::{StepMeta, parse_meta};

/// Error reported for a wrapper that contains no 3-fence steps.
pub const NO_STEPS_ERROR: &str = "No code steps found inside this magic-move block.";

/// Document-level error reported when no wrapper is found.
pub const NO_BLOCKS_ERROR: &str = "No magic-move blocks found. Wrap your steps in a 4-backtick \
     fence opened with `md magic-move` (````md magic-move) or `shiki-magic-move` \
     (````shiki-magic-move), each step being a regular 3-backtick code fence.";

/// Wrapper syntax a block was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum BlockKind {
    /// ````` ````shiki-magic-move ````` (Slidev flavour).
    SlidevStyle,
    /// ````` ````md magic-move ````` (markdown flavour).
    MarkdownStyle,
}

/// One code snippet, the unit between which animation happens.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Step {
    /// First word of the fence info string.
    pub language: String,
    /// Fence body without the trailing newline.
    pub code: String,
    /// Effective formatting metadata.
    pub meta: StepMeta,
}

/// An ordered group of steps sharing one outer metadata scope.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Block {
    /// Wrapper syntax.
    pub kind: BlockKind,
    /// Steps in document order.
    pub steps: Vec<Step>,
    /// User-facing problems found in this block.
    pub errors: Vec<String>,
    /// 1-based line of the wrapper's opening fence.
    pub line: usize,
}

impl Block {
    /// A block can be previewed or exported when it has steps and no errors.
    pub fn is_usable(&self) -> bool {
        self.errors.is_empty() && !self.steps.is_empty()
    }
}

/// Parser output: blocks plus document-level errors.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ParsedDocument {
    /// Blocks in document order.
    pub blocks: Vec<Block>,
    /// Problems not tied to a single block.
    pub errors: Vec<String>,
}

impl ParsedDocument {
    /// Index of the first usable block, if any.
    pub fn first_usable_block(&self) -> Option<usize> {
        self.blocks.iter().position(Block::is_usable)
    }
}

struct FencedBlock {
    info: String,
    body: String,
    fence_len: usize,
    closed: bool,
    line: usize,
}

/// Extract magic-move blocks and their steps from markdown text.
///
/// Pure function of the input. Everything outside the two wrapper syntaxes is ignored; inside a
/// wrapper only 3-character fences become steps.
#[tracing::instrument(skip(document), fields(len = document.len()))]
pub fn parse_document(document: &str) -> ParsedDocument {
    let mut out = ParsedDocument::default();

    for fence in fenced_blocks(document) {
        if fence.fence_len != 4 {
            continue;
        }
        let Some((kind, outer_annotation)) = strip_wrapper_keyword(&fence.info) else {
            continue;
        };
        if !fence.closed {
            out.errors.push(format!(
                "Unclosed magic-move block starting at line {}.",
                fence.line
            ));
            continue;
        }

        let outer = parse_meta(outer_annotation).resolve(StepMeta::default());
        out.blocks.push(parse_block(kind, outer, &fence));
    }

    if out.blocks.is_empty() {
        out.errors.push(NO_BLOCKS_ERROR.to_owned());
    }
    tracing::debug!(
        blocks = out.blocks.len(),
        errors = out.errors.len(),
        "parsed document"
    );
    out
}

fn parse_block(kind: BlockKind, outer: StepMeta, fence: &FencedBlock) -> Block {
    let mut block = Block {
        kind,
        steps: Vec::new(),
        errors: Vec::new(),
        line: fence.line,
    };

    for inner in fenced_blocks(&fence.body) {
        if inner.fence_len != 3 {
            continue;
        }
        if !inner.closed {
            block.errors.push(format!(
                "Step {}: unclosed code fence.",
                block.steps.len() + 1
            ));
            continue;
        }
        let (language, annotation) = split_language(&inner.info);
        block.steps.push(Step {
            language: language.to_owned(),
            code: inner.body,
            meta: parse_meta(annotation).resolve(outer),
        });
    }

    if block.steps.is_empty() {
        block.errors.push(NO_STEPS_ERROR.to_owned());
    }
    for (i, step) in block.steps.iter().enumerate() {
        if step.meta.start_line < 1 {
            block
                .errors
                .push(format!("Step {}: startLine must be >= 1.", i + 1));
        }
    }
    block
}

fn strip_wrapper_keyword(info: &str) -> Option<(BlockKind, &str)> {
    let info = info.trim();
    if let Some(rest) = info.strip_prefix("shiki-magic-move")
        && is_keyword_boundary(rest)
    {
        return Some((BlockKind::SlidevStyle, rest));
    }
    let rest = info.strip_prefix("md")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start().strip_prefix("magic-move")?;
    is_keyword_boundary(rest).then_some((BlockKind::MarkdownStyle, rest))
}

fn is_keyword_boundary(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('{')
}

fn split_language(info: &str) -> (&str, &str) {
    let info = info.trim();
    let end = info
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(info.len());
    (&info[..end], &info[end..])
}

/// Fenced regions of `src`, found line by line.
///
/// A fence opens on a line whose first non-blank characters are a run of at least three `` ` `` or
/// `~` (backtick info strings may not contain a backtick) and closes on a line holding only a run
/// of the same character at least as long. Whatever surrounds a fence has no effect on it, so
/// HTML, prose and indentation never hide one. An unclosed fence runs to the end of `src`.
fn fenced_blocks(src: &str) -> Vec<FencedBlock> {
    let mut out = Vec::new();
    let mut lines = src.lines().enumerate();

    while let Some((idx, line)) = lines.next() {
        let Some(open) = opening_fence(line) else {
            continue;
        };
        let mut block = FencedBlock {
            info: open.info.to_owned(),
            body: String::new(),
            fence_len: open.len,
            closed: false,
            line: idx + 1,
        };
        let mut body: Vec<&str> = Vec::new();
        for (_, inner) in lines.by_ref() {
            if closes(inner, open.ch, open.len) {
                block.closed = true;
                break;
            }
            body.push(strip_indent(inner, open.indent));
        }
        block.body = body.join("\n");
        out.push(block);
    }
    out
}

struct OpeningFence<'a> {
    ch: char,
    len: usize,
    indent: usize,
    info: &'a str,
}

fn opening_fence(line: &str) -> Option<OpeningFence<'_>> {
    let trimmed = line.trim_start_matches([' ', '\t']);
    let ch = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == ch).count();
    if len < 3 {
        return None;
    }
    let info = trimmed[len..].trim();
    if ch == '`' && info.contains('`') {
        return None;
    }
    Some(OpeningFence {
        ch,
        len,
        indent: line.len() - trimmed.len(),
        info,
    })
}

fn closes(line: &str, ch: char, len: usize) -> bool {
    let t = line.trim();
    t.len() >= len && t.chars().all(|c| c == ch)
}

fn strip_indent(line: &str, indent: usize) -> &str {
    let blanks = line
        .bytes()
        .take(indent)
        .take_while(|b| matches!(b, b' ' | b'\t'))
        .count();
    &line[blanks..]
}

#[cfg(test)]
#[path = "../../tests/unit/parse/blocks.rs"]
mod tests;
