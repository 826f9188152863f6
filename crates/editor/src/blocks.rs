//! Block view of a markdown document.
//!
//! [`segment`] and [`join`] are pure and lossless: `join(&segment(s)) == s` for
//! every input. Editing a block means replacing its text and joining again.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// ATX heading with its level (1-6)
    Heading(u8),
    Paragraph,
    /// Fenced code block, fences included
    CodeFence,
    /// Run of blank lines
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Source text including line endings
    pub text: String,
}

impl Block {
    fn new(kind: BlockKind, line: &str) -> Self {
        Self {
            kind,
            text: line.to_string(),
        }
    }

    /// Line ending the block's text finishes with (`""` for the last line of a
    /// document without a trailing newline).
    pub fn line_ending(&self) -> &'static str {
        if self.text.ends_with("\r\n") {
            "\r\n"
        } else if self.text.ends_with('\n') {
            "\n"
        } else {
            ""
        }
    }
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]|\r?\n|$)").expect("valid heading regex"))
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})").expect("valid fence regex"))
}

fn closing_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^ {0,3}(`{3,}|~{3,})[ \t]*(?:\r?\n)?$").expect("valid closing fence regex")
    })
}

/// Split a document into blocks.
pub fn segment(content: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    // Marker of the open fence (e.g. "```"), if inside a code block
    let mut open_fence: Option<String> = None;
    // Whether the last block may absorb the next line
    let mut extendable = false;

    for line in content.split_inclusive('\n') {
        if let Some(marker) = &open_fence {
            if let Some(last) = blocks.last_mut() {
                last.text.push_str(line);
            }
            if closes_fence(line, marker) {
                open_fence = None;
                extendable = false;
            }
            continue;
        }

        if line.trim().is_empty() {
            match blocks.last_mut() {
                Some(last) if extendable && last.kind == BlockKind::Blank => {
                    last.text.push_str(line)
                }
                _ => blocks.push(Block::new(BlockKind::Blank, line)),
            }
            extendable = true;
        } else if let Some(caps) = fence_re().captures(line) {
            open_fence = Some(caps[1].to_string());
            blocks.push(Block::new(BlockKind::CodeFence, line));
            extendable = false;
        } else if let Some(caps) = heading_re().captures(line) {
            let level = caps[1].len() as u8;
            blocks.push(Block::new(BlockKind::Heading(level), line));
            extendable = false;
        } else {
            match blocks.last_mut() {
                Some(last) if extendable && last.kind == BlockKind::Paragraph => {
                    last.text.push_str(line)
                }
                _ => blocks.push(Block::new(BlockKind::Paragraph, line)),
            }
            extendable = true;
        }
    }

    blocks
}

/// Concatenate blocks back into a document.
pub fn join(blocks: &[Block]) -> String {
    blocks.iter().map(|block| block.text.as_str()).collect()
}

fn closes_fence(line: &str, marker: &str) -> bool {
    let Some(caps) = closing_fence_re().captures(line) else {
        return false;
    };
    let fence = &caps[1];
    fence.starts_with(&marker[..1]) && fence.len() >= marker.len()
}
