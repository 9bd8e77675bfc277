//! Input transforms for markup-shaped seeds.
//!
//! Every mutator is a named [`Transform`] value. The registry is plain data, so
//! a catalog can be built, filtered, or extended without touching the harness.

use std::ops::Range;
use std::sync::LazyLock;

use fastrand::Rng;
use regex::Regex;

/// Printable ASCII.
pub const ASCII: Range<u32> = 0x20..0x7F;
/// C0 control characters.
pub const CONTROL: Range<u32> = 0x00..0x1F;
/// Latin-1 supplement, everything above ASCII up to 0xFE.
pub const EXTENDED: Range<u32> = 0x80..0xFF;

pub const INSERT_COUNT: usize = 10;
pub const INFLATE_LEN: usize = 50;
pub const NEST_DEPTH: usize = 20;

static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^/][^>]+)>").expect("open tag pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Insert `count` random chars drawn from `range` at random positions.
    InsertChars { count: usize, range: Range<u32> },
    /// Replace every `token` with one random lowercase string of `len` chars.
    Inflate { token: &'static str, len: usize },
    ReplaceAll { from: &'static str, to: &'static str },
    /// Replace only the first `from`. Absent `from` leaves the input as is.
    ReplaceFirst { from: &'static str, to: &'static str },
    /// Repeat every opening tag right after itself.
    DuplicateTags,
    /// Ignore the input and emit `depth` nested `<div>`s around `content`.
    Nest { depth: usize },
    /// Remove one random contiguous slice.
    DeleteSlice,
    /// Append a `<style>` block with a random colour.
    InjectStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutator {
    pub name: &'static str,
    pub transform: Transform,
}

impl Mutator {
    pub const fn new(name: &'static str, transform: Transform) -> Self {
        Mutator { name, transform }
    }

    pub fn apply(&self, input: &str, rng: &mut Rng) -> String {
        self.transform.apply(input, rng)
    }
}

impl Transform {
    pub fn apply(&self, input: &str, rng: &mut Rng) -> String {
        match self {
            Transform::InsertChars { count, range } => {
                insert_random_chars(input, *count, range.clone(), rng)
            }
            Transform::Inflate { token, len } => input.replace(*token, &random_lowercase(*len, rng)),
            Transform::ReplaceAll { from, to } => input.replace(*from, to),
            Transform::ReplaceFirst { from, to } => input.replacen(*from, to, 1),
            Transform::DuplicateTags => duplicate_tags(input),
            Transform::Nest { depth } => nested_elements(*depth),
            Transform::DeleteSlice => delete_slice(input, rng),
            Transform::InjectStyle => inject_style(input, rng),
        }
    }
}

pub fn insert_random_chars(input: &str, count: usize, range: Range<u32>, rng: &mut Rng) -> String {
    if input.is_empty() || range.is_empty() {
        return input.to_string();
    }
    let mut chars: Vec<char> = input.chars().collect();
    for _ in 0..count {
        let pos = rng.usize(..chars.len());
        let c = char::from_u32(rng.u32(range.clone())).unwrap_or(char::REPLACEMENT_CHARACTER);
        chars.insert(pos, c);
    }
    chars.into_iter().collect()
}

pub fn random_lowercase(len: usize, rng: &mut Rng) -> String {
    (0..len).map(|_| rng.lowercase()).collect()
}

pub fn duplicate_tags(input: &str) -> String {
    OPEN_TAG.replace_all(input, "<${1}><${1}>").into_owned()
}

pub fn nested_elements(depth: usize) -> String {
    let mut out = String::with_capacity(depth * 11 + 7);
    for _ in 0..depth {
        out.push_str("<div>");
    }
    out.push_str("content");
    for _ in 0..depth {
        out.push_str("</div>");
    }
    out
}

pub fn delete_slice(input: &str, rng: &mut Rng) -> String {
    if input.is_empty() {
        return input.to_string();
    }
    let chars: Vec<char> = input.chars().collect();
    let start = rng.usize(..chars.len());
    let end = rng.usize(start..chars.len());
    chars[..start].iter().chain(&chars[end..]).collect()
}

pub fn inject_style(input: &str, rng: &mut Rng) -> String {
    format!(
        "{}<style>body{{background-color:#{:x};}}</style>",
        input,
        rng.u32(..0xFF_FFFF)
    )
}

/// The full catalog, in reporting order.
pub fn default_catalog() -> Vec<Mutator> {
    use Transform::*;

    vec![
        // random characters
        Mutator::new("insert-ascii", InsertChars { count: INSERT_COUNT, range: ASCII }),
        Mutator::new("insert-control", InsertChars { count: INSERT_COUNT, range: CONTROL }),
        Mutator::new("insert-extended", InsertChars { count: INSERT_COUNT, range: EXTENDED }),
        // oversized identifiers
        Mutator::new("inflate-tag", Inflate { token: "tag", len: INFLATE_LEN }),
        Mutator::new("inflate-value", Inflate { token: "value", len: INFLATE_LEN }),
        Mutator::new("inflate-attribute", Inflate { token: "attribute", len: INFLATE_LEN }),
        // every delimiter
        Mutator::new("replace-all-lt-double", ReplaceAll { from: "<", to: "<<" }),
        Mutator::new("replace-all-gt-double", ReplaceAll { from: ">", to: ">>" }),
        Mutator::new("replace-all-gt-escape", ReplaceAll { from: ">", to: "\\>" }),
        Mutator::new("replace-all-lt-escape", ReplaceAll { from: "<", to: "\\<" }),
        Mutator::new("replace-all-space-tab", ReplaceAll { from: " ", to: "\t" }),
        Mutator::new("replace-all-lt-null", ReplaceAll { from: "<", to: "\0<" }),
        Mutator::new("replace-all-quote-apostrophe", ReplaceAll { from: "\"", to: "'" }),
        Mutator::new("replace-all-quote-backtick", ReplaceAll { from: "\"", to: "`" }),
        // first delimiter only
        Mutator::new("replace-first-quote-apostrophe", ReplaceFirst { from: "\"", to: "'" }),
        Mutator::new("replace-first-quote-backtick", ReplaceFirst { from: "\"", to: "`" }),
        Mutator::new("replace-first-quote-null", ReplaceFirst { from: "\"", to: "\0" }),
        Mutator::new("replace-first-quote-tab", ReplaceFirst { from: "\"", to: "\t" }),
        Mutator::new("replace-first-lt-null", ReplaceFirst { from: "<", to: "\0" }),
        Mutator::new("replace-first-lt-tab", ReplaceFirst { from: "<", to: "\t" }),
        Mutator::new("replace-first-gt-null", ReplaceFirst { from: ">", to: "\0" }),
        // structure
        Mutator::new("duplicate-tags", DuplicateTags),
        Mutator::new("nest-divs", Nest { depth: NEST_DEPTH }),
        Mutator::new("delete-slice", DeleteSlice),
        Mutator::new("inject-style", InjectStyle),
    ]
}
