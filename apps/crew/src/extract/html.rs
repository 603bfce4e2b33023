//! Markup stripping for fetched job postings.

use std::sync::LazyLock;

use regex::Regex;

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|template)\b[^>]*>.*?</(script|style|noscript|template)\s*>")
        .expect("valid hidden-block pattern")
});
static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));
static BLOCK_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(br|/?p|/?div|/?li|/?ul|/?ol|/?h[1-6]|/?tr|/?section|/?article)\b[^>]*>")
        .expect("valid block-break pattern")
});
static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));
static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid whitespace pattern"));
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ([,.;:!?])").expect("valid punctuation pattern"));
static ENTITIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[xX]([0-9a-fA-F]{1,6})|#([0-9]{1,7})|([a-zA-Z]+));")
        .expect("valid entity pattern")
});

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("nbsp", " "),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("ndash", "-"),
    ("mdash", "-"),
    ("bull", "*"),
    ("amp", "&"),
];

/// Strips tags, hidden blocks, and comments; decodes common entities; collapses
/// whitespace. Block-level tags become line breaks and blank lines are dropped.
pub fn strip_markup(html: &str) -> String {
    let text = HIDDEN_BLOCKS.replace_all(html, " ");
    let text = COMMENTS.replace_all(&text, " ");
    let text = BLOCK_BREAKS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, " ");

    decode_entities(&text)
        .lines()
        .map(|line| {
            let line = SPACES.replace_all(line, " ");
            SPACE_BEFORE_PUNCT.replace_all(line.trim(), "$1").into_owned()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes named and numeric references in one pass, so decoded text is never
/// decoded again. Unknown names and invalid code points are left as-is.
fn decode_entities(text: &str) -> String {
    ENTITIES
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let decoded = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
            } else if let Some(dec) = caps.get(2) {
                dec.as_str()
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
            } else {
                caps.get(3).and_then(|name| {
                    NAMED_ENTITIES
                        .iter()
                        .find(|(entity, _)| *entity == name.as_str())
                        .map(|(_, replacement)| replacement.to_string())
                })
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
