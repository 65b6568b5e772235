//! Article cleaning and parsing.
//!
//! Cleaning runs in a fixed order: HTML entities are unescaped first, then
//! unicode punctuation is folded to ASCII and remaining non-ASCII is
//! stripped, and finally the content's HTML structure is partitioned into
//! logical text blocks that are rejoined with single spaces.

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

use super::types::{Document, DocumentMetadata};
use crate::news::RawArticle;

/// Block-level elements treated as logical partitions of the content HTML.
const BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, blockquote, pre, td, th";

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn numeric_entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&#(x?[0-9a-fA-F]+);").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

fn block_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(BLOCK_SELECTOR).unwrap())
}

/// Replace HTML entities (named common set plus numeric references) with
/// their literal characters. `&amp;` is resolved last so entities exposed by
/// it are not unescaped twice.
pub fn unescape_entities(text: &str) -> String {
    let replaced = text
        .replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
        .replace("&rdquo;", "\"")
        .replace("&ldquo;", "\"")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    let replaced = numeric_entity_re()
        .replace_all(&replaced, |caps: &regex::Captures| {
            let code = &caps[1];
            let parsed = match code.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse::<u32>().ok(),
            };
            parsed
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned();

    replaced.replace("&amp;", "&")
}

/// Fold unicode quote and dash characters to ASCII, normalize, and strip
/// whatever non-ASCII remains.
pub fn normalize_to_ascii(text: &str) -> String {
    let folded: String = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2015}' => '-',
            _ => c,
        })
        .collect();

    folded.nfkc().filter(|c| c.is_ascii()).collect()
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    whitespace_re().replace_all(text, " ").trim().to_string()
}

/// Clean a plain-text field (headline or summary): unescape entities, strip
/// any stray markup, fold to ASCII and collapse whitespace.
pub fn clean_field(text: &str) -> String {
    let unescaped = unescape_entities(text);
    let stripped = tag_re().replace_all(&unescaped, " ");
    collapse_whitespace(&normalize_to_ascii(&stripped))
}

fn flush_block(buf: &mut String, blocks: &mut Vec<String>) {
    let text = collapse_whitespace(buf);
    if !text.is_empty() {
        blocks.push(text);
    }
    buf.clear();
}

fn walk_blocks(
    element: ElementRef,
    selector: &Selector,
    buf: &mut String,
    blocks: &mut Vec<String>,
) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if selector.matches(&child_element) {
                // An outermost block element: flush any loose text collected
                // before it, then take the element's entire text as one block
                // (nested blocks contribute to it, never to a second block).
                flush_block(buf, blocks);
                let block = collapse_whitespace(&child_element.text().collect::<String>());
                if !block.is_empty() {
                    blocks.push(block);
                }
            } else {
                walk_blocks(child_element, selector, buf, blocks);
            }
        } else if let Node::Text(text) = child.value() {
            buf.push_str(text);
        }
    }
}

/// Partition HTML into the text of its logical blocks, in document order.
/// Block-level elements each become one block; text outside any block
/// element is kept as its own block, so markup-free fragments survive as a
/// single block.
pub fn partition_html_blocks(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    let selector = block_selector();

    let mut blocks = Vec::new();
    let mut buf = String::new();
    walk_blocks(fragment.root_element(), selector, &mut buf, &mut blocks);
    flush_block(&mut buf, &mut blocks);

    blocks
}

/// Clean the content field: entity unescape, ASCII fold, then HTML partition
/// with block text rejoined by single spaces.
pub fn clean_content(content: &str) -> String {
    let cleaned = normalize_to_ascii(&unescape_entities(content));
    partition_html_blocks(&cleaned).join(" ")
}

/// Content-addressed identifier: digest of the original, uncleaned content
/// bytes. Identical raw content always maps to the same id.
pub fn content_id(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Parse a raw article into a cleaned, content-addressed document with empty
/// chunks and embeddings.
pub fn parse_article(article: &RawArticle) -> Document {
    let headline = clean_field(&article.headline);
    let summary = clean_field(&article.summary);
    let content = clean_content(&article.content);

    Document {
        id: content_id(&article.content),
        text: vec![headline.clone(), summary.clone(), content],
        metadata: DocumentMetadata {
            date: article.date.to_rfc3339(),
            headline,
            summary,
        },
        chunks: Vec::new(),
        embeddings: Vec::new(),
    }
}
