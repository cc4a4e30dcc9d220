//! Doc comment extraction
//!
//! Parses the raw text of a declaration's leading doc comment into a
//! structured [`DocComment`] and merges the comments collected from several
//! related declarations (a value, its declared type, its declaration).
//!
//! ```text
//! /**
//!  * Looks up the current weather.      -> description
//!  * @param {string} city - City name   -> params["city"]
//!  * @returns {Weather} The forecast    -> returns
//!  * @idiom sunny day                   -> phrases
//!  * @default "Paris"                   -> tags["default"]
//!  */
//! ```

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Structured form of a doc comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocComment {
    /// Free text before the first tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `@param` texts keyed by parameter name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,

    /// `@returns` text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,

    /// Every other tag, keyed by tag name. Flag tags such as `@noid` map to
    /// an empty string.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    /// `@idiom` phrases, without duplicates, in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phrases: Vec<String>,
}

impl DocComment {
    /// Parse raw doc comment text
    pub fn parse(raw: &str) -> Self {
        let mut doc = DocComment::default();
        let mut description: Vec<&str> = Vec::new();
        let mut current: Option<(&str, Vec<&str>)> = None;

        for line in raw.lines().map(clean_line) {
            if let Some((tag, body)) = split_tag(line) {
                if let Some((name, lines)) = current.take() {
                    doc.apply_tag(name, &lines.join("\n"));
                }
                current = Some((tag, vec![body]));
            } else if let Some((_, lines)) = current.as_mut() {
                lines.push(line);
            } else {
                description.push(line);
            }
        }
        if let Some((name, lines)) = current.take() {
            doc.apply_tag(name, &lines.join("\n"));
        }

        doc.description = non_empty(description.join("\n").trim());
        doc
    }

    fn apply_tag(&mut self, tag: &str, body: &str) {
        match tag {
            "param" | "arg" | "argument" => {
                let (name, text) = split_param(strip_type_annotation(body));
                if !name.is_empty() {
                    self.params.insert(name.to_string(), text.trim().to_string());
                }
            }
            "returns" | "return" => {
                self.returns = non_empty(strip_type_annotation(body).trim());
            }
            "idiom" => {
                if let Some(phrase) = non_empty(body.trim()) {
                    self.add_phrase(phrase);
                }
            }
            _ => {
                self.tags.insert(tag.to_string(), body.trim().to_string());
            }
        }
    }

    fn add_phrase(&mut self, phrase: String) {
        if !self.phrases.contains(&phrase) {
            self.phrases.push(phrase);
        }
    }

    /// Whether the comment carries `@name`
    #[inline]
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Text of `@name`, if present
    #[inline]
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &DocComment::default()
    }

    /// Merge comments in order of increasing precedence.
    ///
    /// Description and returns come from the last comment that defines
    /// them, params and tags are overwritten key by key and phrases are
    /// unioned. Returns `None` when every input is absent.
    pub fn merge<'a, I>(comments: I) -> Option<DocComment>
    where
        I: IntoIterator<Item = Option<&'a DocComment>>,
    {
        let mut merged: Option<DocComment> = None;
        for comment in comments.into_iter().flatten() {
            let target = merged.get_or_insert_with(DocComment::default);
            if comment.description.is_some() {
                target.description = comment.description.clone();
            }
            if comment.returns.is_some() {
                target.returns = comment.returns.clone();
            }
            target
                .params
                .extend(comment.params.iter().map(|(k, v)| (k.clone(), v.clone())));
            target
                .tags
                .extend(comment.tags.iter().map(|(k, v)| (k.clone(), v.clone())));
            for phrase in &comment.phrases {
                target.add_phrase(phrase.clone());
            }
        }
        merged
    }
}

/// Strip comment delimiters and the `*` gutter from one line
fn clean_line(line: &str) -> &str {
    let mut line = line.trim();
    for prefix in ["/**", "/*", "///", "//!", "//"] {
        if let Some(rest) = line.strip_prefix(prefix) {
            line = rest;
            break;
        }
    }
    if let Some(rest) = line.strip_suffix("*/") {
        line = rest;
    }
    let line = line.trim_start();
    line.strip_prefix('*').unwrap_or(line).trim()
}

fn split_tag(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('@')?;
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some((&rest[..end], rest[end..].trim_start()))
}

/// Discard a leading `{...}` type annotation with balanced braces.
///
/// Text with an unterminated annotation is returned unchanged.
fn strip_type_annotation(text: &str) -> &str {
    let text = text.trim_start();
    if !text.starts_with('{') {
        return text;
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return text[i + 1..].trim_start();
                }
            }
            _ => {}
        }
    }
    text
}

/// Split `name [-] text` or `[name=default] [-] text`
fn split_param(text: &str) -> (&str, &str) {
    let (name, rest) = if let Some(inner) = text.strip_prefix('[') {
        match inner.find(']') {
            Some(end) => {
                let name = inner[..end].split('=').next().unwrap_or_default();
                (name.trim(), &inner[end + 1..])
            }
            None => return ("", text),
        }
    } else {
        let end = text.find(char::is_whitespace).unwrap_or(text.len());
        (&text[..end], &text[end..])
    };
    let rest = rest.trim_start();
    (name, rest.strip_prefix('-').unwrap_or(rest).trim_start())
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Per-build memo of parsed comments, keyed by raw text
#[derive(Debug, Default)]
pub struct CommentCache {
    parsed: Mutex<AHashMap<String, Arc<DocComment>>>,
}

impl CommentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed form of `raw`, parsing at most once per distinct text
    pub fn get(&self, raw: Option<&str>) -> Option<Arc<DocComment>> {
        let raw = raw?;
        let mut parsed = self.parsed.lock();
        if let Some(doc) = parsed.get(raw) {
            return Some(doc.clone());
        }
        let doc = Arc::new(DocComment::parse(raw));
        tracing::trace!(cached = parsed.len(), "parsed doc comment");
        parsed.insert(raw.to_string(), doc.clone());
        Some(doc)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.parsed.lock().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
