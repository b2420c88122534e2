// Dictionary projection: one `id<TAB>[word]<TAB>pronunciation` row per word.
//
// The id is the category id of the most recent declaration. Word lines that
// come before any declaration carry id -1 under the legacy policy; that case
// is almost certainly an input mistake, so a strict policy rejects it.

use crate::vocabulary::{Vocabulary, WordLine};

/// Error type for dictionary projection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DictError {
    #[error("line {line}: word entry before any category declaration")]
    EntryBeforeCategory { line: usize },
    #[error("line {line}: word \"{word}\" has no pronunciation")]
    MissingPronunciation { line: usize, word: String },
    /// A line of a compiled `.dict` or `.term` file that cannot be read back.
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// How to treat suspicious vocabulary lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DictionaryPolicy {
    /// Emit orphan words with id -1 and skip words without pronunciation.
    #[default]
    Legacy,
    /// Reject orphan words and words without pronunciation.
    Strict,
}

/// A dictionary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    /// `None` for words preceding every category declaration.
    pub category: Option<u32>,
    pub word: String,
    pub pronunciation: String,
}

impl DictEntry {
    /// Numeric id as written to the dictionary file (-1 when uncategorized).
    pub fn id(&self) -> i64 {
        self.category.map_or(-1, i64::from)
    }

    pub fn render(&self) -> String {
        format!("{}\t[{}]\t{}", self.id(), self.word, self.pronunciation)
    }
}

/// Split a word line on its first run of whitespace.
fn split_word(line: &WordLine) -> Option<(&str, &str)> {
    let (word, rest) = line.text.split_once(char::is_whitespace)?;
    let pronunciation = rest.trim_start();
    if pronunciation.is_empty() {
        return None;
    }
    Some((word, pronunciation))
}

/// Project every word line of `voca` into a dictionary row, in input order.
pub fn project_dictionary(
    voca: &Vocabulary,
    policy: DictionaryPolicy,
) -> Result<Vec<DictEntry>, DictError> {
    let orphans = voca.orphans().iter().map(|w| (None, w));
    let owned = voca
        .categories()
        .iter()
        .flat_map(|c| c.words.iter().map(move |w| (Some(c.id), w)));

    let mut entries = Vec::with_capacity(voca.word_count());
    for (category, line) in orphans.chain(owned) {
        if category.is_none() {
            match policy {
                DictionaryPolicy::Strict => {
                    return Err(DictError::EntryBeforeCategory { line: line.line });
                }
                DictionaryPolicy::Legacy => {
                    tracing::warn!(line = line.line, "word entry before any category, id -1");
                }
            }
        }
        let Some((word, pronunciation)) = split_word(line) else {
            if policy == DictionaryPolicy::Strict {
                return Err(DictError::MissingPronunciation {
                    line: line.line,
                    word: line.text.clone(),
                });
            }
            tracing::warn!(line = line.line, "skipping word without pronunciation: {}", line.text);
            continue;
        };
        entries.push(DictEntry {
            category,
            word: word.to_string(),
            pronunciation: pronunciation.to_string(),
        });
    }
    Ok(entries)
}

/// Render dictionary rows, one per line.
pub fn render_dictionary(entries: &[DictEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.render());
        out.push('\n');
    }
    out
}

/// Read rows back from `.dict` text.
///
/// The word is the bracketed output string when present, otherwise the
/// first field after the id. Id -1 marks a word without category.
pub fn parse_dictionary(text: &str) -> Result<Vec<DictEntry>, DictError> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = |reason: &str| DictError::Malformed {
            line: idx + 1,
            reason: reason.to_string(),
        };
        let (id, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| malformed("expected id, word and pronunciation"))?;
        let category = match id.parse::<i64>() {
            Ok(-1) => None,
            Ok(id) => Some(u32::try_from(id).map_err(|_| malformed("invalid category id"))?),
            Err(_) => return Err(malformed("invalid category id")),
        };
        let rest = rest.trim_start();
        let (word, pronunciation) = match rest.strip_prefix('[') {
            Some(bracketed) => bracketed
                .split_once(']')
                .ok_or_else(|| malformed("unterminated [word]"))?,
            None => rest.split_once(char::is_whitespace).unwrap_or((rest, "")),
        };
        let pronunciation = pronunciation.trim();
        if pronunciation.is_empty() {
            return Err(malformed("missing pronunciation"));
        }
        entries.push(DictEntry {
            category,
            word: word.to_string(),
            pronunciation: pronunciation.to_string(),
        });
    }
    Ok(entries)
}
