// Vocabulary: category declarations and the word entries under them.
//
// A `.voca` file is a sequence of `%Category` headers, each followed by
// `word pronunciation` lines. Category ids are dense and zero-based, assigned
// in declaration order.

use hashbrown::{HashMap, HashSet};

use crate::dictionary::DictError;
use crate::strip_comment;

/// Character that starts a category declaration line.
pub const CATEGORY_MARKER: char = '%';

/// A word line, kept verbatim (comment-stripped and trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordLine {
    /// 1-based line number in the source text.
    pub line: usize,
    pub text: String,
}

/// A declared category with its word lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub words: Vec<WordLine>,
}

/// A parsed vocabulary.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    categories: Vec<Category>,
    /// Word lines that precede the first category declaration.
    orphans: Vec<WordLine>,
    /// First id declared for each name.
    ids: HashMap<String, u32>,
}

impl Vocabulary {
    /// Parse vocabulary text.
    ///
    /// Word lines before any declaration are kept as orphans: they are counted
    /// but belong to no category.
    pub fn parse(text: &str) -> Self {
        let mut voca = Vocabulary::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix(CATEGORY_MARKER) {
                voca.declare(name.trim());
                continue;
            }
            let word = WordLine {
                line: idx + 1,
                text: line.to_string(),
            };
            match voca.categories.last_mut() {
                Some(category) => category.words.push(word),
                None => voca.orphans.push(word),
            }
        }
        voca
    }

    /// Declare a new category and return its id.
    ///
    /// A repeated name gets a fresh id; lookups by name keep resolving to the
    /// first declaration.
    pub fn declare(&mut self, name: &str) -> u32 {
        let id = self.categories.len() as u32;
        self.categories.push(Category {
            id,
            name: name.to_string(),
            words: Vec::new(),
        });
        self.ids.entry(name.to_string()).or_insert(id);
        id
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn orphans(&self) -> &[WordLine] {
        &self.orphans
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Number of word lines, including orphans.
    pub fn word_count(&self) -> usize {
        self.orphans.len() + self.categories.iter().map(|c| c.words.len()).sum::<usize>()
    }

    /// Category id for `name`, if declared.
    pub fn term_id(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Names declared more than once, each listed once in order of its
    /// first repeat.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.categories
            .iter()
            .filter(|c| self.ids.get(&c.name) != Some(&c.id))
            .map(|c| c.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// One header line per category, in declaration order, prefixed by `marker`.
    pub fn render_headers(&self, marker: char) -> String {
        let mut out = String::new();
        for category in &self.categories {
            out.push(marker);
            out.push_str(&category.name);
            out.push('\n');
        }
        out
    }

    /// The category listing in the vocabulary's own header syntax: `%name`
    /// per category, word lines dropped.
    ///
    /// `mkfa` wants `#name` headers instead; the external toolkit writes those
    /// with [`Vocabulary::render_headers`].
    pub fn render_category_listing(&self) -> String {
        self.render_headers(CATEGORY_MARKER)
    }

    /// The term table: `id<TAB>name` per category.
    pub fn render_term_table(&self) -> String {
        let mut out = String::new();
        for category in &self.categories {
            out.push_str(&format!("{}\t{}\n", category.id, category.name));
        }
        out
    }
}

/// Read category names back from `.term` text, indexed by id.
///
/// Ids must be dense from zero, in any line order.
pub fn parse_term_table(text: &str) -> Result<Vec<String>, DictError> {
    let mut slots: Vec<Option<String>> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = |reason: String| DictError::Malformed {
            line: idx + 1,
            reason,
        };
        let (id, name) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| malformed("expected id and category name".to_string()))?;
        let id: usize = id
            .parse()
            .map_err(|_| malformed(format!("invalid category id \"{id}\"")))?;
        if id > text.len() {
            return Err(malformed(format!("category id {id} out of range")));
        }
        if slots.len() <= id {
            slots.resize(id + 1, None);
        }
        if slots[id].replace(name.trim().to_string()).is_some() {
            return Err(malformed(format!("category id {id} listed twice")));
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(id, name)| {
            name.ok_or_else(|| DictError::Malformed {
                line: 0,
                reason: format!("category id {id} missing"),
            })
        })
        .collect()
}
