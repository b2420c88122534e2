// Module: Sentence acceptance against compiled grammar files.
//
// Sentences are checked on the reverse DFA, reading words from last to first.
// A word may belong to several categories, so each position carries a set of
// candidate labels and the check tracks every live state at once. Categories
// containing the short-pause word are skippable: one of their transitions
// may be taken before any word without consuming it.

use std::fmt;
use std::path::Path;

use gramdfa_core::dictionary::{DictEntry, parse_dictionary};
use gramdfa_core::vocabulary::parse_term_table;
use gramdfa_fa::format::parse_records;
use gramdfa_fa::{Dfa, Label, StateId};

use crate::CompileError;
use crate::config::OutputPaths;

/// Output string of the default short-pause word.
pub const DEFAULT_PAUSE_WORD: &str = "sp";

/// How input tokens are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Tokens are dictionary words.
    #[default]
    Words,
    /// Tokens are category names, or ids when no term table is loaded.
    Categories,
}

/// One input token with the categories it can stand for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub categories: Vec<Label>,
}

/// Why a sentence was rejected. Positions are 1-based word indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnknownWord { position: usize, word: String },
    UnknownCategory { position: usize, name: String },
    EmptyCategory { position: usize, name: String },
    /// No transition matches the word at `position`.
    Dfa { position: usize },
    /// Every word was consumed but the sentence cannot end there.
    Incomplete,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnknownWord { position, word } => {
                write!(f, "rejected at {position}: word \"{word}\" not in voca")
            }
            Rejection::UnknownCategory { position, name } => {
                write!(f, "rejected at {position}: category \"{name}\" not exist")
            }
            Rejection::EmptyCategory { position, name } => {
                write!(f, "rejected at {position}: category \"{name}\" has no word")
            }
            Rejection::Dfa { position } => write!(f, "rejected at {position} by DFA"),
            Rejection::Incomplete => write!(f, "rejected: sentence is incomplete"),
        }
    }
}

/// A loaded grammar ready to check sentences.
#[derive(Debug, Clone)]
pub struct SentenceChecker {
    dfa: Dfa,
    words: Vec<DictEntry>,
    terms: Option<Vec<String>>,
    pauses: Vec<bool>,
}

impl SentenceChecker {
    /// `terms` may be `None` when no term table is available; categories are
    /// then shown and entered by id.
    pub fn new(
        dfa: Dfa,
        words: Vec<DictEntry>,
        terms: Option<Vec<String>>,
        pause_word: &str,
    ) -> Self {
        let count = words
            .iter()
            .filter_map(|w| w.category)
            .map(|c| c as usize + 1)
            .chain([dfa.category_count(), terms.as_ref().map_or(0, Vec::len)])
            .max()
            .unwrap_or(0);
        let mut pauses = vec![false; count];
        for word in words.iter().filter(|w| w.word == pause_word) {
            if let Some(c) = word.category {
                pauses[c as usize] = true;
            }
        }
        Self {
            dfa,
            words,
            terms,
            pauses,
        }
    }

    /// Load `.dfa`, `.dict` and, if present, `.term` for a compiled prefix.
    pub fn load(paths: &OutputPaths, pause_word: &str) -> Result<Self, CompileError> {
        let dfa = Dfa::from_records(&parse_records(&read(&paths.dfa)?)?)?;
        let words = parse_dictionary(&read(&paths.dict)?)?;
        let terms = if paths.term.exists() {
            Some(parse_term_table(&read(&paths.term)?)?)
        } else {
            tracing::warn!("{} not found, categories are shown by id", paths.term.display());
            None
        };
        Ok(Self::new(dfa, words, terms, pause_word))
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn category_count(&self) -> usize {
        self.pauses.len()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Display name of category `id`.
    pub fn category_name(&self, id: Label) -> String {
        self.terms
            .as_ref()
            .and_then(|t| t.get(id as usize))
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Categories whose transitions may be skipped before a word.
    pub fn pause_categories(&self) -> impl Iterator<Item = Label> + '_ {
        self.pauses
            .iter()
            .enumerate()
            .filter(|(_, p)| **p)
            .map(|(c, _)| c as Label)
    }

    fn has_words(&self, category: Label) -> bool {
        self.words.iter().any(|w| w.category == Some(category))
    }

    /// Resolve whitespace-separated tokens to candidate categories.
    pub fn tokenize(&self, line: &str, mode: InputMode) -> Result<Vec<Token>, Rejection> {
        let mut tokens = Vec::new();
        for (idx, text) in line.split_whitespace().enumerate() {
            let position = idx + 1;
            let categories = match mode {
                InputMode::Words => {
                    let cats: Vec<Label> = self
                        .words
                        .iter()
                        .filter(|w| w.word == text)
                        .filter_map(|w| w.category)
                        .collect();
                    if cats.is_empty() {
                        return Err(Rejection::UnknownWord {
                            position,
                            word: text.to_string(),
                        });
                    }
                    cats
                }
                InputMode::Categories => self.resolve_category(text, position)?,
            };
            tokens.push(Token {
                text: text.to_string(),
                categories,
            });
        }
        Ok(tokens)
    }

    fn resolve_category(&self, text: &str, position: usize) -> Result<Vec<Label>, Rejection> {
        let cats: Vec<Label> = match &self.terms {
            Some(terms) => terms
                .iter()
                .enumerate()
                .filter(|(_, name)| *name == text)
                .map(|(c, _)| c as Label)
                .collect(),
            None => text
                .parse::<Label>()
                .ok()
                .filter(|&c| (c as usize) < self.category_count())
                .into_iter()
                .collect(),
        };
        if cats.is_empty() {
            return Err(Rejection::UnknownCategory {
                position,
                name: text.to_string(),
            });
        }
        if let Some(&empty) = cats.iter().find(|&&c| !self.has_words(c)) {
            tracing::debug!("category {empty} has no words");
            return Err(Rejection::EmptyCategory {
                position,
                name: text.to_string(),
            });
        }
        Ok(cats)
    }

    /// Run `tokens` through the reverse DFA.
    pub fn accept(&self, tokens: &[Token]) -> Result<(), Rejection> {
        if self.dfa.state_count() == 0 {
            return Err(Rejection::Dfa {
                position: tokens.len(),
            });
        }
        let mut live = vec![false; self.dfa.state_count()];
        live[0] = true;
        for (idx, token) in tokens.iter().enumerate().rev() {
            let mut next = vec![false; live.len()];
            let mut any = false;
            for state in live_states(&live) {
                for to in self.step(state, &token.categories) {
                    next[to as usize] = true;
                    any = true;
                }
            }
            if !any {
                tracing::debug!("no transition for word {} \"{}\"", idx + 1, token.text);
                return Err(Rejection::Dfa { position: idx + 1 });
            }
            live = next;
        }
        if live_states(&live).any(|s| self.dfa.is_accepting(s)) {
            Ok(())
        } else {
            Err(Rejection::Incomplete)
        }
    }

    /// States reached from `state` on one of `labels`, directly or after one
    /// pause transition.
    fn step<'a>(&'a self, state: StateId, labels: &'a [Label]) -> impl Iterator<Item = StateId> + 'a {
        let arcs = &self.dfa.state(state).arcs;
        let direct = arcs
            .iter()
            .filter(move |a| labels.contains(&a.label))
            .map(|a| a.to);
        let skipped = arcs
            .iter()
            .filter(move |a| self.pauses.get(a.label as usize).copied().unwrap_or(false))
            .flat_map(move |pause| {
                self.dfa
                    .state(pause.to)
                    .arcs
                    .iter()
                    .filter(move |a| labels.contains(&a.label))
                    .map(|a| a.to)
            });
        direct.chain(skipped)
    }

    /// Tokenize and accept one input line.
    pub fn check(&self, line: &str, mode: InputMode) -> Result<Vec<Token>, Rejection> {
        let tokens = self.tokenize(line, mode)?;
        self.accept(&tokens)?;
        Ok(tokens)
    }
}

fn live_states(live: &[bool]) -> impl Iterator<Item = StateId> + '_ {
    live.iter()
        .enumerate()
        .filter(|(_, on)| **on)
        .map(|(s, _)| s as StateId)
}

fn read(path: &Path) -> Result<String, CompileError> {
    std::fs::read_to_string(path).map_err(|e| CompileError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramdfa_core::dictionary::{DictionaryPolicy, project_dictionary};
    use gramdfa_core::grammar::Grammar;
    use gramdfa_core::vocabulary::Vocabulary;

    use crate::toolkit::{NativeToolkit, Toolkit};

    const VOCA: &str = "\
%NS_B
<s> sil
%NS_E
</s> sil
%FRUIT
apple a p u r u
orange o r e n j i
%COLOR
orange o r e n j i
red r e d
%SP
sp sp
%EMPTY
";

    fn checker(grammar: &str) -> SentenceChecker {
        let voca = Vocabulary::parse(VOCA);
        let dfa = NativeToolkit
            .build(&Grammar::parse(grammar).reversed(), &voca)
            .unwrap();
        let words = project_dictionary(&voca, DictionaryPolicy::Legacy).unwrap();
        let terms = voca.categories().iter().map(|c| c.name.clone()).collect();
        SentenceChecker::new(dfa, words, Some(terms), DEFAULT_PAUSE_WORD)
    }

    const FRUIT: &str = "S : NS_B FRUIT NS_E\nS : NS_B COLOR FRUIT NS_E\n";

    #[test]
    fn accepts_sentences_in_reading_order() {
        let c = checker(FRUIT);
        assert!(c.check("<s> apple </s>", InputMode::Words).is_ok());
        assert!(c.check("<s> red apple </s>", InputMode::Words).is_ok());
        assert_eq!(
            c.check("<s> apple red </s>", InputMode::Words).unwrap_err(),
            Rejection::Dfa { position: 3 }
        );
    }

    #[test]
    fn ambiguous_word_tries_every_category() {
        let c = checker(FRUIT);
        let tokens = c.check("<s> orange orange </s>", InputMode::Words).unwrap();
        assert_eq!(tokens[1].categories, vec![2, 3]);
        assert_eq!(c.category_name(3), "COLOR");
    }

    #[test]
    fn truncated_sentence_is_incomplete() {
        let c = checker(FRUIT);
        assert_eq!(
            c.check("apple </s>", InputMode::Words).unwrap_err(),
            Rejection::Incomplete
        );
    }

    #[test]
    fn unknown_word_is_reported_with_position() {
        let c = checker(FRUIT);
        let err = c.check("<s> kiwi </s>", InputMode::Words).unwrap_err();
        assert_eq!(err.to_string(), "rejected at 2: word \"kiwi\" not in voca");
    }

    #[test]
    fn category_mode_uses_term_names() {
        let c = checker(FRUIT);
        assert!(c.check("NS_B COLOR FRUIT NS_E", InputMode::Categories).is_ok());
        assert_eq!(
            c.check("NS_B GREEN NS_E", InputMode::Categories).unwrap_err(),
            Rejection::UnknownCategory {
                position: 2,
                name: "GREEN".to_string()
            }
        );
        assert_eq!(
            c.check("NS_B EMPTY", InputMode::Categories).unwrap_err().to_string(),
            "rejected at 2: category \"EMPTY\" has no word"
        );
    }

    #[test]
    fn category_ids_without_term_table() {
        let voca = Vocabulary::parse(VOCA);
        let dfa = NativeToolkit
            .build(&Grammar::parse(FRUIT).reversed(), &voca)
            .unwrap();
        let words = project_dictionary(&voca, DictionaryPolicy::Legacy).unwrap();
        let c = SentenceChecker::new(dfa, words, None, DEFAULT_PAUSE_WORD);
        assert!(c.check("0 2 1", InputMode::Categories).is_ok());
        assert_eq!(c.category_name(2), "2");
        assert!(matches!(
            c.check("0 99 1", InputMode::Categories),
            Err(Rejection::UnknownCategory { position: 2, .. })
        ));
    }

    #[test]
    fn pause_category_may_be_skipped() {
        let c = checker("S : NS_B FRUIT SP NS_E\n");
        assert_eq!(c.pause_categories().collect::<Vec<_>>(), vec![4]);
        assert!(c.check("<s> apple sp </s>", InputMode::Words).is_ok());
        assert!(c.check("<s> apple </s>", InputMode::Words).is_ok());
    }

    #[test]
    fn empty_line_is_accepted_only_by_empty_sentence() {
        let c = checker(FRUIT);
        assert_eq!(c.check("", InputMode::Words).unwrap_err(), Rejection::Incomplete);
    }
}
