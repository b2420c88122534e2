//! End-to-end compile runs with the in-process toolkit.
//!
//! Each test writes a `.grammar`/`.voca` pair into a scratch directory,
//! runs the full pipeline and inspects the files it leaves behind.

use std::path::Path;

use gramdfa::{CompileConfig, CompileError, Compiler, ExternalToolkit, NativeToolkit, ToolConfig};
use gramdfa_core::dictionary::{DictError, DictionaryPolicy};
use gramdfa_fa::format::parse_records;
use gramdfa_fa::{Dfa, FaError};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn setup(dir: &Path, grammar: &str, voca: &str) -> CompileConfig {
    std::fs::write(dir.join("test.grammar"), grammar).unwrap();
    std::fs::write(dir.join("test.voca"), voca).unwrap();
    CompileConfig::new(dir.join("test"))
}

fn load_dfa(path: &Path) -> Dfa {
    let text = std::fs::read_to_string(path).unwrap();
    Dfa::from_records(&parse_records(&text).unwrap()).unwrap()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

const FRUIT_GRAMMAR: &str = "\
# sentence: <sil> fruit [please] <sil>
S      : NS_B SENT NS_E
SENT   : FRUIT          # bare
SENT   : FRUIT PLEASE
";

const FRUIT_VOCA: &str = "\
% NS_B
<s>     sil
% NS_E
</s>    sil
% FRUIT
apple   a p u r u
banana  b a n a n a
% PLEASE
please  p u r i i z u
";

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn two_category_sentence_in_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), "S : A B\n", "%A\na a\n%B\nb b\n");
    let paths = config.paths();
    Compiler::new(config, NativeToolkit).run().unwrap();

    let reverse = load_dfa(&paths.dfa);
    assert!(reverse.accepts(&[1, 0]), "reverse DFA reads b a");
    assert!(!reverse.accepts(&[0, 1]), "reverse DFA rejects a b");

    let forward = load_dfa(&paths.forward);
    assert!(forward.is_deterministic());
    assert!(forward.accepts(&[0, 1]));
    assert!(!forward.accepts(&[1, 0]));

    assert_eq!(std::fs::read_to_string(&paths.term).unwrap(), "0\tA\n1\tB\n");
    assert_eq!(
        std::fs::read_to_string(&paths.dict).unwrap(),
        "0\t[a]\ta\n1\t[b]\tb\n"
    );
}

#[test]
fn reverse_dfa_file_has_reference_shape() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), "S : A B\n", "%A\na a\n%B\nb b\n");
    let paths = config.paths();
    Compiler::new(config, NativeToolkit).run().unwrap();
    assert_eq!(
        std::fs::read_to_string(&paths.dfa).unwrap(),
        "0 1 1 0 0\n1 0 2 0 0\n2 -1 -1 1 0\n"
    );
}

#[test]
fn comment_and_malformed_lines_yield_no_rules() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), "# comment only\nmalformed no colon\n", "%A\na a\n");
    let err = Compiler::new(config, NativeToolkit).run().unwrap_err();
    assert!(matches!(err, CompileError::Automaton(FaError::NoStartSymbol)));
    assert_eq!(file_names(dir.path()), vec!["test.grammar", "test.voca"]);
}

#[test]
fn category_without_words_gives_empty_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), "S : A\n", "%A\n");
    let paths = config.paths();
    let report = Compiler::new(config, NativeToolkit).run().unwrap();
    assert_eq!(std::fs::read_to_string(&paths.term).unwrap(), "0\tA\n");
    assert_eq!(std::fs::read_to_string(&paths.dict).unwrap(), "");
    assert_eq!(report.dictionary_entries, Some(0));
}

#[test]
fn missing_tools_abort_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    setup(dir.path(), "S : A\n", "%A\na a\n");
    let err = ExternalToolkit::new(&ToolConfig::new(tools.path())).unwrap_err();
    assert!(matches!(err, CompileError::MissingTools(ref p) if p.len() == 3));
    assert_eq!(file_names(dir.path()), vec!["test.grammar", "test.voca"]);
}

// ---------------------------------------------------------------------------
// Larger grammars and policies
// ---------------------------------------------------------------------------

#[test]
fn optional_word_grammar() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), FRUIT_GRAMMAR, FRUIT_VOCA);
    let paths = config.paths();
    let report = Compiler::new(config, NativeToolkit).run().unwrap();
    assert_eq!(report.rules, 3);
    assert_eq!((report.categories, report.words), (4, 5));

    let forward = load_dfa(&paths.forward);
    assert!(forward.accepts(&[0, 2, 1]));
    assert!(forward.accepts(&[0, 2, 3, 1]));
    assert!(!forward.accepts(&[0, 3, 1]));

    let reverse = load_dfa(&paths.dfa);
    assert!(reverse.accepts(&[1, 3, 2, 0]));
    assert!(!reverse.accepts(&[0, 2, 3, 1]));

    let dict = std::fs::read_to_string(&paths.dict).unwrap();
    assert_eq!(dict.lines().nth(2), Some("2\t[apple]\ta p u r u"));
}

#[test]
fn left_recursive_grammar_forward_matches_reverse() {
    let dir = tempfile::tempdir().unwrap();
    // Left recursion here is tail recursion in the reversed grammar.
    let grammar = "S : NS_B NUM NS_E\nNUM : DIGIT\nNUM : NUM DIGIT\n";
    let voca = "%NS_B\n%NS_E\n%DIGIT\none w a n\ntwo t u u\n";
    let config = setup(dir.path(), grammar, voca);
    let paths = config.paths();
    Compiler::new(config, NativeToolkit).run().unwrap();

    let reverse = load_dfa(&paths.dfa);
    let forward = load_dfa(&paths.forward);
    for digits in 1..5 {
        let mut sentence = vec![0];
        sentence.extend(std::iter::repeat_n(2, digits));
        sentence.push(1);
        assert!(forward.accepts(&sentence));
        let mut backwards = sentence.clone();
        backwards.reverse();
        assert!(reverse.accepts(&backwards));
    }
    assert!(!forward.accepts(&[0, 1]));
}

#[test]
fn strict_dictionary_rejects_orphan_words() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), "S : A\n", "stray s t\n%A\na a\n");
    config.dict_policy = DictionaryPolicy::Strict;
    let err = Compiler::new(config, NativeToolkit).run().unwrap_err();
    assert!(matches!(
        err,
        CompileError::Dictionary(DictError::EntryBeforeCategory { line: 1 })
    ));
    assert_eq!(file_names(dir.path()), vec!["test.grammar", "test.voca"]);
}

#[test]
fn legacy_dictionary_keeps_orphan_words() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), "S : A\n", "stray s t\n%A\na a\n");
    let paths = config.paths();
    Compiler::new(config, NativeToolkit).run().unwrap();
    assert_eq!(
        std::fs::read_to_string(&paths.dict).unwrap(),
        "-1\t[stray]\ts t\n0\t[a]\ta\n"
    );
}

#[test]
fn right_recursion_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = "S : NUM\nNUM : DIGIT\nNUM : DIGIT NUM\n";
    let config = setup(dir.path(), grammar, "%DIGIT\n");
    let err = Compiler::new(config, NativeToolkit).run().unwrap_err();
    assert!(matches!(err, CompileError::Automaton(FaError::NonRegular(ref s)) if s == "NUM"));
}

#[test]
fn undefined_category_aborts_without_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), "S : A B\n", "%A\na a\n");
    let err = Compiler::new(config, NativeToolkit).run().unwrap_err();
    assert!(matches!(err, CompileError::Automaton(FaError::UndefinedSymbol(ref s)) if s == "B"));
    assert_eq!(file_names(dir.path()), vec!["test.grammar", "test.voca"]);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A single-sentence grammar is accepted forward by `.dfa.forward` and
    /// backward by `.dfa`, and nothing shorter is.
    #[test]
    fn single_sentence_round_trips(sentence in prop::collection::vec(0u32..4, 1..6)) {
        let dir = tempfile::tempdir().unwrap();
        let tokens: Vec<String> = sentence.iter().map(|id| format!("C{id}")).collect();
        let grammar = format!("S : {}\n", tokens.join(" "));
        let config = setup(dir.path(), &grammar, "%C0\n%C1\n%C2\n%C3\n");
        let paths = config.paths();
        Compiler::new(config, NativeToolkit).run().unwrap();

        let forward = load_dfa(&paths.forward);
        let reverse = load_dfa(&paths.dfa);
        let mut backwards = sentence.clone();
        backwards.reverse();
        prop_assert!(forward.is_deterministic());
        prop_assert!(forward.accepts(&sentence));
        prop_assert!(reverse.accepts(&backwards));
        prop_assert!(!forward.accepts(&sentence[..sentence.len() - 1]));
        prop_assert_eq!(forward.state_count(), sentence.len() + 1);

        let term = std::fs::read_to_string(&paths.term).unwrap();
        prop_assert_eq!(term.lines().count(), 4);
    }
}
