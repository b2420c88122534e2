// Module: Compile pipeline.
//
// Stages run strictly in sequence: reverse the grammar, project the
// vocabulary, build the reverse DFA, synthesize the forward DFA, project the
// dictionary. Outputs are staged and committed together at the end.

use std::path::{Path, PathBuf};

use gramdfa_core::dictionary::{project_dictionary, render_dictionary};
use gramdfa_core::grammar::Grammar;
use gramdfa_core::vocabulary::Vocabulary;
use gramdfa_fa::Dfa;
use gramdfa_fa::format::{DfaRecord, render_records};
use gramdfa_fa::forward::forward_nfa_records;

use crate::CompileError;
use crate::config::CompileConfig;
use crate::output::OutputSet;
use crate::toolkit::Toolkit;

/// Size of a produced automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfaStats {
    pub states: usize,
    pub arcs: usize,
}

impl DfaStats {
    fn of(dfa: &Dfa) -> Self {
        Self {
            states: dfa.state_count(),
            arcs: dfa.arc_count(),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct Report {
    pub rules: usize,
    pub categories: usize,
    pub words: usize,
    pub reverse: DfaStats,
    pub forward: Option<DfaStats>,
    pub dictionary_entries: Option<usize>,
    /// Files written, in the order they were produced.
    pub generated: Vec<PathBuf>,
}

pub struct Compiler<T> {
    config: CompileConfig,
    toolkit: T,
}

impl<T: Toolkit> Compiler<T> {
    pub fn new(config: CompileConfig, toolkit: T) -> Self {
        Self { config, toolkit }
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Run every stage. Nothing is written unless all stages succeed.
    pub fn run(&self) -> Result<Report, CompileError> {
        let paths = self.config.paths();
        let grammar_text = read_input(&paths.grammar)?;
        let voca_text = read_input(&paths.voca)?;

        let reverse = Grammar::parse(&grammar_text).reversed();
        tracing::info!("{} has {} rules", paths.grammar.display(), reverse.rule_count());

        let vocabulary = Vocabulary::parse(&voca_text);
        for name in vocabulary.duplicate_names() {
            tracing::warn!("category \"{name}\" is declared more than once");
        }
        tracing::info!(
            "{} has {} categories and {} words",
            paths.voca.display(),
            vocabulary.category_count(),
            vocabulary.word_count()
        );

        let mut outputs = OutputSet::new();

        tracing::debug!("building reverse DFA with the {} toolkit", self.toolkit.name());
        let reverse_dfa = self.toolkit.build(&reverse, &vocabulary)?;
        let reverse_records = reverse_dfa.to_records();
        log_counts(&reverse_dfa, "reverse DFA");
        outputs.stage(&paths.dfa, &render_records(&reverse_records))?;
        outputs.stage(&paths.term, &vocabulary.render_term_table())?;

        let forward = if self.config.skip_forward {
            None
        } else {
            let forward_dfa = self.make_forward(&reverse_records)?;
            log_counts(&forward_dfa, "forward DFA");
            outputs.stage(&paths.forward, &render_records(&forward_dfa.to_records()))?;
            Some(DfaStats::of(&forward_dfa))
        };

        let dictionary_entries = if self.config.skip_dict {
            None
        } else {
            let entries = project_dictionary(&vocabulary, self.config.dict_policy)?;
            outputs.stage(&paths.dict, &render_dictionary(&entries))?;
            Some(entries.len())
        };

        let generated = outputs.commit()?;
        tracing::info!("generated {}", display_list(&generated));

        Ok(Report {
            rules: reverse.rule_count(),
            categories: vocabulary.category_count(),
            words: vocabulary.word_count(),
            reverse: DfaStats::of(&reverse_dfa),
            forward,
            dictionary_entries,
            generated,
        })
    }

    /// Forward DFA from the records of the reverse DFA.
    pub fn make_forward(&self, reverse: &[DfaRecord]) -> Result<Dfa, CompileError> {
        let nfa = forward_nfa_records(reverse)?;
        let dfa = self.toolkit.determinize(&nfa)?;
        self.toolkit.minimize(&dfa)
    }
}

fn read_input(path: &Path) -> Result<String, CompileError> {
    std::fs::read_to_string(path).map_err(|e| CompileError::io(path, e))
}

fn log_counts(dfa: &Dfa, what: &str) {
    tracing::debug!(
        "{what}: {} categories, {} nodes, {} arcs",
        dfa.category_count(),
        dfa.state_count(),
        dfa.arc_count()
    );
}

fn display_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::NativeToolkit;

    fn write_inputs(dir: &Path, grammar: &str, voca: &str) -> CompileConfig {
        let prefix = dir.join("g");
        std::fs::write(dir.join("g.grammar"), grammar).unwrap();
        std::fs::write(dir.join("g.voca"), voca).unwrap();
        CompileConfig::new(prefix)
    }

    #[test]
    fn generated_files_follow_stage_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_inputs(dir.path(), "S : A B\n", "%A\na a\n%B\nb b\n");
        let paths = config.paths();
        let report = Compiler::new(config, NativeToolkit).run().unwrap();
        assert_eq!(
            report.generated,
            vec![paths.dfa, paths.term, paths.forward, paths.dict]
        );
        assert_eq!(report.rules, 1);
        assert_eq!((report.categories, report.words), (2, 2));
        assert_eq!(report.dictionary_entries, Some(2));
    }

    #[test]
    fn skip_flags_leave_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_inputs(dir.path(), "S : A\n", "%A\na a\n");
        config.skip_dict = true;
        config.skip_forward = true;
        let paths = config.paths();
        std::fs::write(&paths.dict, "kept").unwrap();

        let report = Compiler::new(config, NativeToolkit).run().unwrap();
        assert_eq!(report.generated, vec![paths.dfa, paths.term]);
        assert!(report.forward.is_none());
        assert!(!paths.forward.exists());
        assert_eq!(std::fs::read_to_string(&paths.dict).unwrap(), "kept");
    }

    #[test]
    fn missing_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CompileConfig::new(dir.path().join("absent"));
        let expected = config.paths().grammar;
        let err = Compiler::new(config, NativeToolkit).run().unwrap_err();
        assert!(matches!(err, CompileError::Io { ref path, .. } if *path == expected));
    }

    #[test]
    fn make_forward_reverses_language() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = Compiler::new(CompileConfig::new(dir.path().join("g")), NativeToolkit);
        let reverse = gramdfa_fa::format::parse_records("0 1 1 0 0\n1 0 2 0 0\n2 -1 -1 1 0\n")
            .unwrap();
        let forward = compiler.make_forward(&reverse).unwrap();
        assert!(forward.accepts(&[0, 1]));
        assert!(!forward.accepts(&[1, 0]));
    }
}
