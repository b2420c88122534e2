// mkdfa: Compile a recognition grammar.
//
// Reads PREFIX.grammar and PREFIX.voca and writes PREFIX.dfa, PREFIX.term,
// PREFIX.dfa.forward and PREFIX.dict.
//
// Usage:
//   mkdfa [OPTIONS] PREFIX

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use gramdfa::{CompileConfig, Compiler, ExternalToolkit, NativeToolkit, ToolConfig};
use gramdfa_core::dictionary::DictionaryPolicy;

#[derive(Parser, Debug)]
#[command(name = "mkdfa", version)]
#[command(about = "Compile a .grammar/.voca pair into DFA, term and dictionary files")]
struct Args {
    /// Grammar file prefix (PREFIX.grammar, PREFIX.voca)
    prefix: PathBuf,

    /// Keep the current dictionary, do not generate PREFIX.dict
    #[arg(short = 'n', long)]
    no_dict: bool,

    /// Do not generate the forward DFA
    #[arg(short = 'r', long)]
    no_forward: bool,

    /// Use the built-in automaton tools instead of mkfa/dfa_minimize/dfa_determinize
    #[arg(long)]
    native: bool,

    /// Directory containing mkfa, dfa_minimize and dfa_determinize
    /// (default: the directory of this executable)
    #[arg(long, env = "GRAMDFA_TOOL_DIR")]
    tool_dir: Option<PathBuf>,

    /// Seconds each external tool may run
    #[arg(
        long,
        env = "GRAMDFA_TOOL_TIMEOUT",
        default_value_t = 600,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// Reject dictionary words outside any category or without pronunciation
    #[arg(long)]
    strict_dict: bool,

    /// Debug output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    gramdfa_cli::init_tracing(args.verbose, args.quiet);

    let mut config = CompileConfig::new(args.prefix);
    config.skip_dict = args.no_dict;
    config.skip_forward = args.no_forward;
    if args.strict_dict {
        config.dict_policy = DictionaryPolicy::Strict;
    }

    let result = if args.native {
        Compiler::new(config, NativeToolkit).run()
    } else {
        let tools = ToolConfig {
            tool_dir: args.tool_dir.unwrap_or_else(gramdfa_cli::default_tool_dir),
            timeout: Duration::from_secs(args.timeout),
        };
        tracing::debug!("looking for tools in {}", tools.tool_dir.display());
        ExternalToolkit::new(&tools).and_then(|toolkit| Compiler::new(config, toolkit).run())
    };

    if let Err(e) = result {
        gramdfa_cli::exit_with(&e);
    }
}
