// dfa-determinize: Determinize an NFA given in .dfa format.
//
// Usage:
//   dfa-determinize [IN] [-o OUT]
//
// Reads stdin and writes stdout when IN/OUT are omitted.

use std::path::PathBuf;

use clap::Parser;
use gramdfa_fa::determinize::determinize;

#[derive(Parser, Debug)]
#[command(name = "dfa-determinize", version, about = "Determinize a .dfa file")]
struct Args {
    /// Input .dfa file (default: stdin)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    gramdfa_cli::init_tracing(false, true);

    let nfa = gramdfa_cli::read_dfa(args.input.as_deref())
        .unwrap_or_else(|e| gramdfa_cli::fatal(&e));
    eprintln!("{}", gramdfa_cli::describe(&nfa));

    let dfa = determinize(&nfa).unwrap_or_else(|e| gramdfa_cli::fatal(&e.to_string()));
    eprintln!(
        " -> determinized: {} nodes, {} arcs",
        dfa.state_count(),
        dfa.arc_count()
    );

    gramdfa_cli::write_dfa(args.output.as_deref(), &dfa)
        .unwrap_or_else(|e| gramdfa_cli::fatal(&e));
}
