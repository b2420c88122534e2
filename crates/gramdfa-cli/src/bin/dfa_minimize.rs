// dfa-minimize: Minimize a DFA file.
//
// Usage:
//   dfa-minimize [IN] [-o OUT]
//
// Reads stdin and writes stdout when IN/OUT are omitted. Sizes before and
// after go to stderr.

use std::path::PathBuf;

use clap::Parser;
use gramdfa_fa::minimize::minimize;

#[derive(Parser, Debug)]
#[command(name = "dfa-minimize", version, about = "Minimize a .dfa file")]
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

    let dfa = gramdfa_cli::read_dfa(args.input.as_deref())
        .unwrap_or_else(|e| gramdfa_cli::fatal(&e));
    eprintln!("{}", gramdfa_cli::describe(&dfa));

    let min = minimize(&dfa).unwrap_or_else(|e| gramdfa_cli::fatal(&e.to_string()));
    eprintln!(
        " -> minimized: {} nodes, {} arcs",
        min.state_count(),
        min.arc_count()
    );

    gramdfa_cli::write_dfa(args.output.as_deref(), &min)
        .unwrap_or_else(|e| gramdfa_cli::fatal(&e));
}
