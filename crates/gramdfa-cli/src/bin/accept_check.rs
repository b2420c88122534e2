// accept-check: Check sentences against a compiled grammar.
//
// Reads PREFIX.dfa, PREFIX.dict and (if present) PREFIX.term, then checks
// one sentence per line from stdin, printing the words, their categories
// and the verdict.
//
// Usage:
//   accept-check [-t] [-s WORD] PREFIX

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;
use gramdfa::check::{DEFAULT_PAUSE_WORD, Token};
use gramdfa::{InputMode, OutputPaths, SentenceChecker};

#[derive(Parser, Debug)]
#[command(name = "accept-check", version)]
#[command(about = "Accept or reject sentences read from stdin")]
struct Args {
    /// Compiled grammar prefix (PREFIX.dfa, PREFIX.dict, PREFIX.term)
    prefix: PathBuf,

    /// Read category names instead of words
    #[arg(short = 't', long)]
    categories: bool,

    /// Output string of the skippable short-pause word
    #[arg(short = 's', long, default_value = DEFAULT_PAUSE_WORD)]
    pause_word: String,

    /// Debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    gramdfa_cli::init_tracing(args.verbose, true);

    let paths = OutputPaths::for_prefix(&args.prefix);
    let checker = SentenceChecker::load(&paths, &args.pause_word)
        .unwrap_or_else(|e| gramdfa_cli::fatal(&e.to_string()));
    let mode = if args.categories {
        InputMode::Categories
    } else {
        InputMode::Words
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run(&checker, mode, &mut out);
    if let Err(e) = result {
        gramdfa_cli::fatal(&format!("failed to write stdout: {e}"));
    }
}

fn run(checker: &SentenceChecker, mode: InputMode, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{} categories, {} words",
        checker.category_count(),
        checker.word_count()
    )?;
    writeln!(
        out,
        "DFA has {} nodes and {} arcs",
        checker.dfa().state_count(),
        checker.dfa().arc_count()
    )?;
    writeln!(out, "-----")?;

    let interactive = io::stdin().is_terminal();
    let prompt = match mode {
        InputMode::Words => "please input word sequence>",
        InputMode::Categories => "please input category sequence>",
    };
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            eprint!("{prompt}");
        }
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match checker.tokenize(&line, mode) {
            Ok(tokens) => {
                print_tokens(checker, &tokens, out)?;
                match checker.accept(&tokens) {
                    Ok(()) => writeln!(out, "accepted")?,
                    Err(rejection) => writeln!(out, "{rejection}")?,
                }
            }
            Err(rejection) => writeln!(out, "{rejection}")?,
        }
        out.flush()?;
    }
}

/// `wseq:` and `cate:` lines; ambiguous words show `(A|B)`.
fn print_tokens(checker: &SentenceChecker, tokens: &[Token], out: &mut impl Write) -> io::Result<()> {
    let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    writeln!(out, "wseq: {}", words.join(" "))?;
    let cates: Vec<String> = tokens
        .iter()
        .map(|t| {
            let names: Vec<String> = t.categories.iter().map(|&c| checker.category_name(c)).collect();
            if names.len() > 1 {
                format!("({})", names.join("|"))
            } else {
                names.join("")
            }
        })
        .collect();
    writeln!(out, "cate: {}", cates.join(" "))
}
