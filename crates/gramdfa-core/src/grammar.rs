// Grammar rules: lenient line parsing and right-hand-side reversal.
//
// A rule line has the shape `Left : tok tok ...`. Parsing is lenient: lines
// that do not contain a separator are dropped, never reported as fatal. The
// failures are still collected so a caller can warn about them.

use crate::strip_comment;

/// Separator between the left-hand category and the right-hand tokens.
pub const RULE_SEPARATOR: char = ':';

/// Why a grammar line did not yield a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Empty after comment removal. Not a malformation.
    #[error("blank or comment-only line")]
    Blank,
    #[error("missing rule separator ':'")]
    NoSeparator,
}

/// A production rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Left-hand side exactly as written before the separator (untrimmed).
    pub left: String,
    /// Right-hand side tokens in written order.
    pub right: Vec<String>,
}

impl Rule {
    /// The left-hand category name with surrounding whitespace removed.
    pub fn head(&self) -> &str {
        self.left.trim()
    }

    /// The same rule with its right-hand token order reversed.
    pub fn reversed(&self) -> Rule {
        Rule {
            left: self.left.clone(),
            right: self.right.iter().rev().cloned().collect(),
        }
    }

    /// Render as `left:tok tok` (tokens joined by single spaces).
    pub fn render(&self) -> String {
        format!("{}{}{}", self.left, RULE_SEPARATOR, self.right.join(" "))
    }
}

/// Parse one grammar line.
///
/// The line is cut at the comment marker first, then split on the first
/// separator. The right side is tokenized on runs of whitespace.
pub fn parse_rule(line: &str) -> Result<Rule, RuleError> {
    let line = strip_comment(line);
    if line.trim().is_empty() {
        return Err(RuleError::Blank);
    }
    let (left, right) = line
        .split_once(RULE_SEPARATOR)
        .ok_or(RuleError::NoSeparator)?;
    Ok(Rule {
        left: left.to_string(),
        right: right.split_whitespace().map(str::to_string).collect(),
    })
}

/// A grammar line that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source text.
    pub line: usize,
    pub reason: RuleError,
}

/// An ordered list of rules parsed from grammar text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    skipped: Vec<SkippedLine>,
}

impl Grammar {
    /// Parse grammar text, keeping valid rules in input order.
    ///
    /// Malformed lines are recorded in [`Grammar::skipped`] and logged at
    /// `warn`; blank and comment-only lines are ignored without a record.
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();
        let mut skipped = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            match parse_rule(line) {
                Ok(rule) => rules.push(rule),
                Err(RuleError::Blank) => {}
                Err(reason) => {
                    tracing::warn!(line = idx + 1, "skipping grammar line: {reason}");
                    skipped.push(SkippedLine {
                        line: idx + 1,
                        reason,
                    });
                }
            }
        }
        Self { rules, skipped }
    }

    /// Build a grammar from already-parsed rules.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            skipped: Vec::new(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// The start symbol: the left-hand side of the first rule.
    pub fn start_symbol(&self) -> Option<&str> {
        self.rules.first().map(Rule::head)
    }

    /// Iterate over the rules whose head is `name`, in input order.
    pub fn rules_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |r| r.head() == name)
    }

    /// Whether `name` is the head of at least one rule.
    pub fn defines(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.head() == name)
    }

    /// The grammar with every right-hand side reversed.
    pub fn reversed(&self) -> Grammar {
        Grammar {
            rules: self.rules.iter().map(Rule::reversed).collect(),
            skipped: self.skipped.clone(),
        }
    }

    /// Render one rule per line, each terminated by a newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            out.push_str(&rule.render());
            out.push('\n');
        }
        out
    }
}

/// Reverse every rule of grammar text.
///
/// Returns the rendered reverse grammar and the number of rules reversed.
pub fn reverse_grammar(text: &str) -> (String, usize) {
    let reversed = Grammar::parse(text).reversed();
    (reversed.render(), reversed.rule_count())
}
