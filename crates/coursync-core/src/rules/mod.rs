//! Rule-based classification of downloaded course files.
//!
//! Each course carries an ordered list of rules. A rule is a conjunction of
//! optional glob/regex predicates plus an action: `copy` duplicates the file
//! into the rule's destination, `rename` moves it there and leaves an empty
//! placeholder so the next download of the same archive can tell "new file"
//! from "already filed away".

mod engine;
mod matcher;
mod rule;

pub use engine::{classify_and_act, ClassifyReport};
pub use matcher::rule_matches;
pub use rule::{ClassificationRule, Method, RulePatterns};
