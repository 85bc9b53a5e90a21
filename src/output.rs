//! Result extractors and output formatters (human, JSON and JSONL)

pub mod extract;
pub mod report;
pub mod rule_list;

pub use extract::{ErrorReport, ROOT_KEY, ValueReport, collect_errors, collect_values};
pub use report::{HumanFormatter, JsonFormatter, Report};
pub use rule_list::{RuleListHumanFormatter, RuleListJsonlFormatter, RuleListing, RuleSource};
