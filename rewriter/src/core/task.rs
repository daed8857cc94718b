//! One file's trip through the rule engine.

use std::path::PathBuf;

use crate::core::encoding::{self, EncodeError, TextEncoding};
use crate::core::engine::apply_rules;
use crate::core::rule::Rule;
use crate::core::types::RuleReport;

/// A discovered file, its original bytes and (after [`FileTask::apply`]) the
/// transformed text.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub path: PathBuf,
    pub original: Vec<u8>,
    pub encoding: TextEncoding,
    pub transformed: String,
    pub changed: bool,
    pub already_applied: bool,
    pub reports: Vec<RuleReport>,
}

impl FileTask {
    pub fn new(path: PathBuf, original: Vec<u8>) -> Self {
        let (text, encoding) = encoding::decode(&original);
        Self {
            path,
            original,
            encoding,
            transformed: text,
            changed: false,
            already_applied: false,
            reports: Vec::new(),
        }
    }

    /// Run `rules` over the decoded text. The decoded text is the baseline for
    /// `changed`, so calling this twice does not compound.
    pub fn apply(&mut self, rules: &[Box<dyn Rule>]) {
        let (baseline, _) = encoding::decode(&self.original);
        let output = apply_rules(rules, &baseline);
        self.already_applied = output.any_already_applied();
        self.changed = output.changed;
        self.reports = output.reports;
        self.transformed = output.content;
    }

    /// Transformed text in the file's original encoding.
    pub fn encoded(&self) -> Result<Vec<u8>, EncodeError> {
        encoding::encode(&self.transformed, self.encoding)
    }
}
