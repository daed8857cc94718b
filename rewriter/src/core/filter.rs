//! Candidate file selection by name.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Which files a rule set is interested in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFilter {
    /// File name ends with one of these suffixes (e.g. `.h`).
    Suffixes(Vec<String>),
    /// File name equals this exactly (e.g. `CMakeLists.txt`).
    FileName(String),
}

impl FileFilter {
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        match self {
            FileFilter::Suffixes(suffixes) => suffixes
                .iter()
                .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix.as_str())),
            FileFilter::FileName(expected) => name == expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_sources() -> FileFilter {
        FileFilter::Suffixes(vec![".h".into(), ".c".into(), ".cpp".into()])
    }

    #[test]
    fn suffix_filter_matches_file_names() {
        let filter = c_sources();
        assert!(filter.matches(Path::new("src/a.h")));
        assert!(filter.matches(Path::new("b.cpp")));
        assert!(!filter.matches(Path::new("b.hpp")));
        assert!(!filter.matches(Path::new("a.h.bak")));
        assert!(!filter.matches(Path::new(".h")));
    }

    #[test]
    fn name_filter_requires_exact_match() {
        let filter = FileFilter::FileName("CMakeLists.txt".into());
        assert!(filter.matches(Path::new("examples/chat/CMakeLists.txt")));
        assert!(!filter.matches(Path::new("CMakeLists.txt.bak")));
        assert!(!filter.matches(Path::new("cmakelists.txt")));
    }
}
