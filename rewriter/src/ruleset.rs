//! Named rule sets built from configuration.

use std::fmt;

use anyhow::{Result, anyhow};

use crate::core::cmake_links::LinkLibraryMerge;
use crate::core::cmake_version::CmakeMinimumVersion;
use crate::core::filter::FileFilter;
use crate::core::license::LicenseHeader;
use crate::core::platform::{PlatformSettings, PlatformSupport};
use crate::core::redact::SensitiveMacros;
use crate::core::rule::Rule;
use crate::io::config::RewriterConfig;

const CMAKE_LISTS: &str = "CMakeLists.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetKind {
    License,
    Redact,
    CmakeVersion,
    CmakeLinks,
    Platform,
    /// Version bump followed by link merge.
    Cmake,
}

impl RuleSetKind {
    pub fn name(self) -> &'static str {
        match self {
            RuleSetKind::License => "license",
            RuleSetKind::Redact => "redact",
            RuleSetKind::CmakeVersion => "cmake-version",
            RuleSetKind::CmakeLinks => "cmake-links",
            RuleSetKind::Platform => "platform",
            RuleSetKind::Cmake => "cmake",
        }
    }
}

impl fmt::Display for RuleSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A file filter plus the rules applied, in order, to every file it selects.
pub struct RuleSet {
    pub name: &'static str,
    pub filter: FileFilter,
    pub rules: Vec<Box<dyn Rule>>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<&str> = self.rules.iter().map(|rule| rule.name()).collect();
        f.debug_struct("RuleSet")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .field("rules", &rules)
            .finish()
    }
}

pub fn build(kind: RuleSetKind, cfg: &RewriterConfig) -> Result<RuleSet> {
    let cmake_lists = || FileFilter::FileName(CMAKE_LISTS.to_string());
    let (filter, rules): (FileFilter, Vec<Box<dyn Rule>>) = match kind {
        RuleSetKind::License => (
            FileFilter::Suffixes(cfg.license.suffixes.clone()),
            vec![Box::new(LicenseHeader::new(
                cfg.license.marker.clone(),
                cfg.license.header.clone(),
            ))],
        ),
        RuleSetKind::Redact => (
            FileFilter::Suffixes(cfg.redact.suffixes.clone()),
            vec![Box::new(SensitiveMacros::new(
                cfg.redact.macros.iter().cloned(),
                cfg.redact.sentinel.clone(),
                cfg.redact.include_commented,
            ))],
        ),
        RuleSetKind::CmakeVersion => (cmake_lists(), vec![version_rule(cfg)?]),
        RuleSetKind::CmakeLinks => (
            cmake_lists(),
            vec![Box::new(LinkLibraryMerge::new(&cfg.cmake.link_var))],
        ),
        RuleSetKind::Platform => (
            cmake_lists(),
            vec![Box::new(PlatformSupport::new(PlatformSettings {
                marker: cfg.platform.marker.clone(),
                homebrew_include: cfg.platform.homebrew_include.clone(),
                libs_var: cfg.platform.libs_var.clone(),
                windows_libs: cfg.platform.windows_libs.clone(),
            }))],
        ),
        RuleSetKind::Cmake => (
            cmake_lists(),
            vec![
                version_rule(cfg)?,
                Box::new(LinkLibraryMerge::new(&cfg.cmake.link_var)),
            ],
        ),
    };
    Ok(RuleSet {
        name: kind.name(),
        filter,
        rules,
    })
}

fn version_rule(cfg: &RewriterConfig) -> Result<Box<dyn Rule>> {
    let rule = CmakeMinimumVersion::new(&cfg.cmake.target_version).ok_or_else(|| {
        anyhow!(
            "cmake.target_version {:?} is not a dotted version",
            cfg.cmake.target_version
        )
    })?;
    Ok(Box::new(rule))
}
