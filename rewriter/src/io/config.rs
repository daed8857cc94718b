//! Rewriter configuration (`.rewriter.toml`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::cmake_version::CmakeVersion;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".rewriter.toml";

const C_SOURCE_SUFFIXES: [&str; 5] = [".h", ".c", ".cpp", ".cc", ".hpp"];

const DEFAULT_LICENSE_MARKER: &str = "Copyright (2025) Beijing Volcano Engine";

const DEFAULT_LICENSE_HEADER: &str = "\
// Copyright (2025) Beijing Volcano Engine Technology Ltd.
//
// Licensed under the Apache License, Version 2.0 (the \"License\");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an \"AS IS\" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

";

const DEFAULT_SENSITIVE_MACROS: [&str; 8] = [
    "SAMPLE_INSTANCE_ID",
    "SAMPLE_MQTT_HOST",
    "SAMPLE_DEVICE_NAME",
    "SAMPLE_DEVICE_SECRET",
    "SAMPLE_PRODUCT_KEY",
    "SAMPLE_PRODUCT_SECRET",
    "CONFIG_WIFI_SSID",
    "CONFIG_WIFI_PASSWORD",
];

/// Rewriter configuration (TOML).
///
/// Every section is optional; missing fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RewriterConfig {
    /// Appended to a file's path to name its backup.
    pub backup_suffix: String,

    /// Appended to a file's path to name the commit temp file.
    pub temp_suffix: String,

    pub license: LicenseConfig,
    pub redact: RedactConfig,
    pub cmake: CmakeConfig,
    pub platform: PlatformConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LicenseConfig {
    /// Substring whose presence means the header is already there.
    pub marker: String,
    pub header: String,
    pub suffixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RedactConfig {
    pub macros: Vec<String>,
    pub sentinel: String,
    /// Also redact `// #define` lines.
    pub include_commented: bool,
    pub suffixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CmakeConfig {
    /// Minimum version written into `cmake_minimum_required`.
    pub target_version: String,
    /// Variable whose stray `${VAR})` continuation lines get merged.
    pub link_var: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlatformConfig {
    pub marker: String,
    pub homebrew_include: String,
    pub libs_var: String,
    pub windows_libs: Vec<String>,
}

fn strings<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            backup_suffix: ".bak".to_string(),
            temp_suffix: ".rewrite.tmp".to_string(),
            license: LicenseConfig::default(),
            redact: RedactConfig::default(),
            cmake: CmakeConfig::default(),
            platform: PlatformConfig::default(),
        }
    }
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_LICENSE_MARKER.to_string(),
            header: DEFAULT_LICENSE_HEADER.to_string(),
            suffixes: strings(C_SOURCE_SUFFIXES),
        }
    }
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            macros: strings(DEFAULT_SENSITIVE_MACROS),
            sentinel: "***".to_string(),
            include_commented: true,
            suffixes: strings(C_SOURCE_SUFFIXES),
        }
    }
}

impl Default for CmakeConfig {
    fn default() -> Self {
        Self {
            target_version: "3.10".to_string(),
            link_var: "PLATFORM_LIBS".to_string(),
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            marker: "BUILD_PLATFORM".to_string(),
            homebrew_include: "include_directories(\"/opt/homebrew/include\") # openssl"
                .to_string(),
            libs_var: "PLATFORM_LIBS".to_string(),
            windows_libs: strings(["ws2_32", "crypt32", "iphlpapi"]),
        }
    }
}

impl RewriterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.backup_suffix.is_empty() {
            return Err(anyhow!("backup_suffix must be non-empty"));
        }
        if self.temp_suffix.is_empty() {
            return Err(anyhow!("temp_suffix must be non-empty"));
        }
        if self.backup_suffix == self.temp_suffix {
            return Err(anyhow!("backup_suffix and temp_suffix must differ"));
        }
        if self.license.marker.trim().is_empty() {
            return Err(anyhow!("license.marker must be non-empty"));
        }
        if !self.license.header.contains(&self.license.marker) {
            return Err(anyhow!("license.header must contain license.marker"));
        }
        validate_suffixes("license.suffixes", &self.license.suffixes)?;
        if self.redact.sentinel.is_empty() || self.redact.sentinel.contains('"') {
            return Err(anyhow!("redact.sentinel must be non-empty and contain no quotes"));
        }
        validate_suffixes("redact.suffixes", &self.redact.suffixes)?;
        if CmakeVersion::parse(&self.cmake.target_version).is_none() {
            return Err(anyhow!(
                "cmake.target_version {:?} is not a dotted version",
                self.cmake.target_version
            ));
        }
        validate_identifier("cmake.link_var", &self.cmake.link_var)?;
        validate_identifier("platform.marker", &self.platform.marker)?;
        validate_identifier("platform.libs_var", &self.platform.libs_var)?;
        Ok(())
    }
}

fn validate_suffixes(field: &str, suffixes: &[String]) -> Result<()> {
    if suffixes.is_empty() || suffixes.iter().any(|suffix| suffix.trim().is_empty()) {
        return Err(anyhow!("{field} must be a non-empty array of non-empty suffixes"));
    }
    Ok(())
}

fn validate_identifier(field: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid_start = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !valid_start || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(anyhow!("{field} must be a CMake identifier, got {value:?}"));
    }
    Ok(())
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RewriterConfig::default()`.
pub fn load_config(path: &Path) -> Result<RewriterConfig> {
    if !path.exists() {
        let cfg = RewriterConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RewriterConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &RewriterConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
