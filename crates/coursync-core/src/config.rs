//! Sync configuration: credentials, SSO endpoints, courses and their filing rules.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::http::TransportOptions;
use crate::rules::ClassificationRule;

/// Shibboleth entry point of the course server.
pub const DEFAULT_ENTRY_URL: &str = "https://www.moodle.tum.de/Shibboleth.sso/Login?providerId=https://tumidp.lrz.de/idp/shibboleth&target=https://www.moodle.tum.de/auth/shibboleth/index.php";
/// Identity provider the relative login path is resolved against.
pub const DEFAULT_IDP_BASE_URL: &str = "https://login.tum.de";

const TEMPLATE: &str = r#"# coursync configuration
username = ""
password = ""
# Every course gets a directory of its own below root.
root = ""

# [sso]
# entry_url = "https://www.moodle.tum.de/Shibboleth.sso/Login?..."
# idp_base_url = "https://login.tum.de"
# connect_timeout_secs = 30

# [[data]]
# courseId = 12345
# course = "Analysis"
# url = "https://www.moodle.tum.de/mod/folder/download_folder.php?id=12345"
#
# [[data.rules]]
# method = "rename"          # anything else copies
# file_pattern = "*.pdf"
# neg_regex_file_pattern = "(?i)solution"
# dest = "Filed/Analysis"    # relative to root
"#;

/// SSO endpoints (optional `[sso]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoConfig {
    /// URL whose first response redirects to the identity provider.
    #[serde(default = "default_entry_url")]
    pub entry_url: String,
    /// Base the provider-relative login path is joined to.
    #[serde(default = "default_idp_base_url")]
    pub idp_base_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_entry_url() -> String {
    DEFAULT_ENTRY_URL.to_string()
}

fn default_idp_base_url() -> String {
    DEFAULT_IDP_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for SsoConfig {
    fn default() -> Self {
        Self {
            entry_url: default_entry_url(),
            idp_base_url: default_idp_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl SsoConfig {
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..TransportOptions::default()
        }
    }
}

/// One course: where its archive comes from and how its files are filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTarget {
    #[serde(rename = "courseId", alias = "course_id", default)]
    pub course_id: u64,
    /// Directory name below the sync root.
    pub course: String,
    /// Archive download URL.
    pub url: String,
    #[serde(default)]
    pub rules: Vec<ClassificationRule>,
}

/// Whole configuration file.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub sso: SsoConfig,
    #[serde(rename = "data", alias = "courses", default)]
    pub courses: Vec<CourseTarget>,
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("root", &self.root)
            .field("sso", &self.sso)
            .field("courses", &self.courses)
            .finish()
    }
}

impl SyncConfig {
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(self.root.trim())
    }

    /// Checks preconditions before any network or filesystem work.
    ///
    /// Credentials are only required when archives are going to be fetched.
    /// Rules without a single predicate are rejected here instead of silently
    /// never matching.
    pub fn validate(&self, require_credentials: bool) -> Result<(), ConfigError> {
        if self.root.trim().is_empty() {
            return Err(ConfigError::Missing("root"));
        }
        if require_credentials {
            if self.username.trim().is_empty() {
                return Err(ConfigError::Missing("username"));
            }
            if self.password.trim().is_empty() {
                return Err(ConfigError::Missing("password"));
            }
        }

        let mut seen = HashSet::new();
        for course in &self.courses {
            if !seen.insert(course.course.as_str()) {
                return Err(ConfigError::DuplicateCourse(course.course.clone()));
            }
            if let Some(index) = course.rules.iter().position(|r| !r.is_active()) {
                return Err(ConfigError::InactiveRule {
                    course: course.course.clone(),
                    index,
                });
            }
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("coursync")?;
    xdg_dirs
        .place_config_file("config.toml")
        .map_err(|source| ConfigError::Read {
            path: xdg_dirs.get_config_home(),
            source,
        })
}

/// Load the default configuration, writing a template if none exists yet.
pub fn load_or_init() -> Result<SyncConfig, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Read {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, TEMPLATE).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::info!("created config template at {}", path.display());
        return Err(ConfigError::TemplateCreated(path));
    }
    load_from_path(&path)
}

/// Load configuration from `path`: JSON when the extension is `.json`,
/// TOML otherwise.
pub fn load_from_path(path: &Path) -> Result<SyncConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let cfg = if is_json {
        serde_json::from_str(&data)?
    } else {
        toml::from_str(&data)?
    };
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}
