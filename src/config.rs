use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the config file search when set.
pub const CONFIG_ENV: &str = "GLC_CONFIG";
const LOCAL_CONFIG: &str = "gitlab-cli.toml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub project_id: String,
    /// Request timeout; requests never time out when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            host: String::new(),
            api_version: default_api_version(),
            project_id: String::new(),
            timeout_secs: None,
        }
    }
}

fn default_api_version() -> String {
    "v4".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration value(s): {}. Searched: {searched}", .missing.join(", "))]
    Incomplete {
        missing: Vec<&'static str>,
        searched: String,
    },
}

impl Config {
    /// Config file locations, in the order they are tried.
    pub fn candidate_paths() -> Vec<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return vec![PathBuf::from(path)];
        }

        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("gitlab-cli").join("config.toml"));
        }
        paths
    }

    /// Load the first existing config file, then apply `GITLAB_*` environment
    /// overrides. Fails if token, host or project id end up empty.
    pub fn load() -> Result<Self> {
        let candidates = Self::candidate_paths();
        let mut config = match candidates.iter().find(|path| path.exists()) {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();

        let missing = config.missing_fields();
        if !missing.is_empty() {
            let searched = candidates
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ConfigError::Incomplete { missing, searched }.into());
        }

        tracing::debug!(host = %config.host, project = %config.project_id, "configuration loaded");
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(token) = lookup("GITLAB_TOKEN") {
            self.access_token = token;
        }
        if let Some(host) = lookup("GITLAB_HOST") {
            self.host = host;
        }
        if let Some(version) = lookup("GITLAB_API_VERSION") {
            self.api_version = version;
        }
        if let Some(project) = lookup("GITLAB_PROJECT_ID") {
            self.project_id = project;
        }
    }

    fn normalize(&mut self) {
        let host = self.host.trim().trim_end_matches('/');
        // Add https:// if no protocol is specified
        self.host = if host.is_empty() || host.starts_with("http://") || host.starts_with("https://")
        {
            host.to_string()
        } else {
            format!("https://{host}")
        };
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("access-token", &self.access_token),
            ("host", &self.host),
            ("api-version", &self.api_version),
            ("project-id", &self.project_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const ENV_KEYS: [&str; 4] = [
        "GITLAB_TOKEN",
        "GITLAB_HOST",
        "GITLAB_API_VERSION",
        "GITLAB_PROJECT_ID",
    ];

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    /// Runs `f` with `GLC_CONFIG` pointing at `path` and the given GITLAB_* vars.
    fn with_env<R>(path: &Path, vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let mut env: Vec<(&str, Option<String>)> = ENV_KEYS
            .iter()
            .map(|key| {
                let value = vars
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| value.to_string());
                (*key, value)
            })
            .collect();
        env.push((CONFIG_ENV, Some(path.display().to_string())));
        temp_env::with_vars(env, f)
    }

    #[test]
    fn load_reads_kebab_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
access-token = "secret"
host = "gitlab.example.com/"
api-version = "v4"
project-id = "group/app"
timeout-secs = 30
"#,
        );

        let config = with_env(&path, &[], Config::load).unwrap();

        assert_eq!(
            config,
            Config {
                access_token: "secret".to_string(),
                host: "https://gitlab.example.com".to_string(),
                api_version: "v4".to_string(),
                project_id: "group/app".to_string(),
                timeout_secs: Some(30),
            }
        );
    }

    #[test]
    fn api_version_defaults_to_v4() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "access-token = \"t\"\nhost = \"https://h\"\nproject-id = \"1\"\n",
        );

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.api_version, "v4");
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "access-token = \"file\"\nhost = \"https://file\"\nproject-id = \"1\"\n",
        );

        let config = with_env(
            &path,
            &[("GITLAB_TOKEN", "env-token"), ("GITLAB_PROJECT_ID", "99")],
            Config::load,
        )
        .unwrap();

        assert_eq!(config.access_token, "env-token");
        assert_eq!(config.project_id, "99");
        assert_eq!(config.host, "https://file");
    }

    #[test]
    fn environment_alone_is_enough() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");

        let config = with_env(
            &missing,
            &[
                ("GITLAB_TOKEN", "t"),
                ("GITLAB_HOST", "http://localhost:8080"),
                ("GITLAB_PROJECT_ID", "5"),
            ],
            Config::load,
        )
        .unwrap();

        assert_eq!(config.host, "http://localhost:8080");
        assert_eq!(config.api_version, "v4");
    }

    #[test]
    fn incomplete_configuration_lists_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "host = \"https://h\"\n");

        let err = with_env(&path, &[], Config::load).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("access-token, project-id"), "{message}");
        assert!(message.contains(&path.display().to_string()), "{message}");
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "host = [unterminated");

        let err = Config::load_from(&path).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Parse { .. })
        ));
    }

    #[rstest]
    #[case::bare("gitlab.com", "https://gitlab.com")]
    #[case::http("http://gitlab.local/", "http://gitlab.local")]
    #[case::https("https://gitlab.com", "https://gitlab.com")]
    #[case::empty("", "")]
    fn normalize_host(#[case] host: &str, #[case] expected: &str) {
        let mut config = Config {
            host: host.to_string(),
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.host, expected);
    }

    #[test]
    fn candidate_paths_honour_override() {
        temp_env::with_var(CONFIG_ENV, Some("/tmp/custom.toml"), || {
            assert_eq!(
                Config::candidate_paths(),
                vec![PathBuf::from("/tmp/custom.toml")]
            );
        });
    }
}
