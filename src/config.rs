use std::path::Path;

use crate::error::Error;

/// Project configuration loaded from `.docsplice.toml` at the docs root.
pub struct Config {
    /// Component name stamped into every signature and publish URL.
    pub component: String,
    /// Depth at which nested include directives stop being resolved.
    pub max_include_depth: u32,
    /// Base URL prepended to publish paths for external references.
    pub site_url: String,
    /// Component version stamped into every signature and publish URL.
    pub version: String,
}

/// Raw TOML structure for `.docsplice.toml`.
#[derive(serde::Deserialize)]
struct DocspliceTomlConfig {
    #[serde(default = "default_component")]
    component: String,
    #[serde(default = "default_max_include_depth")]
    max_include_depth: u32,
    #[serde(default)]
    site_url: String,
    #[serde(default = "default_version")]
    version: String,
}

fn default_component() -> String {
    "docs".to_string()
}

fn default_max_include_depth() -> u32 {
    64
}

fn default_version() -> String {
    "main".to_string()
}

impl Config {
    /// Load config from `.docsplice.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if the
    /// file exists but is malformed — never silently falls back to
    /// defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".docsplice.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::defaults()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: DocspliceTomlConfig = toml::from_str(&content)?;
        Ok(Self {
            component: raw.component,
            max_include_depth: raw.max_include_depth,
            site_url: raw.site_url,
            version: raw.version,
        })
    }

    /// Configuration used when no config file is present.
    fn defaults() -> Self {
        Self {
            component: default_component(),
            max_include_depth: default_max_include_depth(),
            site_url: String::new(),
            version: default_version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(dir.path()).expect("load");
        assert_eq!(config.component, "docs");
        assert_eq!(config.version, "main");
        assert_eq!(config.max_include_depth, 64);
        assert_eq!(config.site_url, "");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(".docsplice.toml"),
            "component = \"handbook\"\nsite_url = \"https://docs.example.com\"\n",
        )
        .expect("write config");
        let config = Config::load(dir.path()).expect("load");
        assert_eq!(config.component, "handbook");
        assert_eq!(config.site_url, "https://docs.example.com");
        assert_eq!(config.version, "main");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(".docsplice.toml"), "component = [").expect("write config");
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }
}
