use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration, loaded from a TOML file.
///
/// ```toml
/// [storage]
/// data_dir = "/var/lib/stitchline"
///
/// [jwt]
/// secret = "..."
/// expire_secs = 86400
///
/// [root]
/// password_hash = "$argon2id$..."
///
/// [[factories]]
/// id = "dhaka-1"
/// name = "Dhaka Unit 1"
///
/// [ai]
/// endpoint = "http://127.0.0.1:8095/complete"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub root: RootConfig,
    #[serde(default)]
    pub factories: Vec<FactoryConfig>,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootConfig {
    /// Argon2id PHC hash of the root password.
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FactoryConfig {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            api_key: None,
        }
    }
}

fn default_expire_secs() -> u64 {
    86400
}

fn default_ai_endpoint() -> String {
    "http://127.0.0.1:8095/complete".to_string()
}

impl ServerConfig {
    /// Resolve a context name to a config path. A name with `/` or `.`
    /// is used as a path directly; otherwise it resolves to
    /// `/etc/stitchline/<name>.toml`.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/stitchline/{}.toml", name_or_path))
        }
    }

    /// Load and parse the configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("cannot parse {}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_name_vs_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/stitchline/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn load_minimal_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            r#"
[storage]
data_dir = "/var/lib/stitchline"

[jwt]
secret = "test-secret"

[root]
password_hash = "$argon2id$test"

[[factories]]
id = "dhaka-1"
name = "Dhaka Unit 1"
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/stitchline");
        assert_eq!(config.jwt.expire_secs, 86400);
        assert_eq!(config.factories.len(), 1);
        assert_eq!(config.factories[0].id, "dhaka-1");
        assert_eq!(config.ai.endpoint, "http://127.0.0.1:8095/complete");
    }
}
