//! Bootstrap — first-start checks and root account creation.
//!
//! When stitchlined starts:
//! 1. Verify the config carries a root password hash, a JWT secret, a
//!    storage directory and at least one factory — refuse to start
//!    otherwise.
//! 2. Ensure the `root` SystemAdmin user exists in the auth store.

use std::sync::Arc;

use tracing::info;

use auth::service::AuthService;

use crate::config::ServerConfig;

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.root.password_hash.is_empty() {
        anyhow::bail!(
            "No root password hash found in configuration.\n\
             Generate one and set [root].password_hash before starting."
        );
    }
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.factories.is_empty() {
        anyhow::bail!("No factories configured — add at least one [[factories]] entry.");
    }
    Ok(())
}

/// Ensure the root SystemAdmin account exists. Creates it if missing.
pub fn ensure_root(auth: &Arc<AuthService>, password_hash: &str) -> anyhow::Result<()> {
    let user = auth
        .ensure_root(password_hash)
        .map_err(|e| anyhow::anyhow!("failed to ensure root user: {}", e))?;
    info!(id = %user.id, "root account ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AiConfig, FactoryConfig, JwtConfig, RootConfig, StorageConfig};

    fn valid_config() -> ServerConfig {
        ServerConfig {
            storage: StorageConfig { data_dir: "/tmp/stitchline".into() },
            jwt: JwtConfig { secret: "secret".into(), expire_secs: 3600 },
            root: RootConfig { password_hash: "$argon2id$test".into() },
            factories: vec![FactoryConfig { id: "dhaka-1".into(), name: "Dhaka Unit 1".into() }],
            ai: AiConfig::default(),
        }
    }

    #[test]
    fn verify_accepts_complete_config() {
        assert!(verify_config(&valid_config()).is_ok());
    }

    #[test]
    fn verify_rejects_missing_pieces() {
        let mut config = valid_config();
        config.root.password_hash = String::new();
        assert!(verify_config(&config).is_err());

        let mut config = valid_config();
        config.jwt.secret = String::new();
        assert!(verify_config(&config).is_err());

        let mut config = valid_config();
        config.factories.clear();
        assert!(verify_config(&config).is_err());
    }
}
