#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig};

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.url, "sqlite://data/library.db");
        assert_eq!(config.session.cookie_name, "library.sid");
        assert_eq!(config.session.ttl_secs, 24 * 60 * 60);
        assert!(!config.session.secure_cookie);
        assert_eq!(config.uploads.public_path, "/server/uploads");
        assert_eq!(config.uploads.max_file_bytes, 50 * 1024 * 1024);
        assert!(config.uploads.allowed.iter().any(|p| p == "*.pdf"));
        assert!(config.security.is_none());
    }

    #[test]
    fn test_default_config_validates() {
        assert!(config::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_admin_debug_masks_secrets() {
        let config = AppConfig::default();
        let printed = format!("{:?}", config.admin);
        assert!(printed.contains(&config.admin.email));
        assert!(!printed.contains(&config.admin.password));
        assert!(!printed.contains(&config.admin.secret_key));
    }

    #[test]
    fn test_invalid_server_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        let err = config::validate(&config).unwrap_err();
        assert!(err.to_string().contains("invalid server.port"));
    }

    #[test]
    fn test_invalid_session_ttl() {
        let mut config = AppConfig::default();
        config.session.ttl_secs = 0;
        assert!(config::validate(&config).is_err());
    }

    #[test]
    fn test_empty_admin_credentials() {
        let mut config = AppConfig::default();
        config.admin.secret_key.clear();
        assert!(config::validate(&config).is_err());
    }

    #[test]
    fn test_invalid_upload_settings() {
        let mut config = AppConfig::default();
        config.uploads.allowed.push("*.{png".to_string());
        assert!(config::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.uploads.public_path = "/".to_string();
        assert!(config::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.uploads.public_path = "uploads".to_string();
        assert!(config::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.uploads.max_file_bytes = 0;
        assert!(config::validate(&config).is_err());
    }

    #[test]
    fn test_invalid_password_cost() {
        let mut config = AppConfig::default();
        config.passwords.parallelism = 4;
        config.passwords.memory_kib = 16;
        assert!(config::validate(&config).is_err());
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("library.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        config::ensure_sqlite_parent_dir(&url).unwrap();
        assert!(dir.path().join("nested").is_dir());

        // Non-file URLs are left alone.
        config::ensure_sqlite_parent_dir("sqlite::memory:").unwrap();
    }
}
