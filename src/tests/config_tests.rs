#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig};
    use std::env;
    use std::fs;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 1212);
        assert_eq!(config.storage.root, std::path::PathBuf::from("./files"));
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.session.ttl_secs, 30 * 24 * 60 * 60);
        assert!(config.listing.show_hidden);
        assert!(config.listing.excludes.is_empty());
        assert!(config.security.banned_ips.is_empty());
        assert!(!config.security.trust_forwarded_headers);
        assert!(config.security.admin_loopback_only);
        assert!(config::validate(&config).is_ok());
    }

    #[test]
    fn test_with_root() {
        let config = AppConfig::with_root("/srv/share");
        assert_eq!(config.storage.root, std::path::PathBuf::from("/srv/share"));
        assert_eq!(config.server.port, 1212);
    }

    #[test]
    fn test_invalid_server_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        let err = config::validate(&config).unwrap_err();
        assert!(err.to_string().contains("invalid server.port"));
    }

    #[test]
    fn test_upload_limit_bounds() {
        let mut config = AppConfig::default();
        config.upload.max_bytes = 0;
        assert!(config::validate(&config).is_err());
        config.upload.max_bytes = 2 * 1024 * 1024 * 1024;
        assert!(config::validate(&config).is_err());
        config.upload.max_bytes = 1;
        assert!(config::validate(&config).is_ok());
    }

    #[test]
    fn test_session_settings_must_be_positive() {
        let mut config = AppConfig::default();
        config.session.ttl_secs = 0;
        assert!(config::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.session.purge_interval_secs = 0;
        assert!(config::validate(&config).is_err());
    }

    #[test]
    fn test_invalid_exclude_glob() {
        let mut config = AppConfig::default();
        config.listing.excludes = vec!["[unclosed".to_string()];
        let err = config::validate(&config).unwrap_err();
        assert!(err.to_string().contains("listing.excludes"));
    }

    // The only test that touches process env and calls `load`, so parallel tests
    // cannot observe each other's variables.
    #[test]
    fn test_load_layers_file_and_env() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("custom.toml");
        fs::write(
            &toml_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000

[upload]
max_bytes = 2048

[listing]
show_hidden = false
excludes = ["*.tmp", ".git"]
"#,
        )
        .unwrap();

        env::set_var("DATEIWALD_CONFIG", toml_path.to_str().unwrap());
        env::set_var("DATEIWALD__SERVER__PORT", "3000");
        env::set_var("DATEIWALD__SECURITY__BANNED_IPS", "10.0.0.1,10.0.0.2");

        let result = config::load();

        env::remove_var("DATEIWALD_CONFIG");
        env::remove_var("DATEIWALD__SERVER__PORT");
        env::remove_var("DATEIWALD__SECURITY__BANNED_IPS");

        let config = result.unwrap();
        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.max_bytes, 2048);
        assert!(!config.listing.show_hidden);
        assert_eq!(config.listing.excludes, vec!["*.tmp", ".git"]);
        assert_eq!(config.security.banned_ips, vec!["10.0.0.1", "10.0.0.2"]);
        // Untouched sections keep their embedded defaults.
        assert_eq!(config.session.purge_interval_secs, 600);
    }

    #[test]
    fn test_ensure_root_dir_creates_and_canonicalizes() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("share").join("inner");
        let root = config::ensure_root_dir(&nested).unwrap();
        assert!(root.is_dir());
        assert!(root.is_absolute());
        assert_eq!(root, dir.path().canonicalize().unwrap().join("share").join("inner"));
    }

    #[test]
    fn test_ensure_root_dir_rejects_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(config::ensure_root_dir(file.path()).is_err());
    }
}
