use super::*;
use figment::Jail;
use std::path::PathBuf;

fn load_in_jail(path: Option<&Path>) -> figment::error::Result<Settings> {
    Settings::load(path).map_err(|e| figment::Error::from(e.to_string()))
}

#[test]
fn test_default_settings_are_valid() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());
    assert!(settings.secret_key.is_development_default());
    assert_eq!(settings.assets.variant, AssetVariant::Serial);
    assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:5000");
}

#[test]
fn test_settings_validation() {
    let settings = Settings::default();

    let mut invalid = settings.clone();
    invalid.log_level = "loud".to_string();
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.secret_key = SecretKey::new("short");
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.session.ttl_secs = 0;
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.session.cookie_name = "bad name;".to_string();
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.password_requirements.min_length = 3;
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.database.max_connections = 0;
    assert!(invalid.validate().is_err());

    let mut invalid = settings.clone();
    invalid.login_throttle.max_attempts = 0;
    assert!(invalid.validate().is_err());

    let mut upper = settings;
    upper.log_level = "DEBUG".to_string();
    assert!(upper.validate().is_ok());
}

#[test]
fn test_secret_key_is_not_printed() {
    let settings = Settings::default();
    let printed = format!("{settings:?}");
    assert!(!printed.contains(DEV_SECRET_KEY));
    assert!(printed.contains("SecretKey(***)"));
}

#[test]
fn test_load_settings_from_file_and_env() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "assetreg.toml",
            r#"
            bind_addr = "0.0.0.0:8080"
            log_level = "debug"

            [database]
            url = "sqlite://from-file.db"

            [assets]
            variant = "valued"
            "#,
        )?;
        jail.set_env("ASSETREG_LOG_LEVEL", "warn");
        jail.set_env("ASSETREG_SESSION__SECURE", "true");
        jail.set_env("SECRET_KEY", "a-much-longer-production-secret");

        let settings = load_in_jail(None)?;
        assert_eq!(settings.bind_addr.to_string(), "0.0.0.0:8080");
        // Environment variables take precedence over the file
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.database.url, "sqlite://from-file.db");
        assert_eq!(settings.assets.variant, AssetVariant::Valued);
        assert!(settings.session.secure);
        assert_eq!(settings.secret_key.expose(), "a-much-longer-production-secret");
        // Untouched values keep their defaults
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.assets.slug_conflict_retries, 100);
        Ok(())
    });
}

#[test]
fn test_database_url_env_and_explicit_path() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "log_format = \"json\"")?;
        jail.set_env("DATABASE_URL", "sqlite://from-env.db");

        let path = PathBuf::from("custom.toml");
        let settings = load_in_jail(Some(&path))?;
        assert_eq!(settings.database.url, "sqlite://from-env.db");
        assert_eq!(settings.log_format, LogFormat::Json);

        jail.set_env("ASSETREG_DATABASE__URL", "sqlite://prefixed.db");
        let settings = load_in_jail(Some(&path))?;
        assert_eq!(settings.database.url, "sqlite://prefixed.db");
        Ok(())
    });
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    Jail::expect_with(|jail| {
        jail.set_env("ASSETREG_LOG_LEVEL", "chatty");
        assert!(Settings::load(None).is_err());

        jail.set_env("ASSETREG_LOG_LEVEL", "info");
        jail.set_env("ASSETREG_ASSETS__VARIANT", "price");
        assert!(Settings::load(None).is_err());
        Ok(())
    });
}
