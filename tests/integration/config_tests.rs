use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use photodedupe::actions::QuarantinePlacement;
use photodedupe::cli::OutputFormat;
use photodedupe::config::Config;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.placement, QuarantinePlacement::BesideOriginal);
    assert_eq!(config.io_threads, 1);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
extensions = ["nef", ".RAF"]
quarantine_dir = "_Dupes"
placement = "beside-reject"
io_threads = 4
min_size = 1024
output = "json"
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.extensions, vec!["nef", ".RAF"]);
    assert_eq!(config.quarantine_dir, "_Dupes");
    assert_eq!(config.placement, QuarantinePlacement::BesideReject);
    assert_eq!(config.io_threads, 4);
    assert_eq!(config.min_size, Some(1024));
    assert_eq!(config.max_size, None);
    assert_eq!(config.output, OutputFormat::Json);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("PDTEST_IO_THREADS", "16");
    std::env::set_var("PDTEST_QUARANTINE_DIR", "_Rejects");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("PDTEST_").split("__"));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.io_threads, 16);
    assert_eq!(config.quarantine_dir, "_Rejects");

    std::env::remove_var("PDTEST_IO_THREADS");
    std::env::remove_var("PDTEST_QUARANTINE_DIR");
}

#[test]
fn test_load_from_path_reads_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "placement = \"beside-reject\"\n").unwrap();

    let config = Config::load_from_path(Some(&config_path));

    assert_eq!(config.placement, QuarantinePlacement::BesideReject);
}

#[test]
fn test_invalid_file_falls_back_to_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "io_threads = \"many\"\n").unwrap();

    let config = Config::load_from_path(Some(&config_path));

    assert_eq!(config.placement, Config::default().placement);
    assert_eq!(config.extensions, Config::default().extensions);
}

#[test]
fn test_config_serializes_to_toml() {
    let config = Config {
        io_threads: 2,
        ..Config::default()
    };

    let content = toml::to_string_pretty(&config).unwrap();

    assert!(content.contains("io_threads = 2"));
    assert!(content.contains("quarantine_dir = \"_Rejected\""));
    assert!(content.contains("placement = \"beside-original\""));
}
