//! Tests for loading engine configuration from disk.

use std::io::Write;
use std::time::Duration;

use game_of_three::{EngineConfig, NumberGenerator, ThinkingDelay};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
seed_min = 10
seed_max = 20
thinking_min_ms = 5
thinking_max_ms = 15
ai_name = "Deep Three"
"#,
    );

    let config = EngineConfig::from_file(file.path()).expect("Failed to load config");
    assert_eq!(*config.seed_min(), 10);
    assert_eq!(*config.seed_max(), 20);
    assert_eq!(config.ai_name(), "Deep Three");
    assert_eq!(
        config.thinking_delay(),
        ThinkingDelay::new(Duration::from_millis(5), Duration::from_millis(15))
    );

    let generator = config.seed_generator();
    for _ in 0..50 {
        assert!((10..=20).contains(&generator.generate()));
    }
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("absent.toml");

    assert!(EngineConfig::from_file(&path).is_err());
    let config = EngineConfig::load_or_default(&path).expect("defaults");
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_malformed_file_is_an_error() {
    let file = write_config("seed_min = \"three\"\n");
    let err = EngineConfig::load_or_default(file.path()).expect_err("bad type");
    assert!(err.message.contains("parse"), "unexpected message: {}", err.message);
}

#[test]
fn test_validation_errors() {
    let inverted = write_config("seed_min = 50\nseed_max = 10\n");
    assert!(EngineConfig::from_file(inverted.path()).is_err());

    assert!(EngineConfig::new(1, 10, 0, 0, "AI").is_err());
    assert!(EngineConfig::new(3, 10, 20, 10, "AI").is_err());
    assert!(EngineConfig::new(3, 10, 0, 0, "  ").is_err());

    let config = EngineConfig::new(2, 2, 0, 0, "AI").expect("valid config");
    assert_eq!(config.seed_generator().generate(), 2);
    assert_eq!(config.thinking_delay(), ThinkingDelay::fixed(Duration::ZERO));
}
