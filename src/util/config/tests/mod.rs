//! Configuration tests

use std::fs;

use crate::util::config::{
    load_config_from, save_config_to, Color, ConfigError, UserConfiguration,
};
use crate::util::logger::LogLevel;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, UserConfiguration::default());
    assert_eq!(config.repl.prompt, "> ");
    assert_eq!(config.log.level, LogLevel::Warn);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r##"
[theme]
background = "#000000"

[repl]
max_steps = 42

[references]
extra = ["System.Text"]
usings = ["System.Text"]
"##,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.theme.background, Color::rgb(0, 0, 0));
    assert_eq!(
        config.theme.foreground,
        UserConfiguration::default().theme.foreground
    );
    assert_eq!(config.repl.max_steps, 42);
    assert_eq!(config.repl.prompt, "> ");
    assert_eq!(config.references.extra, vec!["System.Text".to_string()]);
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut config = UserConfiguration::default();
    config.repl.prompt = "λ ".to_string();
    config.log.level = LogLevel::Debug;

    save_config_to(&config, &path).unwrap();
    assert_eq!(load_config_from(&path).unwrap(), config);
}

#[test]
fn test_invalid_color_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[theme]\nkeyword = \"blue\"\n").unwrap();

    match load_config_from(&path) {
        Err(ConfigError::Parse(e)) => assert!(e.to_string().contains("#RRGGBB")),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_color_parse_and_display() {
    let color: Color = "#1e90ff".parse().unwrap();
    assert_eq!(color, Color::rgb(0x1E, 0x90, 0xFF));
    assert_eq!(color.to_string(), "#1E90FF");
    assert!("#12345".parse::<Color>().is_err());
    assert!("zzzzzz".parse::<Color>().is_err());
}
