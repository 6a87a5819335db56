use codepad_config::{ThemeMode, WidgetConfig};

#[test]
fn test_load_creates_default_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("codepad.json");
    assert!(!path.exists());

    let config = WidgetConfig::load_or_create(&path);
    assert!(path.exists());
    assert_eq!(config.theme, "System");

    // File should contain valid JSON
    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["default_language"], "javascript");
}

#[test]
fn test_load_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepad.json");
    let json = r#"{
        "theme": "Dark",
        "default_language": "python",
        "word_wrap": true,
        "show_line_numbers": false,
        "indent_width": 4,
        "use_tabs": true
    }"#;
    std::fs::write(&path, json).unwrap();

    let config = WidgetConfig::load_or_create(&path);
    assert_eq!(config.theme_mode(), ThemeMode::Dark);
    assert_eq!(config.default_language, "python");
    assert!(config.word_wrap);
    assert!(!config.show_line_numbers);
    assert_eq!(config.indent_width, 4);
    assert!(config.use_tabs);
}

#[test]
fn test_broken_json_returns_defaults_and_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepad.json");
    std::fs::write(&path, "{ this is not valid json }}}").unwrap();

    let config = WidgetConfig::load_or_create(&path);
    assert_eq!(config.theme, "System");
    assert_eq!(config.indent_width, 2);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{ this is not valid json }}}"
    );
}

#[test]
fn test_out_of_range_values_are_sanitized_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepad.json");
    std::fs::write(
        &path,
        r#"{"indent_width": 99, "notification_secs": 0, "theme": "Neon"}"#,
    )
    .unwrap();

    let config = WidgetConfig::load_or_create(&path);
    assert_eq!(config.indent_width, 8);
    assert_eq!(config.notification_secs, 1);
    assert_eq!(config.theme, "System");
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codepad.json");
    let mut config = WidgetConfig::default();
    config.default_snippet = "SELECT 1;".to_string();
    config.default_language = "sql".to_string();
    config.save(&path).unwrap();

    let loaded = WidgetConfig::load_or_create(&path);
    assert_eq!(loaded.default_snippet, "SELECT 1;");
    assert_eq!(loaded.default_language, "sql");
}
