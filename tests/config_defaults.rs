use panxpan_reporter::config::{Config, NotifyConfig};
use panxpan_reporter::report::FormatLimits;

#[test]
fn test_default_config_values() {
    let config = Config::default();

    assert_eq!(config.report.title, "PanXpan E2E Test");
    assert_eq!(config.report.from, None);
    assert_eq!(config.delivery.timeout, 10);
    assert_eq!(config.delivery.mailgun_api_base, "https://api.mailgun.net");
    assert_eq!(
        config.limits,
        FormatLimits {
            failed_items: 10,
            passed_items: 10,
            skipped_items: 5,
            slow_factor: 1.5,
            error_chars: 200,
        }
    );
}

#[test]
fn test_empty_environment_disables_everything() {
    let notify = NotifyConfig::from_lookup(|_| None);

    assert!(!notify.email_enabled);
    assert!(!notify.chat_enabled);
    assert_eq!(notify.run.run_url(), None);
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join(".panxpanrc.toml");
    std::fs::write(&path, "[report]\ntitle = \"Staging E2E\"\n").unwrap();

    let config = Config::load_from_file(&path).unwrap();

    assert_eq!(config.report.title, "Staging E2E");
    assert_eq!(config.limits.failed_items, 10);
}

#[test]
fn test_load_from_invalid_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[report\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();

    assert!(err.to_string().contains("Invalid config file"));
}
