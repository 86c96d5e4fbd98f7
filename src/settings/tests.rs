//! Tests for layered settings.

use std::{io::Write, net::SocketAddr, num::NonZeroUsize};

use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

fn non_zero(value: usize) -> NonZeroUsize { NonZeroUsize::new(value).expect("non-zero") }

#[fixture]
fn config_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(
        br#"
[server]
host = "0.0.0.0"
port = 9000
workers = 2

[framing]
open = "<a>"
close = "</a>"

[limits]
max_pending_chunks = 16
unindexed = "next-in-sequence"
"#,
    )
    .expect("write config");
    file
}

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, DEFAULT_HOST);
    assert_eq!(settings.server.port, DEFAULT_PORT);
    assert!(settings.server.workers.is_none());
    assert_eq!(settings.framing, FramingConfig::default());
    assert_eq!(settings.limits, ReassemblyLimits::default());
}

#[rstest]
fn file_values_replace_defaults(config_file: NamedTempFile) {
    let settings = Settings::load(config_file.path()).expect("load settings");
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.server.workers, Some(non_zero(2)));
    assert_eq!(settings.framing.open_delimiter.as_deref(), Some("<a>"));
    assert_eq!(settings.limits.max_pending_chunks, non_zero(16));
    assert_eq!(settings.limits.unindexed, UnindexedPolicy::NextInSequence);
    assert!(settings.limits.max_message_bytes.is_none());
}

#[rstest]
fn overrides_take_precedence_over_file(config_file: NamedTempFile) {
    let overrides = Overrides {
        port: Some(4300),
        open: Some("<msg>".to_owned()),
        max_message_bytes: Some(non_zero(64)),
        ..Overrides::default()
    };
    let settings = Settings::resolve(Some(config_file.path()), overrides).expect("resolve");

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 4300);
    assert_eq!(settings.framing.open_delimiter.as_deref(), Some("<msg>"));
    assert!(
        settings.framing.close_delimiter.is_none(),
        "an overridden open tag re-derives its close tag"
    );
    assert_eq!(
        settings.framing.resolve().expect("derivable").delimiters().map(|d| d.close().to_owned()),
        Some("</msg>".to_owned())
    );
    assert_eq!(settings.limits.max_message_bytes, Some(non_zero(64)));
    assert_eq!(settings.limits.max_pending_chunks, non_zero(16));
}

#[test]
fn no_header_disables_framing() {
    let settings = Settings::resolve(
        None,
        Overrides {
            no_header: true,
            ..Overrides::default()
        },
    )
    .expect("resolve defaults");
    assert!(!settings.framing.enabled);
}

#[test]
fn explicit_close_override_is_kept() {
    let mut settings = Settings::default();
    settings.apply(Overrides {
        open: Some("[[".to_owned()),
        close: Some("]]".to_owned()),
        ..Overrides::default()
    });
    assert_eq!(settings.framing.close_delimiter.as_deref(), Some("]]"));
}

#[rstest]
#[case("[server]\nbogus = 1\n")]
#[case("[limits]\nunindexed = \"sometimes\"\n")]
#[case("[limits]\nmax_pending_chunks = 0\n")]
fn invalid_files_are_rejected(#[case] text: &str) {
    assert!(matches!(
        Settings::from_toml_str(text),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.toml");
    let err = Settings::load(&path).expect_err("file does not exist");
    assert!(matches!(err, ConfigError::Io { path: ref p, .. } if *p == path));
}

#[test]
fn rendered_settings_load_back() {
    let mut settings = Settings::default();
    settings.server.workers = Some(non_zero(3));
    settings.limits.unindexed = UnindexedPolicy::Drop;
    let text = settings.to_toml_string().expect("render");
    assert_eq!(Settings::from_toml_str(&text).expect("parse"), settings);
}

#[test]
fn socket_addr_uses_host_and_port() {
    let settings = Settings::default();
    assert_eq!(
        settings.server.socket_addr().expect("resolve localhost"),
        SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
    );
}

#[test]
fn server_builder_uses_configured_workers() {
    let mut settings = Settings::default();
    settings.server.workers = Some(non_zero(5));
    assert_eq!(settings.server().worker_count(), 5);
}
