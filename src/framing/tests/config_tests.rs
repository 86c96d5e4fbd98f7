//! Tests for delimiter defaults, derivation, and validation.

use rstest::rstest;

use crate::framing::{Delimiters, Framing, FramingConfig, FramingError, derive_close_tag};

fn resolved(config: &FramingConfig) -> Delimiters {
    config
        .resolve()
        .expect("delimiters should resolve")
        .delimiters()
        .cloned()
        .expect("framing should be enabled")
}

#[test]
fn default_config_uses_header_tags() {
    let delimiters = resolved(&FramingConfig::default());
    assert_eq!(delimiters.open(), "<header>");
    assert_eq!(delimiters.close(), "</header>");
    assert_eq!(delimiters, Delimiters::default());
}

#[test]
fn disabled_config_resolves_without_delimiters() {
    let framing = FramingConfig::disabled()
        .with_open_delimiter("[[")
        .resolve()
        .expect("disabled framing never fails");
    assert_eq!(framing, Framing::Disabled);
    assert!(framing.delimiters().is_none());
}

#[rstest]
#[case("<a>", "</a>")]
#[case("<msg>", "</msg>")]
#[case("<chunk-meta>", "</chunk-meta>")]
fn close_tag_is_derived_from_open_tag(#[case] open: &str, #[case] close: &str) {
    let delimiters = resolved(&FramingConfig::default().with_open_delimiter(open));
    assert_eq!(delimiters.open(), open);
    assert_eq!(delimiters.close(), close);
}

#[rstest]
#[case("<>")]
#[case("<")]
#[case(">")]
#[case("msg")]
#[case("[msg]")]
#[case("<msg")]
fn underivable_open_delimiters_are_rejected(#[case] open: &str) {
    let err = FramingConfig::default()
        .with_open_delimiter(open)
        .resolve()
        .expect_err("close delimiter cannot be derived");
    assert!(
        matches!(&err, FramingError::UnresolvedDelimiters { open: found } if found == open),
        "unexpected error: {err:?}"
    );
}

#[test]
fn derivation_strips_exactly_one_character_each_side() {
    assert_eq!(derive_close_tag("<<a>>").as_deref(), Some("</<a>>"));
    assert_eq!(derive_close_tag("<x>").as_deref(), Some("</x>"));
}

#[test]
fn explicit_close_delimiter_wins_over_derivation() {
    let delimiters = resolved(
        &FramingConfig::default()
            .with_open_delimiter("<msg>")
            .with_close_delimiter("<<END>>"),
    );
    assert_eq!(delimiters.close(), "<<END>>");
}

#[test]
fn explicit_close_without_open_pairs_with_default_open() {
    let delimiters = resolved(&FramingConfig::default().with_close_delimiter("||"));
    assert_eq!(delimiters.open(), "<header>");
    assert_eq!(delimiters.close(), "||");
}

#[test]
fn non_tag_open_delimiter_needs_explicit_close() {
    let delimiters = resolved(
        &FramingConfig::default()
            .with_open_delimiter("@@")
            .with_close_delimiter("##"),
    );
    assert_eq!((delimiters.open(), delimiters.close()), ("@@", "##"));
}

#[rstest]
#[case(FramingConfig::default().with_open_delimiter(""))]
#[case(FramingConfig::default().with_close_delimiter(""))]
fn empty_delimiters_are_rejected(#[case] config: FramingConfig) {
    let err = config.resolve().expect_err("empty delimiter must fail");
    assert!(matches!(err, FramingError::EmptyDelimiter));
}

#[test]
fn config_deserialises_from_toml() {
    let config: FramingConfig = toml::from_str(
        r#"
        enabled = true
        open = "<m>"
        "#,
    )
    .expect("valid framing table");
    assert_eq!(config, FramingConfig::default().with_open_delimiter("<m>"));
}
