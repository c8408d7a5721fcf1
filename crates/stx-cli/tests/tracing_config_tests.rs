use super::*;

fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| {
        pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[test]
fn test_log_format_names() {
    assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
    assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::parse("text"), LogFormat::Text);
    assert_eq!(LogFormat::parse("yaml"), LogFormat::Text);
}

#[test]
fn test_crate_short_names() {
    assert_eq!(expand_directives("completions"), "stx_completions=debug");
    assert_eq!(
        expand_directives("solver=trace, strategies"),
        "stx_solver=trace,stx_strategies=debug"
    );
    assert_eq!(expand_directives("info,stx_terms=trace"), "info,stx_terms=trace");
    assert_eq!(expand_directives(""), "");
}

#[test]
fn test_config_from_vars() {
    assert_eq!(LogConfig::from_vars(vars(&[])), None);
    assert_eq!(LogConfig::from_vars(vars(&[("STX_LOG_FORMAT", "tree")])), None);

    let config = LogConfig::from_vars(vars(&[("STX_LOG", "solver"), ("STX_LOG_FORMAT", "tree")]))
        .expect("tracing requested");
    assert_eq!(config.directives, "stx_solver=debug");
    assert_eq!(config.format, LogFormat::Tree);

    // RUST_LOG is used verbatim, and only when STX_LOG is unset.
    let config = LogConfig::from_vars(vars(&[("RUST_LOG", "solver")])).expect("tracing requested");
    assert_eq!(config.directives, "solver");
    assert_eq!(config.format, LogFormat::Text);
    let config = LogConfig::from_vars(vars(&[("RUST_LOG", "warn"), ("STX_LOG", "cli")]))
        .expect("tracing requested");
    assert_eq!(config.directives, "stx_cli=debug");
}
