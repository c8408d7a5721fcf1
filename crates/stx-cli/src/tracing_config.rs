//! Tracing setup for inspecting completion runs.
//!
//! `STX_LOG` selects what to trace. Besides the usual `RUST_LOG` directives
//! it accepts the short crate names of the engine, optionally with a level:
//!
//! ```bash
//! STX_LOG=completions stx check fixtures/*.json        # stx_completions=debug
//! STX_LOG=solver=trace,strategies stx complete f.json  # stx_solver=trace,stx_strategies=debug
//! STX_LOG=completions STX_LOG_FORMAT=tree stx check f.json
//! ```
//!
//! `STX_LOG_FORMAT` is `text` (default), `tree` or `json`. The tree format
//! nests strategy traces under the per-round and per-variable spans of the
//! driver. Without `STX_LOG` the plain `RUST_LOG` filter is used; without
//! either, no subscriber is installed.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Short names accepted in `STX_LOG`, and the crates they stand for.
const CRATES: &[(&str, &str)] = &[
    ("terms", "stx_terms"),
    ("scopegraph", "stx_scopegraph"),
    ("strategies", "stx_strategies"),
    ("solver", "stx_solver"),
    ("completions", "stx_completions"),
    ("cli", "stx_cli"),
];

const DEFAULT_LEVEL: &str = "debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Resolved tracing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Directives in `RUST_LOG` syntax.
    pub directives: String,
    pub format: LogFormat,
}

impl LogConfig {
    /// Reads the settings through `var`, which looks up an environment
    /// variable. `None` if tracing was not requested.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let directives = match var("STX_LOG") {
            Some(value) => expand_directives(&value),
            None => var("RUST_LOG")?,
        };
        let format = var("STX_LOG_FORMAT").map_or(LogFormat::Text, |value| LogFormat::parse(&value));
        Some(Self { directives, format })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }
}

/// Rewrites crate short names into `stx_<crate>=<level>` directives; other
/// directives are kept as they are.
pub fn expand_directives(value: &str) -> String {
    value
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .map(|directive| {
            let (name, level) = directive.split_once('=').unwrap_or((directive, DEFAULT_LEVEL));
            match CRATES.iter().find(|(short, _)| *short == name) {
                Some((_, target)) => format!("{target}={level}"),
                None => directive.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber, writing to stderr. Does nothing unless
/// `STX_LOG` or `RUST_LOG` is set.
pub fn init_tracing() {
    let Some(config) = LogConfig::from_env() else {
        return;
    };
    let filter = EnvFilter::builder().parse_lossy(&config.directives);
    match config.format {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .init();
        }
    }
}

#[cfg(test)]
#[path = "../tests/tracing_config_tests.rs"]
mod tests;
