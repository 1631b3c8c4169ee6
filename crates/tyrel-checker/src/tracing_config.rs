//! Tracing configuration for debugging relation and inference behavior.
//!
//! Supports three output formats controlled by `TYREL_LOG_FORMAT`:
//!
//! - `text` (default): standard `tracing-subscriber` flat output
//! - `tree`: hierarchical indented output via `tracing-tree`, one level per
//!   checked declaration span
//! - `json`: one JSON object per span/event, machine-readable
//!
//! ## Quick start
//!
//! ```bash
//! # Human-readable tree
//! TYREL_LOG=debug TYREL_LOG_FORMAT=tree host-binary
//!
//! # Relation query events only, as JSON
//! TYREL_LOG=tyrel::query=trace TYREL_LOG_FORMAT=json host-binary
//!
//! # Fine-grained filtering
//! TYREL_LOG="tyrel_checker=debug,tyrel_solver=trace" host-binary
//! ```
//!
//! The subscriber is only initialised when `TYREL_LOG` (or `RUST_LOG`) is
//! set, so hosts that never ask for tracing pay nothing for it.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a `TYREL_LOG_FORMAT` value. Unknown values fall back to text.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("TYREL_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `TYREL_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("TYREL_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `TYREL_LOG` nor `RUST_LOG` is set. All output
/// goes to stderr so it never mixes with what the host writes to stdout.
/// A second call, or a host that installed its own subscriber, is ignored.
pub fn init_tracing() {
    let has_tyrel_log = std::env::var("TYREL_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_tyrel_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    let installed = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);

            Registry::default().with(filter).with(text_layer).try_init()
        }
    };
    if let Err(error) = installed {
        tracing::debug!(%error, "tracing subscriber already installed");
    }
}

#[cfg(test)]
#[path = "../tests/tracing_config_tests.rs"]
mod tests;
