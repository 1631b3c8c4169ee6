//! Checker configuration.
//!
//! Options arrive already parsed from whatever project file format the host
//! uses; this module only owns the typed representation and a JSON entry
//! point for hosts that forward a compiler-options object verbatim.

use serde::{Deserialize, Serialize};

/// What an inferred type argument falls back to when no candidates were
/// collected and the type parameter has no default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InferenceDefault {
    /// Fall back to `unknown`. Safe: the caller must narrow before use.
    #[default]
    Unknown,
    /// Fall back to `any`. Permissive: matches untyped call sites.
    Any,
    /// Fall back to the type parameter's constraint, or `unknown` when it has none.
    Constraint,
}

/// Strictness and inference settings for one program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerOptions {
    pub strict: bool,
    /// When false, `null` and `undefined` are assignable to every type.
    pub strict_null_checks: bool,
    /// When true, function-typed properties compare parameters contravariantly.
    /// Method parameters stay bivariant either way.
    pub strict_function_types: bool,
    /// When true, indexed access with index signatures adds `| undefined` to the type
    pub no_unchecked_indexed_access: bool,
    pub inference_default: InferenceDefault,
}

impl CheckerOptions {
    /// Apply `--strict` defaults to individual strict flags.
    /// Enabling `strict` turns on the strict family; the per-flag booleans
    /// are OR-ed with `strict`.
    pub fn apply_strict_defaults(mut self) -> Self {
        if self.strict {
            self.strict_null_checks = true;
            self.strict_function_types = true;
            // noUncheckedIndexedAccess is not implied by --strict
        }
        self
    }

    /// Options with the whole strict family enabled.
    pub fn strict() -> Self {
        CheckerOptions {
            strict: true,
            ..CheckerOptions::default()
        }
        .apply_strict_defaults()
    }

    /// Parse a compiler-options JSON object (camelCase keys, unknown keys ignored).
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let options: CheckerOptions = serde_json::from_str(json)?;
        Ok(options.apply_strict_defaults())
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
