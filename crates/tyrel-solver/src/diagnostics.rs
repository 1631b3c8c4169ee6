//! Structured relation failures and their rendering.
//!
//! A failed relation query can be explained as a `SubtypeFailureReason`:
//! the first piece of the comparison that did not hold, nested for
//! property and return types. Reasons are plain data; strings are produced
//! only when a reason is turned into a `Diagnostic`.
//!
//! The rendered diagnostic is headed by "Type 'S' is not assignable to type
//! 'T'." (or the excessive-depth message) and carries one related entry per
//! elaboration line, outermost first.

use crate::env::TypeEnvironment;
use crate::node_builder::{signature_to_string, type_to_string};
use crate::types::*;
use tyrel_common::diagnostics::{Diagnostic, NO_NODE, diagnostic_codes as codes, format_message, get_message_template};
use tyrel_common::interner::Atom;

/// Why a relation did not hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubtypeFailureReason {
    /// A required property of the target has no counterpart in the source.
    MissingProperty {
        property_name: Atom,
        source_type: TypeId,
        target_type: TypeId,
    },
    /// Property types are incompatible.
    PropertyTypeMismatch {
        property_name: Atom,
        source_property_type: TypeId,
        target_property_type: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// An optional source property cannot satisfy a required target property.
    OptionalPropertyRequired {
        property_name: Atom,
        source_type: TypeId,
        target_type: TypeId,
    },
    /// The source relates to no member of the target union.
    NoUnionMemberMatches { source_type: TypeId, target_type: TypeId },
    /// Type arguments of two references to the same target disagree.
    TypeArgumentMismatch {
        index: usize,
        source_arg: TypeId,
        target_arg: TypeId,
    },
    /// Parameter types are incompatible.
    ParameterTypeMismatch {
        param_index: usize,
        source_name: Atom,
        target_name: Atom,
        source_param: TypeId,
        target_param: TypeId,
    },
    /// Return types are incompatible.
    ReturnTypeMismatch {
        source_return: TypeId,
        target_return: TypeId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    /// The source signature requires more arguments than the target provides.
    TooManyParameters { source_count: usize, target_count: usize },
    /// No source signature matches a target signature.
    MissingSignature {
        source_type: TypeId,
        target_signature: SignatureId,
    },
    /// A target index signature is absent from, or not satisfied by, the source.
    IndexSignatureMismatch {
        key_type: TypeId,
        source_type: TypeId,
        source_value: Option<TypeId>,
        target_value: TypeId,
    },
    /// Tuple element counts are incompatible.
    TupleArityMismatch { source_count: usize, target_count: usize },
    /// No more specific reason.
    TypeMismatch { source_type: TypeId, target_type: TypeId },
    /// The comparison ran out of depth budget.
    RecursionLimitExceeded { source_type: TypeId, target_type: TypeId },
}

impl SubtypeFailureReason {
    /// Diagnostic code of the reason's own elaboration line.
    pub fn diagnostic_code(&self) -> u32 {
        match self {
            SubtypeFailureReason::MissingProperty { .. } => codes::PROPERTY_MISSING_BUT_REQUIRED,
            SubtypeFailureReason::PropertyTypeMismatch { .. } => codes::TYPES_OF_PROPERTY_INCOMPATIBLE,
            SubtypeFailureReason::OptionalPropertyRequired { .. } => codes::PROPERTY_OPTIONAL_BUT_REQUIRED,
            SubtypeFailureReason::NoUnionMemberMatches { .. } => codes::NO_UNION_MEMBER_MATCHES,
            SubtypeFailureReason::TypeArgumentMismatch { .. } => codes::TYPE_ARGUMENTS_INCOMPATIBLE,
            SubtypeFailureReason::ParameterTypeMismatch { .. } => codes::TYPES_OF_PARAMETERS_INCOMPATIBLE,
            SubtypeFailureReason::ReturnTypeMismatch { .. } => codes::RETURN_TYPES_INCOMPATIBLE,
            SubtypeFailureReason::TooManyParameters { .. } => codes::TARGET_REQUIRES_FEWER_ARGUMENTS,
            SubtypeFailureReason::MissingSignature { .. } => codes::TYPE_HAS_NO_SIGNATURES,
            SubtypeFailureReason::IndexSignatureMismatch { source_value: None, .. } => codes::INDEX_SIGNATURE_MISSING,
            SubtypeFailureReason::IndexSignatureMismatch { .. } | SubtypeFailureReason::TypeMismatch { .. } => {
                codes::TYPE_NOT_ASSIGNABLE
            }
            SubtypeFailureReason::TupleArityMismatch { .. } => codes::SOURCE_HAS_N_ELEMENTS_TARGET_ACCEPTS_M,
            SubtypeFailureReason::RecursionLimitExceeded { .. } => codes::EXCESSIVE_STACK_DEPTH,
        }
    }

    /// Elaboration lines, outermost first, as `(code, message)` pairs.
    pub fn elaborations(&self, env: &TypeEnvironment) -> Vec<(u32, String)> {
        let mut lines = Vec::new();
        self.collect_elaborations(env, &mut lines);
        lines
    }

    fn collect_elaborations(&self, env: &TypeEnvironment, lines: &mut Vec<(u32, String)>) {
        let interner = env.interner();
        let ty = |t: TypeId| type_to_string(env, t);
        let code = self.diagnostic_code();
        let line = |args: &[&str]| (code, render(code, args));
        match self {
            SubtypeFailureReason::MissingProperty {
                property_name,
                source_type,
                target_type,
            }
            | SubtypeFailureReason::OptionalPropertyRequired {
                property_name,
                source_type,
                target_type,
            } => {
                let name = interner.resolve_atom(*property_name);
                lines.push(line(&[&*name, ty(*source_type).as_str(), ty(*target_type).as_str()]));
            }
            SubtypeFailureReason::PropertyTypeMismatch {
                property_name,
                source_property_type,
                target_property_type,
                nested_reason,
            } => {
                let name = interner.resolve_atom(*property_name);
                lines.push(line(&[&*name]));
                push_nested(env, lines, *source_property_type, *target_property_type, nested_reason.as_deref());
            }
            SubtypeFailureReason::NoUnionMemberMatches {
                source_type,
                target_type,
            } => {
                lines.push(line(&[ty(*source_type).as_str(), ty(*target_type).as_str()]));
            }
            SubtypeFailureReason::TypeArgumentMismatch {
                index,
                source_arg,
                target_arg,
            } => {
                let position = (index + 1).to_string();
                lines.push(line(&[position.as_str(), ty(*source_arg).as_str(), ty(*target_arg).as_str()]));
            }
            SubtypeFailureReason::ParameterTypeMismatch {
                source_name,
                target_name,
                source_param,
                target_param,
                ..
            } => {
                let source_name = interner.resolve_atom(*source_name);
                let target_name = interner.resolve_atom(*target_name);
                lines.push(line(&[&*source_name, &*target_name]));
                lines.push(not_assignable(env, *target_param, *source_param));
            }
            SubtypeFailureReason::ReturnTypeMismatch {
                source_return,
                target_return,
                nested_reason,
            } => {
                lines.push(line(&[ty(*source_return).as_str(), ty(*target_return).as_str()]));
                push_nested(env, lines, *source_return, *target_return, nested_reason.as_deref());
            }
            SubtypeFailureReason::TooManyParameters {
                source_count,
                target_count,
            } => {
                lines.push(line(&[source_count.to_string().as_str(), target_count.to_string().as_str()]));
            }
            SubtypeFailureReason::MissingSignature {
                source_type,
                target_signature,
            } => {
                lines.push(line(&[ty(*source_type).as_str(), signature_to_string(env, *target_signature).as_str()]));
            }
            SubtypeFailureReason::IndexSignatureMismatch {
                key_type,
                source_type,
                source_value,
                target_value,
            } => match source_value {
                None => lines.push(line(&[ty(*key_type).as_str(), ty(*source_type).as_str()])),
                Some(value) => lines.push(not_assignable(env, *value, *target_value)),
            },
            SubtypeFailureReason::TupleArityMismatch {
                source_count,
                target_count,
            } => {
                lines.push(line(&[source_count.to_string().as_str(), target_count.to_string().as_str()]));
            }
            SubtypeFailureReason::TypeMismatch {
                source_type,
                target_type,
            }
            | SubtypeFailureReason::RecursionLimitExceeded {
                source_type,
                target_type,
            } => {
                lines.push(line(&[ty(*source_type).as_str(), ty(*target_type).as_str()]));
            }
        }
    }

    /// Render as a diagnostic at `node` for the failed relation of `source`
    /// to `target`.
    pub fn to_diagnostic(&self, env: &TypeEnvironment, node: u32, source: TypeId, target: TypeId) -> Diagnostic {
        let source_text = type_to_string(env, source);
        let target_text = type_to_string(env, target);
        if let SubtypeFailureReason::RecursionLimitExceeded { .. } = self {
            return Diagnostic::from_code(node, codes::EXCESSIVE_STACK_DEPTH, &[source_text.as_str(), target_text.as_str()]);
        }
        let mut diagnostic = Diagnostic::from_code(node, codes::TYPE_NOT_ASSIGNABLE, &[source_text.as_str(), target_text.as_str()]);
        for (code, message) in self.elaborations(env) {
            // The head already says this.
            if code == codes::TYPE_NOT_ASSIGNABLE && message == diagnostic.message_text {
                continue;
            }
            diagnostic = diagnostic.with_related(NO_NODE, code, message);
        }
        diagnostic
    }
}

fn render(code: u32, args: &[&str]) -> String {
    format_message(get_message_template(code).unwrap_or("{0}"), args)
}

fn not_assignable(env: &TypeEnvironment, source: TypeId, target: TypeId) -> (u32, String) {
    let source_text = type_to_string(env, source);
    let target_text = type_to_string(env, target);
    (
        codes::TYPE_NOT_ASSIGNABLE,
        render(codes::TYPE_NOT_ASSIGNABLE, &[source_text.as_str(), target_text.as_str()]),
    )
}

fn push_nested(
    env: &TypeEnvironment,
    lines: &mut Vec<(u32, String)>,
    source: TypeId,
    target: TypeId,
    nested: Option<&SubtypeFailureReason>,
) {
    lines.push(not_assignable(env, source, target));
    if let Some(nested) = nested {
        let mut inner = nested.elaborations(env);
        // A plain mismatch of the same pair would repeat the line above.
        if let Some(first) = inner.first() {
            if lines.last() == Some(first) {
                inner.remove(0);
            }
        }
        lines.extend(inner);
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
