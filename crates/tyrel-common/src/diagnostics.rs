//! Diagnostic types and message lookup.
//!
//! Diagnostics point at declaration nodes rather than text spans: the
//! surrounding parser owns source positions, so a diagnostic carries the raw
//! node handle and the parser layer maps it back to a span.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// Raw node handle used when a diagnostic has no location.
pub const NO_NODE: u32 = u32::MAX;

/// Related information for a diagnostic (an elaboration line or a "see also" node).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub node: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A type-checking diagnostic message with optional related information.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Raw declaration node handle this diagnostic is attached to.
    pub node: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Related information (relation elaborations, conflicting declarations)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(node: u32, message: String, code: u32) -> Self {
        Self {
            node,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create an error diagnostic from a message table entry and its arguments.
    #[must_use]
    pub fn from_code(node: u32, code: u32, args: &[&str]) -> Self {
        let template = get_message_template(code).unwrap_or("{0}");
        let category = get_diagnostic_category(code).unwrap_or(DiagnosticCategory::Error);
        Self {
            node,
            message_text: format_message(template, args),
            category,
            code,
            related_information: Vec::new(),
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, node: u32, code: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            node,
            message_text: message,
            category: DiagnosticCategory::Message,
            code,
        });
        self
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Diagnostic codes produced by the binder, solver and checker.
pub mod diagnostic_codes {
    pub const DUPLICATE_IDENTIFIER: u32 = 2300;
    pub const CANNOT_FIND_NAME: u32 = 2304;
    pub const TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_BASE: u32 = 2310;
    pub const GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS: u32 = 2314;
    pub const TYPE_NOT_ASSIGNABLE: u32 = 2322;
    pub const TYPES_OF_PROPERTY_INCOMPATIBLE: u32 = 2326;
    pub const TYPES_OF_PARAMETERS_INCOMPATIBLE: u32 = 2328;
    pub const INDEX_SIGNATURE_MISSING: u32 = 2329;
    pub const TYPE_DOES_NOT_SATISFY_CONSTRAINT: u32 = 2344;
    pub const NO_CALL_SIGNATURE_MATCH: u32 = 2345;
    pub const TARGET_REQUIRES_FEWER_ARGUMENTS: u32 = 2352;
    pub const CLASS_INCORRECTLY_EXTENDS_BASE: u32 = 2415;
    pub const CLASS_INCORRECTLY_IMPLEMENTS_INTERFACE: u32 = 2420;
    pub const INTERFACE_INCORRECTLY_EXTENDS_INTERFACE: u32 = 2430;
    pub const SOURCE_HAS_N_ELEMENTS_TARGET_ACCEPTS_M: u32 = 2618;
    pub const CANNOT_USE_NAMESPACE_AS_TYPE: u32 = 2709;
    pub const PROPERTY_MISSING_BUT_REQUIRED: u32 = 2741;
    pub const REFERS_TO_VALUE_USED_AS_TYPE: u32 = 2749;
    pub const PROPERTY_OPTIONAL_BUT_REQUIRED: u32 = 2327;
    pub const RETURN_TYPES_INCOMPATIBLE: u32 = 2202;
    pub const TYPE_ARGUMENTS_INCOMPATIBLE: u32 = 2203;
    pub const NO_UNION_MEMBER_MATCHES: u32 = 2204;
    pub const TYPE_HAS_NO_SIGNATURES: u32 = 2205;
    pub const EXCESSIVE_STACK_DEPTH: u32 = 2321;
    pub const INTERNAL_ERROR: u32 = 9000;
}

use diagnostic_codes as codes;

/// The message table.
pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: codes::DUPLICATE_IDENTIFIER,
        category: DiagnosticCategory::Error,
        message: "Duplicate identifier '{0}'.",
    },
    DiagnosticMessage {
        code: codes::CANNOT_FIND_NAME,
        category: DiagnosticCategory::Error,
        message: "Cannot find name '{0}'.",
    },
    DiagnosticMessage {
        code: codes::TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_BASE,
        category: DiagnosticCategory::Error,
        message: "Type '{0}' recursively references itself as a base type.",
    },
    DiagnosticMessage {
        code: codes::GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS,
        category: DiagnosticCategory::Error,
        message: "Generic type '{0}' requires {1} type argument(s).",
    },
    DiagnosticMessage {
        code: codes::TYPE_NOT_ASSIGNABLE,
        category: DiagnosticCategory::Error,
        message: "Type '{0}' is not assignable to type '{1}'.",
    },
    DiagnosticMessage {
        code: codes::TYPES_OF_PROPERTY_INCOMPATIBLE,
        category: DiagnosticCategory::Error,
        message: "Types of property '{0}' are incompatible.",
    },
    DiagnosticMessage {
        code: codes::PROPERTY_OPTIONAL_BUT_REQUIRED,
        category: DiagnosticCategory::Error,
        message: "Property '{0}' is optional in type '{1}' but required in type '{2}'.",
    },
    DiagnosticMessage {
        code: codes::TYPES_OF_PARAMETERS_INCOMPATIBLE,
        category: DiagnosticCategory::Error,
        message: "Types of parameters '{0}' and '{1}' are incompatible.",
    },
    DiagnosticMessage {
        code: codes::INDEX_SIGNATURE_MISSING,
        category: DiagnosticCategory::Error,
        message: "Index signature for type '{0}' is missing in type '{1}'.",
    },
    DiagnosticMessage {
        code: codes::TYPE_DOES_NOT_SATISFY_CONSTRAINT,
        category: DiagnosticCategory::Error,
        message: "Type '{0}' does not satisfy the constraint '{1}'.",
    },
    DiagnosticMessage {
        code: codes::NO_CALL_SIGNATURE_MATCH,
        category: DiagnosticCategory::Error,
        message: "Argument of type '{0}' is not assignable to parameter of type '{1}'.",
    },
    DiagnosticMessage {
        code: codes::TARGET_REQUIRES_FEWER_ARGUMENTS,
        category: DiagnosticCategory::Error,
        message: "Target signature provides too few arguments. Expected {0} or more, but got {1}.",
    },
    DiagnosticMessage {
        code: codes::CLASS_INCORRECTLY_EXTENDS_BASE,
        category: DiagnosticCategory::Error,
        message: "Class '{0}' incorrectly extends base class '{1}'.",
    },
    DiagnosticMessage {
        code: codes::CLASS_INCORRECTLY_IMPLEMENTS_INTERFACE,
        category: DiagnosticCategory::Error,
        message: "Class '{0}' incorrectly implements interface '{1}'.",
    },
    DiagnosticMessage {
        code: codes::INTERFACE_INCORRECTLY_EXTENDS_INTERFACE,
        category: DiagnosticCategory::Error,
        message: "Interface '{0}' incorrectly extends interface '{1}'.",
    },
    DiagnosticMessage {
        code: codes::SOURCE_HAS_N_ELEMENTS_TARGET_ACCEPTS_M,
        category: DiagnosticCategory::Error,
        message: "Source has {0} element(s) but target allows {1}.",
    },
    DiagnosticMessage {
        code: codes::CANNOT_USE_NAMESPACE_AS_TYPE,
        category: DiagnosticCategory::Error,
        message: "Cannot use namespace '{0}' as a type.",
    },
    DiagnosticMessage {
        code: codes::PROPERTY_MISSING_BUT_REQUIRED,
        category: DiagnosticCategory::Error,
        message: "Property '{0}' is missing in type '{1}' but required in type '{2}'.",
    },
    DiagnosticMessage {
        code: codes::REFERS_TO_VALUE_USED_AS_TYPE,
        category: DiagnosticCategory::Error,
        message: "'{0}' refers to a value, but is being used as a type here.",
    },
    DiagnosticMessage {
        code: codes::RETURN_TYPES_INCOMPATIBLE,
        category: DiagnosticCategory::Error,
        message: "Return types '{0}' and '{1}' are incompatible.",
    },
    DiagnosticMessage {
        code: codes::TYPE_ARGUMENTS_INCOMPATIBLE,
        category: DiagnosticCategory::Error,
        message: "Type argument {0} is incompatible: '{1}' is not related to '{2}'.",
    },
    DiagnosticMessage {
        code: codes::NO_UNION_MEMBER_MATCHES,
        category: DiagnosticCategory::Error,
        message: "Type '{0}' is not assignable to any member of '{1}'.",
    },
    DiagnosticMessage {
        code: codes::TYPE_HAS_NO_SIGNATURES,
        category: DiagnosticCategory::Error,
        message: "Type '{0}' provides no match for the signature '{1}'.",
    },
    DiagnosticMessage {
        code: codes::EXCESSIVE_STACK_DEPTH,
        category: DiagnosticCategory::Error,
        message: "Excessive stack depth comparing types '{0}' and '{1}'.",
    },
    DiagnosticMessage {
        code: codes::INTERNAL_ERROR,
        category: DiagnosticCategory::Error,
        message: "Internal error while checking '{0}': {1}",
    },
];

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
///
/// Returns the template string with `{0}`, `{1}`, etc. placeholders.
/// Use `format_message()` to fill in the placeholders.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

/// Get the category for a diagnostic code.
#[must_use]
pub fn get_diagnostic_category(code: u32) -> Option<DiagnosticCategory> {
    get_diagnostic_message(code).map(|m| m.category)
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
