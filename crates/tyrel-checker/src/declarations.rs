//! Declaration checking.
//!
//! `check_program` visits the top-level declarations in creation order and
//! descends into their members, parameters, type parameters and namespace
//! bodies. Each top-level declaration is checked in isolation: an internal
//! invariant violation met while checking it is reported as an internal
//! error on that declaration, and the pass moves on to the next one.

use crate::cancellation::CancellationToken;
use crate::error::CheckerError;
use crate::state::Checker;
use serde::Serialize;
use tracing::{debug, debug_span, warn};
use tyrel_binder::{DeclarationKind, NodeIndex, TypeNode};
use tyrel_common::diagnostics::{Diagnostic, diagnostic_codes};
use tyrel_solver::{RelationStats, SolverError};

/// Diagnostics of one `check_program` run.
#[derive(Clone, Debug, Serialize)]
pub struct CheckReport {
    pub diagnostics: Vec<Diagnostic>,
    pub stats: RelationStats,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn to_json(&self) -> Result<String, CheckerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Checker {
    /// Check every declaration of the program.
    ///
    /// `token` is polled before each top-level declaration.
    pub fn check_program(&self, token: &CancellationToken) -> Result<CheckReport, CheckerError> {
        let roots = self.env().arena().roots();
        let mut diagnostics = Vec::new();
        for (checked, &root) in roots.iter().enumerate() {
            if token.is_cancelled() {
                debug!(checked, "check cancelled");
                return Err(CheckerError::Cancelled { checked });
            }
            diagnostics.extend(self.check_declaration(root));
        }
        diagnostics.sort_by_key(|d| d.node);
        Ok(CheckReport {
            diagnostics,
            stats: self.stats(),
        })
    }

    /// Check one declaration and everything nested in it.
    pub fn check_declaration(&self, node: NodeIndex) -> Vec<Diagnostic> {
        let name = self
            .env()
            .arena()
            .get(node)
            .map_or_else(String::new, |d| d.name.clone());
        let span = debug_span!("check_declaration", node = node.0, name = %name);
        let _enter = span.enter();

        let mut diagnostics = Vec::new();
        let outcome = self.check_node(node, &mut diagnostics);
        diagnostics.extend(self.env().take_diagnostics());

        let mut violations = self.env().take_violations();
        if let Err(error) = outcome {
            violations.insert(0, error);
        }
        if let Some(first) = violations.first() {
            for extra in &violations[1..] {
                warn!(error = %extra, "additional violation in the same declaration");
            }
            let message = first.to_string();
            diagnostics.push(Diagnostic::from_code(
                node.0,
                diagnostic_codes::INTERNAL_ERROR,
                &[name.as_str(), message.as_str()],
            ));
        }
        diagnostics
    }

    fn check_node(&self, node: NodeIndex, diagnostics: &mut Vec<Diagnostic>) -> Result<(), SolverError> {
        let env = self.env();
        let decl = env
            .arena()
            .get(node)
            .ok_or(SolverError::MissingDeclaration(node.0))?;

        if env.binder().is_conflicting_node(node) {
            diagnostics.push(Diagnostic::from_code(
                node.0,
                diagnostic_codes::DUPLICATE_IDENTIFIER,
                &[decl.name.as_str()],
            ));
        }

        for annotation in annotations(&decl.kind) {
            env.get_type_from_type_node(annotation, node);
            self.check_type_arguments_in(annotation, node, diagnostics);
        }

        match &decl.kind {
            DeclarationKind::Interface { .. } => self.check_interface_heritage(node, diagnostics),
            DeclarationKind::Class { .. } => self.check_class_heritage(node, diagnostics),
            DeclarationKind::Function(_)
            | DeclarationKind::Method(_)
            | DeclarationKind::CallSignature(_)
            | DeclarationKind::ConstructSignature(_)
            | DeclarationKind::Constructor(_) => {
                env.signature_of_declaration(node)?;
            }
            DeclarationKind::Variable { .. } | DeclarationKind::EnumMember { .. } => {
                if let Some(symbol) = env.binder().get_node_symbol(node) {
                    env.get_type_of_symbol(symbol);
                }
            }
            _ => {}
        }
        self.bail_on_violation()?;

        for child in decl.kind.children() {
            self.check_node(child, diagnostics)?;
        }
        Ok(())
    }

    /// Stop checking the current declaration once the solver recorded a violation.
    fn bail_on_violation(&self) -> Result<(), SolverError> {
        let mut violations = self.env().take_violations();
        if violations.is_empty() {
            return Ok(());
        }
        let first = violations.remove(0);
        for extra in violations {
            warn!(error = %extra, "additional violation in the same declaration");
        }
        Err(first)
    }
}

/// Type annotations written directly on a declaration.
fn annotations(kind: &DeclarationKind) -> Vec<&TypeNode> {
    match kind {
        DeclarationKind::Interface { extends, .. } => extends.iter().collect(),
        DeclarationKind::Class {
            extends, implements, ..
        } => extends.iter().chain(implements).collect(),
        DeclarationKind::TypeAlias { ty, .. } => vec![ty],
        DeclarationKind::Variable { ty, .. }
        | DeclarationKind::Parameter { ty }
        | DeclarationKind::Property { ty } => ty.iter().collect(),
        DeclarationKind::TypeParameter { constraint, default } => constraint.iter().chain(default).collect(),
        DeclarationKind::IndexSignature { parameter_type, ty } => vec![parameter_type, ty],
        DeclarationKind::Function(sig)
        | DeclarationKind::Method(sig)
        | DeclarationKind::CallSignature(sig)
        | DeclarationKind::ConstructSignature(sig)
        | DeclarationKind::Constructor(sig) => sig.this_type.iter().chain(&sig.return_type).collect(),
        DeclarationKind::Enum { .. } | DeclarationKind::EnumMember { .. } | DeclarationKind::Namespace { .. } => {
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "../tests/declarations_tests.rs"]
mod tests;
