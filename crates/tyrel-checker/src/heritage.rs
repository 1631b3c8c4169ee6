//! `extends` and `implements` clauses.
//!
//! A derived interface or class must stay assignable to each of its bases
//! after its own members override the inherited ones, and a class must be
//! assignable to every interface it implements. A declaration whose bases
//! loop back to itself is reported once and not related further.

use crate::state::Checker;
use tracing::debug;
use tyrel_binder::{NodeIndex, SymbolId};
use tyrel_common::diagnostics::{Diagnostic, diagnostic_codes};
use tyrel_solver::{RelationKind, TypeId};

impl Checker {
    pub(crate) fn check_interface_heritage(&self, node: NodeIndex, diagnostics: &mut Vec<Diagnostic>) {
        let Some(symbol) = self.get_symbol_at_location(node) else {
            return;
        };
        if self.report_circular_base(node, symbol, diagnostics) {
            return;
        }
        let derived = self.get_declared_type_of_symbol(symbol);
        for base in self.env().base_types(symbol) {
            self.check_heritage_relation(
                node,
                derived,
                base,
                diagnostic_codes::INTERFACE_INCORRECTLY_EXTENDS_INTERFACE,
                diagnostics,
            );
        }
    }

    pub(crate) fn check_class_heritage(&self, node: NodeIndex, diagnostics: &mut Vec<Diagnostic>) {
        let Some(symbol) = self.get_symbol_at_location(node) else {
            return;
        };
        if self.report_circular_base(node, symbol, diagnostics) {
            return;
        }
        let instance = self.get_declared_type_of_symbol(symbol);
        for base in self.env().base_types(symbol) {
            self.check_heritage_relation(
                node,
                instance,
                base,
                diagnostic_codes::CLASS_INCORRECTLY_EXTENDS_BASE,
                diagnostics,
            );
        }
        for implemented in self.env().implemented_types(symbol) {
            self.check_heritage_relation(
                node,
                instance,
                implemented,
                diagnostic_codes::CLASS_INCORRECTLY_IMPLEMENTS_INTERFACE,
                diagnostics,
            );
        }
    }

    /// Resolve the structure of `symbol` and report a base cycle through it.
    fn report_circular_base(&self, node: NodeIndex, symbol: SymbolId, diagnostics: &mut Vec<Diagnostic>) -> bool {
        let declared = self.get_declared_type_of_symbol(symbol);
        self.env().resolve_shape(declared);
        if !self.env().has_circular_base(symbol) {
            return false;
        }
        let name = self.type_to_string(declared);
        diagnostics.push(Diagnostic::from_code(
            node.0,
            diagnostic_codes::TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_BASE,
            &[name.as_str()],
        ));
        true
    }

    fn check_heritage_relation(
        &self,
        node: NodeIndex,
        derived: TypeId,
        base: TypeId,
        code: u32,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        // Unresolved bases were already reported while lowering.
        if base.is_error() || self.is_type_assignable_to(derived, base) {
            return;
        }
        let derived_name = self
            .env()
            .arena()
            .get(node)
            .map_or_else(|| self.type_to_string(derived), |d| d.name.clone());
        let base_name = self.type_to_string(base);
        debug!(derived = %derived_name, base = %base_name, code, "incompatible heritage clause");

        let mut diagnostic = Diagnostic::from_code(node.0, code, &[derived_name.as_str(), base_name.as_str()]);
        if let Some(reason) = self.explain_relation(derived, base, RelationKind::Assignable) {
            for (line_code, message) in reason.elaborations(self.env()) {
                diagnostic = diagnostic.with_related(node.0, line_code, message);
            }
        }
        diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
#[path = "../tests/heritage_tests.rs"]
mod tests;
