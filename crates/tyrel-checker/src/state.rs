//! The checker and its query surface.
//!
//! `Checker` owns the `TypeEnvironment` of one program snapshot. Every query
//! takes `&self`: lazy resolution inside the environment uses interior
//! mutability, so hosts can interleave queries freely on one thread.

use crate::error::CheckerError;
use tyrel_binder::{DeclarationArena, NodeIndex, SymbolId, TypeNode};
use tyrel_common::options::CheckerOptions;
use tyrel_solver::{
    CallArgument, Program, PropertyInfo, RelationKind, RelationStats, SignatureId, SignatureKind,
    SubtypeFailureReason, TypeEnvironment, TypeFormatFlags, TypeId,
};

pub struct Checker {
    env: TypeEnvironment,
}

impl Checker {
    /// Bind `arena` and create a checker for the resulting program.
    pub fn new(arena: DeclarationArena, options: CheckerOptions) -> Self {
        Self::from_program(Program::bind(arena), options)
    }

    pub fn from_program(program: Program, options: CheckerOptions) -> Self {
        Checker {
            env: TypeEnvironment::with_program(program, options),
        }
    }

    #[inline]
    pub fn env(&self) -> &TypeEnvironment {
        &self.env
    }

    #[inline]
    pub fn options(&self) -> &CheckerOptions {
        self.env.options()
    }

    pub fn stats(&self) -> RelationStats {
        self.env.stats()
    }

    // =========================================================================
    // Locations and symbols
    // =========================================================================

    /// Type of a declaration: declared type for interfaces, classes, aliases,
    /// enums and type parameters, value type for everything else.
    pub fn get_type_at_location(&self, node: NodeIndex) -> TypeId {
        self.env.get_type_at_location(node)
    }

    pub fn get_symbol_at_location(&self, node: NodeIndex) -> Option<SymbolId> {
        self.env.binder().get_node_symbol(node)
    }

    pub fn get_type_of_symbol(&self, symbol: SymbolId) -> TypeId {
        self.env.get_type_of_symbol(symbol)
    }

    pub fn get_declared_type_of_symbol(&self, symbol: SymbolId) -> TypeId {
        self.env.get_declared_type_of_symbol(symbol)
    }

    /// Resolve an annotation written on the declaration `location`.
    pub fn get_type_from_type_node(&self, node: &TypeNode, location: NodeIndex) -> TypeId {
        self.env.get_type_from_type_node(node, location)
    }

    // =========================================================================
    // Relations
    // =========================================================================

    pub fn is_type_assignable_to(&self, source: TypeId, target: TypeId) -> bool {
        tyrel_solver::is_type_assignable_to(&self.env, source, target)
    }

    pub fn is_type_comparable_to(&self, source: TypeId, target: TypeId) -> bool {
        tyrel_solver::is_type_comparable_to(&self.env, source, target)
    }

    pub fn is_type_identical_to(&self, source: TypeId, target: TypeId) -> bool {
        tyrel_solver::is_type_identical_to(&self.env, source, target)
    }

    pub fn is_type_subtype_of(&self, source: TypeId, target: TypeId) -> bool {
        tyrel_solver::is_type_subtype_of(&self.env, source, target)
    }

    pub fn is_type_related_to(&self, source: TypeId, target: TypeId, relation: RelationKind) -> bool {
        tyrel_solver::is_type_related_to(&self.env, source, target, relation)
    }

    /// Why `source` does not relate to `target`, or `None` when it does.
    pub fn explain_relation(
        &self,
        source: TypeId,
        target: TypeId,
        relation: RelationKind,
    ) -> Option<SubtypeFailureReason> {
        tyrel_solver::explain_relation(&self.env, source, target, relation)
    }

    // =========================================================================
    // Members and signatures
    // =========================================================================

    pub fn get_signatures_of_type(&self, type_id: TypeId, kind: SignatureKind) -> Vec<SignatureId> {
        self.env.get_signatures_of_type(type_id, kind)
    }

    pub fn get_properties_of_type(&self, type_id: TypeId) -> Vec<PropertyInfo> {
        self.env.get_properties_of_type(type_id)
    }

    pub fn get_property_of_type(&self, type_id: TypeId, name: &str) -> Option<PropertyInfo> {
        self.env.get_property_of_type(type_id, name)
    }

    // =========================================================================
    // Inference
    // =========================================================================

    /// Infer the type arguments of a call to `signature`.
    pub fn infer_type_arguments(
        &self,
        signature: SignatureId,
        args: &[CallArgument],
        return_context: Option<TypeId>,
    ) -> Vec<TypeId> {
        tyrel_solver::infer_type_arguments(&self.env, signature, args, return_context)
    }

    /// Infer the type arguments of a call to the function, method or
    /// signature declared at `declaration`.
    pub fn infer_type_arguments_for_declaration(
        &self,
        declaration: NodeIndex,
        args: &[CallArgument],
        return_context: Option<TypeId>,
    ) -> Result<Vec<TypeId>, CheckerError> {
        let signature = self.env.signature_of_declaration(declaration)?;
        Ok(self.infer_type_arguments(signature, args, return_context))
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Syntax-shaped form of a type as written from inside `enclosing`.
    pub fn type_to_type_node(&self, type_id: TypeId, enclosing: Option<NodeIndex>, flags: TypeFormatFlags) -> TypeNode {
        tyrel_solver::type_to_type_node(&self.env, type_id, enclosing, flags)
    }

    pub fn type_to_string(&self, type_id: TypeId) -> String {
        tyrel_solver::type_to_string(&self.env, type_id)
    }

    pub fn signature_to_string(&self, signature: SignatureId) -> String {
        tyrel_solver::signature_to_string(&self.env, signature)
    }
}

#[cfg(test)]
#[path = "../tests/state_tests.rs"]
mod tests;
