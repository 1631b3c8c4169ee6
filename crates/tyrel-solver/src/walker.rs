//! Reachability walk over types and symbols.
//!
//! Used by tooling that needs everything a declaration mentions, such as
//! declaration emit. The walk is depth-first in discovery order and visits
//! each type and symbol once. The `accept` predicate prunes: a rejected
//! symbol is recorded but its types, bases and members are not walked.

use crate::env::TypeEnvironment;
use crate::recursion::ensure_sufficient_stack;
use crate::types::*;
use fixedbitset::FixedBitSet;
use tracing::trace;
use tyrel_binder::{SymbolId, symbol_flags};

/// Everything reached from a root, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkResult {
    pub visited_types: Vec<TypeId>,
    pub visited_symbols: Vec<SymbolId>,
}

pub struct SymbolWalker<'a, F>
where
    F: FnMut(SymbolId) -> bool,
{
    env: &'a TypeEnvironment,
    accept: F,
    seen_types: FixedBitSet,
    seen_symbols: FixedBitSet,
    /// Symbols the predicate turned down.
    rejected: FixedBitSet,
    result: WalkResult,
}

impl<'a, F> SymbolWalker<'a, F>
where
    F: FnMut(SymbolId) -> bool,
{
    pub fn new(env: &'a TypeEnvironment, accept: F) -> Self {
        SymbolWalker {
            env,
            accept,
            seen_types: FixedBitSet::with_capacity(env.interner().type_count()),
            seen_symbols: FixedBitSet::with_capacity(env.binder().symbols.len()),
            rejected: FixedBitSet::with_capacity(env.binder().symbols.len()),
            result: WalkResult::default(),
        }
    }

    /// Walk from `root` and return what this walk newly reached.
    ///
    /// Types and symbols reached by an earlier walk of the same walker are
    /// not reported again.
    pub fn walk_type(&mut self, root: TypeId) -> WalkResult {
        self.visit_type(root);
        std::mem::take(&mut self.result)
    }

    /// Walk from `root` and return what this walk newly reached.
    pub fn walk_symbol(&mut self, root: SymbolId) -> WalkResult {
        self.visit_symbol(root);
        std::mem::take(&mut self.result)
    }

    fn mark_type(&mut self, type_id: TypeId) -> bool {
        let index = type_id.0 as usize;
        if index >= self.seen_types.len() {
            // Walking can resolve lazy types and intern new ones.
            self.seen_types.grow(self.env.interner().type_count().max(index + 1));
        }
        if self.seen_types.put(index) {
            return false;
        }
        self.result.visited_types.push(type_id);
        true
    }

    fn mark_symbol(&mut self, symbol: SymbolId) -> bool {
        if symbol == SymbolId::NONE {
            return false;
        }
        let index = symbol.0 as usize;
        if index >= self.seen_symbols.len() {
            self.seen_symbols.grow(index + 1);
        }
        if self.seen_symbols.put(index) {
            return false;
        }
        self.result.visited_symbols.push(symbol);
        true
    }

    fn is_rejected(&self, symbol: SymbolId) -> bool {
        self.rejected.contains(symbol.0 as usize)
    }

    fn visit_type(&mut self, type_id: TypeId) {
        if !self.mark_type(type_id) {
            return;
        }
        ensure_sufficient_stack(|| self.visit_type_children(type_id));
    }

    fn visit_type_children(&mut self, type_id: TypeId) {
        let interner = self.env.interner();
        let Some(data) = interner.lookup(type_id) else {
            return;
        };
        match data {
            TypeData::Intrinsic(_) | TypeData::Literal(_) => {}
            TypeData::EnumLiteral(member, value) => {
                self.visit_symbol(member);
                self.visit_type(value);
            }
            TypeData::Union(list) | TypeData::Intersection(list) => {
                for &member in interner.type_list(list).iter() {
                    self.visit_type(member);
                }
            }
            TypeData::Array(element) => self.visit_type(element),
            TypeData::Tuple(list) => {
                for element in interner.tuple_list(list).iter() {
                    self.visit_type(element.type_id);
                }
            }
            TypeData::TypeParameter(param) => {
                if let Some(info) = interner.type_param_info(param) {
                    self.visit_symbol(info.symbol);
                    if let Some(constraint) = info.constraint {
                        self.visit_type(constraint);
                    }
                    if let Some(default) = info.default {
                        self.visit_type(default);
                    }
                }
            }
            TypeData::Object(shape_id) => {
                let shape = interner.object_shape(shape_id);
                self.visit_symbol(shape.symbol);
                if !self.is_rejected(shape.symbol) {
                    self.visit_shape(&shape);
                }
            }
            TypeData::Application(app_id) => {
                let Some(app) = interner.type_application(app_id) else {
                    return;
                };
                self.visit_symbol(app.target);
                for &arg in &app.args {
                    self.visit_type(arg);
                }
                if self.is_rejected(app.target) {
                    return;
                }
                // Members as seen through these type arguments.
                if let Some(shape) = self.env.resolve_shape(type_id) {
                    self.visit_shape(&shape);
                }
            }
            TypeData::Conditional(id) => {
                if let Some(cond) = interner.conditional_type(id) {
                    self.visit_type(cond.check_type);
                    self.visit_type(cond.extends_type);
                    self.visit_type(cond.true_type);
                    self.visit_type(cond.false_type);
                }
            }
            TypeData::Mapped(id) => {
                if let Some(mapped) = interner.mapped_type(id) {
                    self.visit_type(interner.type_param_type(mapped.type_param));
                    self.visit_type(mapped.constraint);
                    self.visit_type(mapped.template);
                }
            }
            TypeData::IndexAccess(object, index) => {
                self.visit_type(object);
                self.visit_type(index);
            }
            TypeData::KeyOf(operand) => self.visit_type(operand),
        }
    }

    fn visit_shape(&mut self, shape: &ObjectShape) {
        for prop in &shape.properties {
            self.visit_symbol(prop.symbol);
            self.visit_type(prop.type_id);
        }
        for &sig in shape.call_signatures.iter().chain(&shape.construct_signatures) {
            self.visit_signature(sig);
        }
        for index in shape.string_index.iter().chain(&shape.number_index) {
            self.visit_type(index.key_type);
            self.visit_type(index.value_type);
        }
    }

    fn visit_signature(&mut self, sig_id: SignatureId) {
        let interner = self.env.interner();
        let Some(sig) = interner.signature(sig_id) else {
            return;
        };
        for &param in &sig.type_params {
            self.visit_type(interner.type_param_type(param));
        }
        for param in &sig.params {
            self.visit_symbol(param.symbol);
            self.visit_type(param.type_id);
        }
        if let Some(this_type) = sig.this_type {
            self.visit_type(this_type);
        }
        self.visit_type(sig.return_type);
    }

    fn visit_symbol(&mut self, symbol: SymbolId) {
        if !self.mark_symbol(symbol) {
            return;
        }
        if !(self.accept)(symbol) {
            trace!(symbol = symbol.0, "walk pruned at symbol");
            self.rejected.grow(symbol.0 as usize + 1);
            self.rejected.insert(symbol.0 as usize);
            return;
        }
        ensure_sufficient_stack(|| self.visit_symbol_children(symbol));
    }

    fn visit_symbol_children(&mut self, symbol: SymbolId) {
        let env = self.env;
        let Some(sym) = env.symbol(symbol) else {
            return;
        };
        let flags = sym.flags;
        let children: Vec<SymbolId> = sym.members.ids().chain(sym.exports.ids()).collect();

        if flags & symbol_flags::TYPE != 0 {
            self.visit_type(env.get_declared_type_of_symbol(symbol));
            for &param in env.type_params_of(symbol).iter() {
                self.visit_type(env.interner().type_param_type(param));
            }
        }
        if flags & symbol_flags::VALUE != 0 {
            self.visit_type(env.get_type_of_symbol(symbol));
        }
        if flags & symbol_flags::HAS_STRUCTURE != 0 {
            for base in env.base_types(symbol).into_iter().chain(env.implemented_types(symbol)) {
                self.visit_type(base);
            }
        }
        for child in children {
            self.visit_symbol(child);
        }
    }
}

/// Walk from a type with every symbol accepted.
pub fn walk_type(env: &TypeEnvironment, root: TypeId) -> WalkResult {
    SymbolWalker::new(env, |_| true).walk_type(root)
}

/// Walk from a symbol with every symbol accepted.
pub fn walk_symbol(env: &TypeEnvironment, root: SymbolId) -> WalkResult {
    SymbolWalker::new(env, |_| true).walk_symbol(root)
}

#[cfg(test)]
#[path = "../tests/walker_tests.rs"]
mod tests;
