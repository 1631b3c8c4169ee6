//! Structural object comparison.
//!
//! Every property of the target must be matched by the source:
//!
//! - a missing source property is fine only when the target's is optional;
//! - an optional source property cannot satisfy a required target property
//!   (except under `Comparable`);
//! - optional properties read as `T | undefined` under strict null checks;
//! - properties declared with method syntax compare their signatures with
//!   bivariant parameters.
//!
//! A target string index signature must be satisfied by every source
//! property and index signature. Anonymous source shapes get an implicit
//! index signature; interfaces and classes do not. A target number index
//! signature covers numerically named properties only.

use crate::evaluate::is_numeric_name;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_structural(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        let Some(target_shape) = self.env.resolve_shape(target) else {
            return SubtypeResult::False;
        };
        let Some(source_shape) = self.env.resolve_shape(source) else {
            return SubtypeResult::False;
        };
        self.check_object_shapes(&source_shape, &target_shape)
    }

    pub(crate) fn check_object_shapes(&mut self, source: &ObjectShape, target: &ObjectShape) -> SubtypeResult {
        for target_prop in &target.properties {
            let result = self.check_property(source, target_prop);
            if result.is_false() {
                return result;
            }
        }
        if let Some(index) = target.string_index {
            let result = self.check_string_index(source, index);
            if result.is_false() {
                return result;
            }
        }
        if let Some(index) = target.number_index {
            let result = self.check_number_index(source, index);
            if result.is_false() {
                return result;
            }
        }
        let result = self.check_signature_lists(&source.call_signatures, &target.call_signatures, false);
        if result.is_false() {
            return result;
        }
        self.check_signature_lists(&source.construct_signatures, &target.construct_signatures, false)
    }

    pub(crate) fn check_property(&mut self, source: &ObjectShape, target_prop: &PropertyInfo) -> SubtypeResult {
        let Some(source_prop) = source.find_property(target_prop.name) else {
            return SubtypeResult::from_bool(target_prop.optional);
        };
        if source_prop.optional && !target_prop.optional && self.relation != RelationKind::Comparable {
            return SubtypeResult::False;
        }
        self.check_property_types(source_prop, target_prop)
    }

    pub(crate) fn check_property_types(&mut self, source_prop: &PropertyInfo, target_prop: &PropertyInfo) -> SubtypeResult {
        if target_prop.is_method {
            // Optionality was settled by the caller; compare the declared function types.
            return self.check_method_types(source_prop.type_id, target_prop.type_id);
        }
        let source_type = self.read_type(source_prop);
        let target_type = self.read_type(target_prop);
        self.check_subtype(source_type, target_type)
    }

    /// The type observed when reading a property.
    pub(crate) fn read_type(&self, prop: &PropertyInfo) -> TypeId {
        if prop.optional && self.strict_null_checks {
            self.env.interner().union2(prop.type_id, TypeId::UNDEFINED)
        } else {
            prop.type_id
        }
    }

    /// Method-typed properties compare call signatures bivariantly. The
    /// comparison bypasses the relation cache so the looser answer is never
    /// stored for the function types themselves.
    pub(crate) fn check_method_types(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if let Some(result) = self.fast_path(source, target) {
            return result;
        }
        let (Some(source_shape), Some(target_shape)) = (self.env.resolve_shape(source), self.env.resolve_shape(target)) else {
            return self.check_subtype(source, target);
        };
        if target_shape.call_signatures.is_empty() || !target_shape.properties.is_empty() {
            return self.check_subtype(source, target);
        }
        self.check_signature_lists(&source_shape.call_signatures, &target_shape.call_signatures, true)
    }

    fn check_string_index(&mut self, source: &ObjectShape, target_index: IndexInfo) -> SubtypeResult {
        let target_value = target_index.value_type;
        match source.string_index {
            Some(source_index) => {
                let result = self.check_subtype(source_index.value_type, target_value);
                if result.is_false() {
                    return result;
                }
            }
            None if !self.has_implicit_index(source) => return SubtypeResult::False,
            None => {}
        }
        for prop in &source.properties {
            let value = self.read_type(prop);
            let result = self.check_subtype(value, target_value);
            if result.is_false() {
                return result;
            }
        }
        if let Some(number_index) = source.number_index {
            return self.check_subtype(number_index.value_type, target_value);
        }
        SubtypeResult::True
    }

    fn check_number_index(&mut self, source: &ObjectShape, target_index: IndexInfo) -> SubtypeResult {
        let target_value = target_index.value_type;
        match source.number_index.or(source.string_index) {
            Some(source_index) => {
                let result = self.check_subtype(source_index.value_type, target_value);
                if result.is_false() {
                    return result;
                }
            }
            None if !self.has_implicit_index(source) => return SubtypeResult::False,
            None => {}
        }
        let interner = self.env.interner();
        for prop in &source.properties {
            if !is_numeric_name(&interner.resolve_atom(prop.name)) {
                continue;
            }
            let value = self.read_type(prop);
            let result = self.check_subtype(value, target_value);
            if result.is_false() {
                return result;
            }
        }
        SubtypeResult::True
    }

    /// Anonymous object shapes are open to index signatures; interfaces and
    /// classes must declare one.
    pub(crate) fn has_implicit_index(&self, shape: &ObjectShape) -> bool {
        !shape
            .flags
            .intersects(ObjectFlags::INTERFACE | ObjectFlags::CLASS)
    }
}
