//! Union and intersection distribution.
//!
//! - Source union: every member must relate (some member under `Comparable`).
//! - Target union: the source must relate to some member.
//! - Target intersection: the source must relate to every member.
//! - Source intersection: some member must relate; the merged structure is
//!   tried afterwards by the caller.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{RelationKind, TypeId};

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_union_source(&mut self, members: &[TypeId], target: TypeId) -> SubtypeResult {
        if self.relation == RelationKind::Comparable {
            return self.check_some_source_member(members, target);
        }
        for &member in members {
            let result = self.check_subtype(member, target);
            if result.is_false() {
                return result;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn check_union_target(&mut self, source: TypeId, members: &[TypeId]) -> SubtypeResult {
        if members.contains(&source) {
            return SubtypeResult::True;
        }
        let mut depth_exceeded = false;
        for &member in members {
            match self.check_subtype(source, member) {
                result if result.is_true() => return SubtypeResult::True,
                SubtypeResult::DepthExceeded => depth_exceeded = true,
                _ => {}
            }
        }
        if depth_exceeded {
            SubtypeResult::DepthExceeded
        } else {
            SubtypeResult::False
        }
    }

    pub(crate) fn check_intersection_target(&mut self, source: TypeId, members: &[TypeId]) -> SubtypeResult {
        for &member in members {
            let result = self.check_subtype(source, member);
            if result.is_false() {
                return result;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn check_intersection_source(&mut self, members: &[TypeId], target: TypeId) -> SubtypeResult {
        self.check_some_source_member(members, target)
    }

    fn check_some_source_member(&mut self, members: &[TypeId], target: TypeId) -> SubtypeResult {
        for &member in members {
            if self.check_subtype(member, target).is_true() {
                return SubtypeResult::True;
            }
        }
        SubtypeResult::False
    }
}
