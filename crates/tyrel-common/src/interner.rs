//! String interner for property names, identifiers and literal values.
//!
//! Strings are interned into a single pool and passed around as `u32`
//! indices (`Atom`s). Comparing two names becomes an integer comparison, and
//! structural type keys that embed names stay `Copy` and cheap to hash.
//!
//! The interner is owned by one program snapshot. It is not shared across
//! threads; the type environment wraps it in a `RefCell`.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::rc::Rc;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Names that show up in almost every program. Interning them up front keeps
/// their atoms small and stable across runs.
const COMMON_STRINGS: &[&str] = &[
    "length",
    "value",
    "next",
    "name",
    "constructor",
    "prototype",
    "toString",
    "valueOf",
    "__call",
    "__new",
    "__index",
];

/// Single-threaded string interner.
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Rc<str>, Atom>,
    /// Vector of all interned strings (index 0 is empty string)
    strings: Vec<Rc<str>>,
}

impl Interner {
    /// Create a new interner with the empty string at index 0.
    pub fn new() -> Self {
        let empty: Rc<str> = Rc::from("");
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), Atom::NONE);
        Interner {
            map,
            strings: vec![empty],
        }
    }

    /// Intern a string, returning its atom.
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let rc: Rc<str> = Rc::from(s);
        let atom = Atom(self.strings.len() as u32);
        self.strings.push(rc.clone());
        self.map.insert(rc, atom);
        atom
    }

    /// Intern an owned string, avoiding a copy when it is new.
    pub fn intern_owned(&mut self, s: String) -> Atom {
        if let Some(&atom) = self.map.get(s.as_str()) {
            return atom;
        }
        let rc: Rc<str> = Rc::from(s);
        let atom = Atom(self.strings.len() as u32);
        self.strings.push(rc.clone());
        self.map.insert(rc, atom);
        atom
    }

    /// Look up an already interned string without inserting it.
    pub fn lookup(&self, s: &str) -> Option<Atom> {
        self.map.get(s).copied()
    }

    /// Resolve an atom back to its string.
    ///
    /// Unknown atoms resolve to the empty string.
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings.get(atom.0 as usize).map_or("", |s| s)
    }

    /// Resolve an atom to a shared handle, for callers that must outlive a borrow.
    pub fn resolve_shared(&self, atom: Atom) -> Rc<str> {
        self.strings
            .get(atom.0 as usize)
            .cloned()
            .unwrap_or_else(|| self.strings[0].clone())
    }

    /// Try to resolve an atom, returning None if invalid.
    pub fn try_resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| &**s)
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Pre-intern the common names.
    pub fn intern_common(&mut self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
