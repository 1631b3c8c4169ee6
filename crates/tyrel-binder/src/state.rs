//! Binder state: walks the declaration arena and builds merged symbols.
//!
//! Top-level declarations land in `globals`. Interface and class instance
//! members land in the owner's `members`; static class members, namespace
//! contents and enum members land in `exports`. Type parameters and
//! parameters land in the `locals` of the declaration that introduces them.

use crate::nodes::{Declaration, DeclarationArena, DeclarationKind, NodeIndex, VariableKind, modifier_flags};
use crate::symbols::{
    Symbol, SymbolArena, SymbolId, SymbolTable, escape_name, internal_names, symbol_flags,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace, warn};

/// How a `declare_symbol` call ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclareOutcome {
    /// No symbol of that name existed; a new one was created.
    Created,
    /// The declaration merged into an existing symbol.
    Merged,
    /// The declaration collides with an existing symbol. A detached symbol
    /// was created for it; `existing_declarations` are the declarations of
    /// the symbol it collided with.
    Conflict {
        existing: SymbolId,
        existing_declarations: Vec<NodeIndex>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclareResult {
    pub symbol: SymbolId,
    pub outcome: DeclareOutcome,
}

impl DeclareResult {
    /// Whether the declaration ended up in the table (created or merged).
    pub fn merge_succeeded(&self) -> bool {
        !matches!(self.outcome, DeclareOutcome::Conflict { .. })
    }
}

/// Where a declaration is being declared.
#[derive(Clone, Copy, Debug)]
enum Container {
    Globals,
    Members(SymbolId),
    Exports(SymbolId),
    Locals(NodeIndex),
}

pub struct BinderState {
    pub symbols: SymbolArena,
    pub globals: SymbolTable,
    /// Per-declaration scopes for type parameters and parameters.
    pub locals: FxHashMap<NodeIndex, SymbolTable>,
    /// Symbol of every bound declaration node.
    pub node_symbols: FxHashMap<NodeIndex, SymbolId>,
    /// Declaration nodes involved in a failed merge (both sides).
    conflicting_nodes: FxHashSet<NodeIndex>,
}

impl BinderState {
    pub fn new() -> Self {
        BinderState {
            symbols: SymbolArena::new(),
            globals: SymbolTable::new(),
            locals: FxHashMap::default(),
            node_symbols: FxHashMap::default(),
            conflicting_nodes: FxHashSet::default(),
        }
    }

    /// Bind every declaration reachable from the arena roots.
    pub fn bind(arena: &DeclarationArena) -> Self {
        let mut binder = BinderState::new();
        for root in arena.roots() {
            binder.bind_declaration(arena, root, Container::Globals);
        }
        debug!(
            symbols = binder.symbols.len(),
            globals = binder.globals.len(),
            conflicts = binder.conflicting_nodes.len(),
            "bound program"
        );
        binder
    }

    // =========================================================================
    // Declaration
    // =========================================================================

    /// Declare `declaration` under `name` in `table`, merging when the flag
    /// combination allows it.
    ///
    /// `name` is the user-facing name; it is escaped here. Synthetic member
    /// names (`__call`, `__new`, `__index`, `__constructor`) are passed with
    /// `synthetic = true` and stored verbatim.
    pub fn declare_symbol(
        &mut self,
        table: &mut SymbolTable,
        name: &str,
        synthetic: bool,
        flags: u32,
        declaration: NodeIndex,
    ) -> DeclareResult {
        let escaped = if synthetic {
            name.to_string()
        } else {
            escape_name(name)
        };

        if let Some(existing_id) = table.get(&escaped) {
            let existing_flags = self.symbols.get(existing_id).map_or(0, |s| s.flags);
            if Self::can_merge_flags(existing_flags, flags) {
                if let Some(sym) = self.symbols.get_mut(existing_id) {
                    sym.flags |= flags;
                    if sym.value_declaration.is_none() && (flags & symbol_flags::VALUE) != 0 {
                        sym.value_declaration = declaration;
                    }
                    if !sym.declarations.contains(&declaration) {
                        sym.declarations.push(declaration);
                    }
                }
                trace!(name = %escaped, existing_flags, flags, "merged declaration");
                self.node_symbols.insert(declaration, existing_id);
                return DeclareResult {
                    symbol: existing_id,
                    outcome: DeclareOutcome::Merged,
                };
            }

            // Conflict: record it on the existing symbol and give the new
            // declaration its own detached symbol so lookups by node still work.
            let existing_declarations = self
                .symbols
                .get(existing_id)
                .map(|s| s.declarations.clone())
                .unwrap_or_default();
            if let Some(sym) = self.symbols.get_mut(existing_id) {
                for &decl in &existing_declarations {
                    if !sym.conflicting_declarations.contains(&decl) {
                        sym.conflicting_declarations.push(decl);
                    }
                }
                sym.conflicting_declarations.push(declaration);
            }
            self.conflicting_nodes.extend(existing_declarations.iter().copied());
            self.conflicting_nodes.insert(declaration);
            debug!(
                name = %escaped,
                existing_flags,
                flags,
                "declaration conflicts with existing symbol"
            );

            let detached = self.alloc_symbol(escaped, flags, declaration);
            return DeclareResult {
                symbol: detached,
                outcome: DeclareOutcome::Conflict {
                    existing: existing_id,
                    existing_declarations,
                },
            };
        }

        let sym_id = self.alloc_symbol(escaped.clone(), flags, declaration);
        table.set(escaped, sym_id);
        DeclareResult {
            symbol: sym_id,
            outcome: DeclareOutcome::Created,
        }
    }

    fn alloc_symbol(&mut self, escaped: String, flags: u32, declaration: NodeIndex) -> SymbolId {
        let sym_id = self.symbols.alloc(flags, escaped);
        if let Some(sym) = self.symbols.get_mut(sym_id) {
            sym.declarations.push(declaration);
            if (flags & symbol_flags::VALUE) != 0 {
                sym.value_declaration = declaration;
            }
        }
        self.node_symbols.insert(declaration, sym_id);
        sym_id
    }

    /// Whether a declaration with `new_flags` may merge into a symbol that
    /// already carries `existing_flags`.
    pub fn can_merge_flags(existing_flags: u32, new_flags: u32) -> bool {
        use symbol_flags as f;

        if (existing_flags & f::INTERFACE) != 0 && (new_flags & f::INTERFACE) != 0 {
            return true;
        }

        if ((existing_flags & f::CLASS) != 0 && (new_flags & f::INTERFACE) != 0)
            || ((existing_flags & f::INTERFACE) != 0 && (new_flags & f::CLASS) != 0)
        {
            return true;
        }

        if (existing_flags & f::MODULE) != 0 && (new_flags & f::MODULE) != 0 {
            return true;
        }

        if (existing_flags & f::MODULE) != 0
            && (new_flags & (f::CLASS | f::FUNCTION | f::ENUM)) != 0
        {
            return true;
        }
        if (new_flags & f::MODULE) != 0
            && (existing_flags & (f::CLASS | f::FUNCTION | f::ENUM)) != 0
        {
            return true;
        }

        // Overloads
        if (existing_flags & f::FUNCTION) != 0 && (new_flags & f::FUNCTION) != 0 {
            return true;
        }
        if (existing_flags & f::METHOD) != 0 && (new_flags & f::METHOD) != 0 {
            return true;
        }
        if (existing_flags & f::SIGNATURE) != 0 && (new_flags & f::SIGNATURE) != 0 {
            return true;
        }
        if (existing_flags & f::CONSTRUCTOR) != 0 && (new_flags & f::CONSTRUCTOR) != 0 {
            return true;
        }

        if (existing_flags & f::ENUM) != 0 && (new_flags & f::ENUM) != 0 {
            return true;
        }

        // `var` redeclaration; `let`/`const` never merge.
        if existing_flags & f::VARIABLE == f::FUNCTION_SCOPED_VARIABLE
            && new_flags & f::VARIABLE == f::FUNCTION_SCOPED_VARIABLE
        {
            return true;
        }

        // Types and plain values live in separate declaration spaces.
        const PLAIN_VALUE: u32 = f::VARIABLE | f::FUNCTION | f::VALUE_MODULE;
        let type_only = f::INTERFACE | f::TYPE_ALIAS;
        if (existing_flags & type_only) != 0
            && (existing_flags & f::VALUE) == 0
            && (new_flags & PLAIN_VALUE) != 0
            && (new_flags & f::TYPE) == 0
        {
            return true;
        }
        if (new_flags & type_only) != 0
            && (existing_flags & PLAIN_VALUE) != 0
            && (existing_flags & f::TYPE) == 0
        {
            return true;
        }

        false
    }

    // =========================================================================
    // Binding walk
    // =========================================================================

    fn bind_declaration(&mut self, arena: &DeclarationArena, idx: NodeIndex, container: Container) {
        let Some(decl) = arena.get(idx) else {
            warn!(node = idx.0, "skipping dangling declaration handle");
            return;
        };

        let (name, synthetic) = Self::declared_name(decl);
        let flags = Self::declaration_flags(decl);
        let result = self.declare_in(container, &name, synthetic, flags, idx);
        let symbol = result.symbol;
        if let Some(sym) = self.symbols.get_mut(symbol) {
            if sym.parent.is_none() {
                sym.parent = match container {
                    Container::Members(owner) | Container::Exports(owner) => owner,
                    Container::Globals | Container::Locals(_) => SymbolId::NONE,
                };
            }
        }

        match &decl.kind {
            DeclarationKind::Interface {
                type_parameters,
                members,
                ..
            } => {
                self.bind_locals(arena, idx, type_parameters);
                for &member in members {
                    self.bind_declaration(arena, member, Container::Members(symbol));
                }
            }
            DeclarationKind::Class {
                type_parameters,
                members,
                ..
            } => {
                self.bind_locals(arena, idx, type_parameters);
                for &member in members {
                    let is_static = arena
                        .get(member)
                        .is_some_and(|m| m.has_modifier(modifier_flags::STATIC));
                    let target = if is_static {
                        Container::Exports(symbol)
                    } else {
                        Container::Members(symbol)
                    };
                    self.bind_declaration(arena, member, target);
                }
            }
            DeclarationKind::TypeAlias {
                type_parameters, ..
            } => self.bind_locals(arena, idx, type_parameters),
            DeclarationKind::Enum { members } => {
                for &member in members {
                    self.bind_declaration(arena, member, Container::Exports(symbol));
                }
            }
            DeclarationKind::Namespace { body } => {
                for &child in body {
                    self.bind_declaration(arena, child, Container::Exports(symbol));
                }
            }
            DeclarationKind::Function(sig)
            | DeclarationKind::Method(sig)
            | DeclarationKind::CallSignature(sig)
            | DeclarationKind::ConstructSignature(sig)
            | DeclarationKind::Constructor(sig) => {
                self.bind_locals(arena, idx, &sig.type_parameters);
                self.bind_locals(arena, idx, &sig.parameters);
            }
            DeclarationKind::EnumMember { .. }
            | DeclarationKind::Variable { .. }
            | DeclarationKind::Parameter { .. }
            | DeclarationKind::TypeParameter { .. }
            | DeclarationKind::Property { .. }
            | DeclarationKind::IndexSignature { .. } => {}
        }
    }

    fn bind_locals(&mut self, arena: &DeclarationArena, owner: NodeIndex, nodes: &[NodeIndex]) {
        for &node in nodes {
            self.bind_declaration(arena, node, Container::Locals(owner));
        }
    }

    fn declare_in(
        &mut self,
        container: Container,
        name: &str,
        synthetic: bool,
        flags: u32,
        declaration: NodeIndex,
    ) -> DeclareResult {
        // Tables are taken out while declaring so `declare_symbol` can borrow
        // the arena mutably.
        match container {
            Container::Globals => {
                let mut table = std::mem::take(&mut self.globals);
                let result = self.declare_symbol(&mut table, name, synthetic, flags, declaration);
                self.globals = table;
                result
            }
            Container::Locals(owner) => {
                let mut table = self.locals.remove(&owner).unwrap_or_default();
                let result = self.declare_symbol(&mut table, name, synthetic, flags, declaration);
                self.locals.insert(owner, table);
                result
            }
            Container::Members(owner) | Container::Exports(owner) => {
                let is_members = matches!(container, Container::Members(_));
                let mut table = self
                    .symbols
                    .get_mut(owner)
                    .map(|sym| {
                        if is_members {
                            std::mem::take(&mut sym.members)
                        } else {
                            std::mem::take(&mut sym.exports)
                        }
                    })
                    .unwrap_or_default();
                let result = self.declare_symbol(&mut table, name, synthetic, flags, declaration);
                if let Some(sym) = self.symbols.get_mut(owner) {
                    if is_members {
                        sym.members = table;
                    } else {
                        sym.exports = table;
                    }
                }
                result
            }
        }
    }

    fn declared_name(decl: &Declaration) -> (String, bool) {
        match decl.kind {
            DeclarationKind::CallSignature(_) => (internal_names::CALL.to_string(), true),
            DeclarationKind::ConstructSignature(_) => (internal_names::NEW.to_string(), true),
            DeclarationKind::IndexSignature { .. } => (internal_names::INDEX.to_string(), true),
            DeclarationKind::Constructor(_) => (internal_names::CONSTRUCTOR.to_string(), true),
            _ => (decl.name.clone(), false),
        }
    }

    fn declaration_flags(decl: &Declaration) -> u32 {
        use symbol_flags as f;

        let mut flags = match &decl.kind {
            DeclarationKind::Interface { .. } => f::INTERFACE,
            DeclarationKind::Class { .. } => f::CLASS,
            DeclarationKind::TypeAlias { .. } => f::TYPE_ALIAS,
            DeclarationKind::Enum { .. } => f::REGULAR_ENUM,
            DeclarationKind::EnumMember { .. } => f::ENUM_MEMBER,
            DeclarationKind::Namespace { .. } => f::VALUE_MODULE | f::NAMESPACE_MODULE,
            DeclarationKind::Function(_) => f::FUNCTION,
            DeclarationKind::Variable { kind, .. } => match kind {
                VariableKind::Var => f::FUNCTION_SCOPED_VARIABLE,
                VariableKind::Let | VariableKind::Const => f::BLOCK_SCOPED_VARIABLE,
            },
            DeclarationKind::Parameter { .. } => f::FUNCTION_SCOPED_VARIABLE | f::PARAMETER,
            DeclarationKind::TypeParameter { .. } => f::TYPE_PARAMETER,
            DeclarationKind::Property { .. } => f::PROPERTY,
            DeclarationKind::Method(_) => f::METHOD,
            DeclarationKind::CallSignature(_)
            | DeclarationKind::ConstructSignature(_)
            | DeclarationKind::IndexSignature { .. } => f::SIGNATURE,
            DeclarationKind::Constructor(_) => f::CONSTRUCTOR,
        };
        if decl.has_modifier(modifier_flags::STATIC) {
            flags |= f::STATIC;
        }
        if decl.has_modifier(modifier_flags::ABSTRACT) {
            flags |= f::ABSTRACT;
        }
        if decl.has_modifier(modifier_flags::OPTIONAL) {
            flags |= f::OPTIONAL;
        }
        if decl.has_modifier(modifier_flags::READONLY) {
            flags |= f::READONLY;
        }
        flags
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn get_node_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    /// Members (instance side) of a symbol.
    pub fn get_members(&self, id: SymbolId) -> Option<&SymbolTable> {
        self.symbols.get(id).map(|s| &s.members)
    }

    /// Exports (static side, namespace contents, enum members) of a symbol.
    pub fn get_exports(&self, id: SymbolId) -> Option<&SymbolTable> {
        self.symbols.get(id).map(|s| &s.exports)
    }

    /// Whether any declaration of this symbol failed to merge.
    pub fn is_merge_error(&self, id: SymbolId) -> bool {
        self.symbols
            .get(id)
            .is_some_and(|s| !s.conflicting_declarations.is_empty())
    }

    /// Declarations that collided with this symbol, in binding order.
    pub fn conflicting_declarations(&self, id: SymbolId) -> &[NodeIndex] {
        self.symbols
            .get(id)
            .map_or(&[][..], |s| s.conflicting_declarations.as_slice())
    }

    /// Whether this declaration node took part in a failed merge.
    pub fn is_conflicting_node(&self, node: NodeIndex) -> bool {
        self.conflicting_nodes.contains(&node)
    }

    /// Resolve an unqualified name from `location` outward.
    ///
    /// Walks the locals of every enclosing declaration (and the exports of
    /// enclosing namespaces), then the globals. Only symbols whose flags
    /// intersect `meaning` are returned.
    pub fn resolve_name(
        &self,
        arena: &DeclarationArena,
        name: &str,
        location: NodeIndex,
        meaning: u32,
    ) -> Option<SymbolId> {
        let escaped = escape_name(name);
        let mut current = location;
        while current.is_some() {
            if let Some(id) = self.locals.get(&current).and_then(|t| t.get(&escaped)) {
                if self.symbol_has_meaning(id, meaning) {
                    return Some(id);
                }
            }
            if let Some(decl) = arena.get(current) {
                if matches!(decl.kind, DeclarationKind::Namespace { .. }) {
                    if let Some(id) = self
                        .get_node_symbol(current)
                        .and_then(|ns| self.get_exports(ns))
                        .and_then(|exports| exports.get(&escaped))
                    {
                        if self.symbol_has_meaning(id, meaning) {
                            return Some(id);
                        }
                    }
                }
            }
            current = arena.parent(current);
        }
        self.globals
            .get(&escaped)
            .filter(|&id| self.symbol_has_meaning(id, meaning))
    }

    /// Resolve a qualified name (`A.B.C`). Every segment but the last must
    /// resolve to a namespace-like symbol; the last is looked up in its exports.
    pub fn resolve_qualified_name(
        &self,
        arena: &DeclarationArena,
        path: &[String],
        location: NodeIndex,
        meaning: u32,
    ) -> Option<SymbolId> {
        let (last, prefix) = path.split_last()?;
        if prefix.is_empty() {
            return self.resolve_name(arena, last, location, meaning);
        }
        let mut container =
            self.resolve_name(arena, &prefix[0], location, symbol_flags::NAMESPACE)?;
        for segment in &prefix[1..] {
            container = self
                .get_exports(container)?
                .get(&escape_name(segment))
                .filter(|&id| self.symbol_has_meaning(id, symbol_flags::NAMESPACE))?;
        }
        self.get_exports(container)?
            .get(&escape_name(last))
            .filter(|&id| self.symbol_has_meaning(id, meaning))
    }

    fn symbol_has_meaning(&self, id: SymbolId, meaning: u32) -> bool {
        self.symbols.get(id).is_some_and(|s| s.flags & meaning != 0)
    }

    /// The chain of enclosing namespace/enum/class names of a symbol,
    /// outermost first, ending with the symbol's own name.
    pub fn qualified_name(&self, id: SymbolId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(sym) = self.symbols.get(current) {
            path.push(sym.name().to_string());
            current = sym.parent;
        }
        path.reverse();
        path
    }
}

impl Default for BinderState {
    fn default() -> Self {
        Self::new()
    }
}
