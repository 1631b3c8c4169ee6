//! The program-owning type environment.
//!
//! `TypeEnvironment` is the one context object every algorithm takes by
//! reference: the interner, the bound program, the per-symbol lazy links and
//! every memo table live here. There is no global state, so independent
//! environments (one per test, one per program snapshot) never interact.
//!
//! The environment is single-threaded: lazy fields use `RefCell`/`Cell`, and
//! the type is `!Sync` by construction.

use crate::error::SolverError;
use crate::instantiate::TypeMapper;
use crate::intern::TypeInterner;
use crate::types::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::warn;
use tyrel_binder::{BinderState, DeclarationArena, NodeIndex, Symbol, SymbolId};
use tyrel_common::diagnostics::Diagnostic;
use tyrel_common::options::CheckerOptions;

/// A bound program: the declarations and the symbols built from them.
pub struct Program {
    pub arena: DeclarationArena,
    pub binder: BinderState,
}

impl Program {
    pub fn new(arena: DeclarationArena, binder: BinderState) -> Self {
        Program { arena, binder }
    }

    /// Bind `arena` and wrap the result.
    pub fn bind(arena: DeclarationArena) -> Self {
        let binder = BinderState::bind(&arena);
        Program { arena, binder }
    }

    pub fn empty() -> Self {
        Program {
            arena: DeclarationArena::new(),
            binder: BinderState::new(),
        }
    }
}

/// Lazily resolved per-symbol state.
#[derive(Default)]
pub(crate) struct SymbolLinks {
    /// Value-side type.
    pub type_of: ResolutionState<TypeId>,
    /// Type-side type (interfaces, classes, aliases, enums, type parameters).
    pub declared_type: ResolutionState<TypeId>,
    /// Own object structure of an interface or class, with bases merged in.
    pub structure: ResolutionState<TypeId>,
    /// Positional type parameters of an interface, class or alias.
    pub type_params: Option<Rc<[TypeParamId]>>,
}

/// Counters for guard trips and cache activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RelationStats {
    pub relation_queries: u64,
    pub relation_cache_hits: u64,
    pub depth_limit_hits: u64,
    pub instantiation_limit_hits: u64,
    pub evaluation_limit_hits: u64,
}

#[derive(Default)]
struct StatCells {
    relation_queries: Cell<u64>,
    relation_cache_hits: Cell<u64>,
    depth_limit_hits: Cell<u64>,
    instantiation_limit_hits: Cell<u64>,
    evaluation_limit_hits: Cell<u64>,
}

fn bump(cell: &Cell<u64>) {
    cell.set(cell.get().saturating_add(1));
}

#[derive(Default)]
struct MapperTable {
    items: Vec<Rc<TypeMapper>>,
    map: FxHashMap<Rc<TypeMapper>, MapperId>,
}

pub struct TypeEnvironment {
    interner: TypeInterner,
    options: CheckerOptions,
    program: Program,

    links: RefCell<FxHashMap<SymbolId, SymbolLinks>>,

    pub(crate) relation_cache: RefCell<FxHashMap<(TypeId, TypeId, RelationKind), bool>>,
    pub(crate) instantiation_cache: RefCell<FxHashMap<(TypeId, MapperId), TypeId>>,
    mappers: RefCell<MapperTable>,
    /// Interface and class applications to their instantiated members.
    pub(crate) expansion_cache: RefCell<FxHashMap<TypeApplicationId, TypeId>>,
    /// Alias applications to their instantiated bodies.
    pub(crate) alias_cache: RefCell<FxHashMap<TypeApplicationId, TypeId>>,
    pub(crate) evaluation_cache: RefCell<FxHashMap<TypeId, TypeId>>,
    pub(crate) signature_of_node: RefCell<FxHashMap<NodeIndex, SignatureId>>,

    pub(crate) variances: RefCell<FxHashMap<(SymbolId, RelationKind), Rc<[Variance]>>>,
    pub(crate) variance_computing: RefCell<FxHashSet<SymbolId>>,
    pub(crate) variance_markers: Cell<Option<(TypeId, TypeId, TypeId)>>,
    circular_bases: RefCell<FxHashSet<SymbolId>>,

    violations: RefCell<Vec<SolverError>>,
    diagnostics: RefCell<Vec<Diagnostic>>,
    diagnostic_keys: RefCell<FxHashSet<(u32, u32, String)>>,

    stats: StatCells,
    pub(crate) instantiation_depth: Cell<u32>,
    pub(crate) evaluation_depth: Cell<u32>,
}

impl TypeEnvironment {
    /// An environment without declarations, for pure type-graph work.
    pub fn new(options: CheckerOptions) -> Self {
        Self::with_program(Program::empty(), options)
    }

    /// Bind `arena` and build an environment over it.
    pub fn from_arena(arena: DeclarationArena, options: CheckerOptions) -> Self {
        Self::with_program(Program::bind(arena), options)
    }

    pub fn with_program(program: Program, options: CheckerOptions) -> Self {
        TypeEnvironment {
            interner: TypeInterner::new(),
            options: options.apply_strict_defaults(),
            program,
            links: RefCell::new(FxHashMap::default()),
            relation_cache: RefCell::new(FxHashMap::default()),
            instantiation_cache: RefCell::new(FxHashMap::default()),
            mappers: RefCell::new(MapperTable::default()),
            expansion_cache: RefCell::new(FxHashMap::default()),
            alias_cache: RefCell::new(FxHashMap::default()),
            evaluation_cache: RefCell::new(FxHashMap::default()),
            signature_of_node: RefCell::new(FxHashMap::default()),
            variances: RefCell::new(FxHashMap::default()),
            variance_computing: RefCell::new(FxHashSet::default()),
            variance_markers: Cell::new(None),
            circular_bases: RefCell::new(FxHashSet::default()),
            violations: RefCell::new(Vec::new()),
            diagnostics: RefCell::new(Vec::new()),
            diagnostic_keys: RefCell::new(FxHashSet::default()),
            stats: StatCells::default(),
            instantiation_depth: Cell::new(0),
            evaluation_depth: Cell::new(0),
        }
    }

    #[inline]
    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    #[inline]
    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    #[inline]
    pub fn binder(&self) -> &BinderState {
        &self.program.binder
    }

    #[inline]
    pub fn arena(&self) -> &DeclarationArena {
        &self.program.arena
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.program.binder.symbol(id)
    }

    /// The declaration of `symbol` used for type-position queries.
    pub(crate) fn first_declaration(&self, symbol: SymbolId) -> Result<NodeIndex, SolverError> {
        let sym = self
            .symbol(symbol)
            .ok_or(SolverError::SymbolWithoutDeclarations(format!("#{}", symbol.0)))?;
        sym.declarations
            .first()
            .copied()
            .ok_or_else(|| SolverError::SymbolWithoutDeclarations(sym.name().to_string()))
    }

    pub(crate) fn symbol_name(&self, symbol: SymbolId) -> String {
        self.symbol(symbol)
            .map(|s| s.name().to_string())
            .unwrap_or_else(|| format!("#{}", symbol.0))
    }

    // =========================================================================
    // Symbol links
    // =========================================================================

    pub(crate) fn with_links<R>(&self, symbol: SymbolId, f: impl FnOnce(&mut SymbolLinks) -> R) -> R {
        let mut links = self.links.borrow_mut();
        f(links.entry(symbol).or_default())
    }

    pub(crate) fn read_links<R>(&self, symbol: SymbolId, f: impl FnOnce(&SymbolLinks) -> R) -> Option<R> {
        self.links.borrow().get(&symbol).map(f)
    }

    // =========================================================================
    // Mappers
    // =========================================================================

    /// Intern a mapper so instantiations through it are memoized.
    pub fn intern_mapper(&self, mapper: TypeMapper) -> MapperId {
        let mut table = self.mappers.borrow_mut();
        if let Some(&id) = table.map.get(&mapper) {
            return id;
        }
        let id = MapperId(table.items.len() as u32);
        let rc = Rc::new(mapper);
        table.items.push(rc.clone());
        table.map.insert(rc, id);
        id
    }

    pub fn mapper(&self, id: MapperId) -> Option<Rc<TypeMapper>> {
        self.mappers.borrow().items.get(id.0 as usize).cloned()
    }

    // =========================================================================
    // Diagnostics and violations
    // =========================================================================

    /// Queue a diagnostic produced during lazy resolution.
    ///
    /// Lowering the same annotation twice reports once.
    pub fn push_diagnostic(&self, diagnostic: Diagnostic) {
        let key = (
            diagnostic.node,
            diagnostic.code,
            diagnostic.message_text.clone(),
        );
        if self.diagnostic_keys.borrow_mut().insert(key) {
            self.diagnostics.borrow_mut().push(diagnostic);
        }
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    pub fn record_violation(&self, error: SolverError) {
        warn!(error = %error, "solver invariant violation");
        self.violations.borrow_mut().push(error);
    }

    pub fn take_violations(&self) -> Vec<SolverError> {
        std::mem::take(&mut *self.violations.borrow_mut())
    }

    pub(crate) fn mark_circular_base(&self, symbol: SymbolId) {
        self.circular_bases.borrow_mut().insert(symbol);
    }

    /// Whether resolving the bases of `symbol` ran into itself.
    pub fn has_circular_base(&self, symbol: SymbolId) -> bool {
        self.circular_bases.borrow().contains(&symbol)
    }

    // =========================================================================
    // Stats
    // =========================================================================

    pub(crate) fn count_relation_query(&self) {
        bump(&self.stats.relation_queries);
    }

    pub(crate) fn count_relation_cache_hit(&self) {
        bump(&self.stats.relation_cache_hits);
    }

    pub(crate) fn count_depth_limit_hit(&self) {
        bump(&self.stats.depth_limit_hits);
    }

    pub(crate) fn count_instantiation_limit_hit(&self) {
        bump(&self.stats.instantiation_limit_hits);
    }

    pub(crate) fn count_evaluation_limit_hit(&self) {
        bump(&self.stats.evaluation_limit_hits);
    }

    pub fn stats(&self) -> RelationStats {
        RelationStats {
            relation_queries: self.stats.relation_queries.get(),
            relation_cache_hits: self.stats.relation_cache_hits.get(),
            depth_limit_hits: self.stats.depth_limit_hits.get(),
            instantiation_limit_hits: self.stats.instantiation_limit_hits.get(),
            evaluation_limit_hits: self.stats.evaluation_limit_hits.get(),
        }
    }
}
