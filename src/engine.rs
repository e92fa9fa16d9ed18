//! The engine core: node ownership and hash-consing.
//!
//! [`BddImpl`] owns every mutable piece of the diagram: the node arena,
//! the per-level unique tables, the five computed caches, the variable ↔
//! index maps, the constants, the GC lock and the reordering flag. The
//! Boolean kernel, the cube utilities, the garbage collector and the
//! sifting engine all live in sibling modules as further `impl BddImpl`
//! blocks; the public wrapper in [`bdd`][crate::bdd] is a thin refcounting
//! shell over this type.
//!
//! # Canonicity
//!
//! Every live non-constant node satisfies:
//!
//! 1. `index(hi) > index` and `index(lo) > index` (ordered, reduced)
//! 2. `hi != lo` (collapsed by [`make_node`][BddImpl::make_node])
//! 3. the `hi` edge is positive; complement is folded onto the parent
//!    edge by [`find_or_add_unique`][BddImpl::find_or_add_unique]
//! 4. for a given `(index, hi, lo)` exactly one node exists
//!
//! Together these reduce function equality to reference equality.

use log::{debug, trace};

use crate::arena::NodeArena;
use crate::cache::{Cache2, Cache3, CacheStats};
use crate::node::{Node, CONST_INDEX};
use crate::reference::Ref;
use crate::subtable::Subtable;
use crate::types::Var;

/// Variable count the tables are pre-sized for when none is given.
pub const DFLT_VAR_SZ: usize = 128;

/// Default computed-cache slot count (per cache).
pub const DFLT_CACHE_SZ: usize = 1 << 20;

/// Initial GC trigger; doubles whenever a collection fails to get the
/// allocated count back under it.
const DFLT_GC_TRIGGER: usize = 1 << 20;

/// Construction parameters for a manager. All fields are optional in the
/// sense that [`Default`] gives a working configuration.
#[derive(Debug, Clone)]
pub struct BddConfig {
    /// Expected number of variables; tables are pre-sized for these.
    pub initial_vars: usize,
    /// Hard ceiling on the node arena. Allocation beyond it fails with an
    /// invalid handle (after one forced GC and retry).
    pub max_nodes: usize,
    /// Slot count per computed cache; rounded up to a power of two.
    pub cache_size: usize,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            initial_vars: DFLT_VAR_SZ,
            max_nodes: u32::MAX as usize,
            cache_size: DFLT_CACHE_SZ,
        }
    }
}

pub(crate) struct BddImpl {
    pub(crate) arena: NodeArena,
    /// One unique table per index; entry 0 is a placeholder (indices are
    /// 1-based).
    pub(crate) tables: Vec<Subtable>,
    /// External variable id -> current index. Entry 0 is a placeholder.
    pub(crate) var2index: Vec<u32>,
    /// Current index -> external variable id. Entry 0 is a placeholder.
    pub(crate) index2var: Vec<u32>,

    pub(crate) gc_lock: u32,
    pub(crate) reordering: bool,
    pub(crate) gc_trigger: usize,
    pub(crate) num_gcs: usize,

    pub(crate) and_cache: Cache2,
    pub(crate) xor_cache: Cache2,
    pub(crate) restrict_cache: Cache2,
    pub(crate) ite_cache: Cache3,
    pub(crate) and_exists_cache: Cache3,

    pub(crate) one: Ref,
    pub(crate) zero: Ref,
}

impl BddImpl {
    pub(crate) fn new(config: &BddConfig) -> Self {
        let cache_size = config.cache_size.next_power_of_two();

        let mut arena = NodeArena::new(config.max_nodes);

        // Slot 0 is the null sentinel, slot 1 the constant record.
        let null = arena.alloc().expect("arena must hold the reserved nodes");
        assert!(null.is_null());
        let one = arena.alloc().expect("arena must hold the reserved nodes");
        assert_eq!(one.slot(), 1);
        arena.at_mut(one).index = CONST_INDEX;

        let mut this = Self {
            arena,
            tables: vec![Subtable::with_bits(0)],
            var2index: vec![0],
            index2var: vec![0],
            gc_lock: 0,
            reordering: false,
            gc_trigger: DFLT_GC_TRIGGER,
            num_gcs: 0,
            and_cache: Cache2::new(cache_size),
            xor_cache: Cache2::new(cache_size),
            restrict_cache: Cache2::new(cache_size),
            ite_cache: Cache3::new(cache_size),
            and_exists_cache: Cache3::new(cache_size),
            one,
            zero: -one,
        };
        this.ensure_var(config.initial_vars as u32);
        this
    }

    /// Number of active indices (and of known variables).
    #[inline]
    pub(crate) fn max_index(&self) -> u32 {
        self.index2var.len() as u32 - 1
    }

    pub(crate) fn vars_created(&self) -> usize {
        self.max_index() as usize
    }

    pub(crate) fn nodes_allocd(&self) -> usize {
        self.arena.allocd()
    }

    pub(crate) fn set_max_nodes(&mut self, max_nodes: usize) {
        self.arena.set_max_nodes(max_nodes);
    }

    /// Extends the variable maps (identity order for fresh variables) and
    /// the unique tables so that `var` is a known variable.
    fn ensure_var(&mut self, var: u32) {
        while self.var2index.len() <= var as usize {
            let nu = self.var2index.len() as u32;
            self.var2index.push(nu);
            self.index2var.push(nu);
            self.tables.push(Subtable::default());
        }
    }

    /// The BDD of a signed literal: `lit > 0` is the positive phase of
    /// variable `lit`, `lit < 0` the negative phase. Literal 0 is a
    /// programmer error.
    pub(crate) fn lit(&mut self, lit: i32) -> Option<Ref> {
        assert_ne!(lit, 0, "Literal 0 is not a variable");
        trace!("lit({})", lit);

        let var = lit.unsigned_abs();
        self.ensure_var(var);
        let index = self.var2index[var as usize];

        let (one, zero) = (self.one, self.zero);
        if lit > 0 {
            self.find_or_add_unique(index, one, zero)
        } else {
            self.find_or_add_unique(index, zero, one)
        }
    }

    /// The positive literal currently sitting at `index`. Unlike variable
    /// ids, the answer changes under reordering.
    pub(crate) fn ith_lit(&mut self, index: u32) -> Option<Ref> {
        assert_ne!(index, 0, "Indices are 1-based");
        self.ensure_var(index);
        let (one, zero) = (self.one, self.zero);
        self.find_or_add_unique(index, one, zero)
    }

    //
    // Node access.
    //

    #[inline]
    pub(crate) fn node(&self, f: Ref) -> &Node {
        self.arena.at(f)
    }

    /// The index (level) of the top variable; `CONST_INDEX` for constants.
    #[inline]
    pub(crate) fn index(&self, f: Ref) -> u32 {
        self.arena.at(f).index
    }

    /// Stored `hi` child, ignoring the complement bit of `f`.
    #[inline]
    pub(crate) fn hi(&self, f: Ref) -> Ref {
        self.arena.at(f).hi
    }

    /// Stored `lo` child, ignoring the complement bit of `f`.
    #[inline]
    pub(crate) fn lo(&self, f: Ref) -> Ref {
        self.arena.at(f).lo
    }

    /// The `hi` cofactor with the complement of `f` folded in.
    #[inline]
    pub(crate) fn xhi(&self, f: Ref) -> Ref {
        let hi = self.arena.at(f).hi;
        if f.is_complemented() {
            -hi
        } else {
            hi
        }
    }

    /// The `lo` cofactor with the complement of `f` folded in.
    #[inline]
    pub(crate) fn xlo(&self, f: Ref) -> Ref {
        let lo = self.arena.at(f).lo;
        if f.is_complemented() {
            -lo
        } else {
            lo
        }
    }

    #[inline]
    pub(crate) fn is_one(&self, f: Ref) -> bool {
        f == self.one
    }

    #[inline]
    pub(crate) fn is_zero(&self, f: Ref) -> bool {
        f == self.zero
    }

    #[inline]
    pub(crate) fn is_constant(&self, f: Ref) -> bool {
        self.is_one(f) || self.is_zero(f)
    }

    pub(crate) fn is_pos_lit(&self, f: Ref) -> bool {
        self.xhi(f) == self.one && self.xlo(f) == self.zero
    }

    pub(crate) fn is_neg_lit(&self, f: Ref) -> bool {
        self.xhi(f) == self.zero && self.xlo(f) == self.one
    }

    /// The external variable at the top of `f`. Must not be a constant.
    pub(crate) fn top_var(&self, f: Ref) -> Var {
        debug_assert!(!self.is_constant(f));
        Var::new(self.index2var[self.index(f) as usize])
    }

    #[inline]
    pub(crate) fn min_index2(&self, f: Ref, g: Ref) -> u32 {
        self.index(f).min(self.index(g))
    }

    #[inline]
    pub(crate) fn min_index3(&self, f: Ref, g: Ref, h: Ref) -> u32 {
        self.index(f).min(self.index(g)).min(self.index(h))
    }

    /// Cofactor of `f` at `index` with the variable true. Assumes
    /// `index(f) >= index`, so a deeper `f` is untouched.
    #[inline]
    pub(crate) fn cof1(&self, f: Ref, index: u32) -> Ref {
        debug_assert!(self.index(f) >= index);
        if self.index(f) != index {
            f
        } else {
            self.xhi(f)
        }
    }

    /// Cofactor of `f` at `index` with the variable false.
    #[inline]
    pub(crate) fn cof0(&self, f: Ref, index: u32) -> Ref {
        debug_assert!(self.index(f) >= index);
        if self.index(f) != index {
            f
        } else {
            self.xlo(f)
        }
    }

    //
    // Hash consing.
    //

    /// Finds or creates the canonical node for `(index, hi, lo)`,
    /// normalizing the complement: a negative `hi` inverts both children
    /// and the returned edge. Returns `None` when the arena is exhausted.
    pub(crate) fn find_or_add_unique(&mut self, index: u32, hi: Ref, lo: Ref) -> Option<Ref> {
        debug_assert_ne!(index, 0);
        debug_assert!(index <= self.max_index());
        debug_assert!(self.index(hi) > index);
        debug_assert!(self.index(lo) > index);

        let inv = hi.is_complemented();
        let (hi, lo) = if inv { (-hi, -lo) } else { (hi, lo) };

        let BddImpl { tables, arena, .. } = self;
        let r = tables[index as usize].find_or_add(arena, index, hi, lo)?;
        trace!("find_or_add_unique({}, {}, {}) -> {}", index, hi, lo, r);

        Some(if inv { -r } else { r })
    }

    /// `hi == lo` collapses without touching the tables; everything else
    /// goes through [`find_or_add_unique`][Self::find_or_add_unique].
    #[inline]
    pub(crate) fn make_node(&mut self, index: u32, hi: Ref, lo: Ref) -> Option<Ref> {
        if hi == lo {
            Some(hi)
        } else {
            self.find_or_add_unique(index, hi, lo)
        }
    }

    //
    // Reference counts.
    //

    pub(crate) fn inc_ref(&mut self, f: Ref) {
        if !f.is_null() && !self.is_constant(f) {
            self.arena.at_mut(f).inc_ref();
        }
    }

    pub(crate) fn dec_ref(&mut self, f: Ref) {
        if !f.is_null() && !self.is_constant(f) {
            self.arena.at_mut(f).dec_ref();
        }
    }

    pub(crate) fn num_refs(&self, f: Ref) -> u32 {
        self.arena.at(f).num_refs()
    }

    //
    // Traversal marks. Bit 0 belongs to the garbage collector; callers of
    // the other bits must unmark after every traversal.
    //

    /// Recursively marks the subgraph rooted at `f`. Constants and the
    /// null sentinel are skipped.
    pub(crate) fn mark_nodes(&mut self, f: Ref, m: u8) {
        if f.slot() <= 1 {
            return;
        }
        if !self.arena.at(f).marked(m) {
            self.arena.at_mut(f).set_mark(m);
            let node = self.arena.at(f);
            let (hi, lo) = (node.hi, node.lo);
            self.mark_nodes(hi, m);
            self.mark_nodes(lo, m);
        }
    }

    /// Recursively clears a mark bit below `f`. Tolerates marked
    /// constants (the counting walk marks the constant record).
    pub(crate) fn unmark_nodes(&mut self, f: Ref, m: u8) {
        if self.arena.at(f).marked(m) {
            self.arena.at_mut(f).clr_mark(m);
            if f.slot() > 1 {
                let node = self.arena.at(f);
                let (hi, lo) = (node.hi, node.lo);
                self.unmark_nodes(hi, m);
                self.unmark_nodes(lo, m);
            }
        }
    }

    //
    // GC lock.
    //

    pub(crate) fn lock_gc(&mut self) {
        self.gc_lock += 1;
    }

    pub(crate) fn unlock_gc(&mut self) {
        if self.gc_lock > 0 {
            self.gc_lock -= 1;
        }
    }

    //
    // Introspection.
    //

    /// Current variable order, topmost first.
    pub(crate) fn var_order(&self) -> Vec<Var> {
        self.index2var[1..].iter().map(|&v| Var::new(v)).collect()
    }

    /// Verifies node-count conservation: `allocated + free == total`.
    pub(crate) fn check_mem(&self) -> bool {
        debug!(
            "check_mem: allocd = {}, free = {}, total = {}, max allocd = {}",
            self.arena.allocd(),
            self.arena.free_count(),
            self.arena.total(),
            self.arena.max_allocd(),
        );
        self.arena.check() && self.arena.free_count() == self.arena.count_free_nodes()
    }

    /// Per-operator computed-cache counters, in a fixed order.
    pub(crate) fn cache_stats(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            ("and", self.and_cache.stats()),
            ("xor", self.xor_cache.stats()),
            ("restrict", self.restrict_cache.stats()),
            ("ite", self.ite_cache.stats()),
            ("and_exists", self.and_exists_cache.stats()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> BddImpl {
        BddImpl::new(&BddConfig {
            initial_vars: 8,
            cache_size: 1 << 10,
            ..BddConfig::default()
        })
    }

    #[test]
    fn test_constants() {
        let bdd = small();
        assert!(bdd.is_one(bdd.one));
        assert!(bdd.is_zero(bdd.zero));
        assert_eq!(-bdd.one, bdd.zero);
        assert_eq!(bdd.index(bdd.one), CONST_INDEX);
        // Null, the constant record, plus nothing else.
        assert_eq!(bdd.nodes_allocd(), 2);
    }

    #[test]
    fn test_lit_canonical() {
        let mut bdd = small();
        let a = bdd.lit(3).unwrap();
        let b = bdd.lit(3).unwrap();
        assert_eq!(a, b);
        assert_eq!(bdd.lit(-3).unwrap(), -a);
        assert!(bdd.is_pos_lit(a));
        assert!(bdd.is_neg_lit(-a));
        assert_eq!(bdd.top_var(a), Var::new(3));
    }

    #[test]
    fn test_lit_extends_vars() {
        let mut bdd = small();
        assert_eq!(bdd.vars_created(), 8);
        bdd.lit(12).unwrap();
        assert_eq!(bdd.vars_created(), 12);
        assert_eq!(bdd.var_order().len(), 12);
    }

    #[test]
    #[should_panic(expected = "Literal 0")]
    fn test_lit_zero_panics() {
        let mut bdd = small();
        let _ = bdd.lit(0);
    }

    #[test]
    fn test_make_node_collapses() {
        let mut bdd = small();
        let a = bdd.lit(2).unwrap();
        let r = bdd.make_node(1, a, a).unwrap();
        assert_eq!(r, a);
    }

    #[test]
    fn test_complement_normalization() {
        let mut bdd = small();
        let a = bdd.lit(2).unwrap();
        let (one, zero) = (bdd.one, bdd.zero);
        // Requesting a negative hi child must return the complemented
        // canonical node: node(1, -a, 1) == -node(1, a, 0).
        let n1 = bdd.find_or_add_unique(1, -a, one).unwrap();
        let n2 = bdd.find_or_add_unique(1, a, zero).unwrap();
        assert_eq!(n1, -n2);
        assert!(!bdd.hi(n1).is_complemented());
    }

    #[test]
    fn test_cofactors() {
        let mut bdd = small();
        let a = bdd.lit(1).unwrap();
        assert_eq!(bdd.cof1(a, 1), bdd.one);
        assert_eq!(bdd.cof0(a, 1), bdd.zero);
        assert_eq!(bdd.cof1(-a, 1), bdd.zero);
        // A node below the split index is untouched.
        let b = bdd.lit(5).unwrap();
        assert_eq!(bdd.cof1(b, 1), b);
    }

    #[test]
    fn test_mark_unmark_roundtrip() {
        let mut bdd = small();
        let a = bdd.lit(1).unwrap();
        let b = bdd.lit(2).unwrap();
        let f = bdd.make_node(1, b, -b).unwrap();
        bdd.mark_nodes(f, 2);
        assert!(bdd.node(f).marked(2));
        assert!(bdd.node(b).marked(2));
        assert!(!bdd.node(a).marked(2));
        bdd.unmark_nodes(f, 2);
        assert!(!bdd.node(f).marked(2));
        assert!(!bdd.node(b).marked(2));
    }

    #[test]
    fn test_gc_lock_nesting() {
        let mut bdd = small();
        bdd.lock_gc();
        bdd.lock_gc();
        assert_eq!(bdd.gc_lock, 2);
        bdd.unlock_gc();
        bdd.unlock_gc();
        bdd.unlock_gc();
        assert_eq!(bdd.gc_lock, 0);
    }
}
