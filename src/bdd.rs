//! The public surface: [`BddMgr`], the refcounted [`Bdd`] handle, and
//! [`BddFnSet`].
//!
//! All state lives in the manager; a [`Bdd`] is a `(manager, node)` pair
//! whose clones and drops keep the node's external reference count
//! honest. The algebraic operators are sugar over manager calls:
//!
//! ```
//! use nyx_bdd::bdd::BddMgr;
//!
//! let mgr = BddMgr::new();
//! let a = mgr.lit(1);
//! let b = mgr.lit(2);
//!
//! // De Morgan, decided by canonicity alone.
//! let lhs = !(&a * &b);
//! let rhs = !&a + !&b;
//! assert_eq!(lhs, rhs);
//! ```
//!
//! Complementation is free: `!f` flips a bit in the edge and allocates
//! nothing. Equality of handles is equality of Boolean functions, because
//! the engine keeps every function canonical.
//!
//! A manager and its handles are a single-threaded unit; independent
//! managers are independent worlds.

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign, BitXor, BitXorAssign, Div, DivAssign, Mul, MulAssign, Not};
use std::rc::Rc;

use log::debug;

use crate::cache::CacheStats;
use crate::engine::{BddConfig, BddImpl};
use crate::reference::Ref;
use crate::types::{Op, Var};

/// Manager for BDD memory and operations.
///
/// Cheap to clone (all clones share the same engine) and the only way to
/// mint [`Bdd`] handles.
#[derive(Clone)]
pub struct BddMgr {
    inner: Rc<RefCell<BddImpl>>,
}

impl Default for BddMgr {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BddMgr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("BddMgr")
            .field("vars_created", &inner.vars_created())
            .field("nodes_allocd", &inner.nodes_allocd())
            .finish()
    }
}

impl BddMgr {
    pub fn new() -> Self {
        Self::with_config(BddConfig::default())
    }

    /// A manager pre-sized for the given number of variables.
    pub fn with_vars(initial_vars: usize) -> Self {
        Self::with_config(BddConfig {
            initial_vars,
            ..BddConfig::default()
        })
    }

    pub fn with_config(config: BddConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BddImpl::new(&config))),
        }
    }

    fn ptr_eq(&self, other: &BddMgr) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Wraps an engine result, taking an external reference; a null (out
    /// of nodes even after the GC retry) becomes an invalid handle.
    fn wrap(&self, r: Option<Ref>) -> Bdd {
        match r {
            Some(r) if !r.is_null() => {
                self.inner.borrow_mut().inc_ref(r);
                Bdd {
                    mgr: Some(self.clone()),
                    node: r,
                }
            }
            _ => Bdd::default(),
        }
    }

    /// Opportunistic trigger check after a producing operation.
    fn maybe_gc(&self) {
        self.inner.borrow_mut().gc(false, false);
    }

    //
    // Constants and literals.
    //

    pub fn one(&self) -> Bdd {
        let r = self.inner.borrow().one;
        self.wrap(Some(r))
    }

    pub fn zero(&self) -> Bdd {
        let r = self.inner.borrow().zero;
        self.wrap(Some(r))
    }

    /// The BDD of a signed literal: positive `lit` for the positive
    /// phase, negative for the negative phase. Literal 0 is a programmer
    /// error.
    pub fn lit(&self, lit: i32) -> Bdd {
        let r = self.inner.borrow_mut().lit(lit);
        self.wrap(r)
    }

    /// The positive literal of whatever variable currently sits at
    /// `index` (1 = top). The answer changes under reordering.
    pub fn ith_lit(&self, index: u32) -> Bdd {
        let r = self.inner.borrow_mut().ith_lit(index);
        self.wrap(r)
    }

    //
    // Operations.
    //

    pub fn apply(&self, f: &Bdd, g: &Bdd, op: Op) -> Bdd {
        self.check_operands(f, g);
        let r = self.inner.borrow_mut().apply(f.node, g.node, op);
        let rtn = self.wrap(r);
        self.maybe_gc();
        rtn
    }

    /// `ite(f, g, h) = f·g + ¬f·h`.
    pub fn ite(&self, f: &Bdd, g: &Bdd, h: &Bdd) -> Bdd {
        self.check_operands(f, g);
        self.check_operands(f, h);
        let r = self.inner.borrow_mut().ite(f.node, g.node, h.node);
        let rtn = self.wrap(r);
        self.maybe_gc();
        rtn
    }

    /// Generalized cofactor of `f` w.r.t. the non-zero care function `c`.
    /// Coincides with the Shannon cofactor when `c` is a cube.
    pub fn restrict(&self, f: &Bdd, c: &Bdd) -> Bdd {
        self.check_operands(f, c);
        let r = self.inner.borrow_mut().restrict(f.node, c.node);
        let rtn = self.wrap(r);
        self.maybe_gc();
        rtn
    }

    /// Replaces variable `x` in `f` by `g`.
    pub fn compose(&self, f: &Bdd, x: Var, g: &Bdd) -> Bdd {
        self.check_operands(f, g);
        let r = self.inner.borrow_mut().compose(f.node, x, g.node);
        let rtn = self.wrap(r);
        self.maybe_gc();
        rtn
    }

    /// The relational product `∃ vars(c). (f ∧ g)` for a cube `c` of
    /// positive literals, computed in a single pass.
    pub fn and_exists(&self, f: &Bdd, g: &Bdd, c: &Bdd) -> Bdd {
        self.check_operands(f, g);
        self.check_operands(f, c);
        let r = self.inner.borrow_mut().and_exists(f.node, g.node, c.node);
        let rtn = self.wrap(r);
        self.maybe_gc();
        rtn
    }

    /// True iff `f` covers `g` (`g ≤ f`).
    pub fn covers(&self, f: &Bdd, g: &Bdd) -> bool {
        self.check_operands(f, g);
        self.inner.borrow_mut().covers(f.node, g.node)
    }

    //
    // Support over handle collections.
    //

    /// The support of all the given functions, as one cube.
    pub fn support_cube(&self, fs: &[Bdd]) -> Bdd {
        let mut rtn = self.one();
        for f in fs {
            rtn = &rtn * &f.support_cube();
        }
        rtn
    }

    /// The joint support as a variable vector in index order.
    pub fn support_vec(&self, fs: &[Bdd]) -> Vec<Var> {
        self.support_cube(fs).support_vec()
    }

    /// Unique nodes reachable from the given roots, shared subgraphs
    /// counted once.
    pub fn count_nodes(&self, fs: &[Bdd]) -> usize {
        let nodes: Vec<Ref> = fs
            .iter()
            .map(|f| {
                assert!(self.ptr_eq(f.mgr()), "Handle belongs to another manager");
                f.node
            })
            .collect();
        self.inner.borrow_mut().count_nodes(&nodes)
    }

    //
    // Memory management.
    //

    /// Possibly collects garbage; returns the number of nodes freed.
    /// A no-op while the GC lock is held.
    pub fn gc(&self, force: bool, verbose: bool) -> usize {
        self.inner.borrow_mut().gc(force, verbose)
    }

    /// Sifts the variable order to shrink the diagram; returns the number
    /// of nodes saved.
    pub fn reorder(&self, verbose: bool) -> usize {
        self.inner.borrow_mut().reorder(verbose)
    }

    /// Defers garbage collection until the matching
    /// [`unlock_gc`](BddMgr::unlock_gc). Locks nest.
    pub fn lock_gc(&self) {
        self.inner.borrow_mut().lock_gc();
    }

    pub fn unlock_gc(&self) {
        self.inner.borrow_mut().unlock_gc();
    }

    pub fn nodes_allocd(&self) -> usize {
        self.inner.borrow().nodes_allocd()
    }

    pub fn vars_created(&self) -> usize {
        self.inner.borrow().vars_created()
    }

    pub fn set_max_nodes(&self, max_nodes: usize) {
        self.inner.borrow_mut().set_max_nodes(max_nodes);
    }

    /// Verifies node-count conservation (`allocated + free == total`).
    pub fn check_mem(&self) -> bool {
        self.inner.borrow().check_mem()
    }

    /// Current variable order, topmost first.
    pub fn var_order(&self) -> Vec<Var> {
        self.inner.borrow().var_order()
    }

    /// Per-operator computed-cache hit/miss counters.
    pub fn cache_stats(&self) -> Vec<(&'static str, CacheStats)> {
        self.inner.borrow().cache_stats()
    }

    fn check_operands(&self, f: &Bdd, g: &Bdd) {
        assert!(self.ptr_eq(f.mgr()), "Operand belongs to another manager");
        assert!(self.ptr_eq(g.mgr()), "Operand belongs to another manager");
    }
}

/// A single Boolean function: a refcounted node handle.
///
/// Cloning bumps the underlying reference count, dropping releases it, a
/// move transfers ownership. A default-constructed handle is invalid;
/// so is the result of an operation that ran out of nodes.
pub struct Bdd {
    mgr: Option<BddMgr>,
    node: Ref,
}

impl Default for Bdd {
    fn default() -> Self {
        Self {
            mgr: None,
            node: Ref::NULL,
        }
    }
}

impl Clone for Bdd {
    fn clone(&self) -> Self {
        if let Some(mgr) = &self.mgr {
            mgr.inner.borrow_mut().inc_ref(self.node);
        }
        Self {
            mgr: self.mgr.clone(),
            node: self.node,
        }
    }
}

impl Drop for Bdd {
    fn drop(&mut self) {
        if let Some(mgr) = &self.mgr {
            mgr.inner.borrow_mut().dec_ref(self.node);
        }
    }
}

impl fmt::Debug for Bdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid() {
            write!(f, "Bdd({})", self.node)
        } else {
            write!(f, "Bdd(invalid)")
        }
    }
}

impl Bdd {
    pub(crate) fn mgr(&self) -> &BddMgr {
        self.mgr.as_ref().expect("Invalid Bdd handle")
    }

    /// False for default-constructed handles and for the results of
    /// operations that ran out of nodes.
    pub fn valid(&self) -> bool {
        self.mgr.is_some() && !self.node.is_null()
    }

    /// Raw node id; stable for the handle's lifetime, including across
    /// garbage collection and reordering.
    pub fn id(&self) -> u32 {
        self.node.raw()
    }

    //
    // Named operations.
    //

    /// The complement. Free: flips the edge bit, allocates nothing.
    pub fn inv(&self) -> Bdd {
        self.mgr().wrap(Some(-self.node))
    }

    /// Strips the complement bit off the edge.
    pub fn abs(&self) -> Bdd {
        self.mgr().wrap(Some(self.node.abs()))
    }

    pub fn and(&self, g: &Bdd) -> Bdd {
        self.mgr().apply(self, g, Op::And)
    }

    pub fn nand(&self, g: &Bdd) -> Bdd {
        self.mgr().apply(self, g, Op::Nand)
    }

    pub fn or(&self, g: &Bdd) -> Bdd {
        self.mgr().apply(self, g, Op::Or)
    }

    pub fn nor(&self, g: &Bdd) -> Bdd {
        self.mgr().apply(self, g, Op::Nor)
    }

    pub fn xor(&self, g: &Bdd) -> Bdd {
        self.mgr().apply(self, g, Op::Xor)
    }

    pub fn xnor(&self, g: &Bdd) -> Bdd {
        self.mgr().apply(self, g, Op::Xnor)
    }

    pub fn implies(&self, g: &Bdd) -> Bdd {
        self.mgr().apply(self, g, Op::Imp)
    }

    pub fn restrict(&self, c: &Bdd) -> Bdd {
        self.mgr().restrict(self, c)
    }

    pub fn compose(&self, x: Var, g: &Bdd) -> Bdd {
        self.mgr().compose(self, x, g)
    }

    pub fn and_exists(&self, g: &Bdd, c: &Bdd) -> Bdd {
        self.mgr().and_exists(self, g, c)
    }

    /// True iff `self` covers `g` (`g ≤ self`).
    pub fn covers(&self, g: &Bdd) -> bool {
        self.mgr().covers(self, g)
    }

    //
    // Tests for trivial functions.
    //

    pub fn is_one(&self) -> bool {
        self.mgr().inner.borrow().is_one(self.node)
    }

    pub fn is_zero(&self) -> bool {
        self.mgr().inner.borrow().is_zero(self.node)
    }

    pub fn is_constant(&self) -> bool {
        self.mgr().inner.borrow().is_constant(self.node)
    }

    pub fn is_pos_lit(&self) -> bool {
        self.mgr().inner.borrow().is_pos_lit(self.node)
    }

    pub fn is_neg_lit(&self) -> bool {
        self.mgr().inner.borrow().is_neg_lit(self.node)
    }

    pub fn is_cube(&self) -> bool {
        self.mgr().inner.borrow().is_cube(self.node)
    }

    //
    // Cubes and support.
    //

    /// The largest cube dividing this function.
    pub fn cube_factor(&self) -> Bdd {
        let mgr = self.mgr();
        let r = mgr.inner.borrow_mut().cube_factor(self.node);
        mgr.wrap(r)
    }

    /// A satisfying cube, or the zero function when none exists.
    pub fn one_cube(&self) -> Bdd {
        let mgr = self.mgr();
        let r = mgr.inner.borrow_mut().one_cube(self.node);
        mgr.wrap(r)
    }

    pub fn support_size(&self) -> usize {
        self.mgr().inner.borrow_mut().support_size(self.node)
    }

    /// The support as a variable vector in index order.
    pub fn support_vec(&self) -> Vec<Var> {
        self.mgr().inner.borrow_mut().support_vec(self.node)
    }

    /// The support as a cube of positive literals.
    pub fn support_cube(&self) -> Bdd {
        let mgr = self.mgr();
        let r = mgr.inner.borrow_mut().support_cube(self.node);
        mgr.wrap(r)
    }

    //
    // Data access.
    //

    /// The positive literal of the top variable.
    pub fn get_if(&self) -> Bdd {
        self.mgr().lit(self.top_var().id() as i32)
    }

    /// The cofactor with the top variable true.
    pub fn get_then(&self) -> Bdd {
        let mgr = self.mgr();
        let r = mgr.inner.borrow().xhi(self.node);
        mgr.wrap(Some(r))
    }

    /// The cofactor with the top variable false.
    pub fn get_else(&self) -> Bdd {
        let mgr = self.mgr();
        let r = mgr.inner.borrow().xlo(self.node);
        mgr.wrap(Some(r))
    }

    /// The top variable. Must not be a constant.
    pub fn top_var(&self) -> Var {
        self.mgr().inner.borrow().top_var(self.node)
    }

    /// The index (level) of the top variable under the current order.
    pub fn index(&self) -> u32 {
        self.mgr().inner.borrow().index(self.node)
    }

    //
    // Debug.
    //

    pub fn count_nodes(&self) -> usize {
        self.mgr().inner.borrow_mut().count_nodes(&[self.node])
    }

    /// External reference count of the underlying node.
    pub fn num_refs(&self) -> usize {
        self.mgr().inner.borrow().num_refs(self.node) as usize
    }

    /// Indented rendering of the graph; shared nodes appear once.
    pub fn to_tree_string(&self) -> String {
        self.mgr().inner.borrow_mut().to_tree_string(self.node)
    }

    /// Dumps the graph through the logger.
    pub fn print(&self) {
        debug!("\n{}", self.to_tree_string());
    }
}

//
// Operator overloads. Complement is !f; AND, OR, XOR, restrict map to
// *, +, ^, /; f <= g is containment.
//

impl Not for &Bdd {
    type Output = Bdd;

    fn not(self) -> Bdd {
        self.inv()
    }
}

impl Not for Bdd {
    type Output = Bdd;

    fn not(self) -> Bdd {
        self.inv()
    }
}

impl Mul for &Bdd {
    type Output = Bdd;

    fn mul(self, rhs: Self) -> Bdd {
        self.and(rhs)
    }
}

impl Mul for Bdd {
    type Output = Bdd;

    fn mul(self, rhs: Self) -> Bdd {
        self.and(&rhs)
    }
}

impl MulAssign<&Bdd> for Bdd {
    fn mul_assign(&mut self, rhs: &Bdd) {
        *self = self.and(rhs);
    }
}

impl Add for &Bdd {
    type Output = Bdd;

    fn add(self, rhs: Self) -> Bdd {
        self.or(rhs)
    }
}

impl Add for Bdd {
    type Output = Bdd;

    fn add(self, rhs: Self) -> Bdd {
        self.or(&rhs)
    }
}

impl Add<&Bdd> for Bdd {
    type Output = Bdd;

    fn add(self, rhs: &Bdd) -> Bdd {
        self.or(rhs)
    }
}

impl AddAssign<&Bdd> for Bdd {
    fn add_assign(&mut self, rhs: &Bdd) {
        *self = self.or(rhs);
    }
}

impl BitXor for &Bdd {
    type Output = Bdd;

    fn bitxor(self, rhs: Self) -> Bdd {
        self.xor(rhs)
    }
}

impl BitXor for Bdd {
    type Output = Bdd;

    fn bitxor(self, rhs: Self) -> Bdd {
        self.xor(&rhs)
    }
}

impl BitXorAssign<&Bdd> for Bdd {
    fn bitxor_assign(&mut self, rhs: &Bdd) {
        *self = self.xor(rhs);
    }
}

impl Div for &Bdd {
    type Output = Bdd;

    fn div(self, rhs: Self) -> Bdd {
        self.restrict(rhs)
    }
}

impl Div for Bdd {
    type Output = Bdd;

    fn div(self, rhs: Self) -> Bdd {
        self.restrict(&rhs)
    }
}

impl DivAssign<&Bdd> for Bdd {
    fn div_assign(&mut self, rhs: &Bdd) {
        *self = self.restrict(rhs);
    }
}

impl PartialEq for Bdd {
    fn eq(&self, other: &Self) -> bool {
        match (&self.mgr, &other.mgr) {
            (Some(a), Some(b)) => a.ptr_eq(b) && self.node == other.node,
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for Bdd {}

impl std::hash::Hash for Bdd {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.node.raw().hash(state);
    }
}

/// Containment: `f <= g` iff `g` covers `f`. A partial order; unrelated
/// functions compare as `None`.
impl PartialOrd for Bdd {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        let le = other.covers(self);
        let ge = self.covers(other);
        match (le, ge) {
            (true, true) => Some(std::cmp::Ordering::Equal),
            (true, false) => Some(std::cmp::Ordering::Less),
            (false, true) => Some(std::cmp::Ordering::Greater),
            (false, false) => None,
        }
    }
}

/// A set of functions deduplicated by node id.
///
/// Two handles denoting the same function are the same set member, so
/// membership is function identity. The decomposition utilities build
/// their level sets with this type.
#[derive(Default, Clone)]
pub struct BddFnSet {
    mgr: Option<BddMgr>,
    set: HashMap<Ref, Bdd>,
}

impl BddFnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a function; false if it was already present. All members
    /// must share one manager.
    pub fn insert(&mut self, f: Bdd) -> bool {
        let mgr = f.mgr().clone();
        if let Some(m) = &self.mgr {
            assert!(m.ptr_eq(&mgr), "BddFnSet members must share a manager");
        } else {
            self.mgr = Some(mgr);
        }
        match self.set.entry(f.node) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(f);
                true
            }
        }
    }

    /// Removes a function; false if it was not present.
    pub fn remove(&mut self, f: &Bdd) -> bool {
        self.set.remove(&f.node).is_some()
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn contains(&self, f: &Bdd) -> bool {
        self.set.contains_key(&f.node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bdd> {
        self.set.values()
    }

    /// The positive literal of the topmost variable (by current order)
    /// over all non-constant members; the zero function if there is none.
    pub fn get_top(&self) -> Bdd {
        let Some(mgr) = &self.mgr else {
            return Bdd::default();
        };
        let mut best: Option<(u32, Var)> = None;
        for f in self.set.values() {
            if !f.is_constant() {
                let index = f.index();
                if best.map_or(true, |(b, _)| index < b) {
                    best = Some((index, f.top_var()));
                }
            }
        }
        match best {
            Some((_, var)) => mgr.lit(var.id() as i32),
            None => mgr.zero(),
        }
    }

    /// Cofactors every member w.r.t. the literal.
    pub fn restrict(&self, lit: &Bdd) -> BddFnSet {
        let mut rtn = BddFnSet::new();
        for f in self.set.values() {
            rtn.insert(f / lit);
        }
        rtn
    }

    /// Replaces every member by both of its cofactors w.r.t. the
    /// literal's variable, eliminating it from the set.
    pub fn eliminate(&self, lit: &Bdd) -> BddFnSet {
        let mut rtn = BddFnSet::new();
        for f in self.set.values() {
            rtn.insert(f / lit);
            rtn.insert(f / &!lit);
        }
        rtn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mgr_with(initial_vars: usize) -> BddMgr {
        BddMgr::with_config(BddConfig {
            initial_vars,
            cache_size: 1 << 12,
            ..BddConfig::default()
        })
    }

    #[test]
    fn test_handle_refcounts() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let f = &a * &b;
        assert_eq!(f.num_refs(), 1);
        {
            let g = f.clone();
            assert_eq!(f.num_refs(), 2);
            assert_eq!(g, f);
        }
        assert_eq!(f.num_refs(), 1);
    }

    #[test]
    fn test_invalid_handle() {
        let f = Bdd::default();
        assert!(!f.valid());
        assert_eq!(f, Bdd::default());
    }

    #[test]
    fn test_operators() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);

        assert_eq!(!&a, a.inv());
        assert_eq!(&a * &b, a.and(&b));
        assert_eq!(!(&a * &b), a.nand(&b));
        assert_eq!(&a + &b, a.or(&b));
        assert_eq!(!(&a + &b), a.nor(&b));
        assert_eq!(&a ^ &b, a.xor(&b));
        assert_eq!(!(&a ^ &b), a.xnor(&b));
        assert_eq!(a.implies(&b), !&a + &b);

        let mut f = a.clone();
        f *= &b;
        assert_eq!(f, &a * &b);
        f += &b;
        assert_eq!(f, &(&a * &b) + &b);
    }

    #[test]
    fn test_double_complement_free() {
        let mgr = mgr_with(2);
        let a = mgr.lit(1);
        let before = mgr.nodes_allocd();
        let naa = !!&a;
        assert_eq!(naa, a);
        assert_eq!(mgr.nodes_allocd(), before);
    }

    #[test]
    fn test_partial_order() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let ab = &a * &b;
        let aorb = &a + &b;

        assert!(ab <= aorb);
        assert!(!(aorb <= ab));
        assert!(ab <= ab);
        assert!(mgr.zero() <= mgr.one());
        assert!(mgr.zero() <= mgr.zero());
        // a and b are incomparable.
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn test_ite_decomposition_access() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = !mgr.lit(2);
        let c = mgr.lit(3);

        let f = &(&a ^ &b) ^ &c;
        assert_eq!(f.get_if(), a);
        assert_eq!(f.get_then(), &!&b ^ &c);
        assert_eq!(f.get_else(), &b ^ &c);
        assert_eq!(f.top_var(), Var::new(1));
    }

    #[test]
    fn test_lit_predicates() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        assert!(a.is_pos_lit());
        assert!((!&a).is_neg_lit());
        let f = &a + &mgr.lit(2);
        assert!(!f.is_pos_lit());
        assert!(!f.is_neg_lit());
    }

    #[test]
    fn test_ith_lit_tracks_levels() {
        let mgr = mgr_with(8);
        let h = mgr.lit(8);
        let h1 = mgr.ith_lit(8);
        assert_eq!(h, h1);
    }

    #[test]
    fn test_fn_set_dedups() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let c = mgr.lit(3);

        let mut fns = BddFnSet::new();
        assert!(fns.insert(&a + &c));
        assert!(fns.insert(&a * &b));
        assert_eq!(fns.len(), 2);
        // The same function again is rejected.
        assert!(!fns.insert(&a * &b));
        assert_eq!(fns.len(), 2);

        let f = &(&a + &b) * &c;
        assert!(!fns.remove(&f));
        let ab = &a * &b;
        assert!(fns.remove(&ab));
        assert_eq!(fns.len(), 1);
    }

    #[test]
    fn test_fn_set_get_top() {
        let mgr = mgr_with(4);
        let b = mgr.lit(2);
        let c = mgr.lit(3);

        let mut fns = BddFnSet::new();
        fns.insert(&b * &c);
        fns.insert(c.clone());
        assert_eq!(fns.get_top(), b);

        let mut consts = BddFnSet::new();
        consts.insert(mgr.one());
        assert!(consts.get_top().is_zero());
    }

    #[test]
    fn test_fn_set_restrict_eliminate() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let c = mgr.lit(3);

        let mut fns = BddFnSet::new();
        fns.insert(&(&a * &b) + &c);

        let restricted = fns.restrict(&a);
        assert_eq!(restricted.len(), 1);
        assert!(restricted.contains(&(&b + &c)));

        let eliminated = fns.eliminate(&a);
        assert_eq!(eliminated.len(), 2);
        assert!(eliminated.contains(&(&b + &c)));
        assert!(eliminated.contains(&c));
    }

    #[test]
    #[should_panic(expected = "another manager")]
    fn test_cross_manager_panics() {
        let m1 = mgr_with(2);
        let m2 = mgr_with(2);
        let a = m1.lit(1);
        let b = m2.lit(1);
        let _ = &a * &b;
    }
}
