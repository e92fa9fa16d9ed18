//! The Boolean kernel.
//!
//! Every operator is a cofactor recursion on the minimum index among its
//! arguments, memoized in a per-operator computed cache. The whole algebra
//! is reduced to two canonical two-operand primitives, AND and XOR, plus
//! ITE; the rest falls out of complement edges:
//!
//! ```text
//! NAND(f,g) = ¬AND(f,g)        NOR(f,g) = AND(¬f,¬g)
//! OR(f,g)   = ¬AND(¬f,¬g)      XNOR(f,g)= ¬XOR(f,g)
//! IMP(f,g)  = ¬AND(f,¬g)
//! ```
//!
//! Allocation failure surfaces as `None` and unwinds the recursion via
//! `?`. Each public entry point converts a `None` into one forced garbage
//! collection and a single retry; a second failure is the caller's
//! problem (an invalid handle).

use log::debug;

use crate::engine::BddImpl;
use crate::reference::Ref;
use crate::types::{Op, Var};

/// Orders a commutative operand pair by raw id so that cache keys are
/// canonical.
#[inline]
fn order_ops(f: &mut Ref, g: &mut Ref) {
    if f.raw() > g.raw() {
        std::mem::swap(f, g);
    }
}

impl BddImpl {
    //
    // Public entry points: null-then-retry boundary.
    //

    pub(crate) fn apply(&mut self, f: Ref, g: Ref, op: Op) -> Option<Ref> {
        debug!("apply(f = {}, g = {}, op = {})", f, g, op);
        let mut rtn = self.apply2(f, g, op);
        if rtn.is_none() && self.gc_lock == 0 {
            self.gc(true, false);
            rtn = self.apply2(f, g, op);
        }
        rtn
    }

    pub(crate) fn ite(&mut self, f: Ref, g: Ref, h: Ref) -> Option<Ref> {
        debug!("ite(f = {}, g = {}, h = {})", f, g, h);
        let mut rtn = self.ite_rec(f, g, h);
        if rtn.is_none() && self.gc_lock == 0 {
            self.gc(true, false);
            rtn = self.ite_rec(f, g, h);
        }
        rtn
    }

    /// Generalized cofactor of `f` w.r.t. the non-zero care function `c`.
    pub(crate) fn restrict(&mut self, f: Ref, c: Ref) -> Option<Ref> {
        debug!("restrict(f = {}, c = {})", f, c);
        debug_assert!(!self.is_zero(c), "restrict care function must be non-zero");
        let mut rtn = self.restrict_rec(f, c);
        if rtn.is_none() && self.gc_lock == 0 {
            self.gc(true, false);
            rtn = self.restrict_rec(f, c);
        }
        rtn
    }

    /// Replaces variable `x` in `f` by `g`: `ite(g, f|x, f|¬x)`.
    ///
    /// GC stays locked through the sequence because the two cofactors are
    /// unreferenced intermediates.
    pub(crate) fn compose(&mut self, f: Ref, x: Var, g: Ref) -> Option<Ref> {
        debug!("compose(f = {}, x = {}, g = {})", f, x, g);
        self.lock_gc();
        let mut rtn = self.compose_rec(f, x, g);
        self.unlock_gc();

        if rtn.is_none() && self.gc_lock == 0 {
            self.gc(true, false);
            self.lock_gc();
            rtn = self.compose_rec(f, x, g);
            self.unlock_gc();
        }
        rtn
    }

    fn compose_rec(&mut self, f: Ref, x: Var, g: Ref) -> Option<Ref> {
        let poslit = self.lit(x.id() as i32)?;
        let neglit = -poslit;
        let f1 = self.restrict_rec(f, poslit)?;
        let f0 = self.restrict_rec(f, neglit)?;
        self.ite_rec(g, f1, f0)
    }

    /// The relational product `∃ vars(c). (f ∧ g)` in a single pass, for a
    /// positive-literal cube `c`.
    pub(crate) fn and_exists(&mut self, f: Ref, g: Ref, c: Ref) -> Option<Ref> {
        debug!("and_exists(f = {}, g = {}, c = {})", f, g, c);
        self.lock_gc();
        let mut rtn = self.and_exists_rec(f, g, c);
        self.unlock_gc();

        if rtn.is_none() && self.gc_lock == 0 {
            self.gc(true, false);
            self.lock_gc();
            rtn = self.and_exists_rec(f, g, c);
            self.unlock_gc();
        }
        rtn
    }

    /// True iff `f` covers `g`, i.e. `g ≤ f`. Decided without building the
    /// conjunction: the recursion bails out as soon as a non-constant
    /// residue appears.
    pub(crate) fn covers(&mut self, f: Ref, g: Ref) -> bool {
        let val = self.and_constant(-f, g);
        val == Some(self.zero)
    }

    //
    // Operator dispatch.
    //

    fn apply2(&mut self, f: Ref, g: Ref, op: Op) -> Option<Ref> {
        match op {
            Op::And => self.and2(f, g),
            Op::Nand => self.and2(f, g).map(|r| -r),
            Op::Or => self.and2(-f, -g).map(|r| -r),
            Op::Nor => self.and2(-f, -g),
            Op::Xor => self.xor2(f, g),
            Op::Xnor => self.xor2(f, g).map(|r| -r),
            Op::Imp => self.and2(f, -g).map(|r| -r),
        }
    }

    #[inline]
    pub(crate) fn or2(&mut self, f: Ref, g: Ref) -> Option<Ref> {
        self.and2(-f, -g).map(|r| -r)
    }

    //
    // AND.
    //

    pub(crate) fn and2(&mut self, mut f: Ref, mut g: Ref) -> Option<Ref> {
        order_ops(&mut f, &mut g);

        // Terminal cases. Constants order first, so f holds any constant.
        if self.is_one(f) {
            return Some(g);
        }
        if self.is_zero(f) {
            return Some(self.zero);
        }
        if f == g {
            return Some(f);
        }
        if f == -g {
            return Some(self.zero);
        }

        if let Some(r) = self.and_cache.get(f, g) {
            return Some(r);
        }

        let index = self.min_index2(f, g);
        let hi = {
            let (f1, g1) = (self.cof1(f, index), self.cof1(g, index));
            self.and2(f1, g1)?
        };
        let lo = {
            let (f0, g0) = (self.cof0(f, index), self.cof0(g, index));
            self.and2(f0, g0)?
        };
        let rtn = self.make_node(index, hi, lo)?;
        self.and_cache.insert(f, g, rtn);
        Some(rtn)
    }

    //
    // XOR.
    //

    pub(crate) fn xor2(&mut self, mut f: Ref, mut g: Ref) -> Option<Ref> {
        order_ops(&mut f, &mut g);

        if self.is_one(f) {
            return Some(-g);
        }
        if self.is_zero(f) {
            return Some(g);
        }
        if f == g {
            return Some(self.zero);
        }
        if f == -g {
            return Some(self.one);
        }

        if let Some(r) = self.xor_cache.get(f, g) {
            return Some(r);
        }

        let index = self.min_index2(f, g);
        let hi = {
            let (f1, g1) = (self.cof1(f, index), self.cof1(g, index));
            self.xor2(f1, g1)?
        };
        let lo = {
            let (f0, g0) = (self.cof0(f, index), self.cof0(g, index));
            self.xor2(f0, g0)?
        };
        let rtn = self.make_node(index, hi, lo)?;
        self.xor_cache.insert(f, g, rtn);
        Some(rtn)
    }

    //
    // Constant-only AND, used by covers().
    //
    // Returns Some(constant) when f ∧ g is a constant, None as soon as any
    // residue is known to be non-constant. Shares the AND cache: hits with
    // non-constant results mean "not constant" immediately.
    //

    fn and_constant(&mut self, mut f: Ref, mut g: Ref) -> Option<Ref> {
        order_ops(&mut f, &mut g);

        if self.is_zero(f) || self.is_zero(g) {
            return Some(self.zero);
        }
        if self.is_one(f) {
            return if self.is_one(g) { Some(self.one) } else { None };
        }
        if f == -g {
            return Some(self.zero);
        }
        if f == g {
            return None;
        }

        if let Some(r) = self.and_cache.get(f, g) {
            return if self.is_constant(r) { Some(r) } else { None };
        }

        let index = self.min_index2(f, g);
        let hi = {
            let (f1, g1) = (self.cof1(f, index), self.cof1(g, index));
            self.and_constant(f1, g1)?
        };
        let lo = {
            let (f0, g0) = (self.cof0(f, index), self.cof0(g, index));
            self.and_constant(f0, g0)?
        };
        if hi == lo {
            self.and_cache.insert(f, g, hi);
            Some(hi)
        } else {
            None
        }
    }

    //
    // ITE.
    //

    fn ite_rec(&mut self, f: Ref, g: Ref, h: Ref) -> Option<Ref> {
        debug_assert!(!f.is_null() && !g.is_null() && !h.is_null());

        let (mut f, mut g, mut h) = (f, g, h);
        let inv = self.std_triple(&mut f, &mut g, &mut h);

        let rtn = if self.is_one(f) {
            g
        } else if g == h {
            g
        } else if self.is_one(g) && self.is_zero(h) {
            f
        } else if let Some(r) = self.ite_cache.get(f, g, h) {
            r
        } else {
            let index = self.min_index3(f, g, h);
            let hi = {
                let (f1, g1, h1) = (self.cof1(f, index), self.cof1(g, index), self.cof1(h, index));
                self.ite_rec(f1, g1, h1)?
            };
            let lo = {
                let (f0, g0, h0) = (self.cof0(f, index), self.cof0(g, index), self.cof0(h, index));
                self.ite_rec(f0, g0, h0)?
            };
            let r = self.make_node(index, hi, lo)?;
            self.ite_cache.insert(f, g, h, r);
            r
        };

        Some(if inv { -rtn } else { rtn })
    }

    /// Standardizes the triple among its equivalent forms so that the
    /// cache sees one canonical key per equivalence class. Returns true
    /// when the standardized form computes the complement of the request.
    fn std_triple(&self, f: &mut Ref, g: &mut Ref, h: &mut Ref) -> bool {
        self.reduce_then_else(*f, g, h);
        self.swap_args(f, g, h);
        self.std_negation(f, g, h)
    }

    /// Collapses then/else arguments that repeat `f` into constants:
    /// `ite(f,f,h) = ite(f,1,h)`, `ite(f,¬f,h) = ite(f,0,h)`,
    /// `ite(f,g,f) = ite(f,g,0)`, `ite(f,g,¬f) = ite(f,g,1)`.
    fn reduce_then_else(&self, f: Ref, g: &mut Ref, h: &mut Ref) {
        if f == *g {
            *g = self.one;
        } else if f == -*g {
            *g = self.zero;
        } else if f == *h {
            *h = self.zero;
        } else if f == -*h {
            *h = self.one;
        }
    }

    /// Exploits the ITE symmetries to move the lexicographically smaller
    /// top variable into the `f` slot:
    ///
    /// ```text
    /// ite(f,1,h) == ite(h,1,f)        ite(f,g,0) == ite(g,f,0)
    /// ite(f,g,1) == ite(¬g,¬f,1)      ite(f,0,h) == ite(¬h,0,¬f)
    /// ite(f,g,¬g) == ite(g,f,¬f)
    /// ```
    fn swap_args(&self, f: &mut Ref, g: &mut Ref, h: &mut Ref) {
        if self.is_one(*g) {
            self.cond_swap(f, h);
        } else if self.is_zero(*h) {
            self.cond_swap(f, g);
        } else if self.is_one(*h) {
            self.cond_swap_neg(f, g);
        } else if self.is_zero(*g) {
            self.cond_swap_neg(f, h);
        } else if *g == -*h && self.index(*f) > self.index(*g) {
            std::mem::swap(f, g);
            *h = -*g;
        }
    }

    fn cond_swap(&self, f: &mut Ref, g: &mut Ref) {
        if self.index(*f) > self.index(*g) {
            std::mem::swap(f, g);
        }
    }

    fn cond_swap_neg(&self, f: &mut Ref, g: &mut Ref) {
        if self.index(*f) > self.index(*g) {
            std::mem::swap(f, g);
            *f = -*f;
            *g = -*g;
        }
    }

    /// Forces `f` and `g` into positive phase; a complemented `g` inverts
    /// the then/else pair and flags the result for inversion.
    fn std_negation(&self, f: &mut Ref, g: &mut Ref, h: &mut Ref) -> bool {
        let mut inv = false;
        if f.is_complemented() {
            if h.is_complemented() {
                *f = -*f;
                *g = -*g;
                *h = -*h;
                std::mem::swap(g, h);
                inv = true;
            } else {
                *f = -*f;
                std::mem::swap(g, h);
            }
        } else if g.is_complemented() {
            *g = -*g;
            *h = -*h;
            inv = true;
        }
        inv
    }

    //
    // Generalized cofactor.
    //

    fn restrict_rec(&mut self, f: Ref, c: Ref) -> Option<Ref> {
        if let Some(r) = self.restrict_terminal(f, c) {
            return Some(r);
        }
        if let Some(r) = self.restrict_cache.get(f, c) {
            return Some(r);
        }

        let fdx = self.index(f);
        // OR-smooth the top variables of c above f; this is what makes the
        // result agree with the Shannon cofactor on cubes.
        let c = self.reduce(c, fdx)?;
        let c1 = self.cof1(c, fdx);
        let c0 = self.cof0(c, fdx);

        let rtn = if self.is_zero(c1) {
            let f0 = self.xlo(f);
            self.restrict_rec(f0, c0)?
        } else if self.is_zero(c0) {
            let f1 = self.xhi(f);
            self.restrict_rec(f1, c1)?
        } else {
            let r1 = {
                let f1 = self.xhi(f);
                self.restrict_rec(f1, c)?
            };
            let r0 = {
                let f0 = self.xlo(f);
                self.restrict_rec(f0, c)?
            };
            self.make_node(fdx, r1, r0)?
        };
        self.restrict_cache.insert(f, c, rtn);
        Some(rtn)
    }

    fn restrict_terminal(&self, f: Ref, c: Ref) -> Option<Ref> {
        if self.is_one(c) || self.is_constant(f) {
            Some(f)
        } else if f == c {
            Some(self.one)
        } else if f == -c {
            Some(self.zero)
        } else {
            None
        }
    }

    /// OR-smooths the top variable of `c` while it lies above `tgt`.
    fn reduce(&mut self, mut c: Ref, tgt: u32) -> Option<Ref> {
        let mut idx = self.index(c);
        while idx < tgt {
            let c1 = self.xhi(c);
            let c0 = self.xlo(c);
            c = self.or2(c1, c0)?;
            idx = self.index(c);
        }
        Some(c)
    }

    //
    // Relational product.
    //

    fn and_exists_rec(&mut self, mut f: Ref, mut g: Ref, c: Ref) -> Option<Ref> {
        order_ops(&mut f, &mut g);

        if self.is_one(c) {
            return self.and2(f, g);
        }
        if self.is_zero(f) {
            return Some(self.zero);
        }
        if f == -g {
            return Some(self.zero);
        }

        if let Some(r) = self.and_exists_cache.get(f, g, c) {
            return Some(r);
        }

        let index = self.min_index2(f, g);

        // Skip quantified variables above both operands: f ∧ g does not
        // depend on them.
        let mut c = c;
        let mut cdx = self.index(c);
        while cdx < index {
            c = self.hi(c);
            cdx = self.index(c);
        }

        let lo = {
            let (f0, g0, cr) = (self.cof0(f, index), self.cof0(g, index), self.cof1(c, index));
            self.and_exists_rec(f0, g0, cr)?
        };
        // OR identity: once the low half is 1 and this level is being
        // quantified, the high half cannot change the answer.
        if index == cdx && self.is_one(lo) {
            return Some(self.one);
        }
        let hi = {
            let (f1, g1, cr) = (self.cof1(f, index), self.cof1(g, index), self.cof1(c, index));
            self.and_exists_rec(f1, g1, cr)?
        };

        let rtn = if index == cdx {
            self.or2(lo, hi)?
        } else {
            self.make_node(index, hi, lo)?
        };
        self.and_exists_cache.insert(f, g, c, rtn);
        Some(rtn)
    }
}
