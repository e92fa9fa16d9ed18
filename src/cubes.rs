//! Support analysis, satisfying cubes, cube factoring, node counting and
//! the debug dump.
//!
//! These walks use the transient mark bits (never bit 0, which belongs to
//! the garbage collector) and clear them before returning.

use std::collections::HashSet;

use log::debug;

use crate::engine::BddImpl;
use crate::reference::Ref;
use crate::types::Var;

/// Mark bit used by the traversals in this module.
const VISIT_MARK: u8 = 1;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Unateness {
    Pos,
    Neg,
    Binate,
}

impl BddImpl {
    //
    // Support.
    //

    /// The support of `f` as a cube of positive literals.
    pub(crate) fn support_cube(&mut self, f: Ref) -> Option<Ref> {
        let rtn = self.support_cube_rec(f);
        self.unmark_nodes(f, VISIT_MARK);
        rtn
    }

    fn support_cube_rec(&mut self, f: Ref) -> Option<Ref> {
        if self.is_constant(f) || self.node(f).marked(VISIT_MARK) {
            return Some(self.one);
        }
        self.arena.at_mut(f).set_mark(VISIT_MARK);

        // Support ignores complement edges, so the stored children suffice.
        let (hi, lo) = (self.hi(f), self.lo(f));
        let s1 = self.support_cube_rec(hi)?;
        let s0 = self.support_cube_rec(lo)?;
        let below = self.and2(s1, s0)?;
        let zero = self.zero;
        self.make_node(self.index(f), below, zero)
    }

    /// The support of `f` as a variable vector in index order (topmost
    /// first). An empty vector for constants, or when the arena is
    /// exhausted mid-walk.
    pub(crate) fn support_vec(&mut self, f: Ref) -> Vec<Var> {
        let Some(cube) = self.support_cube(f) else {
            return Vec::new();
        };
        let mut rtn = Vec::new();
        let mut s = cube;
        while !self.is_constant(s) {
            rtn.push(self.top_var(s));
            s = self.hi(s);
        }
        rtn
    }

    pub(crate) fn support_size(&mut self, f: Ref) -> usize {
        self.support_vec(f).len()
    }

    //
    // Satisfying cube.
    //

    /// A cube of literals satisfying `f`, preferring the hi branch; the
    /// zero function if `f` is unsatisfiable.
    pub(crate) fn one_cube(&mut self, f: Ref) -> Option<Ref> {
        if self.is_constant(f) {
            return Some(f);
        }
        let index = self.index(f);
        let zero = self.zero;

        let f1 = self.xhi(f);
        let hi = self.one_cube(f1)?;
        if self.is_zero(hi) {
            let f0 = self.xlo(f);
            let lo = self.one_cube(f0)?;
            self.make_node(index, zero, lo)
        } else {
            self.make_node(index, hi, zero)
        }
    }

    //
    // Cube factor.
    //

    /// The largest cube `c` dividing `f` (every minterm of `f` lies in
    /// `c`). Walks the support bottom-up, classifying each variable's
    /// unateness over the growing set of cofactor functions: a positively
    /// unate variable contributes a positive literal, a negatively unate
    /// one a negative literal, and a binate variable contributes nothing.
    pub(crate) fn cube_factor(&mut self, f: Ref) -> Option<Ref> {
        debug!("cube_factor(f = {})", f);
        if self.is_constant(f) {
            return Some(f);
        }

        let mut fns = HashSet::new();
        fns.insert(f);

        let vars = self.support_vec(f);
        if vars.is_empty() {
            return None;
        }
        let mut indices: Vec<u32> = vars.iter().map(|v| self.var2index[v.id() as usize]).collect();
        indices.reverse();

        self.cube_factor_rec(&mut indices, &fns)
    }

    fn cube_factor_rec(&mut self, indices: &mut Vec<u32>, fns: &HashSet<Ref>) -> Option<Ref> {
        let Some(index) = indices.pop() else {
            return Some(self.one);
        };

        let unateness = self.unateness(index, fns);
        let expanded = self.expand_fn_set(index, fns);
        let rtn = self.cube_factor_rec(indices, &expanded)?;
        let zero = self.zero;

        match unateness {
            Unateness::Pos => self.make_node(index, rtn, zero),
            Unateness::Neg => self.make_node(index, zero, rtn),
            Unateness::Binate => Some(rtn),
        }
    }

    /// Classifies the function set w.r.t. the variable at `index`, which
    /// is the topmost index across the set.
    fn unateness(&self, index: u32, fns: &HashSet<Ref>) -> Unateness {
        let mut is_pos = true;
        let mut is_neg = true;

        for &f in fns {
            if self.is_one(f) {
                return Unateness::Binate;
            }
            if !self.is_zero(f) {
                if self.index(f) != index {
                    return Unateness::Binate;
                }
                if !self.is_zero(self.xlo(f)) {
                    is_pos = false;
                }
                if !self.is_zero(self.xhi(f)) {
                    is_neg = false;
                }
            }
        }

        debug_assert!(!(is_pos && is_neg));
        if is_pos {
            Unateness::Pos
        } else if is_neg {
            Unateness::Neg
        } else {
            Unateness::Binate
        }
    }

    /// Replaces every member rooted at `index` by both of its cofactors.
    fn expand_fn_set(&self, index: u32, fns: &HashSet<Ref>) -> HashSet<Ref> {
        let mut rtn = HashSet::with_capacity(fns.len() * 2);
        for &f in fns {
            if !self.is_constant(f) && self.index(f) == index {
                rtn.insert(self.xhi(f));
                rtn.insert(self.xlo(f));
            } else {
                rtn.insert(f);
            }
        }
        rtn
    }

    /// True iff `f` is a product of literals (the constant one counts as
    /// the empty product).
    pub(crate) fn is_cube(&self, f: Ref) -> bool {
        if self.is_one(f) {
            return true;
        }
        if self.is_zero(f) {
            return false;
        }
        let (hi, lo) = (self.xhi(f), self.xlo(f));
        if self.is_zero(lo) {
            self.is_cube(hi)
        } else if self.is_zero(hi) {
            self.is_cube(lo)
        } else {
            false
        }
    }

    //
    // Counting.
    //

    /// Unique nodes reachable from the given roots, shared subgraphs and
    /// the terminal counted once.
    pub(crate) fn count_nodes(&mut self, fs: &[Ref]) -> usize {
        let mut count = 0;
        for &f in fs {
            count += self.count_nodes_rec(f);
        }
        for &f in fs {
            self.unmark_nodes(f, VISIT_MARK);
        }
        count
    }

    fn count_nodes_rec(&mut self, f: Ref) -> usize {
        if self.node(f).marked(VISIT_MARK) {
            return 0;
        }
        self.arena.at_mut(f).set_mark(VISIT_MARK);
        if self.is_constant(f) {
            1
        } else {
            let (hi, lo) = (self.hi(f), self.lo(f));
            1 + self.count_nodes_rec(hi) + self.count_nodes_rec(lo)
        }
    }

    //
    // Debug dump.
    //

    /// An indented tree rendering of `f`; shared nodes are printed once
    /// and referenced by slot afterwards.
    pub(crate) fn to_tree_string(&mut self, f: Ref) -> String {
        let mut out = String::new();
        self.tree_string_rec(f, 0, &mut out);
        self.unmark_nodes(f, VISIT_MARK);
        out
    }

    fn tree_string_rec(&mut self, f: Ref, depth: usize, out: &mut String) {
        use std::fmt::Write;

        let _ = write!(out, "{:indent$}", "", indent = 2 * depth);
        if self.is_zero(f) {
            out.push_str("[0]\n");
        } else if self.is_one(f) {
            out.push_str("[1]\n");
        } else if self.node(f).marked(VISIT_MARK) {
            let _ = writeln!(out, "[{}{}]", if f.is_complemented() { "~" } else { "" }, f.slot());
        } else {
            self.arena.at_mut(f).set_mark(VISIT_MARK);
            let _ = writeln!(
                out,
                "{}{:04}:{}",
                if f.is_complemented() { "~" } else { "" },
                f.slot(),
                self.index(f),
            );
            let (hi, lo) = (self.hi(f), self.lo(f));
            self.tree_string_rec(hi, depth + 1, out);
            self.tree_string_rec(lo, depth + 1, out);
        }
    }
}
