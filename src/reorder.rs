//! Dynamic variable reordering: Rudell's sifting algorithm.
//!
//! # Theory
//!
//! BDD size is extremely sensitive to the variable order: the same
//! function can be linear under one order and exponential under another.
//! Finding the optimum is NP-complete, so sifting settles for a strong
//! local search: each variable in turn is moved through every level by
//! adjacent swaps and left where the diagram was smallest.
//!
//! # Mechanics
//!
//! The primitive is [`exchange`][BddImpl::exchange], an in-place swap of
//! two adjacent levels that rewires only the nodes at those levels and
//! preserves every externally referenced function. During a reorder the
//! external reference counts are converted into *total* reference counts
//! (external + internal) so the swap can free nodes the moment their last
//! parent lets go, and restored afterwards.
//!
//! Variables are processed from the most populated level downward; each
//! sift first moves toward the nearer end of the order, then sweeps to
//! the other end, then returns to the best recorded position. A sift
//! direction is abandoned when the diagram grows past
//! `min(1.5 × start, maxNodes)`.
//!
//! # References
//!
//! - R. Rudell. "Dynamic variable ordering for ordered binary decision
//!   diagrams." ICCAD 1993.

use std::collections::HashMap;

use log::{debug, info};

use crate::engine::BddImpl;
use crate::reference::Ref;

impl BddImpl {
    /// Sifts every populated level, returning the number of nodes saved.
    pub(crate) fn reorder(&mut self, verbose: bool) -> usize {
        self.gc(true, false);
        self.lock_gc();
        self.reordering = true;
        self.arena.set_relaxed(true);

        let start_size = self.nodes_allocd();
        if verbose {
            info!("reorder: start size = {}", start_size);
        }

        let refs = self.save_xrefs();
        self.calc_total_refs(&refs);
        for tbl in self.tables[1..].iter_mut() {
            tbl.set_processed(false);
        }

        if self.max_index() >= 2 {
            loop {
                let index = self.next_sift_index();
                if index == 0 {
                    break;
                }
                self.tables[index as usize].set_processed(true);
                // Start toward the nearer end of the order.
                if index < self.max_index() >> 1 {
                    self.sift_udu(index);
                } else {
                    self.sift_dud(index);
                }
                debug_assert!(self.nodes_allocd() <= start_size);
            }
        }

        self.restore_xrefs(&refs);
        self.rebuild_var2index();

        self.reordering = false;
        self.arena.set_relaxed(false);
        self.unlock_gc();
        self.sweep_caches(true);

        let saved = start_size.saturating_sub(self.nodes_allocd());
        if verbose {
            info!("reorder: end size = {}, saved = {}", self.nodes_allocd(), saved);
        }
        saved
    }

    //
    // Reference bookkeeping.
    //

    /// Records every externally referenced node and zeroes the counts, so
    /// the `refs` field can hold total references for the duration.
    fn save_xrefs(&mut self) -> HashMap<Ref, u32> {
        let mut refs = HashMap::new();
        let roots = self.chained_nodes();
        for f in roots {
            let n = self.node(f).num_refs();
            if n > 0 {
                refs.insert(f, n);
                self.arena.at_mut(f).set_refs(0);
            }
        }
        refs
    }

    /// Converts the cleared counts into total reference counts: one for
    /// the external root itself plus one per internal parent edge.
    fn calc_total_refs(&mut self, refs: &HashMap<Ref, u32>) {
        let roots: Vec<Ref> = refs.keys().copied().collect();
        for f in roots {
            self.inc_trefs(f);
        }
    }

    fn restore_xrefs(&mut self, refs: &HashMap<Ref, u32>) {
        let nodes = self.chained_nodes();
        for f in nodes {
            let n = refs.get(&f).copied().unwrap_or(0);
            self.arena.at_mut(f).set_refs(n);
        }
    }

    /// Every node currently chained in a unique table.
    fn chained_nodes(&self) -> Vec<Ref> {
        let mut out = Vec::with_capacity(self.nodes_allocd());
        for tbl in &self.tables[1..] {
            for hdx in 0..tbl.num_buckets() {
                let mut f = tbl.bucket(hdx);
                while !f.is_null() {
                    out.push(f);
                    f = self.node(f).next;
                }
            }
        }
        out
    }

    /// Adds one total reference to `f`, descending on the first visit.
    fn inc_trefs(&mut self, f: Ref) {
        if f.slot() <= 1 {
            return;
        }
        if self.node(f).num_refs() == 0 {
            let (hi, lo) = (self.hi(f), self.lo(f));
            self.inc_trefs(hi);
            self.inc_trefs(lo);
        }
        self.arena.at_mut(f).inc_ref();
    }

    /// Drops one total reference from `f`, cascading to the children when
    /// the last reference goes away.
    fn dec_trefs(&mut self, f: Ref) {
        if f.slot() <= 1 {
            return;
        }
        self.arena.at_mut(f).dec_ref();
        if self.node(f).num_refs() == 0 {
            let (hi, lo) = (self.hi(f), self.lo(f));
            self.dec_trefs(hi);
            self.dec_trefs(lo);
        }
    }

    //
    // Sift scheduling.
    //

    /// The unprocessed level holding the most nodes; 0 when none remain.
    fn next_sift_index(&self) -> u32 {
        let mut rtn = 0;
        let mut worst = 0;
        for (idx, tbl) in self.tables.iter().enumerate().skip(1) {
            if !tbl.processed() && tbl.len() > worst {
                worst = tbl.len();
                rtn = idx as u32;
            }
        }
        rtn
    }

    /// Node budget for one sift: abandon a direction once the diagram
    /// outgrows it.
    fn max_size(&self, start: usize) -> usize {
        (start + (start >> 1)).min(self.arena.max_nodes())
    }

    /// Sift up, then down, then back up to the best position.
    fn sift_udu(&mut self, index: u32) {
        debug!("sift_udu({})", index);
        let start_sz = self.nodes_allocd();
        let max_sz = self.max_size(start_sz);

        let mut jdx = index;
        while jdx > 1 && self.nodes_allocd() < max_sz {
            jdx -= 1;
            self.exchange(jdx);
        }

        // Always take the first downward exchange: the climb above may
        // have blown the budget already, and the minimum tracking is
        // anchored on it.
        let mut delta = self.exchange(jdx);
        jdx += 1;
        let mut best = delta.min(0);
        let mut best_index = if delta < 0 { jdx } else { jdx - 1 };

        while jdx < self.max_index() && self.nodes_allocd() < max_sz {
            delta += self.exchange(jdx);
            jdx += 1;
            if delta < best {
                best = delta;
                best_index = jdx;
            }
        }
        debug_assert!(best <= 0);

        while best_index < jdx {
            jdx -= 1;
            self.exchange(jdx);
        }

        self.rebuild_var2index();
    }

    /// Sift down, then up, then back down to the best position.
    fn sift_dud(&mut self, index: u32) {
        debug!("sift_dud({})", index);
        let start_sz = self.nodes_allocd();
        let max_sz = self.max_size(start_sz);

        let mut jdx = index;
        while jdx < self.max_index() && self.nodes_allocd() < max_sz {
            self.exchange(jdx);
            jdx += 1;
        }

        jdx -= 1;
        let mut delta = self.exchange(jdx);
        let mut best = delta.min(0);
        let mut best_index = if delta < 0 { jdx } else { jdx + 1 };

        while jdx > 1 && self.nodes_allocd() < max_sz {
            jdx -= 1;
            delta += self.exchange(jdx);
            if delta <= best {
                best = delta;
                best_index = jdx;
            }
        }
        debug_assert!(best <= 0);

        while best_index > jdx {
            self.exchange(jdx);
            jdx += 1;
        }

        self.rebuild_var2index();
    }

    pub(crate) fn rebuild_var2index(&mut self) {
        for idx in 1..self.index2var.len() {
            let var = self.index2var[idx] as usize;
            self.var2index[var] = idx as u32;
        }
    }

    //
    // Adjacent exchange.
    //

    /// Swaps levels `index` and `index + 1` in place, preserving every
    /// externally referenced function. Returns the node-count delta.
    ///
    /// The three passes must run in exactly this order; a node leaving
    /// the lower level must not be reclaimed before every upper-level
    /// parent has been rewired past it:
    ///
    /// 1. **Demote** upper-level nodes that do not depend on the moving
    ///    variable (both children below `index + 1`).
    /// 2. **Swap cofactors** of the remaining upper-level nodes: rebuild
    ///    their children from the four grand-cofactors under the new
    ///    order.
    /// 3. **Promote** lower-level nodes that still have references; free
    ///    the rest.
    fn exchange(&mut self, index: u32) -> i64 {
        let i = index as usize;
        self.index2var.swap(i, i + 1);

        let start_sz = (self.tables[i].len() + self.tables[i + 1].len()) as i64;

        let mut upper: Vec<Ref> = Vec::new();
        let mut lower: Vec<Ref> = Vec::new();
        {
            let BddImpl { tables, arena, .. } = self;
            let (t1, t2) = tables.split_at_mut(i + 1);
            t1[i].clear_into(arena, &mut upper);
            t2[0].clear_into(arena, &mut lower);
        }

        // The processed flag tracks the variable, not the level.
        let p = self.tables[i].processed();
        let q = self.tables[i + 1].processed();
        self.tables[i].set_processed(q);
        self.tables[i + 1].set_processed(p);

        self.demote(&upper, index);
        self.swap_cofactors(&upper, index);
        self.promote(&lower, index);

        let end_sz = (self.tables[i].len() + self.tables[i + 1].len()) as i64;
        end_sz - start_sz
    }

    /// Nodes at `index` whose children both lie below `index + 1` do not
    /// depend on the moving variable; relabel them one level down.
    fn demote(&mut self, nodes: &[Ref], index: u32) {
        let BddImpl { tables, arena, .. } = self;
        for &f in nodes {
            let hi = arena.at(f).hi;
            if arena.at(hi).index > index + 1 {
                let lo = arena.at(f).lo;
                if arena.at(lo).index > index + 1 {
                    arena.at_mut(f).index = index + 1;
                    tables[index as usize + 1].put_hash(arena, f);
                }
            }
        }
    }

    /// Rewires each remaining node at `index` from
    /// `v1 ? (v2 ? f11 : f10) : (v2 ? f01 : f00)` to
    /// `v2 ? (v1 ? f11 : f01) : (v1 ? f10 : f00)`, keeping the node's
    /// identity (and thus every external reference to it) intact.
    fn swap_cofactors(&mut self, nodes: &[Ref], index: u32) {
        for &f in nodes {
            if self.node(f).index != index {
                continue; // demoted
            }

            let f1 = self.hi(f);
            let f0 = self.lo(f);
            self.dec_trefs(f1);
            self.dec_trefs(f0);

            let (f11, f10) = if self.index(f1) == index + 1 {
                (self.hi(f1), self.lo(f1))
            } else {
                (f1, f1)
            };
            let (f01, f00) = if self.index(f0) == index + 1 {
                (self.xhi(f0), self.xlo(f0))
            } else {
                (f0, f0)
            };

            let new_hi = if f11 != f01 {
                self.find_or_add_unique(index + 1, f11, f01)
                    .expect("node allocation failed during reorder")
            } else {
                f11
            };
            self.inc_trefs(new_hi);
            self.arena.at_mut(f).hi = new_hi;

            let new_lo = if f10 != f00 {
                self.find_or_add_unique(index + 1, f10, f00)
                    .expect("node allocation failed during reorder")
            } else {
                f00
            };
            self.inc_trefs(new_lo);
            self.arena.at_mut(f).lo = new_lo;

            let BddImpl { tables, arena, .. } = self;
            tables[index as usize].put_hash(arena, f);
        }
    }

    /// Lower-level nodes still referenced move up to `index`; the rest
    /// lost their last parent during the cofactor swap and are freed.
    fn promote(&mut self, nodes: &[Ref], index: u32) {
        for &f in nodes {
            if self.node(f).num_refs() > 0 {
                self.arena.at_mut(f).index = index;
                let BddImpl { tables, arena, .. } = self;
                tables[index as usize].put_hash(arena, f);
            } else {
                self.arena.free(f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{BddConfig, BddImpl};
    use crate::reference::Ref;
    use crate::types::Var;

    fn small() -> BddImpl {
        BddImpl::new(&BddConfig {
            initial_vars: 8,
            cache_size: 1 << 10,
            ..BddConfig::default()
        })
    }

    /// Evaluates `f` under a full assignment given as signed literals.
    fn eval(bdd: &mut BddImpl, f: Ref, cube: &[i32]) -> bool {
        let mut c = bdd.one;
        for &lit in cube {
            let l = bdd.lit(lit).unwrap();
            c = bdd.and2(c, l).unwrap();
        }
        let r = bdd.restrict(f, c).unwrap();
        assert!(bdd.is_constant(r));
        bdd.is_one(r)
    }

    #[test]
    fn test_exchange_preserves_semantics() {
        let mut bdd = small();
        let a = bdd.lit(1).unwrap();
        let b = bdd.lit(2).unwrap();
        let f = bdd.and2(a, b).unwrap();
        bdd.inc_ref(f);

        bdd.gc(true, false);
        let refs = bdd.save_xrefs();
        bdd.calc_total_refs(&refs);
        bdd.exchange(1);
        bdd.restore_xrefs(&refs);
        bdd.rebuild_var2index();
        bdd.sweep_caches(true);

        // Variable order flipped, function intact.
        assert_eq!(bdd.var_order(), vec![Var::new(2), Var::new(1)]);
        assert!(eval(&mut bdd, f, &[1, 2]));
        assert!(!eval(&mut bdd, f, &[1, -2]));
        assert!(!eval(&mut bdd, f, &[-1, 2]));
        assert!(bdd.check_mem());
    }

    #[test]
    fn test_reorder_shrinks_mismatched_order() {
        let mut bdd = small();
        // f = a1·b1 + a2·b2 with the hostile order a1 a2 b1 b2.
        let a1 = bdd.lit(1).unwrap();
        let a2 = bdd.lit(2).unwrap();
        let b1 = bdd.lit(3).unwrap();
        let b2 = bdd.lit(4).unwrap();
        let f = {
            let p = bdd.and2(a1, b1).unwrap();
            let q = bdd.and2(a2, b2).unwrap();
            bdd.or2(p, q).unwrap()
        };
        bdd.inc_ref(f);

        let before = bdd.count_nodes(&[f]);
        let saved = bdd.reorder(false);
        let after = bdd.count_nodes(&[f]);
        assert!(after <= before);
        assert!(saved > 0 || after == before);

        // Truth table unchanged under every assignment.
        for bits in 0..16u32 {
            let cube: Vec<i32> = (0..4)
                .map(|i| {
                    let v = i as i32 + 1;
                    if bits & (1 << i) != 0 {
                        v
                    } else {
                        -v
                    }
                })
                .collect();
            let expect = (bits & 0b0101 == 0b0101) || (bits & 0b1010 == 0b1010);
            assert_eq!(eval(&mut bdd, f, &cube), expect, "bits = {:04b}", bits);
        }
        assert!(bdd.check_mem());
    }

    #[test]
    fn test_reorder_restores_external_refs() {
        let mut bdd = small();
        let a = bdd.lit(1).unwrap();
        let b = bdd.lit(2).unwrap();
        let f = bdd.xor2(a, b).unwrap();
        bdd.inc_ref(f);
        bdd.inc_ref(f);

        bdd.reorder(false);
        assert_eq!(bdd.num_refs(f), 2);
        assert_eq!(bdd.gc_lock, 0);
        assert!(!bdd.reordering);
    }
}
