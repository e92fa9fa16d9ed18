//! Two-phase garbage collection.
//!
//! Reference counts alone cannot reclaim memory here: cycles are
//! structurally impossible, but every operator leaves unreferenced
//! intermediate nodes behind, and those are only discovered by tracing
//! from the externally referenced roots.
//!
//! Phases, in order:
//!
//! 1. **Mark**: walk every unique-table chain; nodes with a nonzero
//!    external refcount get mark bit 0 set on themselves and their
//!    transitive children.
//! 2. **Cache clean**: clear every computed-cache slot whose operands or
//!    result are unmarked, so no cache read can resurrect a freed node.
//! 3. **Sweep**: empty each chain; marked nodes are unmarked and
//!    re-chained, unmarked nodes go back to the arena free list.
//!
//! A collection is skipped entirely while the GC lock is held. The
//! trigger doubles whenever a collection leaves the allocated count above
//! it.

use log::{debug, info};

use crate::engine::BddImpl;
use crate::reference::Ref;

impl BddImpl {
    /// Possibly collects garbage, returning the number of nodes freed.
    ///
    /// Runs when `force` is set or the allocated count exceeds the
    /// trigger; never runs while the GC lock is held.
    pub(crate) fn gc(&mut self, force: bool, verbose: bool) -> usize {
        if self.gc_lock > 0 {
            return 0;
        }
        if !force && self.nodes_allocd() <= self.gc_trigger {
            return 0;
        }

        self.num_gcs += 1;
        debug!("gc #{}: {} nodes allocated", self.num_gcs, self.nodes_allocd());

        self.mark_referenced_nodes();
        self.sweep_caches(false);

        let mut freed = 0;
        let mut nodes: Vec<Ref> = Vec::new();
        for index in 1..=self.max_index() as usize {
            let BddImpl { tables, arena, .. } = self;
            nodes.clear();
            tables[index].clear_into(arena, &mut nodes);
            for &f in &nodes {
                if arena.at(f).marked(0) {
                    arena.at_mut(f).clr_mark(0);
                    tables[index].put_hash(arena, f);
                } else {
                    arena.free(f);
                    freed += 1;
                }
            }
        }

        if self.nodes_allocd() > self.gc_trigger {
            self.gc_trigger *= 2;
        }

        debug_assert!(self.arena.check());

        if verbose {
            info!(
                "gc #{}: {} live, {} freed",
                self.num_gcs,
                self.nodes_allocd(),
                freed
            );
        }

        freed
    }

    /// Marks every node reachable from an externally referenced node.
    fn mark_referenced_nodes(&mut self) {
        let mut roots: Vec<Ref> = Vec::new();
        for tbl in &self.tables[1..] {
            for hdx in 0..tbl.num_buckets() {
                let mut f = tbl.bucket(hdx);
                while !f.is_null() {
                    let node = self.arena.at(f);
                    if node.num_refs() > 0 {
                        roots.push(f);
                    }
                    f = node.next;
                }
            }
        }
        for f in roots {
            self.mark_nodes(f, 0);
        }
    }

    /// Sweeps all five computed caches against mark bit 0 (or wholesale
    /// when `force` is set, as after a reorder).
    pub(crate) fn sweep_caches(&mut self, force: bool) {
        let BddImpl {
            arena,
            and_cache,
            xor_cache,
            restrict_cache,
            ite_cache,
            and_exists_cache,
            ..
        } = self;
        and_cache.sweep(arena, force);
        xor_cache.sweep(arena, force);
        restrict_cache.sweep(arena, force);
        ite_cache.sweep(arena, force);
        and_exists_cache.sweep(arena, force);
    }
}
