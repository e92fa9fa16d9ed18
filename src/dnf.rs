//! Prime-irredundant covers: the Minato-Morreale expansion.
//!
//! Extracts a sum-of-products for a function (or for an interval of
//! functions) in which no term and no literal can be dropped without
//! changing what is represented.
//!
//! The recursion at the top variable `x` of the interval `f`:
//!
//! 1. cofactor into `f0`, `f1`;
//! 2. shrink each against the other's upper bound, so a term is only
//!    forced into a branch when the opposite branch cannot absorb it:
//!    `f0' = [f0.min·¬f1.max, f0.max]`, `f1' = [f1.min·¬f0.max, f1.max]`;
//! 3. extract covers `g0`, `g1` of the shrunken intervals;
//! 4. whatever `g0`/`g1` left uncovered must be covered by terms without
//!    `x`: extract `g2` from the residue interval
//!    `[f0.min·¬g0 + f1.min·¬g1, f0.max·f1.max]`;
//! 5. the cover is `¬x·g0 + x·g1 + g2`.
//!
//! # References
//!
//! - S. Minato: "Fast Generation of Prime-Irredundant Covers from Binary
//!   Decision Diagrams," IEICE Trans. Fundamentals, E76-A(6), 1993.

use crate::bdd::{Bdd, BddMgr};
use crate::interval::BddInterval;

/// A product of literals: signed variable ids.
pub type Term = Vec<i32>;

/// A sum of products.
pub type Dnf = Vec<Term>;

/// Extracts a prime-irredundant cover of `f`.
pub fn extract_dnf(f: &Bdd) -> Dnf {
    extract_dnf_interval(&BddInterval::exact(f.clone()))
}

/// Extracts a prime-irredundant cover of any implementation of the
/// interval.
pub fn extract_dnf_interval(f: &BddInterval) -> Dnf {
    let (_, dnf) = extract_dnf_pair(f);
    dnf
}

/// Builds the BDD of a cover.
pub fn dnf_to_bdd(mgr: &BddMgr, dnf: &Dnf) -> Bdd {
    let mut sum = mgr.zero();
    for term in dnf {
        sum = &sum + &term_to_bdd(mgr, term);
    }
    sum
}

/// Builds the BDD of one term. The empty term is the constant one.
pub fn term_to_bdd(mgr: &BddMgr, term: &Term) -> Bdd {
    let mut prod = mgr.one();
    for &lit in term {
        prod = &prod * &mgr.lit(lit);
    }
    prod
}

/// Recursive worker: returns the cover and the function it denotes.
fn extract_dnf_pair(f: &BddInterval) -> (Bdd, Dnf) {
    if f.min().is_zero() {
        return (f.min(), Vec::new());
    }
    if f.max().is_one() {
        // The tautology cover: a single empty term.
        return (f.max(), vec![Vec::new()]);
    }

    let x = f.top_var_lit();
    let nx = !&x;

    let f0 = BddInterval::new(&f.min() / &nx, &f.max() / &nx);
    let f1 = BddInterval::new(&f.min() / &x, &f.max() / &x);

    let fp0 = BddInterval::new(&f0.min() * &!&f1.max(), f0.max());
    let fp1 = BddInterval::new(&f1.min() * &!&f0.max(), f1.max());

    let (g0, dnf0) = extract_dnf_pair(&fp0);
    let (g1, dnf1) = extract_dnf_pair(&fp1);

    let fpp0 = BddInterval::new(&f0.min() * &!&g0, f0.max());
    let fpp1 = BddInterval::new(&f1.min() * &!&g1, f1.max());
    let f_star = BddInterval::new(&fpp0.min() + &fpp1.min(), &fpp0.max() * &fpp1.max());

    let (g2, dnf2) = extract_dnf_pair(&f_star);

    let g = &(&(&nx * &g0) + &(&x * &g1)) + &g2;
    let dnf = combine_dnf(&x, dnf0, dnf1, dnf2);
    debug_assert!(f.admits(&g));

    (g, dnf)
}

/// Prepends `¬x` to the terms of `d0` and `x` to the terms of `d1`; the
/// residue terms of `d2` pass through untouched.
fn combine_dnf(x: &Bdd, d0: Dnf, d1: Dnf, d2: Dnf) -> Dnf {
    let v = x.top_var().id() as i32;
    let mut rtn = Dnf::with_capacity(d0.len() + d1.len() + d2.len());

    for mut term in d0 {
        term.push(-v);
        rtn.push(term);
    }
    for mut term in d1 {
        term.push(v);
        rtn.push(term);
    }
    rtn.extend(d2);
    rtn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BddConfig;

    fn mgr_with(initial_vars: usize) -> BddMgr {
        BddMgr::with_config(BddConfig {
            initial_vars,
            cache_size: 1 << 12,
            ..BddConfig::default()
        })
    }

    #[test]
    fn test_constants() {
        let mgr = mgr_with(4);
        assert!(extract_dnf(&mgr.zero()).is_empty());
        let one_dnf = extract_dnf(&mgr.one());
        assert_eq!(one_dnf, vec![Vec::<i32>::new()]);
        assert!(dnf_to_bdd(&mgr, &one_dnf).is_one());
    }

    #[test]
    fn test_single_literal() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let dnf = extract_dnf(&a);
        assert_eq!(dnf, vec![vec![1]]);
        let dnf = extract_dnf(&!&a);
        assert_eq!(dnf, vec![vec![-1]]);
    }

    #[test]
    fn test_round_trip() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let c = mgr.lit(3);
        let d = mgr.lit(4);

        // f = a·b·d + ¬a·c·d + ¬b·c·¬d
        let f = {
            let t1 = &(&a * &b) * &d;
            let t2 = &(&!&a * &c) * &d;
            let t3 = &(&!&b * &c) * &!&d;
            &(&t1 + &t2) + &t3
        };
        let dnf = extract_dnf(&f);
        assert_eq!(dnf_to_bdd(&mgr, &dnf), f);

        // Irredundant: dropping any term changes the function.
        for skip in 0..dnf.len() {
            let pruned: Dnf = dnf
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != skip)
                .map(|(_, t)| t.clone())
                .collect();
            assert_ne!(dnf_to_bdd(&mgr, &pruned), f);
        }
    }

    #[test]
    fn test_interval_cover_lands_inside() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);

        // Any cover of [a·b, a+b] implements the interval.
        let f = BddInterval::new(&a * &b, &a + &b);
        let dnf = extract_dnf_interval(&f);
        let g = dnf_to_bdd(&mgr, &dnf);
        assert!(f.admits(&g));
        // The don't-care freedom buys a smaller cover than either bound's
        // own: here a single term.
        assert_eq!(dnf.len(), 1);
    }

    #[test]
    fn test_cover_of_xor() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let f = &a ^ &b;
        let dnf = extract_dnf(&f);
        // Both XOR minterms are essential primes.
        assert_eq!(dnf.len(), 2);
        assert_eq!(dnf_to_bdd(&mgr, &dnf), f);
    }
}
