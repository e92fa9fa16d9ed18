//! Quasi-algebraic decomposition: conjunctive and XOR factors.
//!
//! [`find_product`] looks for a non-trivial `h` such that `f = g·h` for
//! some `g` (recoverable as `g = f/h`); [`find_xor`] looks for `h` with
//! `f = g ⊕ h` (then `g = f ⊕ h`). Both walk the support, eliminating one
//! variable at a time from a [`BddFnSet`] of subfunctions and testing the
//! per-level compatibility conditions; the factor is rebuilt as
//! `x·h1 + ¬x·h0` on the way out.
//!
//! # References
//!
//! - T. Stanion and C. Sechen, "Quasi-algebraic decompositions of
//!   switching functions," ARVLSI 1995; restricted here to the AND and
//!   XOR cases.

use crate::bdd::{Bdd, BddFnSet};

/// Tries to find a non-trivial function `h` such that `f = g·h` for some
/// `g`. Returns the constant one when no such factor exists.
pub fn find_product(f: &Bdd) -> Bdd {
    assert!(f.valid());

    let mgr = f.mgr().clone();
    let mut rtn: Option<Bdd> = None;

    if !f.is_constant() {
        let mut vars = f.support_vec();
        let mut set = BddFnSet::new();
        set.insert(f.clone());

        // Leave the last variable out, so at least one variable stays in
        // a separate partition from the factor.
        vars.pop();
        for var in vars {
            let lit = mgr.lit(var.id() as i32);
            set = set.eliminate(&lit);
            match product_of_set(&set) {
                Some(result) => rtn = Some(result),
                None if rtn.is_none() => break,
                None => {}
            }
        }
    }

    rtn.unwrap_or_else(|| mgr.one())
}

/// One level of the product search: either every subfunction agrees on a
/// common factor below this point, or there is none.
fn product_of_set(fns: &BddFnSet) -> Option<Bdd> {
    if no_product(fns) {
        return None;
    }
    if fns.len() == 1 {
        return fns.iter().next().cloned();
    }
    if fns.len() == 2 {
        let mut iter = fns.iter();
        let f1 = iter.next().unwrap();
        let f2 = iter.next().unwrap();
        if f1.is_zero() {
            return Some(f2.clone());
        }
        if f2.is_zero() {
            return Some(f1.clone());
        }
        if *f1 == !f2 {
            return None;
        }
    }

    let x = fns.get_top();
    let h1 = product_of_set(&fns.restrict(&x))?;
    let h0 = product_of_set(&fns.restrict(&!&x))?;
    Some(&(&x * &h1) + &(&!&x * &h0))
}

/// A set containing the constant one alongside a non-constant member
/// cannot share a product factor.
fn no_product(fns: &BddFnSet) -> bool {
    if fns.len() <= 1 {
        return false;
    }
    let mut seen_one = false;
    let mut seen_other = false;
    for f in fns.iter() {
        if f.is_one() {
            seen_one = true;
        } else if !f.is_zero() {
            seen_other = true;
        }
        if seen_one && seen_other {
            return true;
        }
    }
    false
}

/// Tries to find a non-trivial function `h` such that `f = g ⊕ h` for
/// some `g`. Returns the constant zero when no such factor exists.
pub fn find_xor(f: &Bdd) -> Bdd {
    assert!(f.valid());

    let mgr = f.mgr().clone();
    let mut rtn: Option<Bdd> = None;

    if !f.is_constant() {
        let mut vars = f.support_vec();
        let mut set = BddFnSet::new();
        set.insert(f.clone());

        vars.pop();
        for var in vars {
            let lit = mgr.lit(var.id() as i32);
            set = set.eliminate(&lit);
            match xor_of_set(&set) {
                Some(result) => rtn = Some(result),
                None if rtn.is_none() => break,
                None => {}
            }
        }
    }

    rtn.unwrap_or_else(|| mgr.zero())
}

fn xor_of_set(fns: &BddFnSet) -> Option<Bdd> {
    if no_xor(fns) {
        return None;
    }
    if fns.len() == 1 {
        return fns.iter().next().cloned();
    }
    if fns.len() == 2 {
        let mut iter = fns.iter();
        let f1 = iter.next().unwrap();
        let f2 = iter.next().unwrap();
        if *f1 == !f2 {
            return Some(f1.abs());
        }
    }

    let x = fns.get_top();
    let h1 = xor_of_set(&fns.restrict(&x))?;
    let h0 = xor_of_set(&fns.restrict(&!&x))?;
    Some(&(&x * &h1) + &(&!&x * &h0))
}

/// An XOR factor shifts every subfunction by a constant, so constants and
/// non-constants cannot mix.
fn no_xor(fns: &BddFnSet) -> bool {
    if fns.len() <= 1 {
        return false;
    }
    let mut seen_const = false;
    let mut seen_other = false;
    for f in fns.iter() {
        if f.is_constant() {
            seen_const = true;
        } else {
            seen_other = true;
        }
        if seen_const && seen_other {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdd::BddMgr;
    use crate::engine::BddConfig;

    fn mgr_with(initial_vars: usize) -> BddMgr {
        BddMgr::with_config(BddConfig {
            initial_vars,
            cache_size: 1 << 12,
            ..BddConfig::default()
        })
    }

    #[test]
    fn test_find_product_recovers_factors() {
        let mgr = mgr_with(8);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let c = mgr.lit(3);
        let d = mgr.lit(4);
        let e = mgr.lit(5);
        let f = mgr.lit(6);

        // F = (a+b+c+d)·(c+d+e+f): factors share c and d.
        let g = &(&(&a + &b) + &c) + &d;
        let h = &(&(&c + &d) + &e) + &f;
        let func = &g * &h;

        let h2 = find_product(&func);
        let g2 = &func / &h2;
        assert_eq!(h2, h);
        assert_eq!(g2, g);
        assert_eq!(&g2 * &h2, func);
    }

    #[test]
    fn test_find_product_trivial() {
        let mgr = mgr_with(8);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let c = mgr.lit(3);
        let d = mgr.lit(4);
        let e = mgr.lit(5);
        let f = mgr.lit(6);

        // A disjoint sum of products has only the trivial factor.
        let func = &(&(&a * &b) * &c) + &(&(&d * &e) * &f);
        assert!(find_product(&func).is_one());

        // XOR chains have no conjunctive factor either.
        let func = &(&a ^ &b) ^ &(&c ^ &d);
        assert!(find_product(&func).is_one());

        assert!(find_product(&mgr.one()).is_one());
    }

    #[test]
    fn test_find_xor_recovers_factor() {
        let mgr = mgr_with(8);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let c = mgr.lit(3);
        let d = mgr.lit(4);
        let e = mgr.lit(5);
        let f = mgr.lit(6);

        let g = &(&(&a + &b) + &c) + &d;
        let h = &(&(&c + &d) + &e) + &f;
        let func = &g ^ &h;

        let h2 = find_xor(&func);
        let g2 = &func ^ &h2;
        // The recovered pieces recombine to the function and each touches
        // only support variables of the function.
        assert_eq!(&g2 ^ &h2, func);
        assert!(func.support_cube() <= g2.support_cube());
        assert!(func.support_cube() <= h2.support_cube());
    }

    #[test]
    fn test_find_xor_trivial() {
        let mgr = mgr_with(8);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let c = mgr.lit(3);
        let d = mgr.lit(4);
        let e = mgr.lit(5);
        let f = mgr.lit(6);

        let func = &(&(&a * &b) * &c) + &(&(&d * &e) * &f);
        assert!(find_xor(&func).is_zero());
    }
}
