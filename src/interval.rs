//! Incompletely specified functions as intervals.
//!
//! An interval `F = [min, max]` with `min ≤ max` stands for every
//! function `f` with `min ≤ f ≤ max`. Given an on-set `f` and don't-care
//! set `d`, the equivalent interval is `[f·¬d, f+d]`; conversely the
//! don't-care set of an interval is `max·¬min`. Unlike the (f, d) form,
//! the interval representation is unique.

use crate::bdd::{Bdd, BddMgr};
use std::ops::{Add, BitXor, Mul, Not};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BddInterval {
    min: Bdd,
    max: Bdd,
}

impl BddInterval {
    /// The interval `[f0, f1]`; requires `f0 ≤ f1`.
    pub fn new(f0: Bdd, f1: Bdd) -> Self {
        debug_assert!(f0 <= f1);
        Self { min: f0, max: f1 }
    }

    /// The completely specified interval `[f, f]`.
    pub fn exact(f: Bdd) -> Self {
        Self {
            min: f.clone(),
            max: f,
        }
    }

    /// The constant don't-care interval `[0, 1]`.
    pub fn x(mgr: &BddMgr) -> Self {
        Self {
            min: mgr.zero(),
            max: mgr.one(),
        }
    }

    pub fn min(&self) -> Bdd {
        self.min.clone()
    }

    pub fn max(&self) -> Bdd {
        self.max.clone()
    }

    /// The positive literal of the topmost variable of either bound.
    pub fn top_var_lit(&self) -> Bdd {
        let f = if self.min.index() < self.max.index() {
            &self.min
        } else {
            &self.max
        };
        f.get_if()
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.min.is_one()
    }

    pub fn is_x(&self) -> bool {
        self.min.is_zero() && self.max.is_one()
    }

    pub fn valid(&self) -> bool {
        self.min.valid() && self.max.valid()
    }

    /// Forces the interval to the constant X.
    pub fn to_x(&mut self, mgr: &BddMgr) {
        self.min = mgr.zero();
        self.max = mgr.one();
    }

    /// Interval containment: every implementation of `self` is an
    /// implementation of `rhs`.
    pub fn le(&self, rhs: &BddInterval) -> bool {
        rhs.min <= self.min && self.max <= rhs.max
    }

    /// True iff the function `f` implements this interval.
    pub fn admits(&self, f: &Bdd) -> bool {
        self.min <= *f && *f <= self.max
    }
}

// ~[a, b] == [~b, ~a]
impl Not for &BddInterval {
    type Output = BddInterval;

    fn not(self) -> BddInterval {
        BddInterval {
            min: !&self.max,
            max: !&self.min,
        }
    }
}

impl Mul for &BddInterval {
    type Output = BddInterval;

    fn mul(self, rhs: Self) -> BddInterval {
        let rtn = BddInterval {
            min: &self.min * &rhs.min,
            max: &self.max * &rhs.max,
        };
        debug_assert!(rtn.min <= rtn.max);
        rtn
    }
}

impl Add for &BddInterval {
    type Output = BddInterval;

    fn add(self, rhs: Self) -> BddInterval {
        let rtn = BddInterval {
            min: &self.min + &rhs.min,
            max: &self.max + &rhs.max,
        };
        debug_assert!(rtn.min <= rtn.max);
        rtn
    }
}

// The bounds of an XOR come from the pessimistic pairings of the operand
// bounds.
impl BitXor for &BddInterval {
    type Output = BddInterval;

    fn bitxor(self, rhs: Self) -> BddInterval {
        let min = &(&self.min * &!&rhs.max) + &(&!&self.max * &rhs.min);
        let max = &(&self.max * &!&rhs.min) + &(&!&self.min * &rhs.max);
        let rtn = BddInterval { min, max };
        debug_assert!(rtn.min <= rtn.max);
        rtn
    }
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
    fn test_exact_interval() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let f = BddInterval::exact(a.clone());
        assert_eq!(f.min(), a);
        assert_eq!(f.max(), a);
        assert!(!f.is_x());
        assert!(f.admits(&a));
    }

    #[test]
    fn test_x_interval() {
        let mgr = mgr_with(4);
        let x = BddInterval::x(&mgr);
        assert!(x.is_x());
        assert!(x.admits(&mgr.lit(1)));
        assert!(x.admits(&mgr.one()));
        assert!(x.admits(&mgr.zero()));
    }

    #[test]
    fn test_complement_swaps_bounds() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let f = BddInterval::new(&a * &b, &a + &b);
        let nf = !&f;
        assert_eq!(nf.min(), !(&a + &b));
        assert_eq!(nf.max(), !(&a * &b));
        // Double complement is identity.
        assert_eq!(!&nf, f);
    }

    #[test]
    fn test_interval_algebra() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);

        let fa = BddInterval::exact(a.clone());
        let fb = BddInterval::exact(b.clone());

        assert_eq!((&fa * &fb).min(), &a * &b);
        assert_eq!((&fa + &fb).max(), &a + &b);
        assert_eq!((&fa ^ &fb).min(), &a ^ &b);
        assert_eq!((&fa ^ &fb).max(), &a ^ &b);
    }

    #[test]
    fn test_le() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let exact = BddInterval::exact(a);
        let x = BddInterval::x(&mgr);
        assert!(exact.le(&x));
        assert!(!x.le(&exact));
        assert!(x.le(&x));
    }

    #[test]
    fn test_top_var_lit() {
        let mgr = mgr_with(4);
        let a = mgr.lit(1);
        let b = mgr.lit(2);
        let f = BddInterval::new(&a * &b, b.clone());
        assert_eq!(f.top_var_lit(), a);
    }
}
