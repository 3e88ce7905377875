//! Randomization of big integers

use num_integer::Integer;
use num_traits::Zero;
use rand::prelude::*;

use crate::big_digit::{self, BigDigit};
use crate::biguint::{BigDigitVec, BigUint};

pub trait RandBigUint {
    /// Generate a random `BigUint` of at most the given bit size.
    fn gen_biguint(&mut self, bit_size: usize) -> BigUint;

    /// Generate a random `BigUint` less than the given bound. Fails
    /// when the bound is zero.
    fn gen_biguint_below(&mut self, bound: &BigUint) -> BigUint;

    /// Generate a random `BigUint` within the given range. The lower
    /// bound is inclusive; the upper bound is exclusive. Fails when
    /// the upper bound is not greater than the lower bound.
    fn gen_biguint_range(&mut self, lbound: &BigUint, ubound: &BigUint) -> BigUint;
}

impl<R: Rng + ?Sized> RandBigUint for R {
    fn gen_biguint(&mut self, bit_size: usize) -> BigUint {
        let (digits, rem) = bit_size.div_rem(&big_digit::BITS);
        let len = digits + (rem > 0) as usize;
        let mut data = BigDigitVec::with_capacity(len);
        for _ in 0..len {
            data.push(self.gen::<BigDigit>() & big_digit::MASK);
        }
        if rem > 0 {
            data[len - 1] &= (1 << rem) - 1;
        }
        BigUint::from_vec(data)
    }

    fn gen_biguint_below(&mut self, bound: &BigUint) -> BigUint {
        assert!(!bound.is_zero(), "bound must be positive");

        // Draw exactly as many digits as the bound has, with the top digit
        // masked down to the bound's top bit width. Candidates then exceed
        // the bound less than half the time, so the retry loop is short.
        let len = bound.data.len();
        let top_mask: BigDigit = (1 << (bound.bits() - (len - 1) * big_digit::BITS)) - 1;
        loop {
            let mut data = BigDigitVec::with_capacity(len);
            for _ in 1..len {
                data.push(self.gen::<BigDigit>() & big_digit::MASK);
            }
            data.push(self.gen::<BigDigit>() & top_mask);
            let candidate = BigUint::from_vec(data);
            if candidate < *bound {
                return candidate;
            }
        }
    }

    fn gen_biguint_range(&mut self, lbound: &BigUint, ubound: &BigUint) -> BigUint {
        assert!(*lbound < *ubound, "empty range");
        let width = ubound - lbound;
        lbound + &self.gen_biguint_below(&width)
    }
}

/// Random odd number of exactly `bits` bits, for reduction tests.
#[cfg(test)]
pub(crate) fn gen_odd_biguint<R: Rng + ?Sized>(rng: &mut R, bits: usize) -> BigUint {
    assert!(bits >= 2);
    let mut n = rng.gen_biguint(bits);
    let top = (bits - 1) / big_digit::BITS;
    if n.data.len() <= top {
        n.data.resize(top + 1, 0);
    }
    n.data[0] |= 1;
    n.data[top] |= 1 << ((bits - 1) % big_digit::BITS);
    n
}
