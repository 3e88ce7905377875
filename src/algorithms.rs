//! Digit-slice arithmetic underneath `BigUint`.
//!
//! Everything here works on little-endian digit slices in reduced radix:
//! each digit carries `big_digit::BITS` significant bits, so a product of
//! two digits plus a digit and a carry always fits a `DoubleBigDigit`.

use core::cmp::Ordering::{self, Equal, Greater, Less};

use smallvec::{smallvec, SmallVec};

use crate::big_digit::{self, BigDigit, DoubleBigDigit};
use crate::biguint::{BigDigitVec, BigUint};

pub(crate) fn cmp_slice(a: &[BigDigit], b: &[BigDigit]) -> Ordering {
    debug_assert!(a.last() != Some(&0));
    debug_assert!(b.last() != Some(&0));

    match a.len().cmp(&b.len()) {
        Equal => {
            for (&ai, &bi) in a.iter().rev().zip(b.iter().rev()) {
                if ai < bi {
                    return Less;
                }
                if ai > bi {
                    return Greater;
                }
            }
            Equal
        }
        other => other,
    }
}

/// a += b
pub(crate) fn add2(a: &mut BigDigitVec, b: &[BigDigit]) {
    if a.len() < b.len() {
        a.resize(b.len(), 0);
    }

    let mut carry: BigDigit = 0;
    for (ai, &bi) in a.iter_mut().zip(b.iter()) {
        let t = *ai + bi + carry;
        *ai = t & big_digit::MASK;
        carry = t >> big_digit::BITS;
    }

    let mut i = b.len();
    while carry != 0 {
        if i == a.len() {
            a.push(carry);
            return;
        }
        let t = a[i] + carry;
        a[i] = t & big_digit::MASK;
        carry = t >> big_digit::BITS;
        i += 1;
    }
}

/// a -= b; requires a >= b.
pub(crate) fn sub2(a: &mut BigDigitVec, b: &[BigDigit]) {
    let mut borrow: BigDigit = 0;
    for (ai, &bi) in a.iter_mut().zip(b.iter()) {
        let t = ai.wrapping_sub(bi + borrow);
        // Sign bit of the storage word doubles as the borrow flag.
        borrow = t >> (big_digit::WORD_BITS - 1);
        *ai = t & big_digit::MASK;
    }

    let mut i = b.len();
    while borrow != 0 {
        let ai = &mut a[i];
        let t = ai.wrapping_sub(borrow);
        borrow = t >> (big_digit::WORD_BITS - 1);
        *ai = t & big_digit::MASK;
        i += 1;
    }
}

/// acc += b * c, where acc must have room for the carry to settle.
pub(crate) fn mac_digit(acc: &mut [BigDigit], b: &[BigDigit], c: BigDigit) {
    if c == 0 {
        return;
    }

    let c = c as DoubleBigDigit;
    let mut carry: DoubleBigDigit = 0;
    let (lo, hi) = acc.split_at_mut(b.len());

    for (ai, &bi) in lo.iter_mut().zip(b.iter()) {
        let t = *ai as DoubleBigDigit + carry + (bi as DoubleBigDigit) * c;
        *ai = (t & big_digit::MASK as DoubleBigDigit) as BigDigit;
        carry = t >> big_digit::BITS;
    }

    let mut hi = hi.iter_mut();
    while carry != 0 {
        let ai = hi.next().expect("carry overflow during multiplication");
        let t = *ai as DoubleBigDigit + carry;
        *ai = (t & big_digit::MASK as DoubleBigDigit) as BigDigit;
        carry = t >> big_digit::BITS;
    }
}

/// Schoolbook product a * b.
pub(crate) fn mul3(a: &[BigDigit], b: &[BigDigit]) -> BigDigitVec {
    if a.is_empty() || b.is_empty() {
        return SmallVec::new();
    }

    let mut acc: BigDigitVec = smallvec![0; a.len() + b.len()];
    for (i, &ai) in a.iter().enumerate() {
        mac_digit(&mut acc[i..], b, ai);
    }
    acc
}

/// a * d for a single digit d.
pub(crate) fn mul_digit(a: &[BigDigit], d: BigDigit) -> BigDigitVec {
    if a.is_empty() || d == 0 {
        return SmallVec::new();
    }

    let mut acc: BigDigitVec = smallvec![0; a.len() + 1];
    mac_digit(&mut acc, a, d);
    acc
}

/// Dedicated squaring: each cross product is computed once and doubled.
pub(crate) fn sqr(a: &[BigDigit]) -> BigDigitVec {
    if a.is_empty() {
        return SmallVec::new();
    }

    let mask = big_digit::MASK as DoubleBigDigit;
    let mut acc: BigDigitVec = smallvec![0; 2 * a.len()];
    for ix in 0..a.len() {
        let ai = a[ix] as DoubleBigDigit;

        let t = acc[2 * ix] as DoubleBigDigit + ai * ai;
        acc[2 * ix] = (t & mask) as BigDigit;
        let mut carry = t >> big_digit::BITS;

        for iy in ix + 1..a.len() {
            let t = acc[ix + iy] as DoubleBigDigit + 2 * ai * (a[iy] as DoubleBigDigit) + carry;
            acc[ix + iy] = (t & mask) as BigDigit;
            carry = t >> big_digit::BITS;
        }

        let mut i = ix + a.len();
        while carry != 0 {
            let t = acc[i] as DoubleBigDigit + carry;
            acc[i] = (t & mask) as BigDigit;
            carry = t >> big_digit::BITS;
            i += 1;
        }
    }
    acc
}

/// Truncated product: the digits of a * b below position `digs` only.
pub(crate) fn mul_digs(a: &[BigDigit], b: &[BigDigit], digs: usize) -> BigDigitVec {
    let mask = big_digit::MASK as DoubleBigDigit;
    let mut acc: BigDigitVec = smallvec![0; digs];

    for ix in 0..a.len().min(digs) {
        let ai = a[ix] as DoubleBigDigit;
        let mut u: DoubleBigDigit = 0;
        let pb = b.len().min(digs - ix);
        for iy in 0..pb {
            let t = acc[ix + iy] as DoubleBigDigit + ai * (b[iy] as DoubleBigDigit) + u;
            acc[ix + iy] = (t & mask) as BigDigit;
            u = t >> big_digit::BITS;
        }
        let mut i = ix + pb;
        while u != 0 && i < digs {
            let t = acc[i] as DoubleBigDigit + u;
            acc[i] = (t & mask) as BigDigit;
            u = t >> big_digit::BITS;
            i += 1;
        }
    }
    acc
}

/// Partial product keeping digits at position `digs` and above.
///
/// Carries that originate strictly below `digs` are not accounted for, so
/// low-order result digits may fall short of the exact product; Barrett
/// reduction absorbs the defect with its trailing correction loop.
pub(crate) fn mul_high_digs(a: &[BigDigit], b: &[BigDigit], digs: usize) -> BigDigitVec {
    let mask = big_digit::MASK as DoubleBigDigit;
    let mut acc: BigDigitVec = smallvec![0; a.len() + b.len()];

    for ix in 0..a.len() {
        let start = digs.saturating_sub(ix);
        if start >= b.len() {
            continue;
        }
        let ai = a[ix] as DoubleBigDigit;
        let mut u: DoubleBigDigit = 0;
        for iy in start..b.len() {
            let t = acc[ix + iy] as DoubleBigDigit + ai * (b[iy] as DoubleBigDigit) + u;
            acc[ix + iy] = (t & mask) as BigDigit;
            u = t >> big_digit::BITS;
        }
        let mut i = ix + b.len();
        while u != 0 {
            let t = acc[i] as DoubleBigDigit + u;
            acc[i] = (t & mask) as BigDigit;
            u = t >> big_digit::BITS;
            i += 1;
        }
    }
    acc
}

/// Knuth-style long division with a normalized divisor.
pub(crate) fn div_rem(u: &BigUint, d: &BigUint) -> (BigUint, BigUint) {
    use num_traits::{One, Zero};

    assert!(!d.is_zero(), "attempt to divide by zero");
    if u.is_zero() {
        return (BigUint::zero(), BigUint::zero());
    }
    if d.data.len() == 1 {
        let (q, r) = div_rem_digit(u.clone(), d.data[0]);
        return (q, BigUint::from_digit(r));
    }
    match cmp_slice(&u.data, &d.data) {
        Less => return (BigUint::zero(), u.clone()),
        Equal => return (BigUint::one(), BigUint::zero()),
        Greater => {}
    }

    // Shift so the divisor's top digit has its high bit set; the two-digit
    // quotient estimate below depends on it.
    let shift = big_digit::BITS - 1 - ((d.bits() - 1) % big_digit::BITS);
    let mut a = u << shift;
    let b = d << shift;

    let bn = b.data.len();
    let b_top = b.data[bn - 1] as DoubleBigDigit;
    let b_next = b.data[bn - 2] as DoubleBigDigit;
    let mask = big_digit::MASK as DoubleBigDigit;

    let q_len = a.data.len() - bn + 1;
    let mut q: BigDigitVec = smallvec![0; q_len];
    a.data.push(0);

    for j in (0..q_len).rev() {
        let a2 = ((a.data[j + bn] as DoubleBigDigit) << big_digit::BITS)
            | a.data[j + bn - 1] as DoubleBigDigit;
        let a3 = a.data[j + bn - 2] as DoubleBigDigit;

        let mut qhat = (a2 / b_top).min(mask);
        loop {
            let rhat = a2 - qhat * b_top;
            if rhat > mask {
                break;
            }
            if qhat * b_next > (rhat << big_digit::BITS | a3) {
                qhat -= 1;
            } else {
                break;
            }
        }

        // a[j..=j+bn] -= qhat * b
        let mut carry: DoubleBigDigit = 0;
        let mut borrow: BigDigit = 0;
        for i in 0..bn {
            let p = qhat * (b.data[i] as DoubleBigDigit) + carry;
            carry = p >> big_digit::BITS;
            let t = a.data[j + i]
                .wrapping_sub((p & mask) as BigDigit)
                .wrapping_sub(borrow);
            borrow = t >> (big_digit::WORD_BITS - 1);
            a.data[j + i] = t & big_digit::MASK;
        }
        let t = a.data[j + bn]
            .wrapping_sub(carry as BigDigit)
            .wrapping_sub(borrow);
        borrow = t >> (big_digit::WORD_BITS - 1);
        a.data[j + bn] = t & big_digit::MASK;

        if borrow != 0 {
            // Estimate was one too large; add the divisor back.
            qhat -= 1;
            let mut c: BigDigit = 0;
            for i in 0..bn {
                let t = a.data[j + i] + b.data[i] + c;
                a.data[j + i] = t & big_digit::MASK;
                c = t >> big_digit::BITS;
            }
            // The final carry cancels the borrow above.
            a.data[j + bn] = (a.data[j + bn] + c) & big_digit::MASK;
        }

        q[j] = qhat as BigDigit;
    }

    a.data.truncate(bn);
    a.normalize();
    (BigUint::from_vec(q), &a >> shift)
}

/// Division by a single digit.
pub(crate) fn div_rem_digit(mut a: BigUint, d: BigDigit) -> (BigUint, BigDigit) {
    assert!(d != 0, "attempt to divide by zero");

    let d = d as DoubleBigDigit;
    let mut rem: DoubleBigDigit = 0;
    for digit in a.data.iter_mut().rev() {
        let t = (rem << big_digit::BITS) | *digit as DoubleBigDigit;
        *digit = (t / d) as BigDigit;
        rem = t % d;
    }
    a.normalize();
    (a, rem as BigDigit)
}

/// Remainder by a single digit.
pub(crate) fn mod_digit(a: &[BigDigit], d: BigDigit) -> BigDigit {
    debug_assert!(d != 0);

    let d = d as DoubleBigDigit;
    let mut rem: DoubleBigDigit = 0;
    for &digit in a.iter().rev() {
        rem = ((rem << big_digit::BITS) | digit as DoubleBigDigit) % d;
    }
    rem as BigDigit
}
