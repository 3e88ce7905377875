//! Modular exponentiation and primality testing for big integers.
//!
//! The heart of the crate is a pair of sliding-window exponentiation
//! engines computing `g^x mod p`: [`exponent_mod`] reduces with Barrett or
//! multi-digit `2^k - d` arithmetic and accepts any modulus, while
//! [`exponent_mod_fast`] reduces with Montgomery or single-digit `2^k - d`
//! arithmetic and is the one to use for odd or `2^k - d` moduli. The
//! [`mod_exp`] wrapper inspects the modulus and picks for you.
//!
//! The underlying reduction primitives ([`montgomery_reduce`], [`reduce`],
//! [`reduce_2k`], [`reduce_2k_l`]) and their setup functions are exported
//! for callers that reduce many values against a fixed modulus.
//!
//! Primality support consists of small-prime trial screening
//! ([`prime_is_divisible`]), the Miller-Rabin test ([`miller_rabin`],
//! [`is_probably_prime`]) and the classic trial-count policy
//! ([`number_of_rabin_miller_trials`]).

mod algorithms;
mod barrett;
pub mod big_digit;
mod bigrand;
mod biguint;
mod modpow;
mod monty;
mod prime;
mod reduce_2k;

pub use crate::barrett::{reduce, reduce_setup};
pub use crate::bigrand::RandBigUint;
pub use crate::biguint::BigUint;
pub use crate::modpow::{
    exponent_mod, exponent_mod_fast, mod_exp, RedMode, MAX_WIN_SIZE, TAB_SIZE,
};
pub use crate::monty::{montgomery_calc_normalization, montgomery_reduce, montgomery_setup};
pub use crate::prime::{
    is_probably_prime, miller_rabin, number_of_rabin_miller_trials, prime_is_divisible,
    SMALL_PRIMES,
};
pub use crate::reduce_2k::{
    reduce_2k, reduce_2k_l, reduce_2k_setup, reduce_2k_setup_l, reduce_is_2k, reduce_is_2k_l,
};

/// Errors reported by the fallible operations in this crate.
///
/// Allocation failure has no variant here: the global allocator aborts, so
/// out-of-memory never surfaces as a value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A precondition on an argument was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The requested operation has no implementation.
    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
