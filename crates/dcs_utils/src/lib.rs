#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod prime;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use prime::{is_prime, next_prime};
