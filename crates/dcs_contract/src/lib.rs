#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod accessor;
mod error;
mod kind;
mod surrogate;

pub mod contract;
pub mod info;
pub mod registry;
pub mod value;

// -----------------------------------------------------------------------------
// Top-level exports

pub use accessor::{FieldAccessor, MemberAccessor};
pub use error::ContractError;
pub use kind::DataKind;
pub use surrogate::SerializationSurrogate;

// -----------------------------------------------------------------------------
// Macro support

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}
