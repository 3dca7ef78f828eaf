//! Type descriptors: what the type-model provider knows about a type.
//!
//! A [`TypeInfo`] is plain data supplied by the user (or by a registration
//! submitted with [`submit_type!`](crate::submit_type)). The
//! [`TypeRegistry`](crate::registry::TypeRegistry) turns descriptors into
//! [`Contract`](crate::contract::Contract)s on demand.
//!
//! Descriptors reference other types by *type path* rather than by value,
//! which is what lets self-referential and mutually recursive types be
//! described at all.

// -----------------------------------------------------------------------------
// Modules

mod class_info;
mod collection_info;
mod enum_info;
mod primitive;
mod type_info;

// -----------------------------------------------------------------------------
// Exports

pub use class_info::{ClassInfo, MemberFlags, MemberInfo};
pub use collection_info::{CollectionInfo, CollectionShape};
pub use enum_info::EnumInfo;
pub use primitive::PrimitiveType;
pub use type_info::{TypeInfo, TypeKind};
