use std::sync::Arc;

use dcs_xml::QualifiedName;
use thiserror::Error;

use crate::DataKind;

/// A type cannot be modeled, or a value does not fit its contract.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ContractError {
    /// No `TypeInfo` is registered under the path.
    #[error("type `{type_path}` is not registered")]
    UnknownType { type_path: Arc<str> },
    /// The descriptor is inconsistent.
    #[error("type `{type_path}` cannot be serialized: {reason}")]
    Invalid { type_path: Arc<str>, reason: String },
    /// An abstract class was about to be instantiated or written as is.
    #[error(
        "type `{type_path}` is abstract; declare known types for it so a concrete type can be used"
    )]
    Abstract { type_path: Arc<str> },
    /// Only classes and collections have instances.
    #[error("{kind} contract `{type_path}` cannot be constructed")]
    NotConstructible { type_path: Arc<str>, kind: DataKind },
    /// A value-typed member without the nullable flag held `Null`.
    #[error("member `{member}` of `{type_path}` is not nullable")]
    NotNullable { type_path: Arc<str>, member: Arc<str> },
    /// The value's shape does not match the contract kind.
    #[error("a value of type `{actual}` does not fit the {kind} contract `{type_path}`")]
    ShapeMismatch {
        type_path: Arc<str>,
        kind: DataKind,
        actual: String,
    },
    /// Two types resolve to the same stable name in one call.
    #[error("data contract name {name} is used by both `{first}` and `{second}`")]
    DuplicateName {
        name: QualifiedName,
        first: Arc<str>,
        second: Arc<str>,
    },
}

impl ContractError {
    pub(crate) fn invalid(type_path: &Arc<str>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            type_path: type_path.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(type_path: &str) -> Self {
        Self::UnknownType {
            type_path: Arc::from(type_path),
        }
    }
}
