use std::sync::Arc;

use dcs_contract::ContractError;
use dcs_xml::{Position, XmlError, at};
use thiserror::Error;

/// An error that ends a serialize or deserialize call.
///
/// None of them are retried; the graph written so far (or read so far)
/// must be discarded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializationError {
    /// A type cannot be modeled, or a value does not fit its contract.
    #[error(transparent)]
    InvalidContract(#[from] ContractError),
    /// The call visited more nodes than allowed.
    #[error(
        "maximum number of items that can be serialized or deserialized in an object graph is {limit}; the limit was reached at `{type_path}`"
    )]
    GraphTooLarge { limit: usize, type_path: Arc<str> },
    /// The runtime type cannot stand where the declared type is expected.
    #[error("a value of type `{actual}` cannot be used where `{declared}` is declared")]
    UnsupportedPolymorphism { declared: Arc<str>, actual: Arc<str> },
    /// A `z:Ref` names an id no element has defined.
    #[error("element refers to object id `{id}`, which is not defined{}", at(.position))]
    DanglingReference {
        id: String,
        position: Option<Position>,
    },
    /// A runtime type is not among the known types in scope.
    #[error("type {name} is not expected where `{declared}` is declared; add it to the known types{}", at(.position))]
    UnknownType {
        name: String,
        declared: Arc<str>,
        position: Option<Position>,
    },
    #[error("required member `{member}` of `{type_path}` is missing{}", at(.position))]
    RequiredMemberMissing {
        type_path: Arc<str>,
        member: Arc<str>,
        position: Option<Position>,
    },
    #[error("`{value}` is not a valid value of enum `{type_path}`{}", at(.position))]
    InvalidEnumValue {
        type_path: Arc<str>,
        value: String,
        position: Option<Position>,
    },
    /// The document does not have the expected structure.
    #[error("{message}{}", at(.position))]
    MalformedInput {
        message: String,
        position: Option<Position>,
    },
    /// A node was met again while it was still being written, and
    /// references are not preserved.
    #[error(
        "object graph of `{type_path}` contains a cycle, which cannot be written without preserving object references"
    )]
    CycleDetected { type_path: Arc<str> },
    #[error("object graph is nested deeper than {limit} levels")]
    MaxDepthExceeded { limit: usize },
    #[error(transparent)]
    Xml(#[from] XmlError),
}

impl SerializationError {
    pub(crate) fn malformed(message: impl Into<String>, position: Option<Position>) -> Self {
        Self::MalformedInput {
            message: message.into(),
            position,
        }
    }
}
