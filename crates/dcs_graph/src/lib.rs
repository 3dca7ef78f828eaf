#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod context;
mod error;
mod identity;
mod known_types;
mod quota;
mod reader;
mod serializer;
mod settings;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use error::SerializationError;
pub use identity::{Identity, IdentityTable, ReferenceTable};
pub use known_types::{KnownTypeFrame, KnownTypeScope};
pub use quota::QuotaGuard;
pub use reader::GraphReader;
pub use serializer::DataContractSerializer;
pub use settings::SerializerSettings;
pub use writer::GraphWriter;
