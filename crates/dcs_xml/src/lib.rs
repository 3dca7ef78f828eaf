#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod encode;
mod error;
mod name;
mod node;
mod reader;
mod text_reader;
mod text_writer;
mod writer;

pub mod ns;

// -----------------------------------------------------------------------------
// Exports

pub use encode::{decode_local_name, encode_local_name, is_ncname};
pub use error::{Position, XmlError, at};
pub use name::QualifiedName;
pub use node::{NamespaceDeclaration, XmlAttribute, XmlElement, XmlNode};
pub use reader::{NodeKind, XmlReader};
pub use text_reader::XmlTextReader;
pub use text_writer::XmlTextWriter;
pub use writer::{XmlWriter, write_element, write_node};
