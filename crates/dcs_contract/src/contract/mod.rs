//! Contracts: the resolved, cached wire model of a type.
//!
//! A [`Contract`] is built once per type path by
//! [`TypeRegistry::contract`](crate::registry::TypeRegistry::contract) and
//! never mutated afterwards, except for links to other contracts (base
//! class, member types, item types, transitive known types) which are
//! filled on first use. Links to other contracts are weak, so recursive
//! types do not keep each other alive.

// -----------------------------------------------------------------------------
// Modules

mod class;
mod collection;
mod enums;
mod lazy;
mod naming;

// -----------------------------------------------------------------------------
// Exports

pub use class::{ClassContract, DataMember};
pub use collection::CollectionContract;
pub use enums::EnumContract;
pub use naming::{collection_name, default_stable_name, dictionary_name};

pub(crate) use lazy::LazyContract;

use std::sync::{Arc, OnceLock};

use dcs_xml::QualifiedName;

use crate::info::{CollectionShape, PrimitiveType};
use crate::registry::TypeRegistry;
use crate::{ContractError, DataKind};

// -----------------------------------------------------------------------------
// SurrogateContract

/// A contract standing in for another type.
///
/// Values of the original type are converted to the substitute type on
/// write and back on read; on the wire they look exactly like substitute
/// values.
#[derive(Debug)]
pub struct SurrogateContract {
    substitute: Arc<Contract>,
}

impl SurrogateContract {
    /// The contract values travel as.
    #[inline]
    pub fn substitute(&self) -> &Arc<Contract> {
        &self.substitute
    }
}

// -----------------------------------------------------------------------------
// ContractKind

/// Kind-specific part of a [`Contract`].
#[derive(Debug)]
pub enum ContractKind {
    Primitive(PrimitiveType),
    Class(ClassContract),
    Collection(CollectionContract),
    Enum(EnumContract),
    Surrogate(SurrogateContract),
    XmlAny,
}

// -----------------------------------------------------------------------------
// Contract

/// The serialization shape of one type.
///
/// # Examples
///
/// ```
/// use dcs_contract::DataKind;
/// use dcs_contract::registry::TypeRegistry;
///
/// let registry = TypeRegistry::new();
/// let int = registry.contract("i32").unwrap();
///
/// assert_eq!(int.data_kind(), DataKind::Primitive);
/// assert_eq!(int.stable_name().name(), "int");
/// assert!(!int.can_contain_references());
///
/// // Contracts are cached.
/// assert!(std::sync::Arc::ptr_eq(&int, &registry.contract("i32").unwrap()));
/// ```
#[derive(Debug)]
pub struct Contract {
    type_path: Arc<str>,
    stable_name: QualifiedName,
    kind: ContractKind,
    known_types: Box<[Arc<str>]>,
    all_known_types: OnceLock<Box<[Arc<str>]>>,
}

impl Contract {
    pub(crate) fn new(
        type_path: Arc<str>,
        stable_name: QualifiedName,
        kind: ContractKind,
        known_types: Box<[Arc<str>]>,
    ) -> Self {
        Self {
            type_path,
            stable_name,
            kind,
            known_types,
            all_known_types: OnceLock::new(),
        }
    }

    /// Builds a surrogate contract: values of `original` travel with the
    /// stable name and layout of `substitute`.
    pub fn surrogate(original: &Contract, substitute: Arc<Contract>) -> Self {
        Self::new(
            original.type_path.clone(),
            substitute.stable_name.clone(),
            ContractKind::Surrogate(SurrogateContract { substitute }),
            original.known_types.clone(),
        )
    }

    /// The type path this contract was built for.
    #[inline]
    pub fn type_path(&self) -> &str {
        &self.type_path
    }

    #[inline]
    pub fn type_path_arc(&self) -> &Arc<str> {
        &self.type_path
    }

    /// The wire identity of the type.
    #[inline]
    pub fn stable_name(&self) -> &QualifiedName {
        &self.stable_name
    }

    #[inline]
    pub fn kind(&self) -> &ContractKind {
        &self.kind
    }

    pub fn data_kind(&self) -> DataKind {
        match &self.kind {
            ContractKind::Primitive(_) => DataKind::Primitive,
            ContractKind::Class(_) => DataKind::Class,
            ContractKind::Collection(_) => DataKind::Collection,
            ContractKind::Enum(_) => DataKind::Enum,
            ContractKind::Surrogate(_) => DataKind::Surrogate,
            ContractKind::XmlAny => DataKind::XmlAny,
        }
    }

    /// Whether values of this contract are objects that can be shared.
    ///
    /// `false` for primitives other than `Object`, enums and raw XML.
    pub fn can_contain_references(&self) -> bool {
        match &self.kind {
            ContractKind::Primitive(primitive) => *primitive == PrimitiveType::Object,
            ContractKind::Class(_) | ContractKind::Collection(_) => true,
            ContractKind::Enum(_) | ContractKind::XmlAny => false,
            ContractKind::Surrogate(surrogate) => surrogate.substitute.can_contain_references(),
        }
    }

    /// Whether instances always carry `z:Id`/`z:Ref`.
    pub fn is_reference(&self) -> bool {
        match &self.kind {
            ContractKind::Class(class) => class.is_reference(),
            ContractKind::Surrogate(surrogate) => surrogate.substitute.is_reference(),
            _ => false,
        }
    }

    /// Whether this is an abstract class.
    pub fn is_abstract(&self) -> bool {
        matches!(&self.kind, ContractKind::Class(class) if class.is_abstract())
    }

    /// `true` for the `xs:anyType` contract.
    pub fn is_any_type(&self) -> bool {
        matches!(self.kind, ContractKind::Primitive(PrimitiveType::Object))
    }

    /// Known types declared directly on the type.
    #[inline]
    pub fn declared_known_types(&self) -> &[Arc<str>] {
        &self.known_types
    }

    /// Known types of the type, its base classes, and transitively of every
    /// known type found. Computed once.
    pub fn known_types(&self, registry: &TypeRegistry) -> &[Arc<str>] {
        self.all_known_types
            .get_or_init(|| registry.collect_known_types(&self.type_path, &self.known_types))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match &self.kind {
            ContractKind::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassContract> {
        match &self.kind {
            ContractKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionContract> {
        match &self.kind {
            ContractKind::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumContract> {
        match &self.kind {
            ContractKind::Enum(enumeration) => Some(enumeration),
            _ => None,
        }
    }

    pub fn as_surrogate(&self) -> Option<&SurrogateContract> {
        match &self.kind {
            ContractKind::Surrogate(surrogate) => Some(surrogate),
            _ => None,
        }
    }

    /// Collection shape, looking through surrogates.
    pub fn collection_shape(&self) -> Option<CollectionShape> {
        match &self.kind {
            ContractKind::Collection(collection) => Some(collection.shape()),
            ContractKind::Surrogate(surrogate) => surrogate.substitute.collection_shape(),
            _ => None,
        }
    }

    /// The class chain from the root base class down to this contract.
    ///
    /// Non-class contracts yield just themselves.
    pub fn class_hierarchy(
        self: &Arc<Self>,
        registry: &TypeRegistry,
    ) -> Result<Vec<Arc<Contract>>, ContractError> {
        let mut chain = vec![self.clone()];
        let mut current = self.clone();
        while let Some(class) = current.as_class() {
            let Some(base) = class.base(registry)? else {
                break;
            };
            chain.push(base.clone());
            current = base;
        }
        chain.reverse();
        Ok(chain)
    }
}
