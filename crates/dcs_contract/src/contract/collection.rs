use std::sync::Arc;

use crate::ContractError;
use crate::contract::{Contract, LazyContract};
use crate::info::CollectionShape;
use crate::registry::TypeRegistry;

/// A homogeneous sequence or a dictionary.
///
/// Dictionaries are written as a sequence of `item_name` elements, each
/// holding a `key_name` and a `value_name` child. For them, [`item`] is the
/// value type.
///
/// [`item`]: CollectionContract::item_contract
#[derive(Debug)]
pub struct CollectionContract {
    pub(crate) shape: CollectionShape,
    pub(crate) item: LazyContract,
    pub(crate) key: Option<LazyContract>,
    pub(crate) item_name: Arc<str>,
    pub(crate) key_name: Arc<str>,
    pub(crate) value_name: Arc<str>,
    pub(crate) namespace: Arc<str>,
}

impl CollectionContract {
    #[inline]
    pub fn shape(&self) -> CollectionShape {
        self.shape
    }

    #[inline]
    pub fn is_dictionary(&self) -> bool {
        self.shape == CollectionShape::Dictionary
    }

    #[inline]
    pub fn item_type(&self) -> &str {
        self.item.type_path()
    }

    #[inline]
    pub fn key_type(&self) -> Option<&str> {
        self.key.as_ref().map(LazyContract::type_path)
    }

    /// Element name of each item (or of each key/value pair).
    #[inline]
    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    #[inline]
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    #[inline]
    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    /// Namespace of the item, key and value elements.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn item_contract(&self, registry: &TypeRegistry) -> Result<Arc<Contract>, ContractError> {
        self.item.resolve(registry)
    }

    pub fn key_contract(
        &self,
        registry: &TypeRegistry,
    ) -> Result<Option<Arc<Contract>>, ContractError> {
        self.key.as_ref().map(|key| key.resolve(registry)).transpose()
    }
}
