use std::sync::{Arc, OnceLock, Weak};

use crate::ContractError;
use crate::contract::Contract;
use crate::registry::TypeRegistry;

/// A link to another contract, resolved on first use.
#[derive(Debug)]
pub(crate) struct LazyContract {
    type_path: Arc<str>,
    cell: OnceLock<Weak<Contract>>,
}

impl LazyContract {
    pub(crate) fn new(type_path: Arc<str>) -> Self {
        Self {
            type_path,
            cell: OnceLock::new(),
        }
    }

    #[inline]
    pub(crate) fn type_path(&self) -> &str {
        &self.type_path
    }

    #[inline]
    pub(crate) fn type_path_arc(&self) -> &Arc<str> {
        &self.type_path
    }

    pub(crate) fn resolve(&self, registry: &TypeRegistry) -> Result<Arc<Contract>, ContractError> {
        if let Some(contract) = self.cell.get().and_then(Weak::upgrade) {
            return Ok(contract);
        }
        let contract = registry.contract(&self.type_path)?;
        let _ = self.cell.set(Arc::downgrade(&contract));
        Ok(contract)
    }
}
