use std::sync::Arc;

use crate::ContractError;
use crate::accessor::MemberAccessor;
use crate::contract::{Contract, LazyContract};
use crate::info::MemberFlags;
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// DataMember

/// One serialized member of a class contract.
///
/// `name` is already encoded for XML; `namespace` is the namespace of the
/// declaring class.
#[derive(Debug)]
pub struct DataMember {
    pub(crate) name: Arc<str>,
    pub(crate) namespace: Arc<str>,
    pub(crate) order: i32,
    pub(crate) flags: MemberFlags,
    pub(crate) is_value_type: bool,
    pub(crate) known_types: Box<[Arc<str>]>,
    pub(crate) accessor: Arc<dyn MemberAccessor>,
    pub(crate) contract: LazyContract,
}

impl DataMember {
    /// Element name of the member.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn order(&self) -> i32 {
        self.order
    }

    #[inline]
    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.flags.contains(MemberFlags::REQUIRED)
    }

    #[inline]
    pub fn emit_default(&self) -> bool {
        self.flags.contains(MemberFlags::EMIT_DEFAULT)
    }

    /// Whether the member may hold `Null`.
    ///
    /// Reference-like members always can; numbers, `bool`, `char` and
    /// enums only with [`MemberFlags::NULLABLE`].
    #[inline]
    pub fn is_nullable(&self) -> bool {
        !self.is_value_type || self.flags.contains(MemberFlags::NULLABLE)
    }

    /// Declared type path of the member.
    #[inline]
    pub fn type_path(&self) -> &str {
        self.contract.type_path()
    }

    #[inline]
    pub fn type_path_arc(&self) -> &Arc<str> {
        self.contract.type_path_arc()
    }

    /// Known types declared on the member itself.
    #[inline]
    pub fn known_types(&self) -> &[Arc<str>] {
        &self.known_types
    }

    #[inline]
    pub fn accessor(&self) -> &dyn MemberAccessor {
        &*self.accessor
    }

    /// The contract of the declared type.
    pub fn contract(&self, registry: &TypeRegistry) -> Result<Arc<Contract>, ContractError> {
        self.contract.resolve(registry)
    }
}

// -----------------------------------------------------------------------------
// ClassContract

/// A record of named members, possibly with a base class.
#[derive(Debug)]
pub struct ClassContract {
    pub(crate) base: Option<LazyContract>,
    pub(crate) members: Box<[DataMember]>,
    pub(crate) is_abstract: bool,
    pub(crate) is_reference: bool,
}

impl ClassContract {
    /// Members declared by this class, in wire order.
    #[inline]
    pub fn members(&self) -> &[DataMember] {
        &self.members
    }

    #[inline]
    pub fn base_type(&self) -> Option<&str> {
        self.base.as_ref().map(LazyContract::type_path)
    }

    pub fn base(&self, registry: &TypeRegistry) -> Result<Option<Arc<Contract>>, ContractError> {
        self.base.as_ref().map(|base| base.resolve(registry)).transpose()
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[inline]
    pub fn is_reference(&self) -> bool {
        self.is_reference
    }
}
