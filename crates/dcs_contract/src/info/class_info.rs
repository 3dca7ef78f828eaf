use std::sync::Arc;

use bitflags::bitflags;

use crate::MemberAccessor;

// -----------------------------------------------------------------------------
// MemberFlags

bitflags! {
    /// Per-member serialization switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u8 {
        /// Reading fails if the member is absent.
        const REQUIRED = 1 << 0;
        /// The member is written even when it holds its default value.
        const EMIT_DEFAULT = 1 << 1;
        /// A value-typed member may hold `Null`.
        const NULLABLE = 1 << 2;
    }
}

impl Default for MemberFlags {
    #[inline]
    fn default() -> Self {
        Self::EMIT_DEFAULT
    }
}

// -----------------------------------------------------------------------------
// MemberInfo

/// Describes one data member of a class.
///
/// # Examples
///
/// ```
/// use dcs_contract::info::{MemberFlags, MemberInfo};
///
/// let member = MemberInfo::new("Id", "i64").required().with_order(1);
///
/// assert_eq!(member.name(), "Id");
/// assert_eq!(member.order(), 1);
/// assert!(member.flags().contains(MemberFlags::REQUIRED | MemberFlags::EMIT_DEFAULT));
/// ```
#[derive(Debug, Clone)]
pub struct MemberInfo {
    name: Arc<str>,
    type_path: Arc<str>,
    order: i32,
    flags: MemberFlags,
    known_types: Vec<Arc<str>>,
    accessor: Option<Arc<dyn MemberAccessor>>,
}

impl MemberInfo {
    /// A member named `name` holding values of `type_path`.
    pub fn new(name: impl Into<Arc<str>>, type_path: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            type_path: type_path.into(),
            order: -1,
            flags: MemberFlags::default(),
            known_types: Vec::new(),
            accessor: None,
        }
    }

    /// Marks the member as required.
    pub fn required(mut self) -> Self {
        self.flags.insert(MemberFlags::REQUIRED);
        self
    }

    /// Marks a value-typed member as nullable.
    pub fn nullable(mut self) -> Self {
        self.flags.insert(MemberFlags::NULLABLE);
        self
    }

    /// Sets whether the member is written when it holds its default value.
    pub fn emit_default(mut self, emit: bool) -> Self {
        self.flags.set(MemberFlags::EMIT_DEFAULT, emit);
        self
    }

    /// Sets the wire order. Members are sorted by order, then by name;
    /// the default order is `-1`.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Adds a type accepted in this member only.
    pub fn with_known_type(mut self, type_path: impl Into<Arc<str>>) -> Self {
        self.known_types.push(type_path.into());
        self
    }

    /// Replaces the default field accessor.
    pub fn with_accessor(mut self, accessor: Arc<dyn MemberAccessor>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    #[inline]
    pub fn type_path(&self) -> &str {
        &self.type_path
    }

    #[inline]
    pub(crate) fn type_path_arc(&self) -> &Arc<str> {
        &self.type_path
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
    pub fn known_types(&self) -> &[Arc<str>] {
        &self.known_types
    }

    #[inline]
    pub fn accessor(&self) -> Option<&Arc<dyn MemberAccessor>> {
        self.accessor.as_ref()
    }
}

// -----------------------------------------------------------------------------
// ClassInfo

/// Describes a class: its own members and an optional base class.
///
/// Members of the base class are not repeated here; the base chain is
/// followed when the contract is built.
#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    base: Option<Arc<str>>,
    members: Vec<MemberInfo>,
    is_abstract: bool,
    is_reference: bool,
}

impl ClassInfo {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base class.
    pub fn with_base(mut self, type_path: impl Into<Arc<str>>) -> Self {
        self.base = Some(type_path.into());
        self
    }

    /// Appends a member.
    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    /// Marks the class abstract: it is only ever written or read through a
    /// concrete known type.
    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// Makes instances of this class always carry `z:Id`/`z:Ref`, whether
    /// or not reference preservation is enabled for the call.
    pub fn with_reference(mut self, is_reference: bool) -> Self {
        self.is_reference = is_reference;
        self
    }

    #[inline]
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    #[inline]
    pub(crate) fn base_arc(&self) -> Option<&Arc<str>> {
        self.base.as_ref()
    }

    #[inline]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
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
