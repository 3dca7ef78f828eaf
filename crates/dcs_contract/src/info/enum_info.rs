use std::sync::Arc;

/// Describes an enum: member names and their 64-bit values.
///
/// Unsigned enums store their values bit-cast into `i64`.
///
/// # Examples
///
/// ```
/// use dcs_contract::info::EnumInfo;
///
/// let colors = EnumInfo::new()
///     .with_member("Red", 1)
///     .with_member("Green", 2)
///     .with_member("Blue", 4)
///     .with_flags(true);
///
/// assert!(colors.is_flags());
/// assert_eq!(colors.members().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnumInfo {
    members: Vec<(Arc<str>, i64)>,
    is_flags: bool,
}

impl EnumInfo {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member.
    pub fn with_member(mut self, name: impl Into<Arc<str>>, value: i64) -> Self {
        self.members.push((name.into(), value));
        self
    }

    /// Appends a member of an unsigned enum.
    pub fn with_unsigned_member(self, name: impl Into<Arc<str>>, value: u64) -> Self {
        self.with_member(name, value as i64)
    }

    /// Marks the enum as a bit set.
    pub fn with_flags(mut self, is_flags: bool) -> Self {
        self.is_flags = is_flags;
        self
    }

    #[inline]
    pub fn members(&self) -> &[(Arc<str>, i64)] {
        &self.members
    }

    #[inline]
    pub fn is_flags(&self) -> bool {
        self.is_flags
    }
}
