use std::sync::Arc;

/// How a collection stores and exposes its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionShape {
    /// Fixed-size; carries `z:Size` when references are preserved.
    Array,
    /// Growable sequence.
    List,
    /// Key/value pairs.
    Dictionary,
}

/// Describes a collection type.
///
/// # Examples
///
/// ```
/// use dcs_contract::info::{CollectionInfo, CollectionShape};
///
/// let scores = CollectionInfo::dictionary("String", "i32");
///
/// assert_eq!(scores.shape(), CollectionShape::Dictionary);
/// assert_eq!(scores.key_type(), Some("String"));
/// assert_eq!(scores.item_type(), "i32");
/// ```
#[derive(Debug, Clone)]
pub struct CollectionInfo {
    shape: CollectionShape,
    item_type: Arc<str>,
    key_type: Option<Arc<str>>,
    item_name: Option<Arc<str>>,
    key_name: Option<Arc<str>>,
    value_name: Option<Arc<str>>,
}

impl CollectionInfo {
    fn new(shape: CollectionShape, item_type: Arc<str>, key_type: Option<Arc<str>>) -> Self {
        Self {
            shape,
            item_type,
            key_type,
            item_name: None,
            key_name: None,
            value_name: None,
        }
    }

    /// A fixed-size array of `item_type`.
    pub fn array(item_type: impl Into<Arc<str>>) -> Self {
        Self::new(CollectionShape::Array, item_type.into(), None)
    }

    /// A growable list of `item_type`.
    pub fn list(item_type: impl Into<Arc<str>>) -> Self {
        Self::new(CollectionShape::List, item_type.into(), None)
    }

    /// A dictionary from `key_type` to `value_type`.
    pub fn dictionary(key_type: impl Into<Arc<str>>, value_type: impl Into<Arc<str>>) -> Self {
        Self::new(
            CollectionShape::Dictionary,
            value_type.into(),
            Some(key_type.into()),
        )
    }

    /// Overrides the item element name (the pair element for dictionaries).
    pub fn with_item_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    /// Overrides the `Key` element name of a dictionary.
    pub fn with_key_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.key_name = Some(name.into());
        self
    }

    /// Overrides the `Value` element name of a dictionary.
    pub fn with_value_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.value_name = Some(name.into());
        self
    }

    #[inline]
    pub fn shape(&self) -> CollectionShape {
        self.shape
    }

    /// The item type; for dictionaries, the value type.
    #[inline]
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    #[inline]
    pub(crate) fn item_type_arc(&self) -> &Arc<str> {
        &self.item_type
    }

    #[inline]
    pub fn key_type(&self) -> Option<&str> {
        self.key_type.as_deref()
    }

    #[inline]
    pub(crate) fn key_type_arc(&self) -> Option<&Arc<str>> {
        self.key_type.as_ref()
    }

    #[inline]
    pub fn item_name(&self) -> Option<&str> {
        self.item_name.as_deref()
    }

    #[inline]
    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    #[inline]
    pub fn value_name(&self) -> Option<&str> {
        self.value_name.as_deref()
    }
}
