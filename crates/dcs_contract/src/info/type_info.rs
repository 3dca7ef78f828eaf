use std::sync::Arc;

use crate::DataKind;
use crate::info::{ClassInfo, CollectionInfo, EnumInfo, PrimitiveType};

// -----------------------------------------------------------------------------
// TypeKind

/// Kind-specific part of a [`TypeInfo`].
#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    Class(ClassInfo),
    Collection(CollectionInfo),
    Enum(EnumInfo),
    /// Raw XML content, kept as nodes.
    Xml,
}

impl TypeKind {
    /// Returns the [`DataKind`] of contracts built from this descriptor.
    pub const fn data_kind(&self) -> DataKind {
        match self {
            Self::Primitive(_) => DataKind::Primitive,
            Self::Class(_) => DataKind::Class,
            Self::Collection(_) => DataKind::Collection,
            Self::Enum(_) => DataKind::Enum,
            Self::Xml => DataKind::XmlAny,
        }
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Describes one serializable type.
///
/// # Content
///
/// - **type path**: the unique key of the type, e.g. `zoo::Dog`.
/// - **kind**: class, collection, enum, primitive or raw XML, with its layout.
/// - **contract name / namespace**: optional overrides of the stable name.
/// - **known types**: types accepted wherever this type is declared.
///
/// # Examples
///
/// ```
/// use dcs_contract::info::{ClassInfo, MemberInfo, TypeInfo};
///
/// let info = TypeInfo::class(
///     "zoo::Animal",
///     ClassInfo::new().with_member(MemberInfo::new("Name", "String")),
/// )
/// .with_known_type("zoo::Dog");
///
/// assert_eq!(info.type_path(), "zoo::Animal");
/// assert_eq!(info.as_class().unwrap().members().len(), 1);
/// assert_eq!(info.known_types().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TypeInfo {
    type_path: Arc<str>,
    kind: TypeKind,
    contract_name: Option<Arc<str>>,
    contract_namespace: Option<Arc<str>>,
    known_types: Vec<Arc<str>>,
}

impl TypeInfo {
    fn with_kind(type_path: impl Into<Arc<str>>, kind: TypeKind) -> Self {
        Self {
            type_path: type_path.into(),
            kind,
            contract_name: None,
            contract_namespace: None,
            known_types: Vec::new(),
        }
    }

    /// Describes a builtin primitive.
    pub fn primitive(primitive: PrimitiveType) -> Self {
        Self::with_kind(primitive.type_path(), TypeKind::Primitive(primitive))
    }

    /// Describes a class.
    pub fn class(type_path: impl Into<Arc<str>>, info: ClassInfo) -> Self {
        Self::with_kind(type_path, TypeKind::Class(info))
    }

    /// Describes a collection or dictionary.
    pub fn collection(type_path: impl Into<Arc<str>>, info: CollectionInfo) -> Self {
        Self::with_kind(type_path, TypeKind::Collection(info))
    }

    /// Describes an enum.
    pub fn enumeration(type_path: impl Into<Arc<str>>, info: EnumInfo) -> Self {
        Self::with_kind(type_path, TypeKind::Enum(info))
    }

    /// Describes a raw XML type.
    pub fn xml(type_path: impl Into<Arc<str>>) -> Self {
        Self::with_kind(type_path, TypeKind::Xml)
    }

    /// Overrides the local part of the stable name.
    pub fn with_contract_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.contract_name = Some(name.into());
        self
    }

    /// Overrides the namespace of the stable name.
    pub fn with_contract_namespace(mut self, namespace: impl Into<Arc<str>>) -> Self {
        self.contract_namespace = Some(namespace.into());
        self
    }

    /// Adds a known type, accepted wherever this type is declared.
    pub fn with_known_type(mut self, type_path: impl Into<Arc<str>>) -> Self {
        self.known_types.push(type_path.into());
        self
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
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    #[inline]
    pub fn contract_name(&self) -> Option<&str> {
        self.contract_name.as_deref()
    }

    #[inline]
    pub fn contract_namespace(&self) -> Option<&str> {
        self.contract_namespace.as_deref()
    }

    #[inline]
    pub fn known_types(&self) -> &[Arc<str>] {
        &self.known_types
    }

    /// The class layout, if this is a class.
    pub fn as_class(&self) -> Option<&ClassInfo> {
        match &self.kind {
            TypeKind::Class(info) => Some(info),
            _ => None,
        }
    }

    /// The collection layout, if this is a collection.
    pub fn as_collection(&self) -> Option<&CollectionInfo> {
        match &self.kind {
            TypeKind::Collection(info) => Some(info),
            _ => None,
        }
    }

    /// The enum layout, if this is an enum.
    pub fn as_enum(&self) -> Option<&EnumInfo> {
        match &self.kind {
            TypeKind::Enum(info) => Some(info),
            _ => None,
        }
    }

    /// Returns `true` for kinds whose values are never `Null` unless a member
    /// says so: numbers, booleans, characters and enums.
    pub fn is_value_type(&self) -> bool {
        match &self.kind {
            TypeKind::Primitive(primitive) => primitive.is_value_type(),
            TypeKind::Enum(_) => true,
            _ => false,
        }
    }
}
