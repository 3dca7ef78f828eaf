//! The store of type descriptors and the process-wide contract cache.
//!
//! ## auto_register
//!
//! With the `auto_register` feature, descriptors can be submitted from
//! anywhere in the program with [`submit_type!`](crate::submit_type) and
//! collected with [`TypeRegistry::auto_register`]. [`TypeRegistry::global`]
//! does this once on first use. We use the [`inventory`] crate to implement
//! static registration, so it only works on platforms `inventory` supports.
//!
//! [`inventory`]: https://docs.rs/inventory

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard};

use dcs_utils::hash::{HashMap, HashSet};
use dcs_xml::{QualifiedName, encode_local_name, is_ncname, ns};

use crate::accessor::{FieldAccessor, MemberAccessor};
use crate::contract::{
    ClassContract, CollectionContract, Contract, ContractKind, DataMember, EnumContract,
    LazyContract, collection_name, default_stable_name, dictionary_name,
};
use crate::info::{
    ClassInfo, CollectionInfo, EnumInfo, MemberFlags, PrimitiveType, TypeInfo, TypeKind,
};
use crate::value::{EnumValue, Object, Value, XML_TYPE_PATH};
use crate::ContractError;

/// Collections whose item chain is deeper than this are treated as
/// self-referential.
const MAX_NAME_DEPTH: usize = 64;

// -----------------------------------------------------------------------------
// AutoRegistration

/// A descriptor submitted with [`submit_type!`](crate::submit_type).
#[cfg(feature = "auto_register")]
pub struct AutoRegistration {
    type_info: fn() -> TypeInfo,
}

#[cfg(feature = "auto_register")]
impl AutoRegistration {
    #[inline]
    pub const fn new(type_info: fn() -> TypeInfo) -> Self {
        Self { type_info }
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegistration);

/// Submits a descriptor for [`TypeRegistry::auto_register`].
///
/// The argument is a `fn() -> TypeInfo`.
///
/// # Examples
///
/// ```
/// use dcs_contract::info::{ClassInfo, MemberInfo, TypeInfo};
/// use dcs_contract::registry::TypeRegistry;
///
/// fn point() -> TypeInfo {
///     TypeInfo::class(
///         "geo::Point",
///         ClassInfo::new()
///             .with_member(MemberInfo::new("X", "i32"))
///             .with_member(MemberInfo::new("Y", "i32")),
///     )
/// }
///
/// dcs_contract::submit_type!(point);
///
/// assert!(TypeRegistry::global().contains("geo::Point"));
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! submit_type {
    ($type_info:path) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegistration::new($type_info)
        }
    };
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of type descriptors and the contracts built from them.
///
/// Descriptors are added with [`register`](Self::register), which needs
/// exclusive access. Contracts are built on first request and cached; the
/// cache is shared and safe to fill from several threads at once.
///
/// # Examples
///
/// ```
/// use dcs_contract::info::{ClassInfo, MemberInfo, TypeInfo};
/// use dcs_contract::registry::TypeRegistry;
/// use dcs_contract::value::Value;
///
/// let mut registry = TypeRegistry::new();
/// registry.register(TypeInfo::class(
///     "geo::Point",
///     ClassInfo::new()
///         .with_member(MemberInfo::new("X", "i32"))
///         .with_member(MemberInfo::new("Label", "String")),
/// ));
///
/// let point = registry.construct("geo::Point").unwrap();
/// assert_eq!(point.field("X"), Some(&Value::I32(0)));
/// assert_eq!(point.field("Label"), Some(&Value::Null));
///
/// let name = registry.stable_name("geo::Point").unwrap();
/// assert_eq!(name.namespace(), "http://schemas.datacontract.org/2004/07/geo");
/// ```
pub struct TypeRegistry {
    types: HashMap<Arc<str>, TypeInfo>,
    type_name_to_path: HashMap<Arc<str>, Arc<str>>,
    ambiguous_names: HashSet<Arc<str>>,
    contracts: RwLock<HashMap<Arc<str>, Arc<Contract>>>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.types.keys()).finish()
    }
}

impl TypeRegistry {
    /// Create an empty [`TypeRegistry`].
    pub fn empty() -> Self {
        Self {
            types: HashMap::default(),
            type_name_to_path: HashMap::default(),
            ambiguous_names: HashSet::default(),
            contracts: RwLock::new(HashMap::default()),
        }
    }

    /// Create a type registry with the builtin types registered.
    ///
    /// - `bool` `char`
    /// - `i8 - i64` `u8 - u64`
    /// - `f32` `f64`
    /// - `String` `Bytes` `Object`
    /// - `XmlElement`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for primitive in PrimitiveType::ALL {
            registry.register(TypeInfo::primitive(primitive));
        }
        registry.register(
            TypeInfo::xml(XML_TYPE_PATH)
                .with_contract_namespace(format!("{}System.Xml", ns::DATA_CONTRACT)),
        );
        registry
    }

    /// The registry used when none is given: the builtin types plus every
    /// descriptor submitted with [`submit_type!`](crate::submit_type).
    pub fn global() -> &'static TypeRegistry {
        static GLOBAL: LazyLock<TypeRegistry> = LazyLock::new(|| {
            let mut registry = TypeRegistry::new();
            registry.auto_register();
            registry
        });
        &GLOBAL
    }

    /// Adds a descriptor. A descriptor already registered under the same
    /// path is replaced.
    ///
    /// Returns `true` if the path was new. Cached contracts are dropped.
    pub fn register(&mut self, info: TypeInfo) -> bool {
        let type_path = info.type_path_arc().clone();
        let is_new = self.types.insert(type_path.clone(), info).is_none();
        if is_new {
            self.index_type_name(type_path);
        } else {
            log::warn!("type `{type_path}` was registered twice; the later descriptor is kept");
        }

        self.contracts
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        is_new
    }

    fn index_type_name(&mut self, type_path: Arc<str>) {
        let type_name: Arc<str> = short_name(&type_path).into();
        if self.ambiguous_names.contains(&type_name) {
            return;
        }
        if self.type_name_to_path.contains_key(&type_name) {
            self.type_name_to_path.remove(&type_name);
            self.ambiguous_names.insert(type_name);
        } else {
            self.type_name_to_path.insert(type_name, type_path);
        }
    }

    /// Registers every descriptor submitted with
    /// [`submit_type!`](crate::submit_type).
    ///
    /// Returns the number of descriptors seen. Without the `auto_register`
    /// feature this does nothing and returns `0`.
    pub fn auto_register(&mut self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            let mut count = 0;
            for registration in inventory::iter::<AutoRegistration> {
                self.register((registration.type_info)());
                count += 1;
            }
            log::debug!("auto-registered {count} types");
            count
        }
        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }

    #[inline]
    pub fn get(&self, type_path: &str) -> Option<&TypeInfo> {
        self.types.get(type_path)
    }

    /// Looks a descriptor up by the last segment of its path.
    ///
    /// Returns `None` if the name is unknown or shared by several types.
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&TypeInfo> {
        self.type_name_to_path
            .get(type_name)
            .and_then(|path| self.get(path))
    }

    #[inline]
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    #[inline]
    pub fn contains(&self, type_path: &str) -> bool {
        self.types.contains_key(type_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }

    /// The wire name of a type, without building its contract.
    pub fn stable_name(&self, type_path: &str) -> Result<QualifiedName, ContractError> {
        self.stable_name_at(type_path, 0)
    }

    fn stable_name_at(&self, type_path: &str, depth: usize) -> Result<QualifiedName, ContractError> {
        let info = self
            .get(type_path)
            .ok_or_else(|| ContractError::unknown(type_path))?;
        if depth > MAX_NAME_DEPTH {
            return Err(ContractError::invalid(
                info.type_path_arc(),
                "collection item types refer back to the collection",
            ));
        }

        let default = match info.kind() {
            TypeKind::Primitive(primitive) => return Ok(primitive.stable_name()),
            TypeKind::Collection(collection) => {
                let item = self.stable_name_at(collection.item_type(), depth + 1)?;
                match collection.key_type() {
                    Some(key) => dictionary_name(&self.stable_name_at(key, depth + 1)?, &item).0,
                    None => collection_name(&item),
                }
            }
            _ => default_stable_name(type_path),
        };

        let name = match info.contract_name() {
            Some(name) if !is_ncname(name) => {
                return Err(ContractError::invalid(
                    info.type_path_arc(),
                    format!("contract name `{name}` is not a valid XML name"),
                ));
            }
            Some(name) => name,
            None => default.name(),
        };
        let namespace = info.contract_namespace().unwrap_or(default.namespace());
        Ok(QualifiedName::new(name, namespace))
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<Arc<str>, Arc<Contract>>> {
        self.contracts.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The contract of a registered type, built on first request.
    ///
    /// Concurrent first requests may each build the contract; all of them
    /// get the one that reached the cache first.
    pub fn contract(&self, type_path: &str) -> Result<Arc<Contract>, ContractError> {
        if let Some(contract) = self.read_cache().get(type_path) {
            return Ok(contract.clone());
        }

        let info = self
            .get(type_path)
            .ok_or_else(|| ContractError::unknown(type_path))?;
        let built = Arc::new(self.build_contract(info)?);
        log::debug!(
            "built {} contract for `{type_path}` as {}",
            built.data_kind(),
            built.stable_name()
        );

        let mut cache = self.contracts.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache
            .entry(info.type_path_arc().clone())
            .or_insert(built)
            .clone())
    }

    /// The builtin primitive contract with the given wire name.
    pub fn builtin_by_name(&self, name: &QualifiedName) -> Option<Arc<Contract>> {
        let primitive = PrimitiveType::from_stable_name(name)?;
        self.contract(primitive.type_path()).ok()
    }

    /// Creates an instance of a class or collection type.
    ///
    /// Class members start at their default values: zero for numbers,
    /// `false`, the zero enum value, and `Null` for everything else.
    /// Abstract classes cannot be constructed.
    pub fn construct(&self, type_path: &str) -> Result<Object, ContractError> {
        let contract = self.contract(type_path)?;
        let type_path = contract.type_path_arc().clone();
        match contract.kind() {
            ContractKind::Class(class) if class.is_abstract() => {
                Err(ContractError::Abstract { type_path })
            }
            ContractKind::Class(_) => {
                let mut object = Object::new_class(type_path);
                for level in contract.class_hierarchy(self)? {
                    let Some(class) = level.as_class() else {
                        continue;
                    };
                    for member in class.members() {
                        member.accessor().set(&mut object, self.default_value(member));
                    }
                }
                Ok(object)
            }
            ContractKind::Collection(collection) if collection.is_dictionary() => {
                Ok(Object::new_dictionary(type_path))
            }
            ContractKind::Collection(_) => Ok(Object::new_collection(type_path)),
            ContractKind::Primitive(PrimitiveType::Object) => Ok(Object::new_class(type_path)),
            _ => Err(ContractError::NotConstructible {
                type_path,
                kind: contract.data_kind(),
            }),
        }
    }

    /// The value a member holds when it was never set.
    pub fn default_value(&self, member: &DataMember) -> Value {
        if member.flags().contains(MemberFlags::NULLABLE) {
            return Value::Null;
        }
        match self.get(member.type_path()).map(TypeInfo::kind) {
            Some(TypeKind::Primitive(primitive)) => primitive.default_value(),
            Some(TypeKind::Enum(_)) => Value::Enum(EnumValue::new(member.type_path_arc().clone(), 0)),
            _ => Value::Null,
        }
    }

    /// Known types of `type_path` and its bases, followed transitively.
    pub(crate) fn collect_known_types(
        &self,
        type_path: &str,
        declared: &[Arc<str>],
    ) -> Box<[Arc<str>]> {
        let mut queue: VecDeque<Arc<str>> = declared.iter().cloned().collect();
        for base in self.base_infos(type_path) {
            queue.extend(base.known_types().iter().cloned());
        }

        let mut seen: HashSet<Arc<str>> = HashSet::default();
        let mut found = Vec::new();
        while let Some(path) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }
            if let Some(info) = self.get(&path) {
                queue.extend(info.known_types().iter().cloned());
                for base in self.base_infos(&path) {
                    queue.extend(base.known_types().iter().cloned());
                }
            }
            found.push(path);
        }
        found.into_boxed_slice()
    }

    /// Descriptors of the base classes of `type_path`, nearest first.
    fn base_infos(&self, type_path: &str) -> Vec<&TypeInfo> {
        let mut bases = Vec::new();
        let mut current = self.get(type_path).and_then(TypeInfo::as_class);
        while let Some(base) = current.and_then(ClassInfo::base) {
            let Some(info) = self.get(base) else { break };
            if info.type_path() == type_path || bases.iter().any(|b: &&TypeInfo| b.type_path() == base) {
                break;
            }
            bases.push(info);
            current = info.as_class();
        }
        bases
    }

    fn build_contract(&self, info: &TypeInfo) -> Result<Contract, ContractError> {
        let type_path = info.type_path_arc();
        let stable_name = self.stable_name(type_path)?;
        let kind = match info.kind() {
            TypeKind::Primitive(primitive) => ContractKind::Primitive(*primitive),
            TypeKind::Class(class) => {
                ContractKind::Class(self.build_class(type_path, &stable_name, class)?)
            }
            TypeKind::Collection(collection) => {
                ContractKind::Collection(self.build_collection(type_path, &stable_name, collection)?)
            }
            TypeKind::Enum(enumeration) => ContractKind::Enum(build_enum(type_path, enumeration)?),
            TypeKind::Xml => ContractKind::XmlAny,
        };
        Ok(Contract::new(
            type_path.clone(),
            stable_name,
            kind,
            info.known_types().into(),
        ))
    }

    fn build_class(
        &self,
        type_path: &Arc<str>,
        stable_name: &QualifiedName,
        class: &ClassInfo,
    ) -> Result<ClassContract, ContractError> {
        let mut seen: HashSet<&str> = HashSet::default();
        seen.insert(type_path);
        let mut base = class.base();
        while let Some(base_path) = base {
            if !seen.insert(base_path) {
                return Err(ContractError::invalid(
                    type_path,
                    format!("base class chain loops back through `{base_path}`"),
                ));
            }
            let base_info = self
                .get(base_path)
                .ok_or_else(|| ContractError::unknown(base_path))?;
            let Some(base_class) = base_info.as_class() else {
                return Err(ContractError::invalid(
                    type_path,
                    format!("base type `{base_path}` is not a class"),
                ));
            };
            base = base_class.base();
        }

        let namespace: Arc<str> = stable_name.namespace().into();
        let mut names: HashSet<Arc<str>> = HashSet::default();
        let mut members = Vec::with_capacity(class.members().len());
        for member in class.members() {
            let name: Arc<str> = encode_local_name(member.name()).into();
            if !names.insert(name.clone()) {
                return Err(ContractError::invalid(
                    type_path,
                    format!("data member name `{name}` is used twice"),
                ));
            }
            let member_type = self
                .get(member.type_path())
                .ok_or_else(|| ContractError::unknown(member.type_path()))?;
            let accessor: Arc<dyn MemberAccessor> = match member.accessor() {
                Some(accessor) => accessor.clone(),
                None => Arc::new(FieldAccessor::new(member.name_arc().clone())),
            };
            members.push(DataMember {
                name,
                namespace: namespace.clone(),
                order: member.order(),
                flags: member.flags(),
                is_value_type: member_type.is_value_type(),
                known_types: member.known_types().into(),
                accessor,
                contract: LazyContract::new(member.type_path_arc().clone()),
            });
        }
        members.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));

        Ok(ClassContract {
            base: class.base_arc().cloned().map(LazyContract::new),
            members: members.into_boxed_slice(),
            is_abstract: class.is_abstract(),
            is_reference: class.is_reference(),
        })
    }

    fn build_collection(
        &self,
        type_path: &Arc<str>,
        stable_name: &QualifiedName,
        collection: &CollectionInfo,
    ) -> Result<CollectionContract, ContractError> {
        let item_name = self.stable_name(collection.item_type())?;
        let default_item = match collection.key_type() {
            Some(key) => dictionary_name(&self.stable_name(key)?, &item_name).1,
            None => item_name.name().to_owned(),
        };

        let element_name = |given: Option<&str>, default: &str| -> Result<Arc<str>, ContractError> {
            match given {
                Some(name) if !is_ncname(name) => Err(ContractError::invalid(
                    type_path,
                    format!("collection element name `{name}` is not a valid XML name"),
                )),
                Some(name) => Ok(name.into()),
                None => Ok(default.into()),
            }
        };

        Ok(CollectionContract {
            shape: collection.shape(),
            item: LazyContract::new(collection.item_type_arc().clone()),
            key: collection.key_type_arc().cloned().map(LazyContract::new),
            item_name: element_name(collection.item_name(), &default_item)?,
            key_name: element_name(collection.key_name(), "Key")?,
            value_name: element_name(collection.value_name(), "Value")?,
            namespace: stable_name.namespace().into(),
        })
    }
}

fn build_enum(type_path: &Arc<str>, info: &EnumInfo) -> Result<EnumContract, ContractError> {
    let mut seen: HashSet<&str> = HashSet::default();
    for (name, _) in info.members() {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ContractError::invalid(
                type_path,
                format!("enum member name `{name}` is empty or contains whitespace"),
            ));
        }
        if !seen.insert(name) {
            return Err(ContractError::invalid(
                type_path,
                format!("enum member name `{name}` is used twice"),
            ));
        }
    }
    Ok(EnumContract {
        names: info.members().iter().map(|(name, _)| name.clone()).collect(),
        values: info.members().iter().map(|(_, value)| *value).collect(),
        is_flags: info.is_flags(),
    })
}

/// `a::b::C<d::E>` → `C<d::E>`.
fn short_name(type_path: &str) -> &str {
    let end = type_path.find('<').unwrap_or(type_path.len());
    match type_path[..end].rfind("::") {
        Some(index) => &type_path[index + 2..],
        None => type_path,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::info::{ClassInfo, CollectionInfo, EnumInfo, MemberInfo, TypeInfo};
    use crate::value::{EnumValue, Value};
    use crate::{ContractError, DataKind};

    use super::TypeRegistry;

    fn shapes() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::class(
            "geo::Shape",
            ClassInfo::new()
                .with_abstract(true)
                .with_member(MemberInfo::new("Name", "String")),
        ));
        registry.register(
            TypeInfo::class(
                "geo::Circle",
                ClassInfo::new()
                    .with_base("geo::Shape")
                    .with_member(MemberInfo::new("Radius", "f64"))
                    .with_member(MemberInfo::new("Center", "geo::Point").with_order(1)),
            )
            .with_known_type("geo::Square"),
        );
        registry.register(TypeInfo::class(
            "geo::Square",
            ClassInfo::new()
                .with_base("geo::Shape")
                .with_member(MemberInfo::new("Side", "f64")),
        ));
        registry.register(TypeInfo::class(
            "geo::Point",
            ClassInfo::new()
                .with_member(MemberInfo::new("Y", "i32"))
                .with_member(MemberInfo::new("X", "i32")),
        ));
        registry.register(TypeInfo::enumeration(
            "geo::Fill",
            EnumInfo::new().with_member("Solid", 0).with_member("Hatched", 1),
        ));
        registry.register(TypeInfo::collection(
            "geo::Points",
            CollectionInfo::list("geo::Point"),
        ));
        registry.register(TypeInfo::collection(
            "geo::Lookup",
            CollectionInfo::dictionary("String", "i32"),
        ));
        registry
    }

    #[test]
    fn contracts_are_cached() {
        let registry = shapes();
        let first = registry.contract("geo::Circle").unwrap();
        let second = registry.contract("geo::Circle").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.data_kind(), DataKind::Class);
    }

    #[test]
    fn concurrent_first_use() {
        let registry = shapes();
        let contracts: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.contract("geo::Square").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(contracts.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn member_order_and_hierarchy() {
        let registry = shapes();
        let circle = registry.contract("geo::Circle").unwrap();

        let names: Vec<_> = circle
            .as_class()
            .unwrap()
            .members()
            .iter()
            .map(|m| m.name())
            .collect();
        assert_eq!(names, ["Radius", "Center"]);

        let point = registry.contract("geo::Point").unwrap();
        let names: Vec<_> = point.as_class().unwrap().members().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["X", "Y"]);

        let chain: Vec<_> = circle
            .class_hierarchy(&registry)
            .unwrap()
            .iter()
            .map(|c| c.type_path().to_owned())
            .collect();
        assert_eq!(chain, ["geo::Shape", "geo::Circle"]);
    }

    #[test]
    fn collection_names() {
        let registry = shapes();
        let points = registry.contract("geo::Points").unwrap();
        assert_eq!(points.stable_name().name(), "ArrayOfPoint");
        assert_eq!(points.as_collection().unwrap().item_name(), "Point");

        let lookup = registry.contract("geo::Lookup").unwrap();
        let lookup_collection = lookup.as_collection().unwrap();
        assert_eq!(lookup.stable_name().name(), "ArrayOfKeyValueOfstringint");
        assert_eq!(lookup_collection.item_name(), "KeyValueOfstringint");
        assert_eq!(lookup_collection.key_name(), "Key");
        assert!(lookup_collection.is_dictionary());
    }

    #[test]
    fn known_types_are_transitive() {
        let mut registry = shapes();
        registry.register(
            TypeInfo::class("geo::Drawing", ClassInfo::new()).with_known_type("geo::Circle"),
        );
        let drawing = registry.contract("geo::Drawing").unwrap();
        let known: Vec<_> = drawing.known_types(&registry).iter().map(|p| &**p).collect();
        assert_eq!(known, ["geo::Circle", "geo::Square"]);
    }

    #[test]
    fn invalid_descriptors() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::class("a::A", ClassInfo::new().with_base("a::B")));
        registry.register(TypeInfo::class("a::B", ClassInfo::new().with_base("a::A")));
        registry.register(TypeInfo::class(
            "a::Twice",
            ClassInfo::new()
                .with_member(MemberInfo::new("V", "i32"))
                .with_member(MemberInfo::new("V", "String")),
        ));
        registry.register(TypeInfo::class(
            "a::Missing",
            ClassInfo::new().with_member(MemberInfo::new("V", "a::Nowhere")),
        ));
        registry.register(TypeInfo::collection("a::Loop", CollectionInfo::list("a::Loop")));
        registry.register(TypeInfo::class("a::Named", ClassInfo::new()).with_contract_name("not a name"));

        assert!(matches!(registry.contract("a::A"), Err(ContractError::Invalid { .. })));
        assert!(matches!(registry.contract("a::Twice"), Err(ContractError::Invalid { .. })));
        assert!(matches!(
            registry.contract("a::Missing"),
            Err(ContractError::UnknownType { type_path }) if &*type_path == "a::Nowhere"
        ));
        assert!(matches!(registry.contract("a::Loop"), Err(ContractError::Invalid { .. })));
        assert!(matches!(registry.contract("a::Named"), Err(ContractError::Invalid { .. })));
        assert!(matches!(registry.contract("a::Unregistered"), Err(ContractError::UnknownType { .. })));
    }

    #[test]
    fn construct_defaults() {
        let mut registry = shapes();
        registry.register(TypeInfo::class(
            "geo::Style",
            ClassInfo::new()
                .with_member(MemberInfo::new("Fill", "geo::Fill"))
                .with_member(MemberInfo::new("Width", "i32").nullable()),
        ));

        let circle = registry.construct("geo::Circle").unwrap();
        assert_eq!(circle.field("Name"), Some(&Value::Null));
        assert_eq!(circle.field("Radius"), Some(&Value::F64(0.0)));
        assert_eq!(circle.field("Center"), Some(&Value::Null));

        let style = registry.construct("geo::Style").unwrap();
        assert_eq!(style.field("Fill"), Some(&Value::Enum(EnumValue::new("geo::Fill", 0))));
        assert_eq!(style.field("Width"), Some(&Value::Null));

        assert!(registry.construct("geo::Points").unwrap().items().is_some());
        assert!(registry.construct("geo::Lookup").unwrap().entries().is_some());
        assert!(matches!(registry.construct("geo::Shape"), Err(ContractError::Abstract { .. })));
        assert!(matches!(
            registry.construct("geo::Fill"),
            Err(ContractError::NotConstructible { kind: DataKind::Enum, .. })
        ));
    }

    #[test]
    fn register_replaces_and_clears_cache() {
        let mut registry = shapes();
        let before = registry.contract("geo::Point").unwrap();
        assert!(!registry.register(
            TypeInfo::class("geo::Point", ClassInfo::new()).with_contract_name("Pt")
        ));
        let after = registry.contract("geo::Point").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.stable_name().name(), "Pt");
        assert_eq!(registry.get_with_type_name("Point").unwrap().type_path(), "geo::Point");
    }

    #[test]
    fn ambiguous_type_names() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::class("a::Item", ClassInfo::new()));
        registry.register(TypeInfo::class("b::Item", ClassInfo::new()));
        assert!(registry.get_with_type_name("Item").is_none());
        assert!(registry.is_ambiguous("Item"));
    }

    #[test]
    fn builtins() {
        let registry = TypeRegistry::new();
        let name = registry.stable_name("String").unwrap();
        assert_eq!(name.name(), "string");
        assert!(registry.builtin_by_name(&name).is_some());

        let xml = registry.contract("XmlElement").unwrap();
        assert_eq!(xml.data_kind(), DataKind::XmlAny);
        assert_eq!(
            xml.stable_name().namespace(),
            "http://schemas.datacontract.org/2004/07/System.Xml"
        );
    }

    #[cfg(feature = "auto_register")]
    fn submitted() -> TypeInfo {
        TypeInfo::class("tests::Submitted", ClassInfo::new())
    }

    #[cfg(feature = "auto_register")]
    crate::submit_type!(submitted);

    #[test]
    #[cfg(feature = "auto_register")]
    fn auto_register() {
        let mut registry = TypeRegistry::new();
        assert!(registry.auto_register() >= 1);
        assert!(registry.contains("tests::Submitted"));
        assert!(TypeRegistry::global().contains("tests::Submitted"));
    }
}
