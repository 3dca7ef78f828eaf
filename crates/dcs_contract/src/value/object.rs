use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use std::rc::Rc;
use std::sync::Arc;

use dcs_utils::hash::HashMap;
use dcs_xml::XmlElement;

use crate::value::Value;

// -----------------------------------------------------------------------------
// Fields

/// Named member storage of a class instance.
///
/// Keeps insertion order and supports lookup by name.
#[derive(Default, Clone)]
pub struct Fields {
    values: Vec<Value>,
    names: Vec<Arc<str>>,
    indices: HashMap<Arc<str>, usize>,
}

impl Fields {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.indices.get(name).map(|index| &self.values[*index])
    }

    /// Returns the value of `name` mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.indices
            .get(name)
            .copied()
            .map(|index| &mut self.values[index])
    }

    /// Inserts or overwrites `name`.
    pub fn insert(&mut self, name: impl Into<Arc<str>>, value: Value) {
        let name = name.into();
        match self.indices.get(&name) {
            Some(index) => self.values[*index] = value,
            None => {
                self.indices.insert(name.clone(), self.values.len());
                self.names.push(name);
                self.values.push(value);
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(name, value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(|name| &**name).zip(self.values.iter())
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// ExtensionData

/// One unknown member captured during a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMember {
    /// Index of the first known member that followed it in the input; the
    /// member count of the class if it came last.
    pub position: usize,
    pub element: XmlElement,
}

/// Unknown members of a class instance, kept for the next write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionData {
    members: Vec<ExtensionMember>,
}

impl ExtensionData {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `element` as seen before the known member at `position`.
    pub fn push(&mut self, position: usize, element: XmlElement) {
        self.members.push(ExtensionMember { position, element });
    }

    #[inline]
    pub fn members(&self) -> &[ExtensionMember] {
        &self.members
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members recorded at exactly `position`.
    pub fn at_position(&self, position: usize) -> impl Iterator<Item = &ExtensionMember> {
        self.members.iter().filter(move |m| m.position == position)
    }

    /// Members recorded at `position` or later.
    pub fn from_position(&self, position: usize) -> impl Iterator<Item = &ExtensionMember> {
        self.members.iter().filter(move |m| m.position >= position)
    }
}

// -----------------------------------------------------------------------------
// ObjectBody

/// Layout of an object: named fields, a sequence, or key/value entries.
#[derive(Debug, Clone)]
pub enum ObjectBody {
    Fields(Fields),
    Items(Vec<Value>),
    Entries(Vec<(Value, Value)>),
}

// -----------------------------------------------------------------------------
// Object

/// A class or collection instance.
///
/// # Examples
///
/// ```
/// use dcs_contract::value::{Object, Value};
///
/// let mut person = Object::new_class("people::Person").with_field("Name", "Ann".into());
/// person.set_field("Age", Value::I32(41));
///
/// assert_eq!(person.field("Age"), Some(&Value::I32(41)));
///
/// let mut tags = Object::new_collection("people::Tags");
/// tags.push_item("a".into());
/// assert_eq!(tags.items().map(<[Value]>::len), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct Object {
    type_path: Arc<str>,
    body: ObjectBody,
    extension_data: Option<ExtensionData>,
}

impl Object {
    fn with_body(type_path: impl Into<Arc<str>>, body: ObjectBody) -> Self {
        Self {
            type_path: type_path.into(),
            body,
            extension_data: None,
        }
    }

    /// A class instance without fields.
    pub fn new_class(type_path: impl Into<Arc<str>>) -> Self {
        Self::with_body(type_path, ObjectBody::Fields(Fields::new()))
    }

    /// An empty array or list.
    pub fn new_collection(type_path: impl Into<Arc<str>>) -> Self {
        Self::with_body(type_path, ObjectBody::Items(Vec::new()))
    }

    /// An empty dictionary.
    pub fn new_dictionary(type_path: impl Into<Arc<str>>) -> Self {
        Self::with_body(type_path, ObjectBody::Entries(Vec::new()))
    }

    #[inline]
    pub fn type_path(&self) -> &str {
        &self.type_path
    }

    #[inline]
    pub fn body(&self) -> &ObjectBody {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut ObjectBody {
        &mut self.body
    }

    /// Field `name` of a class instance.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.body {
            ObjectBody::Fields(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Sets field `name`. No-op on collections.
    pub fn set_field(&mut self, name: impl Into<Arc<str>>, value: Value) {
        if let ObjectBody::Fields(fields) = &mut self.body {
            fields.insert(name, value);
        }
    }

    /// Builder form of [`set_field`](Self::set_field).
    pub fn with_field(mut self, name: impl Into<Arc<str>>, value: Value) -> Self {
        self.set_field(name, value);
        self
    }

    /// Items of an array or list.
    pub fn items(&self) -> Option<&[Value]> {
        match &self.body {
            ObjectBody::Items(items) => Some(items),
            _ => None,
        }
    }

    /// Appends an item. No-op unless this is an array or list.
    pub fn push_item(&mut self, value: Value) {
        if let ObjectBody::Items(items) = &mut self.body {
            items.push(value);
        }
    }

    /// Builder form of [`push_item`](Self::push_item).
    pub fn with_item(mut self, value: Value) -> Self {
        self.push_item(value);
        self
    }

    /// Entries of a dictionary.
    pub fn entries(&self) -> Option<&[(Value, Value)]> {
        match &self.body {
            ObjectBody::Entries(entries) => Some(entries),
            _ => None,
        }
    }

    /// Appends an entry. No-op unless this is a dictionary.
    pub fn push_entry(&mut self, key: Value, value: Value) {
        if let ObjectBody::Entries(entries) = &mut self.body {
            entries.push((key, value));
        }
    }

    /// Builder form of [`push_entry`](Self::push_entry).
    pub fn with_entry(mut self, key: Value, value: Value) -> Self {
        self.push_entry(key, value);
        self
    }

    /// Reserves room for `additional` items or entries.
    pub fn reserve(&mut self, additional: usize) {
        match &mut self.body {
            ObjectBody::Items(items) => items.reserve(additional),
            ObjectBody::Entries(entries) => entries.reserve(additional),
            ObjectBody::Fields(_) => {}
        }
    }

    #[inline]
    pub fn extension_data(&self) -> Option<&ExtensionData> {
        self.extension_data.as_ref()
    }

    #[inline]
    pub fn set_extension_data(&mut self, data: Option<ExtensionData>) {
        self.extension_data = data;
    }
}

// -----------------------------------------------------------------------------
// ObjectRef

/// Shared handle to an [`Object`]. Identity is the address of the object.
///
/// `Debug` prints the type and address only, so cyclic graphs can be
/// formatted.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    #[inline]
    pub fn new(object: Object) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    /// Immutably borrows the object.
    ///
    /// # Panics
    ///
    /// Panics if the object is mutably borrowed.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    /// Mutably borrows the object.
    ///
    /// # Panics
    ///
    /// Panics if the object is borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    /// The identity of the object.
    #[inline]
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The type path of the object.
    pub fn type_path(&self) -> Arc<str> {
        self.0.borrow().type_path.clone()
    }
}

impl PartialEq for ObjectRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(object) => write!(f, "ObjectRef({} @ {:#x})", object.type_path, self.address()),
            Err(_) => write!(f, "ObjectRef(<borrowed> @ {:#x})", self.address()),
        }
    }
}
