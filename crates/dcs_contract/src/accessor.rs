use core::fmt::Debug;
use std::sync::Arc;

use crate::value::{Object, Value};

/// Reads and writes one data member of an object.
///
/// Built once per member when its contract is built, then shared by every
/// call. The default is [`FieldAccessor`]; supply another implementation
/// through [`MemberInfo::with_accessor`](crate::info::MemberInfo::with_accessor)
/// to map a member onto differently named or computed state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use dcs_contract::MemberAccessor;
/// use dcs_contract::value::{Object, Value};
///
/// /// Stores the member under a field with another name.
/// #[derive(Debug)]
/// struct Renamed(&'static str);
///
/// impl MemberAccessor for Renamed {
///     fn get(&self, object: &Object) -> Value {
///         object.field(self.0).cloned().unwrap_or_default()
///     }
///
///     fn set(&self, object: &mut Object, value: Value) {
///         object.set_field(self.0, value);
///     }
/// }
///
/// let accessor: Arc<dyn MemberAccessor> = Arc::new(Renamed("full_name"));
/// let mut object = Object::new_class("Person");
/// accessor.set(&mut object, "Ann Lee".into());
///
/// assert_eq!(object.field("full_name"), Some(&Value::from("Ann Lee")));
/// ```
pub trait MemberAccessor: Debug + Send + Sync {
    /// Returns the member value; `Null` when absent.
    fn get(&self, object: &Object) -> Value;

    /// Stores the member value.
    fn set(&self, object: &mut Object, value: Value);
}

/// Stores a member in the object field of the same name.
#[derive(Debug, Clone)]
pub struct FieldAccessor {
    field: Arc<str>,
}

impl FieldAccessor {
    #[inline]
    pub fn new(field: impl Into<Arc<str>>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl MemberAccessor for FieldAccessor {
    fn get(&self, object: &Object) -> Value {
        object.field(&self.field).cloned().unwrap_or_default()
    }

    fn set(&self, object: &mut Object, value: Value) {
        object.set_field(self.field.clone(), value);
    }
}
