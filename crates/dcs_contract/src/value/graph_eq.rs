use dcs_utils::hash::HashMap;

use crate::value::{Object, ObjectBody, Value};

struct Matcher {
    forward: HashMap<usize, usize>,
    backward: HashMap<usize, usize>,
}

impl Matcher {
    fn values(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Object(a), Value::Object(b)) => {
                let (left, right) = (a.address(), b.address());
                match (self.forward.get(&left), self.backward.get(&right)) {
                    (Some(seen), _) => return *seen == right,
                    (None, Some(_)) => return false,
                    (None, None) => {}
                }
                self.forward.insert(left, right);
                self.backward.insert(right, left);
                self.objects(&a.borrow(), &b.borrow())
            }
            (Value::F32(a), Value::F32(b)) if a.is_nan() && b.is_nan() => true,
            (Value::F64(a), Value::F64(b)) if a.is_nan() && b.is_nan() => true,
            (a, b) => a == b,
        }
    }

    fn objects(&mut self, a: &Object, b: &Object) -> bool {
        if a.type_path() != b.type_path() || a.extension_data() != b.extension_data() {
            return false;
        }
        match (a.body(), b.body()) {
            (ObjectBody::Fields(a), ObjectBody::Fields(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(name, value)| {
                        b.get(name).is_some_and(|other| self.values(value, other))
                    })
            }
            (ObjectBody::Items(a), ObjectBody::Items(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| self.values(a, b))
            }
            (ObjectBody::Entries(a), ObjectBody::Entries(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((ak, av), (bk, bv))| {
                        self.values(ak, bk) && self.values(av, bv)
                    })
            }
            _ => false,
        }
    }
}

/// Compares two graphs structurally.
///
/// Objects are matched one-to-one: if `a` reaches the same object twice,
/// `b` must reach one object at the same places, and vice versa. `NaN`
/// equals `NaN`.
///
/// # Examples
///
/// ```
/// use dcs_contract::value::{Object, Value, graph_eq};
///
/// let shared = Value::object(Object::new_class("Leaf"));
/// let a = Value::object(
///     Object::new_class("Pair").with_field("L", shared.clone()).with_field("R", shared),
/// );
///
/// let b = Value::object(
///     Object::new_class("Pair")
///         .with_field("L", Value::object(Object::new_class("Leaf")))
///         .with_field("R", Value::object(Object::new_class("Leaf"))),
/// );
///
/// assert!(graph_eq(&a, &a.clone()));
/// assert!(!graph_eq(&a, &b));
/// ```
pub fn graph_eq(a: &Value, b: &Value) -> bool {
    Matcher {
        forward: HashMap::default(),
        backward: HashMap::default(),
    }
    .values(a, b)
}
