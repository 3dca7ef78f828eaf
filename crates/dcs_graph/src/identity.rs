use core::hash::BuildHasher;
use std::rc::Rc;

use dcs_contract::value::{ObjectRef, Value};
use dcs_utils::hash::{FixedHashState, HashMap};
use dcs_utils::next_prime;

// -----------------------------------------------------------------------------
// Identity

/// A handle whose address identifies the object it points to.
pub trait Identity: Clone {
    fn address(&self) -> usize;
}

impl Identity for ObjectRef {
    #[inline]
    fn address(&self) -> usize {
        ObjectRef::address(self)
    }
}

impl<T: ?Sized> Identity for Rc<T> {
    #[inline]
    fn address(&self) -> usize {
        Rc::as_ptr(self) as *const () as usize
    }
}

// -----------------------------------------------------------------------------
// IdentityTable

const INITIAL_CAPACITY: usize = next_prime(32);

struct Entry<K> {
    key: K,
    id: u32,
}

/// An open-addressing map from object identity to a small integer id.
///
/// Keys are compared by address, never by value. Ids are handed out
/// sequentially from `1`. The table keeps a clone of every key, so an
/// address cannot be reused by another object while it is registered.
///
/// Slots are probed linearly, wrapping at the end. The capacity is prime and
/// grows to the next prime past twice its size once more than 80% of the
/// slots are taken, so there is always an empty slot to stop a probe.
/// Removal shifts the following entries of the chain back instead of
/// leaving tombstones.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use dcs_graph::IdentityTable;
///
/// let a = Rc::new(1);
/// let b = Rc::new(1);
/// let mut table = IdentityTable::new();
///
/// assert_eq!(table.get_or_assign_id(&a), (1, true));
/// assert_eq!(table.get_or_assign_id(&b), (2, true));
/// assert_eq!(table.get_or_assign_id(&a), (1, false));
///
/// assert_eq!(table.remove(&a), Some(1));
/// assert_eq!(table.get_id(&a), None);
/// assert_eq!(table.get_id(&b), Some(2));
/// ```
pub struct IdentityTable<K: Identity> {
    slots: Box<[Option<Entry<K>>]>,
    len: usize,
    next_id: u32,
}

impl<K: Identity> Default for IdentityTable<K> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Identity> IdentityTable<K> {
    pub fn new() -> Self {
        Self {
            slots: empty_slots(INITIAL_CAPACITY),
            len: 0,
            next_id: 1,
        }
    }

    /// Number of registered objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The id of `key`, if it has one.
    pub fn get_id(&self, key: &K) -> Option<u32> {
        self.find(key.address())
            .ok()
            .and_then(|slot| self.slots[slot].as_ref())
            .map(|entry| entry.id)
    }

    /// The id of `key`, assigning the next free id on first sight.
    ///
    /// The flag is `true` if the id was assigned by this call.
    pub fn get_or_assign_id(&mut self, key: &K) -> (u32, bool) {
        if let Some(id) = self.get_id(key) {
            return (id, false);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.insert(key.clone(), id);
        (id, true)
    }

    /// Lets `new` stand for the object registered as `old` under `id`.
    ///
    /// Used when a surrogate swaps one object for another. If `new` already
    /// has an id, `old` is remapped to it and that id is returned; otherwise
    /// `new` is registered under `id` and `None` is returned. Either way both
    /// objects resolve to the same id afterwards.
    pub fn reassign_id(&mut self, id: u32, old: &K, new: &K) -> Option<u32> {
        if let Some(previous) = self.get_id(new) {
            match self.find(old.address()) {
                Ok(slot) => {
                    if let Some(entry) = self.slots[slot].as_mut() {
                        entry.id = previous;
                    }
                }
                Err(_) => self.insert(old.clone(), previous),
            }
            return Some(previous);
        }
        self.insert(new.clone(), id);
        None
    }

    /// Unregisters `key`, returning its id.
    pub fn remove(&mut self, key: &K) -> Option<u32> {
        let mut hole = self.find(key.address()).ok()?;
        let removed = self.slots[hole].take()?;
        self.len -= 1;

        let capacity = self.slots.len();
        let mut index = (hole + 1) % capacity;
        while let Some(entry) = &self.slots[index] {
            let home = self.home(entry.key.address());
            // The entry may fill the hole only if the hole lies on its probe
            // path, i.e. between its home slot and where it sits now.
            if distance(home, hole, capacity) < distance(home, index, capacity) {
                self.slots[hole] = self.slots[index].take();
                hole = index;
            }
            index = (index + 1) % capacity;
        }
        Some(removed.id)
    }

    #[inline]
    fn home(&self, address: usize) -> usize {
        (FixedHashState.hash_one(address) % self.slots.len() as u64) as usize
    }

    /// `Ok(slot)` holding `address`, or `Err(slot)` where it would go.
    fn find(&self, address: usize) -> Result<usize, usize> {
        let capacity = self.slots.len();
        let mut index = self.home(address);
        loop {
            match &self.slots[index] {
                None => return Err(index),
                Some(entry) if entry.key.address() == address => return Ok(index),
                Some(_) => index = (index + 1) % capacity,
            }
        }
    }

    fn insert(&mut self, key: K, id: u32) {
        if (self.len + 1) * 5 > self.slots.len() * 4 {
            self.grow();
        }
        if let Err(slot) = self.find(key.address()) {
            self.slots[slot] = Some(Entry { key, id });
            self.len += 1;
        }
    }

    fn grow(&mut self) {
        let capacity = next_prime(self.slots.len() * 2);
        let old = core::mem::replace(&mut self.slots, empty_slots(capacity));
        for entry in old.into_vec().into_iter().flatten() {
            if let Err(slot) = self.find(entry.key.address()) {
                self.slots[slot] = Some(entry);
            }
        }
    }
}

fn empty_slots<K>(capacity: usize) -> Box<[Option<Entry<K>>]> {
    core::iter::repeat_with(|| None).take(capacity).collect()
}

/// Forward distance from `from` to `to` on a ring of `capacity` slots.
#[inline]
fn distance(from: usize, to: usize, capacity: usize) -> usize {
    (to + capacity - from) % capacity
}

// -----------------------------------------------------------------------------
// ReferenceTable

/// The read-side map from `z:Id` values to the objects they define.
///
/// Objects are inserted as soon as they are created, before their content is
/// read, so a `z:Ref` to an ancestor resolves to the instance still being
/// populated.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    values: HashMap<String, Value>,
}

impl ReferenceTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` under `id`. Returns `false` if `id` was already
    /// defined; the later definition wins.
    pub fn insert(&mut self, id: &str, value: Value) -> bool {
        self.values.insert(id.to_owned(), value).is_none()
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    /// Points `id` at a different value, returning the old one. Used when a
    /// surrogate turns the value read under `id` into another.
    pub fn replace(&mut self, id: &str, value: Value) -> Option<Value> {
        self.values.insert(id.to_owned(), value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{IdentityTable, ReferenceTable};
    use dcs_contract::value::Value;

    #[test]
    fn identity_not_equality() {
        let a = Rc::new(String::from("same"));
        let b = Rc::new(String::from("same"));
        let mut table = IdentityTable::new();

        assert_eq!(table.get_or_assign_id(&a), (1, true));
        assert_eq!(table.get_or_assign_id(&b), (2, true));
        assert_eq!(table.get_or_assign_id(&a.clone()), (1, false));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn grows_and_keeps_entries() {
        let keys: Vec<_> = (0..1000).map(Rc::new).collect();
        let mut table = IdentityTable::new();
        let initial = table.capacity();
        for (index, key) in keys.iter().enumerate() {
            assert_eq!(table.get_or_assign_id(key), (index as u32 + 1, true));
        }
        assert!(table.capacity() > initial);
        assert!(table.len() < table.capacity());
        for (index, key) in keys.iter().enumerate() {
            assert_eq!(table.get_id(key), Some(index as u32 + 1));
        }
    }

    #[test]
    fn remove_from_middle_keeps_others_reachable() {
        let keys: Vec<_> = (0..200).map(Rc::new).collect();
        let mut table = IdentityTable::new();
        for key in &keys {
            table.get_or_assign_id(key);
        }

        for removed in [100, 0, 199, 57, 58, 59] {
            assert_eq!(table.remove(&keys[removed]), Some(removed as u32 + 1));
            assert_eq!(table.remove(&keys[removed]), None);
        }

        for (index, key) in keys.iter().enumerate() {
            let expected = match index {
                100 | 0 | 199 | 57 | 58 | 59 => None,
                _ => Some(index as u32 + 1),
            };
            assert_eq!(table.get_id(key), expected, "key {index}");
        }
        assert_eq!(table.len(), 194);
    }

    #[test]
    fn remove_and_reinsert_under_pressure() {
        let keys: Vec<_> = (0..64).map(Rc::new).collect();
        let mut table = IdentityTable::new();
        for round in 0..10 {
            for key in &keys {
                table.get_or_assign_id(key);
            }
            for key in keys.iter().skip(round % 3).step_by(3) {
                assert!(table.remove(key).is_some());
            }
            for key in keys.iter().skip(round % 3).step_by(3) {
                assert_eq!(table.get_id(key), None);
            }
        }
        let present = keys.iter().filter(|key| table.get_id(key).is_some()).count();
        assert_eq!(present, table.len());
    }

    #[test]
    fn reassign() {
        let original = Rc::new(1);
        let replacement = Rc::new(2);
        let mut table = IdentityTable::new();

        let (id, _) = table.get_or_assign_id(&original);
        assert_eq!(table.reassign_id(id, &original, &replacement), None);
        assert_eq!(table.get_id(&replacement), Some(id));
        assert_eq!(table.get_id(&original), Some(id));

        let other = Rc::new(3);
        let (other_id, _) = table.get_or_assign_id(&other);
        assert_eq!(table.reassign_id(other_id, &other, &replacement), Some(id));
        assert_eq!(table.get_id(&other), Some(id));
    }

    #[test]
    fn reference_table() {
        let mut refs = ReferenceTable::new();
        assert!(refs.insert("i1", Value::I32(1)));
        assert!(!refs.insert("i1", Value::I32(2)));
        assert_eq!(refs.get("i1"), Some(&Value::I32(2)));
        assert_eq!(refs.replace("i1", Value::I32(3)), Some(Value::I32(2)));
        assert_eq!(refs.get("i2"), None);
        assert_eq!(refs.len(), 1);
    }
}
