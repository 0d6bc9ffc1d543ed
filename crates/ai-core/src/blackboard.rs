use std::any::Any;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Typed blackboard slot.
///
/// The name is only used for diagnostics; identity is the numeric id.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    id: u64,
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(id: u64, name: &'static str) -> Self {
        Self {
            id,
            name,
            _phantom: PhantomData,
        }
    }

    pub fn id(self) -> u64 {
        self.id
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Caller-owned parameter store threaded through every node invocation.
///
/// The tree runtime never writes to it on its own; values are put there by the host or by
/// leaves the caller supplied.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<u64, Box<dyn Any>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(&key.id)
    }

    pub fn set<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.id, Box::new(value));
    }

    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        let value = self.values.get(&key.id)?;
        Some(value.downcast_ref::<T>().unwrap_or_else(|| mismatch(key)))
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        let value = self.values.get_mut(&key.id)?;
        Some(value.downcast_mut::<T>().unwrap_or_else(|| mismatch(key)))
    }

    /// Mutable access, inserting `make()` first when the slot is empty.
    pub fn get_or_insert_with<T: 'static>(
        &mut self,
        key: BbKey<T>,
        make: impl FnOnce() -> T,
    ) -> &mut T {
        let value = self
            .values
            .entry(key.id)
            .or_insert_with(|| Box::new(make()));
        value.downcast_mut::<T>().unwrap_or_else(|| mismatch(key))
    }

    pub fn remove<T: 'static>(&mut self, key: BbKey<T>) -> Option<T> {
        let value = self.values.remove(&key.id)?;
        Some(*value.downcast::<T>().unwrap_or_else(|_| mismatch(key)))
    }
}

fn mismatch<T: 'static, R>(key: BbKey<T>) -> R {
    panic!(
        "blackboard type mismatch for key {} (id={}): stored type differs from requested",
        key.name, key.id
    )
}
