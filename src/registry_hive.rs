use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::error::RegistryError;
use crate::registry_value::WireValue;

/// Predefined registry root a key lives under. Only the current user's hive
/// is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryRoot {
    #[default]
    CurrentUser,
}

impl RegistryRoot {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryRoot::CurrentUser => "HKEY_CURRENT_USER",
        }
    }
}

/// Where a [`crate::RegistryItem`] reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLocation {
    pub root: RegistryRoot,
    pub path: String,
}

impl KeyLocation {
    pub fn new(root: RegistryRoot, path: impl Into<String>) -> Self {
        Self {
            root,
            path: path.into(),
        }
    }

    /// `HKEY_CURRENT_USER\Environment`.
    pub fn user_environment() -> Self {
        Self::new(RegistryRoot::CurrentUser, "Environment")
    }
}

impl Default for KeyLocation {
    fn default() -> Self {
        Self::user_environment()
    }
}

impl fmt::Display for KeyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.root.as_str(), self.path)
    }
}

/// Access to registry keys. Handles are closed when dropped.
pub trait RegistryHive {
    fn open_read(&self, location: &KeyLocation) -> Result<Box<dyn KeyHandle + '_>, RegistryError>;
    fn open_write(&self, location: &KeyLocation) -> Result<Box<dyn KeyHandle + '_>, RegistryError>;
}

/// An open registry key.
pub trait KeyHandle {
    /// The value at `index`, or `None` once enumeration is exhausted.
    fn value_at(&self, index: u32) -> Result<Option<WireValue>, RegistryError>;
    fn set_value(&self, value: &WireValue) -> Result<(), RegistryError>;
    fn delete_value(&self, name: &str) -> Result<(), RegistryError>;
}

/// Enumerates the values of a key in index order. Stops after the first error.
pub struct ValueIter<'a> {
    handle: &'a dyn KeyHandle,
    index: u32,
    done: bool,
}

impl<'a> ValueIter<'a> {
    pub fn new(handle: &'a dyn KeyHandle) -> Self {
        Self {
            handle,
            index: 0,
            done: false,
        }
    }
}

impl Iterator for ValueIter<'_> {
    type Item = Result<WireValue, RegistryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.handle.value_at(self.index) {
            Ok(Some(value)) => {
                self.index += 1;
                Some(Ok(value))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Delete every value currently enumerable under `location`. Returns the
/// number of values removed.
pub fn empty_key<H: RegistryHive + ?Sized>(hive: &H, location: &KeyLocation) -> Result<usize, RegistryError> {
    let handle = hive.open_write(location)?;
    let names = ValueIter::new(&*handle)
        .map(|value| value.map(|v| v.name))
        .collect::<Result<Vec<_>, _>>()?;
    for name in &names {
        debug!("deleting {}\\{}", location, name);
        handle.delete_value(name)?;
    }
    info!("emptied {} value(s) from {}", names.len(), location);
    Ok(names.len())
}

type KeyValues = Rc<RefCell<Vec<WireValue>>>;

/// In-memory hive. Clones share the same keys and handle count.
#[derive(Debug, Clone, Default)]
pub struct MemoryHive {
    keys: Rc<RefCell<BTreeMap<String, KeyValues>>>,
    open_handles: Rc<Cell<usize>>,
    fail_at: Rc<Cell<Option<u32>>>,
}

impl MemoryHive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_key(&self, location: &KeyLocation) {
        self.keys
            .borrow_mut()
            .entry(normalize(location))
            .or_default();
    }

    /// Store `value` directly, creating the key when needed.
    pub fn insert(&self, location: &KeyLocation, value: WireValue) {
        self.create_key(location);
        let values = self.keys.borrow()[&normalize(location)].clone();
        set_in(&mut values.borrow_mut(), value);
    }

    pub fn values(&self, location: &KeyLocation) -> Option<Vec<WireValue>> {
        self.keys
            .borrow()
            .get(&normalize(location))
            .map(|values| values.borrow().clone())
    }

    pub fn get(&self, location: &KeyLocation, name: &str) -> Option<WireValue> {
        self.values(location)?
            .into_iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.open_handles.get()
    }

    /// Make enumeration at `index` fail with an access error.
    pub fn fail_enumeration_at(&self, index: u32) {
        self.fail_at.set(Some(index));
    }

    fn open(&self, location: &KeyLocation, writable: bool) -> Result<Box<dyn KeyHandle + '_>, RegistryError> {
        let values = self
            .keys
            .borrow()
            .get(&normalize(location))
            .cloned()
            .ok_or_else(|| RegistryError::KeyNotFound(location.to_string()))?;
        self.open_handles.set(self.open_handles.get() + 1);
        Ok(Box::new(MemoryKeyHandle {
            hive: self,
            key: location.to_string(),
            values,
            writable,
        }))
    }
}

impl RegistryHive for MemoryHive {
    fn open_read(&self, location: &KeyLocation) -> Result<Box<dyn KeyHandle + '_>, RegistryError> {
        self.open(location, false)
    }

    fn open_write(&self, location: &KeyLocation) -> Result<Box<dyn KeyHandle + '_>, RegistryError> {
        self.open(location, true)
    }
}

struct MemoryKeyHandle<'a> {
    hive: &'a MemoryHive,
    key: String,
    values: KeyValues,
    writable: bool,
}

impl MemoryKeyHandle<'_> {
    fn check_writable(&self) -> Result<(), RegistryError> {
        if self.writable {
            Ok(())
        } else {
            Err(RegistryError::AccessDenied(format!("{} is open read-only", self.key)))
        }
    }
}

impl KeyHandle for MemoryKeyHandle<'_> {
    fn value_at(&self, index: u32) -> Result<Option<WireValue>, RegistryError> {
        if self.hive.fail_at.get() == Some(index) {
            return Err(RegistryError::AccessDenied(self.key.clone()));
        }
        Ok(self.values.borrow().get(index as usize).cloned())
    }

    fn set_value(&self, value: &WireValue) -> Result<(), RegistryError> {
        self.check_writable()?;
        set_in(&mut self.values.borrow_mut(), value.clone());
        Ok(())
    }

    fn delete_value(&self, name: &str) -> Result<(), RegistryError> {
        self.check_writable()?;
        let mut values = self.values.borrow_mut();
        let pos = values
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| RegistryError::ValueNotFound(format!("{}\\{}", self.key, name)))?;
        values.remove(pos);
        Ok(())
    }
}

impl Drop for MemoryKeyHandle<'_> {
    fn drop(&mut self) {
        self.hive.open_handles.set(self.hive.open_handles.get() - 1);
    }
}

fn set_in(values: &mut Vec<WireValue>, value: WireValue) {
    match values.iter_mut().find(|v| v.name.eq_ignore_ascii_case(&value.name)) {
        Some(existing) => *existing = value,
        None => values.push(value),
    }
}

fn normalize(location: &KeyLocation) -> String {
    location.to_string().to_ascii_uppercase()
}
