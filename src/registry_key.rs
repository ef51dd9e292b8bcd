use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info};

use crate::error::RegistryError;
use crate::registry_hive::{KeyLocation, RegistryHive, ValueIter};
use crate::registry_value::{DocumentEntry, RegistryValue, SEPARATOR};

/// One registry key and the values under it. Value names are
/// case-insensitive; insertion order is kept for display and export.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryItem {
    location: KeyLocation,
    order: Vec<String>,
    values: BTreeMap<String, RegistryValue>,
}

impl RegistryItem {
    pub fn new(location: KeyLocation) -> Self {
        Self {
            location,
            order: Vec::new(),
            values: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.location.path
    }

    pub fn location(&self) -> &KeyLocation {
        &self.location
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get_value(&self, name: &str) -> Option<&RegistryValue> {
        self.values.get(&normalize(name))
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &RegistryValue> {
        self.order.iter().filter_map(|k| self.values.get(k))
    }

    /// Insert `value`, or merge it into the same-named value already held.
    pub fn update_value(&mut self, value: RegistryValue) -> Result<(), RegistryError> {
        let key = normalize(&value.name);
        match self.values.get_mut(&key) {
            Some(existing) => existing.merge(&value),
            None => {
                self.order.push(key.clone());
                self.values.insert(key, value);
                Ok(())
            }
        }
    }

    pub fn merge_with(&mut self, other: &RegistryItem) -> Result<(), RegistryError> {
        if !self.name().eq_ignore_ascii_case(other.name()) {
            return Err(RegistryError::KeyMismatch {
                left: self.name().to_string(),
                right: other.name().to_string(),
            });
        }
        for value in other.values() {
            self.update_value(value.clone())?;
        }
        Ok(())
    }

    pub fn read_from<H: RegistryHive + ?Sized>(&mut self, hive: &H) -> Result<(), RegistryError> {
        let handle = hive.open_read(&self.location)?;
        let mut count = 0usize;
        for wire in ValueIter::new(&*handle) {
            let value = RegistryValue::from_wire(&wire?)?;
            debug!("read {}", value);
            self.update_value(value)?;
            count += 1;
        }
        info!("read {} value(s) from {}", count, self.location);
        Ok(())
    }

    /// Set every held value on the key. Values on the key that this item
    /// does not hold are left alone.
    pub fn write_to<H: RegistryHive + ?Sized>(&self, hive: &H) -> Result<usize, RegistryError> {
        let wires = self
            .values()
            .map(RegistryValue::to_wire)
            .collect::<Result<Vec<_>, _>>()?;
        let handle = hive.open_write(&self.location)?;
        for wire in &wires {
            debug!("writing {}\\{} (type {})", self.location, wire.name, wire.code);
            handle.set_value(wire)?;
        }
        info!("wrote {} value(s) to {}", wires.len(), self.location);
        Ok(wires.len())
    }

    pub fn to_document(&self) -> Vec<DocumentEntry> {
        self.values().map(RegistryValue::to_document).collect()
    }

    /// Merge the entries into this item. Nothing is changed when any entry
    /// fails to decode.
    pub fn from_document(&mut self, entries: &[DocumentEntry]) -> Result<(), RegistryError> {
        let parsed = entries
            .iter()
            .map(RegistryValue::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        for value in parsed {
            self.update_value(value)?;
        }
        Ok(())
    }
}

impl fmt::Display for RegistryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .values()
            .map(|v| (v.name.as_str(), v.values.join(SEPARATOR.to_string().as_str()), v.value_type.symbol()))
            .collect::<Vec<_>>();
        let name_width = rows.iter().map(|r| r.0.chars().count()).chain(Some(4)).max().unwrap_or(4);
        let value_width = rows.iter().map(|r| r.1.chars().count()).chain(Some(5)).max().unwrap_or(5);
        writeln!(f, "[{}]", self.location)?;
        writeln!(f, "{:<name_width$}  {:<value_width$}  Type", "Name", "Value")?;
        writeln!(f, "{}  {}  {}", "-".repeat(name_width), "-".repeat(value_width), "-".repeat(4))?;
        for (name, values, ty) in rows {
            writeln!(f, "{:<name_width$}  {:<value_width$}  {}", name, values, ty)?;
        }
        Ok(())
    }
}

fn normalize(name: &str) -> String {
    name.to_ascii_uppercase()
}
