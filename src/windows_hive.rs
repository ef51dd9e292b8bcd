use winreg::enums::*;
use winreg::{RegKey, RegValue};

use crate::error::RegistryError;
use crate::registry_hive::{KeyHandle, KeyLocation, RegistryHive, RegistryRoot};
use crate::registry_value::WireValue;

/// The live Windows registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsHive;

impl WindowsHive {
    fn open(&self, location: &KeyLocation, flags: u32) -> Result<Box<dyn KeyHandle + '_>, RegistryError> {
        let root = match location.root {
            RegistryRoot::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
        };
        let key = root
            .open_subkey_with_flags(&location.path, flags)
            .map_err(|e| RegistryError::from_io(location.to_string(), e))?;
        Ok(Box::new(WindowsKeyHandle {
            key,
            label: location.to_string(),
        }))
    }
}

impl RegistryHive for WindowsHive {
    fn open_read(&self, location: &KeyLocation) -> Result<Box<dyn KeyHandle + '_>, RegistryError> {
        self.open(location, KEY_READ)
    }

    fn open_write(&self, location: &KeyLocation) -> Result<Box<dyn KeyHandle + '_>, RegistryError> {
        // Emptying a key enumerates through the write handle too.
        self.open(location, KEY_READ | KEY_WRITE)
    }
}

struct WindowsKeyHandle {
    key: RegKey,
    label: String,
}

impl KeyHandle for WindowsKeyHandle {
    fn value_at(&self, index: u32) -> Result<Option<WireValue>, RegistryError> {
        let Some(entry) = self.key.enum_values().nth(index as usize) else {
            return Ok(None);
        };
        let (name, raw) = entry.map_err(|e| RegistryError::from_io(self.label.clone(), e))?;
        let code = raw.vtype.clone() as u32;
        WireValue::from_raw_bytes(name, &raw.bytes[..], code).map(Some)
    }

    fn set_value(&self, value: &WireValue) -> Result<(), RegistryError> {
        let raw = RegValue {
            bytes: value.raw_bytes().into(),
            vtype: reg_type(value.code)?,
        };
        self.key
            .set_raw_value(&value.name, &raw)
            .map_err(|e| RegistryError::from_io(format!("{}\\{}", self.label, value.name), e))
    }

    fn delete_value(&self, name: &str) -> Result<(), RegistryError> {
        self.key.delete_value(name).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RegistryError::ValueNotFound(format!("{}\\{}", self.label, name)),
            _ => RegistryError::from_io(self.label.clone(), e),
        })
    }
}

fn reg_type(code: u32) -> Result<RegType, RegistryError> {
    let ty = match code {
        0 => REG_NONE,
        1 => REG_SZ,
        2 => REG_EXPAND_SZ,
        3 => REG_BINARY,
        4 => REG_DWORD,
        5 => REG_DWORD_BIG_ENDIAN,
        6 => REG_LINK,
        7 => REG_MULTI_SZ,
        11 => REG_QWORD,
        other => return Err(RegistryError::UnsupportedTypeCode(other)),
    };
    Ok(ty)
}
