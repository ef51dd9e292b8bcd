use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::registry_utils::{decode_wire, encode_wire, format_hex_bytes, parse_hex_bytes, parse_integer};

pub const REG_NONE: u32 = 0;
pub const REG_SZ: u32 = 1;
pub const REG_EXPAND_SZ: u32 = 2;
pub const REG_BINARY: u32 = 3;
pub const REG_DWORD: u32 = 4;
pub const REG_DWORD_BIG_ENDIAN: u32 = 5;
pub const REG_LINK: u32 = 6;
pub const REG_MULTI_SZ: u32 = 7;
pub const REG_QWORD: u32 = 11;

/// Separator between the entries of a string value, as in `PATH`.
pub const SEPARATOR: char = ';';

static SEARCH_PATH_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)path(ext)?$").expect("search path pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryValueType {
    Binary,
    DWord,
    DWordBigEndian,
    DWordLittleEndian,
    ExpandString,
    Link,
    MultiString,
    None,
    QWord,
    QWordLittleEndian,
    String,
}

impl RegistryValueType {
    pub const ALL: [RegistryValueType; 11] = [
        RegistryValueType::Binary,
        RegistryValueType::DWord,
        RegistryValueType::DWordBigEndian,
        RegistryValueType::DWordLittleEndian,
        RegistryValueType::ExpandString,
        RegistryValueType::Link,
        RegistryValueType::MultiString,
        RegistryValueType::None,
        RegistryValueType::QWord,
        RegistryValueType::QWordLittleEndian,
        RegistryValueType::String,
    ];

    /// Name used in backup documents.
    pub fn symbol(&self) -> &'static str {
        match self {
            RegistryValueType::Binary => "REG_BINARY",
            RegistryValueType::DWord => "REG_DWORD",
            RegistryValueType::DWordBigEndian => "REG_DWORD_BIG_ENDIAN",
            RegistryValueType::DWordLittleEndian => "REG_DWORD_LITTLE_ENDIAN",
            RegistryValueType::ExpandString => "REG_EXPAND_SZ",
            RegistryValueType::Link => "REG_LINK",
            RegistryValueType::MultiString => "REG_MULTI_SZ",
            RegistryValueType::None => "REG_NONE",
            RegistryValueType::QWord => "REG_QWORD",
            RegistryValueType::QWordLittleEndian => "REG_QWORD_LITTLE_ENDIAN",
            RegistryValueType::String => "REG_SZ",
        }
    }

    pub fn from_symbol(symbol: &str) -> Result<Self, RegistryError> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.symbol() == symbol)
            .ok_or_else(|| RegistryError::UnknownType(symbol.to_string()))
    }

    /// Type code used by the OS registry API.
    pub fn code(&self) -> u32 {
        match self {
            RegistryValueType::Binary => REG_BINARY,
            RegistryValueType::DWord | RegistryValueType::DWordLittleEndian => REG_DWORD,
            RegistryValueType::DWordBigEndian => REG_DWORD_BIG_ENDIAN,
            RegistryValueType::ExpandString => REG_EXPAND_SZ,
            RegistryValueType::Link => REG_LINK,
            RegistryValueType::MultiString => REG_MULTI_SZ,
            RegistryValueType::None => REG_NONE,
            RegistryValueType::QWord | RegistryValueType::QWordLittleEndian => REG_QWORD,
            RegistryValueType::String => REG_SZ,
        }
    }

    /// Codes shared by two variants decode to the plain `DWord`/`QWord`.
    pub fn from_code(code: u32) -> Result<Self, RegistryError> {
        match code {
            REG_NONE => Ok(RegistryValueType::None),
            REG_SZ => Ok(RegistryValueType::String),
            REG_EXPAND_SZ => Ok(RegistryValueType::ExpandString),
            REG_BINARY => Ok(RegistryValueType::Binary),
            REG_DWORD => Ok(RegistryValueType::DWord),
            REG_DWORD_BIG_ENDIAN => Ok(RegistryValueType::DWordBigEndian),
            REG_LINK => Ok(RegistryValueType::Link),
            REG_MULTI_SZ => Ok(RegistryValueType::MultiString),
            REG_QWORD => Ok(RegistryValueType::QWord),
            other => Err(RegistryError::UnsupportedTypeCode(other)),
        }
    }

    /// String types are split on [`SEPARATOR`]; every other type holds one token.
    pub fn is_string(&self) -> bool {
        match self {
            RegistryValueType::String
            | RegistryValueType::ExpandString
            | RegistryValueType::MultiString => true,
            RegistryValueType::Binary
            | RegistryValueType::DWord
            | RegistryValueType::DWordBigEndian
            | RegistryValueType::DWordLittleEndian
            | RegistryValueType::Link
            | RegistryValueType::None
            | RegistryValueType::QWord
            | RegistryValueType::QWordLittleEndian => false,
        }
    }
}

impl fmt::Display for RegistryValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Scalar in the shape the registry API reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryValueData {
    Text(String),
    DWord(u32),
    QWord(u64),
    Binary(Vec<u8>),
}

/// A `(name, data, code)` triple as exchanged with a hive.
#[derive(Debug, Clone, PartialEq)]
pub struct WireValue {
    pub name: String,
    pub data: RegistryValueData,
    pub code: u32,
}

impl WireValue {
    pub fn new(name: impl Into<String>, data: RegistryValueData, code: u32) -> Self {
        Self {
            name: name.into(),
            data,
            code,
        }
    }

    pub fn from_raw_bytes(name: impl Into<String>, bytes: &[u8], code: u32) -> Result<Self, RegistryError> {
        Ok(Self::new(name, decode_wire(bytes, code)?, code))
    }

    pub fn raw_bytes(&self) -> Vec<u8> {
        encode_wire(&self.data, self.code)
    }
}

/// One `[name, [values...], type]` entry of a backup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry(pub String, pub Vec<String>, pub String);

impl DocumentEntry {
    pub fn new(name: impl Into<String>, values: Vec<String>, type_name: impl Into<String>) -> Self {
        Self(name.into(), values, type_name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn values(&self) -> &[String] {
        &self.1
    }

    pub fn type_name(&self) -> &str {
        &self.2
    }
}

/// A named registry value held in document form. The wire scalar is derived
/// on demand by [`RegistryValue::to_wire`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryValue {
    pub name: String,
    pub value_type: RegistryValueType,
    pub values: Vec<String>,
    pub multi_valued: bool,
}

impl RegistryValue {
    pub fn new(name: impl Into<String>, value_type: RegistryValueType, values: Vec<String>) -> Self {
        let name = name.into();
        let multi_valued = is_multi_valued(&name, value_type, &values);
        Self {
            name,
            value_type,
            values,
            multi_valued,
        }
    }

    pub fn from_wire(wire: &WireValue) -> Result<Self, RegistryError> {
        let value_type = RegistryValueType::from_code(wire.code)?;
        let values = match (&wire.data, value_type.is_string()) {
            (RegistryValueData::Text(text), true) => {
                text.split(SEPARATOR).map(str::to_string).collect()
            }
            (RegistryValueData::DWord(v), false) => vec![v.to_string()],
            (RegistryValueData::QWord(v), false) => vec![v.to_string()],
            (RegistryValueData::Binary(bytes), false)
                if !matches!(wire.code, REG_DWORD | REG_DWORD_BIG_ENDIAN | REG_QWORD) =>
            {
                vec![format_hex_bytes(bytes)]
            }
            _ => {
                return Err(RegistryError::MalformedData {
                    code: wire.code,
                    len: wire.raw_bytes().len(),
                })
            }
        };
        Ok(Self::new(wire.name.clone(), value_type, values))
    }

    pub fn to_wire(&self) -> Result<WireValue, RegistryError> {
        let data = match self.value_type {
            RegistryValueType::String
            | RegistryValueType::ExpandString
            | RegistryValueType::MultiString => {
                RegistryValueData::Text(self.values.join(SEPARATOR.to_string().as_str()))
            }
            RegistryValueType::DWord
            | RegistryValueType::DWordBigEndian
            | RegistryValueType::DWordLittleEndian => {
                let token = self.scalar()?;
                let v = parse_integer(token)
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| self.invalid(token))?;
                RegistryValueData::DWord(v)
            }
            RegistryValueType::QWord | RegistryValueType::QWordLittleEndian => {
                let token = self.scalar()?;
                RegistryValueData::QWord(parse_integer(token).ok_or_else(|| self.invalid(token))?)
            }
            RegistryValueType::Binary | RegistryValueType::Link | RegistryValueType::None => {
                let token = self.scalar()?;
                RegistryValueData::Binary(parse_hex_bytes(token).ok_or_else(|| self.invalid(token))?)
            }
        };
        Ok(WireValue::new(self.name.clone(), data, self.value_type.code()))
    }

    pub fn to_document(&self) -> DocumentEntry {
        DocumentEntry::new(self.name.clone(), self.values.clone(), self.value_type.symbol())
    }

    pub fn from_document(entry: &DocumentEntry) -> Result<Self, RegistryError> {
        let value_type = RegistryValueType::from_symbol(entry.type_name())?;
        Ok(Self::new(entry.name(), value_type, entry.values().to_vec()))
    }

    /// Fold `other` into `self`. When `self` is multi-valued and both sides
    /// are string-typed the entries are unioned in first-seen order;
    /// otherwise `other` overwrites values and type.
    pub fn merge(&mut self, other: &RegistryValue) -> Result<(), RegistryError> {
        if !self.name.eq_ignore_ascii_case(&other.name) {
            return Err(RegistryError::NameMismatch {
                left: self.name.clone(),
                right: other.name.clone(),
            });
        }
        let union = self.multi_valued
            && self.value_type.is_string()
            && other.value_type.is_string();
        if union {
            for v in &other.values {
                if !self.values.contains(v) {
                    self.values.push(v.clone());
                }
            }
            self.multi_valued = true;
        } else {
            self.values = other.values.clone();
            self.multi_valued = other.multi_valued;
        }
        self.value_type = other.value_type;
        Ok(())
    }

    fn scalar(&self) -> Result<&str, RegistryError> {
        match self.values.as_slice() {
            [single] => Ok(single.as_str()),
            values => Err(RegistryError::ScalarArity {
                name: self.name.clone(),
                type_name: self.value_type.symbol(),
                count: values.len(),
            }),
        }
    }

    fn invalid(&self, token: &str) -> RegistryError {
        RegistryError::InvalidScalar {
            name: self.name.clone(),
            type_name: self.value_type.symbol(),
            token: token.to_string(),
        }
    }
}

/// String values with several entries, or named like a search path
/// (`PATH`, `PSModulePath`, `PATHEXT`), merge by union.
pub fn is_multi_valued(name: &str, value_type: RegistryValueType, values: &[String]) -> bool {
    value_type.is_string() && (values.len() > 1 || SEARCH_PATH_NAME.is_match(name))
}

impl fmt::Display for RegistryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?} ({})", self.name, self.values, self.value_type)
    }
}
