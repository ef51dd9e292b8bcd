mod cli;
mod error;
mod registry_editor;
mod registry_hive;
mod registry_key;
mod registry_parser;
mod registry_utils;
mod registry_value;
mod registry_writer;
#[cfg(windows)]
mod windows_hive;

pub use cli::Cli;
pub use error::RegistryError;
pub use registry_editor::{Command, EditorError, EditorOptions, Outcome, RegistryEditor};
pub use registry_hive::{KeyHandle, KeyLocation, MemoryHive, RegistryHive, RegistryRoot, ValueIter, empty_key};
pub use registry_key::RegistryItem;
pub use registry_parser::{DocumentError, DocumentParser};
pub use registry_utils::*;
pub use registry_value::{
    DocumentEntry, REG_BINARY, REG_DWORD, REG_DWORD_BIG_ENDIAN, REG_EXPAND_SZ, REG_LINK, REG_MULTI_SZ,
    REG_NONE, REG_QWORD, REG_SZ, RegistryValue, RegistryValueData, RegistryValueType, SEPARATOR, WireValue,
    is_multi_valued,
};
pub use registry_writer::DocumentWriter;
#[cfg(windows)]
pub use windows_hive::WindowsHive;
