use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown registry type name: {0}")]
    UnknownType(String),
    #[error("unsupported registry type code: {0}")]
    UnsupportedTypeCode(u32),
    #[error("cannot merge value '{right}' into value '{left}'")]
    NameMismatch { left: String, right: String },
    #[error("cannot merge key '{right}' into key '{left}'")]
    KeyMismatch { left: String, right: String },
    #[error("value '{name}' of type {type_name} needs exactly one entry, found {count}")]
    ScalarArity {
        name: String,
        type_name: &'static str,
        count: usize,
    },
    #[error("value '{name}' of type {type_name} has invalid entry '{token}'")]
    InvalidScalar {
        name: String,
        type_name: &'static str,
        token: String,
    },
    #[error("{len} bytes of data do not fit registry type code {code}")]
    MalformedData { code: u32, len: usize },
    #[error("registry key not found: {0}")]
    KeyNotFound(String),
    #[error("registry value not found: {0}")]
    ValueNotFound(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("registry error on '{key}': {source}")]
    Os {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    /// Classify an OS error raised while working on `key`.
    pub fn from_io(key: impl Into<String>, source: std::io::Error) -> Self {
        let key = key.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => RegistryError::KeyNotFound(key),
            std::io::ErrorKind::PermissionDenied => RegistryError::AccessDenied(key),
            _ => RegistryError::Os { key, source },
        }
    }
}
