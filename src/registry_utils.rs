use crate::error::RegistryError;
use crate::registry_value::{
    REG_DWORD, REG_DWORD_BIG_ENDIAN, REG_EXPAND_SZ, REG_MULTI_SZ, REG_QWORD, REG_SZ,
    RegistryValueData, SEPARATOR,
};

pub fn hex_digit_value(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'a'..='f' => Some(c as u8 - b'a' + 10),
        'A'..='F' => Some(c as u8 - b'A' + 10),
        _ => None,
    }
}

/// Render bytes as comma-separated lowercase pairs, `01,ab,ff`.
pub fn format_hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(",")
}

/// Inverse of [`format_hex_bytes`]. Whitespace around pairs is ignored and an
/// empty token is an empty byte string.
pub fn parse_hex_bytes(token: &str) -> Option<Vec<u8>> {
    let mut bytes = Vec::new();
    for part in token.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut chars = part.chars();
        let (hi, lo) = match (chars.next(), chars.next(), chars.next()) {
            (Some(hi), Some(lo), None) => (hi, lo),
            _ => return None,
        };
        bytes.push(hex_digit_value(hi)? << 4 | hex_digit_value(lo)?);
    }
    Some(bytes)
}

/// Parse a DWORD/QWORD token: decimal, or hex with a `0x` prefix.
pub fn parse_integer(token: &str) -> Option<u64> {
    let token = token.trim();
    match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => token.parse::<u64>().ok(),
    }
}

pub fn encode_utf16(s: &str) -> Vec<u8> {
    let mut bytes = s.encode_utf16().flat_map(|c| c.to_le_bytes()).collect::<Vec<_>>();
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

pub fn encode_multi_sz(parts: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for part in parts {
        bytes.extend(part.encode_utf16().flat_map(|c| c.to_le_bytes()));
        bytes.extend_from_slice(&[0, 0]);
    }
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Decode a NUL-terminated UTF-16LE string. Missing terminators are tolerated.
pub fn decode_utf16(bytes: &[u8]) -> String {
    let units = utf16_units(bytes);
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

pub fn decode_multi_sz(bytes: &[u8]) -> Vec<String> {
    utf16_units(bytes)
        .split(|&u| u == 0)
        .filter(|part| !part.is_empty())
        .map(String::from_utf16_lossy)
        .collect()
}

/// Decode raw registry bytes of type `code` into a wire scalar.
pub fn decode_wire(bytes: &[u8], code: u32) -> Result<RegistryValueData, RegistryError> {
    let malformed = || RegistryError::MalformedData {
        code,
        len: bytes.len(),
    };
    let data = match code {
        REG_SZ | REG_EXPAND_SZ => RegistryValueData::Text(decode_utf16(bytes)),
        REG_MULTI_SZ => RegistryValueData::Text(decode_multi_sz(bytes).join(SEPARATOR.to_string().as_str())),
        REG_DWORD => {
            let arr: [u8; 4] = bytes.try_into().map_err(|_| malformed())?;
            RegistryValueData::DWord(u32::from_le_bytes(arr))
        }
        REG_DWORD_BIG_ENDIAN => {
            let arr: [u8; 4] = bytes.try_into().map_err(|_| malformed())?;
            RegistryValueData::DWord(u32::from_be_bytes(arr))
        }
        REG_QWORD => {
            let arr: [u8; 8] = bytes.try_into().map_err(|_| malformed())?;
            RegistryValueData::QWord(u64::from_le_bytes(arr))
        }
        _ => RegistryValueData::Binary(bytes.to_vec()),
    };
    Ok(data)
}

/// Encode a wire scalar as the raw bytes the registry stores for `code`.
pub fn encode_wire(data: &RegistryValueData, code: u32) -> Vec<u8> {
    match data {
        RegistryValueData::Text(text) if code == REG_MULTI_SZ => {
            let parts = text.split(SEPARATOR).collect::<Vec<_>>();
            encode_multi_sz(&parts)
        }
        RegistryValueData::Text(text) => encode_utf16(text),
        RegistryValueData::DWord(v) if code == REG_DWORD_BIG_ENDIAN => v.to_be_bytes().to_vec(),
        RegistryValueData::DWord(v) => v.to_le_bytes().to_vec(),
        RegistryValueData::QWord(v) => v.to_le_bytes().to_vec(),
        RegistryValueData::Binary(v) => v.clone(),
    }
}
