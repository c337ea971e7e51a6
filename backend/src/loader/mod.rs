//! Dataset loading with encoding auto-detection.
//!
//! Turns a file or byte buffer into the UTF-8, `\n`-delimited text the
//! engine expects. Nothing here looks at columns or rows.

use std::path::Path;

use crate::error::{LoadError, LoadResult};

/// Decoded dataset text plus what was detected along the way.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// UTF-8 text with `\n` line endings
    pub text: String,
    /// Detected source encoding
    pub encoding: String,
    /// Size of the raw input
    pub byte_len: usize,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => {
            let bytes = strip_bom(bytes);
            match std::str::from_utf8(bytes) {
                Ok(s) => s.to_string(),
                Err(_) => String::from_utf8_lossy(bytes).into_owned(),
            }
        }
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Convert CRLF and lone CR line endings to LF.
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decode a byte buffer into dataset text.
///
/// Valid UTF-8 is taken as is; anything else goes through detection.
pub fn load_bytes(bytes: &[u8]) -> LoadResult<LoadedDataset> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let (encoding, decoded) = match std::str::from_utf8(strip_bom(bytes)) {
        Ok(s) => ("utf-8".to_string(), s.to_string()),
        Err(_) => {
            // a UTF-8 BOM settles the encoding even if the content is damaged
            let encoding = if bytes.starts_with(UTF8_BOM) {
                "utf-8".to_string()
            } else {
                detect_encoding(bytes)
            };
            let decoded = decode_content(bytes, &encoding);
            (encoding, decoded)
        }
    };
    let text = normalize_newlines(&decoded);
    if text.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    Ok(LoadedDataset {
        text,
        encoding,
        byte_len: bytes.len(),
    })
}

/// Like [`load_bytes`], rejecting buffers over `limit` bytes.
pub fn load_bytes_limited(bytes: &[u8], limit: usize) -> LoadResult<LoadedDataset> {
    if bytes.len() > limit {
        return Err(LoadError::TooLarge {
            size: bytes.len(),
            limit,
        });
    }
    load_bytes(bytes)
}

/// Read and decode a dataset file.
///
/// # Example
/// ```ignore
/// let dataset = load_file("/path/to/export.csv")?;
/// println!("Encoding: {}, {} bytes", dataset.encoding, dataset.byte_len);
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> LoadResult<LoadedDataset> {
    let bytes = std::fs::read(path.as_ref())?;
    load_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_utf8_passthrough() {
        let loaded = load_bytes("id,name\n1,Zoë".as_bytes()).unwrap();
        assert_eq!(loaded.text, "id,name\n1,Zoë");
        assert_eq!(loaded.encoding, "utf-8");
    }

    #[test]
    fn test_crlf_converted() {
        let loaded = load_bytes(b"id,name\r\n1,a\r\n2,b\r3,c").unwrap();
        assert_eq!(loaded.text, "id,name\n1,a\n2,b\n3,c");
    }

    #[test]
    fn test_bom_stripped() {
        let loaded = load_bytes(b"\xEF\xBB\xBFid,name\n1,a").unwrap();
        assert!(loaded.text.starts_with("id,name"));
    }

    #[test]
    fn test_bom_stripped_from_invalid_utf8() {
        let bytes = b"\xEF\xBB\xBFid,name\n1,caf\xFF";
        assert_eq!(decode_content(bytes, "utf-8"), "id,name\n1,caf\u{FFFD}");

        let loaded = load_bytes(bytes).unwrap();
        assert_eq!(loaded.encoding, "utf-8");
        assert!(loaded.text.starts_with("id,name\n"));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(load_bytes(b""), Err(LoadError::EmptyFile)));
    }

    #[test]
    fn test_size_limit() {
        let err = load_bytes_limited(b"a,b\n1,2", 3).unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { size: 7, limit: 3 }));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "id,name\r\n1,Alice\r\n").unwrap();

        let loaded = load_file(file.path()).unwrap();
        assert_eq!(loaded.text, "id,name\n1,Alice\n");
        assert_eq!(loaded.byte_len, 18);
    }

    #[test]
    fn test_missing_file() {
        let err = load_file("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
