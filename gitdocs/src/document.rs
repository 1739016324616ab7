use serde_json::Value;

/// File extension (without the dot) that marks a tree entry as a document.
pub const DOC_EXTENSION: &str = "json";

/// The store key for a document file name, or `None` if the name does not
/// denote a document.
///
/// `"config.json"` → `Some("config")`. Entries without the document
/// extension, and the bare `".json"`, are not documents.
pub fn document_stem(name: &str) -> Option<&str> {
    let stem = name.strip_suffix(".json")?;
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Whether a file name denotes a document.
pub fn is_document_name(name: &str) -> bool {
    document_stem(name).is_some()
}

/// The on-disk file name for a store key.
pub fn file_name(stem: &str) -> String {
    format!("{}.{}", stem, DOC_EXTENSION)
}

/// Parse document file bytes into a value.
pub fn parse(bytes: &[u8]) -> serde_json::Result<Value> {
    serde_json::from_slice(bytes)
}

/// Serialize a value into document file bytes (pretty-printed, newline
/// terminated).
pub fn serialize(doc: &Value) -> serde_json::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(doc)?;
    bytes.push(b'\n');
    Ok(bytes)
}
