use crate::error::IngestError;
use crate::models::RetrievalOptions;

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `text` into fixed-size windows of `chunk_size` characters where
/// consecutive windows share `overlap` characters. The final window may be
/// shorter; together the windows cover every character of the input.
///
/// Windows are cut on `char` boundaries, so multi-byte text never splits
/// inside a code point. The window always advances by
/// `chunk_size - overlap`, so the tail of the input can yield a short
/// window that sits entirely inside the previous window's overlap.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, IngestError> {
    let options = RetrievalOptions {
        chunk_size,
        overlap,
        ..RetrievalOptions::default()
    };
    options.validate()?;

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let stride = chunk_size - overlap;
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += stride;
    }

    Ok(chunks)
}
