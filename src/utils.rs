/// Shared utility functions for the iButton report builder
///
/// Decode the raw bytes of a data-logger export into text
///
/// Exports written by the 1-Wire viewer are Latin-1 encoded, so the degree sign
/// arrives as the single byte `0xB0`. Files re-saved by other tools are usually
/// UTF-8. Valid UTF-8 is kept as is; anything else is decoded byte-for-byte as
/// Latin-1, which cannot fail.
///
/// # Examples
///
/// ```
/// use ibutton_report::utils::decode_text;
///
/// assert_eq!(decode_text(b"40.0\xB0C".to_vec()), "40.0°C");
/// assert_eq!(decode_text("40.0°C".as_bytes().to_vec()), "40.0°C");
/// ```
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        // Latin-1 code points map one-to-one onto the first 256 chars
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Derive the subject key from a file name: the name without its extension
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ibutton_report::utils::subject_key;
///
/// assert_eq!(subject_key(Path::new("data/mouse_01.csv")).unwrap(), "mouse_01");
/// assert_eq!(subject_key(Path::new("cage.B.CSV")).unwrap(), "cage.B");
/// ```
pub fn subject_key(path: &std::path::Path) -> Result<String, &'static str> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or("File name has no stem")
}
