//! Byte-order mark reconstruction.

use std::borrow::Cow;

use crate::types::{FileBody, VirtualFile};
use crate::{BOM_BYTES, BOM_CHAR};

/// Get the body of a file exactly as it was stored.
///
/// Loaders strip a leading BOM and set the file's `bom` flag; this puts the
/// mark back so processors see the author's original content. Files without
/// the flag are returned borrowed and untouched.
pub fn with_bom(file: &VirtualFile) -> Cow<'_, FileBody> {
    if !file.has_bom() {
        return Cow::Borrowed(file.body());
    }

    match file.body() {
        FileBody::Text(text) => {
            let mut restored = String::with_capacity(BOM_CHAR.len_utf8() + text.len());
            restored.push(BOM_CHAR);
            restored.push_str(text);
            Cow::Owned(FileBody::Text(restored))
        }
        FileBody::Bytes(bytes) => {
            let mut restored = Vec::with_capacity(BOM_BYTES.len() + bytes.len());
            restored.extend_from_slice(&BOM_BYTES);
            restored.extend_from_slice(bytes);
            Cow::Owned(FileBody::Bytes(restored))
        }
    }
}
