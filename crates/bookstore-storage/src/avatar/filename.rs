//! Stored filename derivation.

use bookstore_core::types::UserId;

/// Name the stored avatar `<user-id><ext>`, where `ext` is the final
/// extension of `original` including its leading dot, or nothing when the
/// original has none.
///
/// Only the last path component of `original` is considered, with either
/// slash or backslash as separator, so client-supplied directories never
/// reach the stored name. A leading dot (`.profile`) does not start an
/// extension, and neither does a trailing one (`photo.`).
pub fn derive_filename(user_id: &UserId, original: &str) -> String {
    format!("{}{}", user_id, final_extension(original))
}

fn final_extension(original: &str) -> &str {
    let name = original.rsplit(['/', '\\']).next().unwrap_or(original);
    match name.rfind('.') {
        Some(0) | None => "",
        Some(pos) if pos + 1 == name.len() => "",
        Some(pos) => &name[pos..],
    }
}
