use std::collections::HashSet;

use super::pattern::SensitiveCategory;
use super::MaskingTable;

/// Restore token placeholders in `text` from `table`.
///
/// `allowed` limits restoration to the given categories; `None` treats every
/// category present in the table as allowed. Each eligible token is replaced
/// wherever it literally occurs. Tokens absent from the table, or present
/// but not eligible, stay verbatim -- on any mismatch the output degrades to
/// an opaque token, never to spuriously inserted data. Replacement order is
/// irrelevant: the `[CATEGORY_N]` delimiters make no token a substring of
/// another.
pub fn unmask(
    text: &str,
    table: &MaskingTable,
    allowed: Option<&HashSet<SensitiveCategory>>,
) -> String {
    if table.is_empty() {
        return text.to_string();
    }

    let mut result = text.to_string();
    for (token, entry) in table.iter() {
        if allowed.is_none_or(|set| set.contains(&entry.category)) {
            result = result.replace(token.as_str(), &entry.value);
        }
    }
    result
}
