//! Small conversions shared by the Diesel adapters.

use pagination::PageRequest;

/// `LIMIT` and `OFFSET` values for a page request.
pub fn page_window(request: PageRequest) -> (i64, i64) {
    let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
    (i64::from(request.limit()), offset)
}

/// Convert a `COUNT(*)` result into a page total.
pub fn count_to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

/// Escape `LIKE` metacharacters so user input only matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Narrow a stored integer to the domain's `u16` range.
pub fn narrow_u16(value: i32, column: &str) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("{column} out of range: {value}"))
}
