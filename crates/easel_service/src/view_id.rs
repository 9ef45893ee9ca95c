//! Wire encoding of view handles: `_easelView/0x<hex>`.

use easel_core::ViewId;

use crate::error::ProtocolError;

pub const VIEW_ID_PREFIX: &str = "_easelView/";

pub fn format_view_id(id: ViewId) -> String {
    format!("{VIEW_ID_PREFIX}0x{:x}", id.0)
}

pub fn has_view_id_prefix(raw: &str) -> bool {
    raw.starts_with(VIEW_ID_PREFIX)
}

/// Decode a wire view id.
///
/// After the prefix, an optional `0x` is followed by hex digits; decoding
/// stops at the first non-hex character.
pub fn parse_view_id(raw: &str) -> Result<ViewId, ProtocolError> {
    let bad = || ProtocolError::bad("viewId", raw);

    let rest = raw.strip_prefix(VIEW_ID_PREFIX).ok_or_else(bad)?;
    let digits = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .unwrap_or(rest);
    let end = digits
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(digits.len());

    usize::from_str_radix(&digits[..end], 16)
        .map(ViewId)
        .map_err(|_| bad())
}
