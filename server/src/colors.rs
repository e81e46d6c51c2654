// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::error::{StoreError, StoreResult};

/// Color given to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#5B4FE5";

/// Resolves the color for a new or updated category.
///
/// `None` (or a blank string) falls back to [`DEFAULT_CATEGORY_COLOR`].
/// Anything else must be a `#RGB` or `#RRGGBB` hex color; it is returned
/// upper-cased so colors compare by value.
pub fn resolve_color(color: Option<&str>) -> StoreResult<String> {
    match color.map(str::trim) {
        None | Some("") => Ok(DEFAULT_CATEGORY_COLOR.to_string()),
        Some(raw) => normalize_hex(raw),
    }
}

/// Validates a hex color string, returning it trimmed and upper-cased.
pub fn normalize_hex(raw: &str) -> StoreResult<String> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix('#')
        .ok_or_else(|| StoreError::validation(format!("Color must start with '#': {raw}")))?;

    if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StoreError::validation(format!(
            "Color must be #RGB or #RRGGBB: {raw}"
        )));
    }

    Ok(format!("#{}", digits.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_color_uses_default() {
        assert_eq!(resolve_color(None).unwrap(), DEFAULT_CATEGORY_COLOR);
        assert_eq!(resolve_color(Some("  ")).unwrap(), DEFAULT_CATEGORY_COLOR);
    }

    #[test]
    fn test_hex_colors_are_normalized() {
        assert_eq!(resolve_color(Some("#10b981")).unwrap(), "#10B981");
        assert_eq!(resolve_color(Some(" #abc ")).unwrap(), "#ABC");
        assert_eq!(normalize_hex(" #abc ").unwrap(), "#ABC");
    }

    #[test]
    fn test_invalid_colors_are_rejected() {
        for bad in ["10b981", "#12", "#12345", "#zzzzzz", "red"] {
            let err = resolve_color(Some(bad)).unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)), "{bad} accepted");
        }
    }
}
