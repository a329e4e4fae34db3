use material_colors::color::Argb;

use crate::ColorError;

/// Trim surrounding whitespace and add a leading `#` if it is missing.
pub fn ensure_hash_prefix(hex: &str) -> String {
    let trimmed = hex.trim();
    if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{}", trimmed)
    }
}

/// Parse `RRGGBB` or `AARRGGBB`, with or without `#`, into an opaque color.
///
/// The alpha byte of an eight-digit value is discarded.
pub fn parse_seed(input: &str) -> Result<Argb, ColorError> {
    let invalid = || ColorError::InvalidSeed(input.to_string());

    let normalized = ensure_hash_prefix(input);
    let digits = &normalized[1..];
    if !(digits.len() == 6 || digits.len() == 8) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let rgb = &digits[digits.len() - 6..];
    let value = u32::from_str_radix(rgb, 16).map_err(|_| invalid())?;

    Ok(Argb::new(
        0xFF,
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    ))
}

pub fn hex_lower(color: Argb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

pub fn hex_upper(color: Argb) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}
