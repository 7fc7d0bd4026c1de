//! Text → seed fingerprint.
//!
//! The seed is a 31-multiplier rolling hash over the UTF-16 code units of the
//! input, wrapped to 32 bits. It depends on nothing but the text, so the same
//! mood phrase always produces the same melody.

/// Derive the 32-bit seed for `text`. Total over all strings; `""` yields `0`.
pub fn derive_seed(text: &str) -> u32 {
    text.encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)))
}
