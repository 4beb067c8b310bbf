//! Reversible, non-cryptographic name scrambling.
//!
//! Title directories are renamed to `<marker><reversed name>` and file
//! extensions are reversed (`png` becomes `gnp`). Both transforms are plain
//! string bijections: they only keep original names out of casual directory
//! listings and offer no secrecy at all.

/// Marker prefixed to obfuscated title names.
pub const DEFAULT_MARKER: &str = "Rev ";

/// Reverses a string by Unicode scalar values.
pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

/// Reverses a file extension (`webp` -> `pbew`).
pub fn reverse_extension(extension: &str) -> String {
    reverse(extension)
}

/// Zero-pads a page ordinal to `width` digits. Wider ordinals are kept whole.
pub fn pad_ordinal(ordinal: usize, width: usize) -> String {
    format!("{:0width$}", ordinal, width = width)
}

/// Obfuscates and recovers title names using a marker prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCodec {
    marker: String,
}

impl Default for NameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl NameCodec {
    /// Creates a codec with the given marker prefix.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Returns the marker prefix.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether a name already carries the marker.
    pub fn is_obfuscated(&self, name: &str) -> bool {
        name.starts_with(&self.marker)
    }

    /// Obfuscates a title name. Already-marked names are returned unchanged.
    ///
    /// Surrounding whitespace is trimmed before reversal, so the round trip
    /// through [`NameCodec::deobfuscate`] is exact for trimmed names.
    pub fn obfuscate(&self, name: &str) -> String {
        if self.is_obfuscated(name) {
            return name.to_string();
        }
        format!("{}{}", self.marker, reverse(name.trim()))
    }

    /// Recovers the original title name. Unmarked names pass through.
    pub fn deobfuscate(&self, name: &str) -> String {
        match name.strip_prefix(&self.marker) {
            Some(rest) => reverse(rest),
            None => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let codec = NameCodec::default();
        for title in ["My Title", "[Circle] Book 12 (Eng)", "単行本 第1巻", "a"] {
            let obfuscated = codec.obfuscate(title);
            assert!(obfuscated.starts_with("Rev "));
            assert_ne!(obfuscated, title);
            assert_eq!(codec.deobfuscate(&obfuscated), title);
        }
    }

    #[test]
    fn test_obfuscate_reverses_after_trim() {
        let codec = NameCodec::default();
        assert_eq!(codec.obfuscate("  Hello World "), "Rev dlroW olleH");
    }

    #[test]
    fn test_obfuscate_is_idempotent() {
        let codec = NameCodec::default();
        let once = codec.obfuscate("Title");
        assert_eq!(codec.obfuscate(&once), once);
    }

    #[test]
    fn test_deobfuscate_passes_through_plain_names() {
        let codec = NameCodec::default();
        assert_eq!(codec.deobfuscate("Plain Title"), "Plain Title");
    }

    #[test]
    fn test_custom_marker() {
        let codec = NameCodec::new("~");
        assert_eq!(codec.obfuscate("abc"), "~cba");
        assert_eq!(codec.deobfuscate("~cba"), "abc");
        assert!(!codec.is_obfuscated("Rev cba"));
    }

    #[test]
    fn test_reverse_extension() {
        assert_eq!(reverse_extension("png"), "gnp");
        assert_eq!(reverse_extension("jpeg"), "gepj");
        assert_eq!(reverse_extension("webp"), "pbew");
    }

    #[test]
    fn test_pad_ordinal() {
        assert_eq!(pad_ordinal(1, 3), "001");
        assert_eq!(pad_ordinal(42, 3), "042");
        assert_eq!(pad_ordinal(1234, 3), "1234");
    }
}
