//! Pure string transforms shared by every stage.
//!
//! - Natural ordering of file and title names
//! - Ordinal padding
//! - Reversible title/extension obfuscation

mod natural;
mod obfuscate;

pub use natural::{natural_cmp, natural_sort};
pub use obfuscate::{pad_ordinal, reverse, reverse_extension, NameCodec, DEFAULT_MARKER};
