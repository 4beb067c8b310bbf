//! At-rest obfuscation of processed titles.
//!
//! For every title this module:
//! - encrypts pages to `<NNN>.<reversed ext>` and thumbnails to
//!   `thumbnail_<i>-<w>-<h>.<reversed ext>` with AES-256-CBC
//! - renames the directory to `<marker><reversed name>`
//! - writes the `index.json` metadata record
//!
//! The plaintext files stay next to their encrypted counterparts; the
//! publishing step only reads the encrypted ones.
//!
//! # Example
//!
//! ```ignore
//! use tankobon_core::obfuscator::{ObfuscationConfig, Obfuscator};
//!
//! let obfuscator = Obfuscator::from_config(&ObfuscationConfig::new(key_hex, iv_hex))?;
//! let report = obfuscator.run(Path::new("content")).await?;
//! ```

mod cipher;
mod config;
mod error;
mod stage;

pub use cipher::ObfuscationKey;
pub use config::ObfuscationConfig;
pub use error::ObfuscateError;
pub use stage::{ObfuscationOutcome, Obfuscator, TRACKED_EXTENSIONS};
