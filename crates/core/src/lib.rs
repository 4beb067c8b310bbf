pub mod catalog;
pub mod config;
pub mod converter;
pub mod files;
pub mod naming;
pub mod obfuscator;
pub mod processor;
pub mod scheduler;
pub mod testing;

pub use catalog::{build_catalog, CatalogEntry, CatalogError, TitleMetadata};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use converter::{CwebpTranscoder, Transcoder, Upscaler, Waifu2xUpscaler};
pub use naming::NameCodec;
pub use obfuscator::{ObfuscateError, ObfuscationKey, Obfuscator};
pub use processor::{PipelineProcessor, RunReport, TitleOutcome, TitleStatus};
pub use scheduler::{schedule, BatchError, TaskScheduler};
