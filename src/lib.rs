pub mod audio;
pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod generation;
pub mod logger;
pub mod sources;
pub mod speech;
pub mod studio;

#[cfg(test)]
mod test_support;

pub use audio::{build_wav, PcmFormat, WavFile};
pub use config::AppConfig;
pub use error::AppError;
