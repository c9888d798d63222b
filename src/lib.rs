//! voicegen: text-to-speech generation behind stable local audio codes.
//!
//! Generated audio is stored on an external file host; clients only ever see
//! `/audio/{code}` URLs served by this process.

pub mod api;
pub mod cache;
pub mod code;
pub mod config;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod prompt;
pub mod proxy;
pub mod tts;
pub mod upload;

pub use cache::{EvictionPolicy, ResourceCache};
pub use config::Config;
pub use error::{AppError, AppResult};
