//! Clip loading, kit files and configuration for drumkeys

mod config;
mod kit;
mod loader;

pub use config::Config;
pub use kit::{Kit, KitEntry, KitFileError};
pub use loader::{to_stereo, ClipLoader, LoadError, LoadedClip};
