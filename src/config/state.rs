// Application state module
// Shared, read-only request-time state

use super::types::Config;
use crate::fs::FileSystem;
use crate::render::Renderer;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Filtered view of the served root
    pub fs: Box<dyn FileSystem>,
    pub renderer: Renderer,
}

impl AppState {
    pub fn new(config: &Config, fs: Box<dyn FileSystem>, renderer: Renderer) -> Self {
        Self {
            config: config.clone(),
            fs,
            renderer,
        }
    }
}
