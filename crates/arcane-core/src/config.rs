/// Configuration for an ARcane application.
///
/// Built with [`EngineConfig::default`] and adjusted through the builder
/// methods before being handed to the application.
///
/// ```
/// use arcane_core::config::{EngineConfig, ProfilingMode};
///
/// let config = EngineConfig::default()
///     .with_title("Sandbox")
///     .with_size(1600, 900)
///     .with_profiling(ProfilingMode::WithWebserver);
/// assert_eq!(config.width, 1600);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub vsync: bool,
    /// `tracing` filter directive. `None` uses `RUST_LOG` or the default filter.
    pub log_filter: Option<String>,
    pub profiling: ProfilingMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            title: "ARcane Engine".to_owned(),
            width: 1280,
            height: 720,
            resizable: true,
            vsync: true,
            log_filter: None,
            profiling: ProfilingMode::Off,
        }
    }
}

impl EngineConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    pub fn with_profiling(mut self, profiling: ProfilingMode) -> Self {
        self.profiling = profiling;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingMode {
    /// Profiling scopes are disabled
    Off,
    /// Profiling scopes are recorded but not served
    On,
    /// Profiling scopes are recorded and served to 'puffin_viewer'
    WithWebserver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.title, "ARcane Engine");
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(config.resizable);
        assert!(config.vsync);
        assert!(config.log_filter.is_none());
        assert_eq!(config.profiling, ProfilingMode::Off);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_title("Sandbox")
            .with_resizable(false)
            .with_vsync(false)
            .with_log_filter("info");
        assert_eq!(config.title, "Sandbox");
        assert!(!config.resizable);
        assert!(!config.vsync);
        assert_eq!(config.log_filter.as_deref(), Some("info"));
    }
}
