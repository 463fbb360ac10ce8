//! Generator configuration.

/// Generator configuration.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Whether deferred values (futures/promises) can be handed out.
    deferred: bool,
}

impl GeneratorConfig {
    /// Create a configuration with deferred values enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { deferred: true }
    }

    /// Enable or disable the deferred-value convention.
    ///
    /// Hosts without a promise primitive turn this off, which makes
    /// [`crate::RandomBytes::generate_deferred`] demand a callback instead.
    #[must_use]
    pub fn with_deferred(mut self, enabled: bool) -> Self {
        self.deferred = enabled;
        self
    }

    /// Whether deferred values are enabled.
    #[must_use]
    pub fn deferred(&self) -> bool {
        self.deferred
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new()
    }
}
