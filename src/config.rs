//! Configuration for repositories and sink-backed publishers.

/// Default buffer size for channel-backed publishers.
pub const DEFAULT_BUFFER_SIZE: usize = 100;

/// Base trait for configuration types.
///
/// # Example
///
/// ```rust
/// use reactive_people::Config;
///
/// #[derive(Debug, Clone)]
/// struct AuditConfig {
///     buffer: usize,
/// }
///
/// impl Config for AuditConfig {
///     fn name(&self) -> &str {
///         "audit"
///     }
///
///     fn buffer_size(&self) -> usize {
///         self.buffer
///     }
/// }
///
/// assert_eq!(AuditConfig { buffer: 8 }.buffer_size(), 8);
/// ```
pub trait Config: Send + Sync {
    /// Returns the configuration name, also used as the log category.
    fn name(&self) -> &str {
        "default"
    }

    /// Returns whether every signal should be logged.
    fn is_verbose(&self) -> bool {
        false
    }

    /// Returns the channel capacity for sink-backed publishers.
    fn buffer_size(&self) -> usize {
        DEFAULT_BUFFER_SIZE
    }

    /// Validates the configuration.
    ///
    /// Returns Ok(()) if valid, or an error message describing the issue.
    fn validate(&self) -> Result<(), String> {
        if self.buffer_size() == 0 {
            return Err("buffer_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Configuration for [`InMemoryPersonRepository`](crate::InMemoryPersonRepository).
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Configuration name
    pub name: String,
    /// Capacity of sink channels
    pub buffer_size: usize,
    /// Log every signal emitted by the repository
    pub verbose: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            name: "person".to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            verbose: false,
        }
    }
}

impl RepositoryConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the sink channel capacity.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Enable signal logging.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl Config for RepositoryConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.buffer_size == 0 {
            return Err("buffer_size must be greater than 0".to_string());
        }
        Ok(())
    }
}
