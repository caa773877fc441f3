//! Loop configuration

/// Default name of the thread that runs the loop body
pub const DEFAULT_BODY_THREAD_NAME: &str = "mainloop-body";

/// Settings fixed for the lifetime of one loop run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// Queue capacity. 0 makes every submission a rendezvous with the loop
    /// thread; N > 0 buffers up to N pending tasks.
    pub capacity: usize,

    /// Name given to the thread the loop body runs on
    pub body_thread_name: String,
}

impl LoopConfig {
    /// Unbuffered loop with the default body thread name
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the queue capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the body thread name
    pub fn with_body_thread_name(mut self, name: impl Into<String>) -> Self {
        self.body_thread_name = name.into();
        self
    }

    /// Whether submissions rendezvous with the loop thread
    pub fn is_unbuffered(&self) -> bool {
        self.capacity == 0
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            body_thread_name: DEFAULT_BODY_THREAD_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbuffered() {
        let config = LoopConfig::default();
        assert_eq!(config.capacity, 0);
        assert!(config.is_unbuffered());
        assert_eq!(config.body_thread_name, DEFAULT_BODY_THREAD_NAME);
    }

    #[test]
    fn test_builder() {
        let config = LoopConfig::new()
            .with_capacity(16)
            .with_body_thread_name("ui-main");

        assert_eq!(config.capacity, 16);
        assert!(!config.is_unbuffered());
        assert_eq!(config.body_thread_name, "ui-main");
    }
}
