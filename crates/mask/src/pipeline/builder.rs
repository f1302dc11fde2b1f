use crate::pipeline::{DispatchOptions, MaskDispatcher};

/// Builder for configuring a [`MaskDispatcher`] with a fluent API
#[derive(Debug, Clone, Default)]
pub struct DispatcherBuilder {
    options: DispatchOptions,
}

impl DispatcherBuilder {
    /// Create a new dispatcher builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep empty input masks as empty output masks instead of skipping them
    pub fn preserve_empty_masks(mut self, preserve: bool) -> Self {
        self.options.preserve_empty_masks = preserve;
        self
    }

    /// Run the parallel phase on a dedicated pool with `threads` workers
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.options.num_threads = Some(threads);
        self
    }

    /// Run the parallel phase on rayon's global pool
    pub fn global_pool(mut self) -> Self {
        self.options.num_threads = None;
        self
    }

    pub fn build(self) -> MaskDispatcher {
        MaskDispatcher::new(self.options)
    }
}
