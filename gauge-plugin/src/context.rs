//! Evaluation Context

use crate::PluginRegistry;
use std::sync::Arc;

/// Decimal places used when a result is rendered for display
pub const DEFAULT_PRECISION: usize = 5;

/// Evaluation context passed to plugins
pub struct EvalContext {
    pub precision: usize,
    pub registry: Arc<PluginRegistry>,
}

impl EvalContext {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            registry,
        }
    }
}
