use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use super::registry::FanoutRegistry;

/// Holds the registry of the most recent recording session
///
/// New stream connections attach to whatever registry is current. A finished
/// session's registry stays published (its subscribers simply receive
/// nothing) until the next session replaces it, which closes them.
#[derive(Clone, Default)]
pub struct StreamHub {
    current: Arc<RwLock<Option<FanoutRegistry>>>,
}

impl StreamHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `registry` as the one new connections attach to
    pub fn publish(&self, registry: FanoutRegistry) {
        let previous = self.current.write().replace(registry);
        if let Some(previous) = previous {
            info!(
                "Replacing stream registry ({} stale subscribers will be closed)",
                previous.subscriber_count()
            );
        }
    }

    pub fn current(&self) -> Option<FanoutRegistry> {
        self.current.read().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.current
            .read()
            .as_ref()
            .map(FanoutRegistry::subscriber_count)
            .unwrap_or(0)
    }
}
