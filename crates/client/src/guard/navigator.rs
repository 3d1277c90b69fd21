//! Navigation targets for guard redirects.

use super::Route;

/// Performs the navigation a guard asks for.
pub trait Navigator {
    fn navigate(&mut self, to: Route);
}

/// In-memory navigation history.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Route>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Most recent destination.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.entries.last().copied()
    }

    #[must_use]
    pub fn entries(&self) -> &[Route] {
        &self.entries
    }
}

impl Navigator for History {
    fn navigate(&mut self, to: Route) {
        tracing::debug!(path = to.path(), "Navigate");
        self.entries.push(to);
    }
}
