//! Navigation Seam
//!
//! The API client forces a return to the login view when a request comes
//! back 401. Presentation layers provide a `Navigator` to make that happen.

use std::sync::RwLock;

/// Route of the login view.
pub const LOGIN_ROUTE: &str = "/login";

/// Current-route access for the hosting view layer.
pub trait Navigator: Send + Sync {
    /// The route currently displayed.
    fn current_route(&self) -> String;

    /// Replace the current route without pushing history.
    fn replace(&self, route: &str);

    fn is_at_login(&self) -> bool {
        self.current_route() == LOGIN_ROUTE
    }
}

/// In-memory navigator that records every replacement.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: RwLock<NavState>,
}

#[derive(Debug)]
struct NavState {
    current: String,
    replacements: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(NavState {
                current: start.into(),
                replacements: Vec::new(),
            }),
        }
    }

    /// Routes passed to `replace`, oldest first.
    pub fn replacements(&self) -> Vec<String> {
        self.state
            .read()
            .map(|s| s.replacements.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_route(&self) -> String {
        self.state
            .read()
            .map(|s| s.current.clone())
            .unwrap_or_default()
    }

    fn replace(&self, route: &str) {
        if let Ok(mut state) = self.state.write() {
            state.current = route.to_string();
            state.replacements.push(route.to_string());
        }
    }
}
