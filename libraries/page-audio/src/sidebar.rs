//! Mobile sidebar toggle

use crate::{types::SidebarConfig, ui::SidebarPanel};
use tracing::debug;

/// Flips the open class on the sidebar when the nav toggle is clicked
///
/// Holds no state of its own; whether the sidebar is open lives on the
/// panel's class list.
pub struct SidebarToggle {
    panel: Box<dyn SidebarPanel>,
    open_class: String,
}

impl SidebarToggle {
    /// Bind the toggle
    ///
    /// Returns `None` unless both the toggle button and the panel exist.
    pub fn bind(
        toggle_present: bool,
        panel: Option<Box<dyn SidebarPanel>>,
        config: &SidebarConfig,
    ) -> Option<Self> {
        let panel = panel.filter(|_| toggle_present);
        if panel.is_none() {
            debug!("Sidebar toggle or panel missing, toggle not bound");
        }
        panel.map(|panel| Self {
            panel,
            open_class: config.open_class.clone(),
        })
    }

    /// Toggle button click, returns whether the sidebar is now open
    pub fn on_toggle_click(&mut self) -> bool {
        self.panel.toggle_class(&self.open_class)
    }

    /// Whether the sidebar is open
    pub fn is_open(&self) -> bool {
        self.panel.has_class(&self.open_class)
    }
}
