//! Optional page elements the core drives
//!
//! Each element is a capability: the page may or may not provide it, and
//! the core holds it as an `Option<Box<dyn ...>>`.

/// Play/pause button
pub trait PlayButton {
    /// Replace the visible label
    fn set_label(&mut self, label: &str);

    /// Reflect the pressed state for assistive technology (`aria-pressed`)
    fn set_pressed(&mut self, pressed: bool);
}

/// Collapsible sidebar panel
pub trait SidebarPanel {
    /// Flip `class` on the panel, returning whether it is now present
    fn toggle_class(&mut self, class: &str) -> bool;

    /// Whether `class` is present on the panel
    fn has_class(&self, class: &str) -> bool;
}
