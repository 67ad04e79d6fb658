//! WASM bindings for page-audio
//!
//! This module wires the platform-agnostic controller to the browser:
//! `HTMLAudioElement`, `localStorage`, `setTimeout`, and DOM listeners.

#[cfg(feature = "wasm")]
pub mod dom;

#[cfg(feature = "wasm")]
pub mod page;

#[cfg(feature = "wasm")]
pub use dom::{DomButton, DomSidebar, LocalStorageStore, TimeoutScheduler, WebMedia};

#[cfg(feature = "wasm")]
pub use page::mount_page;
