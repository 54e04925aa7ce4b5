//! Terminal rendering.
//!
//! Each view gets its own submodule with a `render` function; `common`
//! holds the chrome shared by all of them (header, tabs, status bar, help).

pub mod analytics;
pub mod common;
pub mod detail;
pub mod instances;
pub mod map;
pub mod theme;
pub mod transfers;
pub mod workflows;

pub use theme::Theme;
