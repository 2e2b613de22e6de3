// UI module
// Layout, pages and reusable components

pub mod components;
pub mod layout;
pub mod pages;

pub use layout::render_app_layout;
