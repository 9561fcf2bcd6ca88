//! A retro desktop simulator for the terminal: draggable windows, a
//! taskbar, desktop icons and a handful of small applets.

pub mod applets;
pub mod clipboard;
pub mod component_context;
pub mod components;
pub mod config;
pub mod constants;
pub mod desktop;
pub mod drivers;
pub mod effects;
pub mod error;
pub mod event_loop;
pub mod icons;
pub mod layout;
pub mod runner;
pub mod store;
pub mod taskbar;
pub mod term_color;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod utils;
pub mod window;

pub use config::DesktopConfig;
pub use desktop::Desktop;
