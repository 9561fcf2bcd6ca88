//! Full-screen cosmetic sequences that temporarily take over the desktop.

pub mod boot;
pub mod y2k;

pub use boot::{BootPhase, BootScreen};
pub use y2k::{Y2kSequence, Y2kStage};
