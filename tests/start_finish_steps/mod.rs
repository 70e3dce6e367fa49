//! Step definitions for the start/finish lifecycle scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
