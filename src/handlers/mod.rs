// src/handlers/mod.rs

pub mod diffs;
pub mod page;
pub mod plugins;
pub mod previewers;
pub mod source;
pub mod workbench;
