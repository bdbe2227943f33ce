// src/models/mod.rs

pub mod action;
pub mod previewer;
pub mod workbench;
