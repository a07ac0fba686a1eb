// src/models/mod.rs
pub mod attendance;
pub mod navigation;
pub mod student;
