// src/services/mod.rs
pub mod attendance_service;
pub mod history_service;
pub mod import_service;
pub mod qr_service;
pub mod roster;
pub mod scan_service;
pub mod store;
pub mod toast_service;
pub mod tracker;
pub mod view_service;
