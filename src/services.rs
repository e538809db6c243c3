pub mod attendance_service;
pub mod auth;
pub mod lateness;
pub mod regularization_service;
pub mod settings_service;
pub mod staff_directory;
pub mod summary_service;
