pub mod attendance;
pub mod auth;
pub mod regularization;
pub mod settings;
pub mod staff;
pub mod summary;
