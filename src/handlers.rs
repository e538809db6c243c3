pub mod attendance;
pub mod regularization;
pub mod settings;
