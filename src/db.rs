pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod regularization_repo;
pub use regularization_repo::RegularizationRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod staff_repo;
pub use staff_repo::PgStaffDirectory;
