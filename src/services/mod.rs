//! Business logic: configuration loading and schedule queries.

pub mod active_hours;
pub mod loader;
pub mod scheduler;

pub use active_hours::{ActiveHoursError, ActiveHoursProbe, OsActiveHours};
pub use loader::{ConfigReader, DiskReader};
pub use scheduler::SchedulerService;
