//! Domain model: windows, their concrete schedules, and the label map.

pub mod map;
pub mod schedule;
pub mod window;

pub use map::WindowMap;
pub use schedule::{Schedule, State};
pub use window::{Format, Window, WindowDoc, WindowsDoc};
