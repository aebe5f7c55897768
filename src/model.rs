pub mod route_spec;
pub mod snapshot;
pub mod timetable;

pub use route_spec::*;
pub use snapshot::*;
pub use timetable::*;
