pub mod dedup;
pub mod time_extractor;
pub mod trip_pairer;

pub use dedup::*;
pub use time_extractor::*;
pub use trip_pairer::*;
