pub mod html_report;
pub mod snapshot_file;

pub use html_report::*;
pub use snapshot_file::*;
