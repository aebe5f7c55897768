pub mod render_acquirer;
pub mod reporter;
pub mod route_scraper;
pub mod run_orchestrator;

#[cfg(test)]
mod test_support;

pub use render_acquirer::*;
pub use reporter::*;
pub use route_scraper::*;
pub use run_orchestrator::*;
