//! CLI command implementations.

pub mod retailers;
pub mod search;

pub use retailers::list_retailers;
pub use search::SearchCommand;
