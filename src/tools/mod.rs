//! Native tools offered to agents.

pub mod current_date;
pub mod web_search;

pub use current_date::CurrentDateTool;
pub use web_search::{WebSearchTool, format_results};
