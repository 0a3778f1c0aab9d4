//! Intent router: ordered rule table and argument extraction

mod args;
mod rules;

pub use args::{normalize_filename, query_encode};
pub use rules::{route, Command, Routed};
