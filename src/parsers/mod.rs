pub mod html;


pub use html::{extract, extract_at};

use thiserror::Error;

/// Reasons a document + selector pair yields no storable items
///
/// These are input errors the user can correct; the messages are meant
/// to be shown as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
    #[error("No elements found matching the provided selector")]
    NoMatch,
    #[error("Selected elements contain no content")]
    EmptyContent,
}
