//! Response formatting for the posts REST API.
//!
//! - [`envelope`] - the `{data, message, errors}` wrapper used by every endpoint

pub mod envelope;

pub use envelope::Envelope;
