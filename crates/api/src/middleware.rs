//! Request extractors shared by the handlers.

pub mod client_key;
