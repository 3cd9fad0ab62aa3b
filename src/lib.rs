//! Dynamic popup forms
//!
//! Parses markdown documents with embedded `:::dc<...>dc:::` form components,
//! tracks answers, conditional visibility and requiredness, validates and
//! submits the result to a [`completion::CompletionHandler`].

pub mod completion;
pub mod config;
pub mod error;
pub mod parser;
pub mod state;
