//! Form rendering module
//!
//! - `field_renderer`: one field to styled lines
//! - `form_body`: prose and fields as a scrollable list

mod field_renderer;
mod form_body;

pub use form_body::draw_form_body;
