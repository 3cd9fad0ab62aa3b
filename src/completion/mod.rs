//! Completion handling: where a finished form's answers go

mod sink;
mod traits;

pub use sink::{Completion, CompletionSink};
pub use traits::CompletionHandler;

#[cfg(test)]
pub use traits::MockCompletionHandler;
