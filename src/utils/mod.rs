pub mod diagnostics;
pub mod interval;
pub mod mixed;
pub mod source;

pub use diagnostics::{Diagnostic, Reporter};
pub use interval::Interval;
pub use mixed::mixed_error;
