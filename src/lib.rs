pub mod core;

pub use crate::core::aliases::expand_macro;
pub use crate::core::field::FieldKind;
pub use crate::core::schedule::{Schedule, ScheduleError};
