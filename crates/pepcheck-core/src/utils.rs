//! Utility functions for rule implementations.

pub mod allowance;
pub mod stdlib;

#[doc(inline)]
pub use allowance::{check_allow_with_reason, AllowCheck};
#[doc(inline)]
pub use stdlib::is_stdlib;
