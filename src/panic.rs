//! Utilities for working with panic payloads.

use std::{any::Any, fmt};

/// Wrapper that formats a borrowed panic payload when logged or displayed.
///
/// The payload is downcast to `String` or `&'static str` if possible and falls
/// back to `Debug` formatting otherwise.
///
/// ```
/// use std::any::Any;
///
/// use wirestitch::panic::format_panic;
///
/// let boom: Box<dyn Any + Send> = Box::new("boom");
/// assert_eq!(format_panic(&*boom).to_string(), "boom");
/// let owned: Box<dyn Any + Send> = Box::new(String::from("boom"));
/// assert_eq!(format_panic(&*owned).to_string(), "boom");
/// let number: Box<dyn Any + Send> = Box::new(5_u32);
/// assert!(format_panic(&*number).to_string().contains("Any"));
/// ```
#[derive(Debug)]
#[must_use]
pub struct PanicMessage<'a>(&'a (dyn Any + Send));

impl fmt::Display for PanicMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.0.downcast_ref::<String>() {
            f.write_str(s)
        } else if let Some(s) = self.0.downcast_ref::<&'static str>() {
            f.write_str(s)
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

/// Create a [`PanicMessage`] for the payload returned by `catch_unwind`.
///
/// Pass the payload itself (`&*payload`), not a reference to its `Box`.
pub fn format_panic(panic: &(dyn Any + Send)) -> PanicMessage<'_> { PanicMessage(panic) }
