//! Utility modules: timeouts and cancellation.

pub mod cancel;
pub mod timeout;
