//! Card artwork resolution with fallbacks.

pub mod resolver;

pub use resolver::{ImagePlan, ImageResolver, ImageTicket, PendingImages};
