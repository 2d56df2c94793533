//! Request Queue Module
//!
//! Serializes lookups from any number of producers into one paced stream of
//! pipeline runs, delivered back in submission order.

mod request_queue;
mod ticket;

pub use request_queue::{Callback, QueueState, RequestQueue};
pub use ticket::Ticket;
