//! # Event subscribers.
//!
//! Subscribers are the logging capability of the manager: they are passed in
//! explicitly at build time and receive every runtime [`Event`](crate::Event).
//!
//! ```text
//! Manager ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                                   │
//!                                                     ┌─────────────┼──────────┐
//!                                                     ▼             ▼          ▼
//!                                                 LogWriter      Metrics    Custom
//! ```

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
