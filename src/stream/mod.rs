//! Live fan-out of the encoded stream
//!
//! - `registry`: subscriber directory with bounded, best-effort queues
//! - `hub`: the registry new connections attach to
//! - `read_loop`: live pipe → broadcast
//! - `delivery`: one subscriber's queue → one network peer

pub mod delivery;
pub mod hub;
pub mod read_loop;
pub mod registry;

pub use delivery::{deliver, DeliveryEnd, PRIMING_HEADER, SERVER_NAME};
pub use hub::StreamHub;
pub use read_loop::{run_read_loop, ReadLoopExit};
pub use registry::{BroadcastReport, FanoutRegistry, StreamTuning, SubscriberId, Subscription};
