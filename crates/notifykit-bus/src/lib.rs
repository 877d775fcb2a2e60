//! # notifykit Bus
//!
//! In-process notification bus. Producers post a message under a name, with
//! an optional subject and payload; every observer whose filter matches is
//! notified.
//!
//! ## Matching
//!
//! | observer name | observer subject | receives                              |
//! |---------------|------------------|---------------------------------------|
//! | set           | set              | that name with that subject           |
//! | set           | any              | that name, any or no subject          |
//! | any           | set              | any name with that subject            |
//! | any           | any              | everything                            |
//!
//! ## Delivery
//!
//! Inline observers run on the posting thread before `post` returns, in
//! registration order. Queued observers run on the bus's own
//! [`DeliveryQueue`], one at a time, in post order.
//!
//! ```
//! use notifykit_bus::{Bus, Payload, Subject};
//!
//! let bus = Bus::new();
//! let token = bus.observe(Some("job.finished"), None, |msg| {
//!     println!("finished: {:?}", msg.get::<u32>());
//! });
//!
//! let report = bus.post("job.finished", Some(Subject::from(7)), Payload::new(42u32));
//! assert_eq!(report.invoked, 1);
//!
//! bus.remove_observer(&token);
//! assert!(bus.is_empty());
//! ```

pub mod builder;
pub mod bus;
pub mod config;
pub mod queue;
mod registry;
pub mod stream;
mod typed;

pub use builder::BusBuilder;
pub use bus::{default_bus, init_default_bus, Bus, PostReport};
pub use config::BusConfig;
pub use queue::DeliveryQueue;
pub use stream::MessageStream;

pub use notifykit_core::{
    BusId, DeliveryFailure, Handler, HandlerError, Message, NotifyError, ObjectKey, Observe,
    ObserveAsync, ObserverToken, Payload, Result, Subject, TypedMessage,
};
