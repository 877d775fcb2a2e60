//! # notifykit Core
//!
//! Core types, traits, and errors for notifykit.
//! Provides the vocabulary shared by every bus: tokens, subjects, messages,
//! payloads and the observer handler abstraction.

pub mod error;
pub mod handler;
pub mod message;
pub mod subject;
pub mod token;

pub use error::{DeliveryFailure, HandlerError, NotifyError, Result};
pub use handler::{Handler, InlineFn, Observe, ObserveAsync, QueuedFn};
pub use message::{Message, Payload, TypedMessage};
pub use subject::{ObjectKey, Subject};
pub use token::{BusId, ObserverToken};
