//! # notifykit
//!
//! An in-process notification bus. Producers post named messages with an
//! optional subject and payload; observers register filters on name and/or
//! subject and are notified either inline or on the bus's serial delivery
//! queue.
//!
//! ## Architecture
//!
//! notifykit is organized as a workspace with multiple crates:
//!
//! 1. **notifykit-core** - Tokens, subjects, messages, handler traits, errors
//! 2. **notifykit-bus** - Registry, matching, delivery queue, streams, config
//! 3. **notifykit** - This facade: re-exports and logging setup
//!
//! ## Example
//!
//! ```
//! use notifykit::{default_bus, Payload, Subject};
//!
//! let bus = default_bus();
//! let token = bus.observe(Some("spindle.changed"), Some(Subject::from(1)), |msg| {
//!     assert_eq!(msg.get::<u32>(), Some(&12000));
//! });
//!
//! bus.post("spindle.changed", Some(Subject::from(1)), Payload::new(12000u32));
//! bus.remove_observer(&token);
//! ```

pub use notifykit_bus::{
    default_bus, init_default_bus, Bus, BusBuilder, BusConfig, DeliveryQueue, MessageStream,
    PostReport,
};

pub use notifykit_core::{
    BusId, DeliveryFailure, Handler, HandlerError, InlineFn, Message, NotifyError, ObjectKey,
    Observe, ObserveAsync, ObserverToken, Payload, QueuedFn, Result, Subject, TypedMessage,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support (default level `info`)
/// - Thread names, so delivery worker output is easy to tell apart
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
