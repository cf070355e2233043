//! Reactive layer — live ordered queries over a `ContactBackend`.
//!
//! # Overview
//!
//! [`ReactiveStore`] wraps a backend and implements
//! [`ContactStore`](crate::storage::traits::ContactStore). Every committed
//! write emits a [`ChangeEvent`] and re-runs all open [`LiveQuery`]s.
//!
//! # Modules
//!
//! - [`event`] — [`ChangeEvent`] enum.
//! - [`event_emitter`] — Generic typed pub/sub ([`EventEmitter<T>`]).
//! - [`live_query`] — [`LiveQuery`] subscription handle.
//! - [`store`] — [`ReactiveStore<B>`].

pub mod event;
pub mod event_emitter;
pub mod live_query;
pub mod store;

pub use event::ChangeEvent;
pub use event_emitter::{EventEmitter, ListenerId};
pub use live_query::{LiveQuery, QueryEmission, Unsubscribe};
pub use store::ReactiveStore;
