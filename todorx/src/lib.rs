//! Reactive client for a to-do REST backend.
//!
//! Each remote operation runs through a [`Pipeline`] and is observed as a
//! stream of [`Resource`] values: `Loading`, then one `Success` or `Error`.
//! The session credential lives in a [`TokenStore`], and a [`Session`] ties
//! the store, the [`api::ApiClient`] and the pipeline together.

mod error_detail;
mod execution_result;
mod pipeline;
mod resource;
mod session;
mod state_store;
mod stream_ext;
mod token_store;

pub mod api;
pub mod config;

pub use error_detail::*;
pub use execution_result::*;
pub use pipeline::*;
pub use resource::*;
pub use session::*;
pub use state_store::*;
pub use stream_ext::*;
pub use token_store::*;

/// Marker for view states held by a [`StateStore`].
pub trait State: Clone + Send + Sync + 'static {}

#[cfg(test)]
mod unit_tests;
