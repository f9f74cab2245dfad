//! Conversion and automation state machines.
//!
//! [`conversion`] turns user text into a [`Position`](geoshare_core::Position),
//! asking for permission before it touches the network. [`action`] runs the
//! configured automation on the result.

pub mod action;
pub mod conversion;
pub mod error;
pub mod location;
pub mod network;
pub mod preferences;
pub mod retry;

pub use action::{Action, ActionContext, ActionExecutor, ActionState};
pub use conversion::{ConversionContext, ConversionState, FailureReason, MAX_PAGE_REDIRECTS};
pub use error::NetworkError;
pub use location::{FixedLocation, LocationProvider};
pub use network::{HttpClient, NetworkClient, MAX_BODY_BYTES};
pub use preferences::{MemoryPreferences, Preferences};
pub use retry::RetryPolicy;
