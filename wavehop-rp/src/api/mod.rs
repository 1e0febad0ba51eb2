//! HTTP control surface for the Presentation layer
//!
//! REST endpoints for playback control and favorites, plus the SSE event
//! stream every UI client subscribes to.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, AppContext};
