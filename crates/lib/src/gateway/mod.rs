//! Gateway: the HTTP side of the bridge.
//!
//! `GET /webhook` answers the Messenger verification handshake; `POST /webhook` receives
//! page events and hands each messaging event to the conversation engine in its own task.

mod dispatch;
mod server;

pub use dispatch::{Dispatcher, StepOutcome};
pub use server::{router, run_gateway, verify_handshake, GatewayState, VerifyQuery};
