//! Messenger bridge library — connects a finite-state-machine conversation engine
//! to the Facebook Messenger Platform webhook and send API.

pub mod channels;
pub mod config;
pub mod emission;
pub mod engine;
pub mod gateway;
pub mod init;
