//! Discord event handlers
//!
//! Non-command traffic: every message the bot can see is offered to the forward dispatcher.

/// Gateway event handling (message forwarding)
pub mod events;
