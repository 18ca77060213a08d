//! Wire message types
//!
//! The envelope is a JSON object carrying an `action` key plus the
//! operation's payload fields. Responses are plain JSON objects whose shape
//! depends on the action.

pub mod action;
pub mod reply;
pub mod response;
