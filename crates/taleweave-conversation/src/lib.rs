//! Taleweave: Conversation bounded context.
//!
//! Responsible for episode sessions: a player chatting with a character
//! through the beats of an episode template, making choices, and reaching
//! the end of the episode. Sessions are event-sourced.

pub mod application;
pub mod domain;
