//! Keyword intent matching for the front-office assistant chat.
//!
//! Every chat surface in the dashboard (reception, inventory, agenda) routes
//! operator input through the same [`IntentEngine`], so identical phrases
//! always produce identical replies.

pub mod rules;
pub mod engine;

pub use engine::*;
pub use rules::*;
