//! Event handling for the scout-bot.
//!
//! This module provides functionality for handling webhook events:
//! - Background processing of qualifying messages (lookups, analysis, alert)
//! - The cooldown and dedup gate state shared by all handlers

pub mod relay_event;
pub mod state;
