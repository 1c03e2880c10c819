//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the collections, validation, fan-out, and
//! persistence so controllers and route handlers stay focused on view
//! state and protocol translation.

pub mod collection;
pub mod feed;
pub mod message;
pub mod persistence;
pub mod room;
pub mod session;
