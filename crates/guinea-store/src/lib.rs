//! Durable thread-to-origin mapping storage for the Guinea bot.
//!
//! The mapping file is a flat JSON object keyed by stringified thread ids.
//! It is read once at startup and rewritten in full after every insertion.

pub mod atomic_io;
pub mod thread_map_store;

pub use atomic_io::write_text_atomic;
pub use thread_map_store::{read_thread_map, write_thread_map, ThreadMap, ThreadMapStore};
