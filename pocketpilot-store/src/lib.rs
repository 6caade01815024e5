//! pocketpilot-store: reference data collaborators (in-memory and JSON file)

pub mod activity;
pub mod json;
pub mod memory;
pub mod state;

pub use activity::{ActivityEntry, ActivityKind};
pub use json::JsonStore;
pub use memory::MemoryStore;
pub use state::StoreState;
