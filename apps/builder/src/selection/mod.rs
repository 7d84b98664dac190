// Selection state engine: per-version on/off flags over the master content
// tree, hierarchical toggles, and derived tri-state checkboxes.

pub mod check_state;
pub mod state;
pub mod toggle;

pub use check_state::CheckStates;
pub use state::{SectionId, SelectionState};
pub use toggle::ToggleCommand;
