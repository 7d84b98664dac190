// Text override layer: per-version replacement text that shadows master
// values, plus the push-to-master write path.

pub mod layer;
pub mod master;
pub mod target;

pub use layer::{effective_text, TextOverride, TextOverrides};
pub use master::{master_text, write_master};
pub use target::{OverrideIndices, OverrideTarget};
