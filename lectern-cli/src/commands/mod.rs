//! CLI command implementations

mod groups;
mod info;
mod process;

pub use groups::groups;
pub use info::info;
pub use process::process;
