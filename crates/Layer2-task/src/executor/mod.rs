//! Worker launchers
//!
//! - `DetachedLauncher` - spawns an unsupervised host process
//! - `Launcher` - trait for alternative backends and test doubles

pub mod local;
pub mod r#trait;

pub use local::{DetachedLauncher, DetachedLauncherConfig};
pub use r#trait::{LaunchSpec, Launcher};
