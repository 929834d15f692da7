//! Composition of the landscape: sky, stars, mountains and lightning.

pub mod animation;
pub mod bolt;
pub mod filter;
pub mod flash;
pub mod landscape;
pub mod mountains;
pub mod sky;

pub use animation::{Animation, AnimationStatus, FrameDriver};
pub use bolt::{Bolt, BoltAnimation, BoltColors, BoltStrike, BoltTree, BranchParams, BranchSegment};
pub use flash::SkyFlash;
pub use landscape::Landscape;
