//! Pose Tracking Boundary
//!
//! Types shared with the external pose tracker. The engine never talks to a
//! camera; it only consumes frames published here.

pub mod frame;
pub mod feed;

pub use frame::{PoseFrame, TrackingStatus};
pub use feed::{PoseFeed, PoseSubscriber};
