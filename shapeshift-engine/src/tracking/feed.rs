//! Pose Feed
//!
//! Latest-value channel between the tracker and the game loop. Readers only
//! ever see the most recent frame; a frame that is superseded before it is
//! read is dropped, never queued.

use tokio::sync::watch;
use tracing::{debug, info};

use crate::core::point::Landmark;
use crate::tracking::frame::{PoseFrame, TrackingStatus};

/// Tracker-side handle: publishes frames and status changes.
#[derive(Debug)]
pub struct PoseFeed {
    frame_tx: watch::Sender<Option<PoseFrame>>,
    status_tx: watch::Sender<TrackingStatus>,
    last_timestamp_ms: Option<u64>,
}

/// Game-side handle: reads the latest frame and status.
#[derive(Clone, Debug)]
pub struct PoseSubscriber {
    frame_rx: watch::Receiver<Option<PoseFrame>>,
    status_rx: watch::Receiver<TrackingStatus>,
}

impl PoseFeed {
    /// Create a connected feed/subscriber pair in the `idle` state.
    pub fn channel() -> (PoseFeed, PoseSubscriber) {
        let (frame_tx, frame_rx) = watch::channel(None);
        let (status_tx, status_rx) = watch::channel(TrackingStatus::Idle);
        (
            PoseFeed {
                frame_tx,
                status_tx,
                last_timestamp_ms: None,
            },
            PoseSubscriber { frame_rx, status_rx },
        )
    }

    /// Report a tracker status change.
    pub fn set_status(&self, status: TrackingStatus) {
        let changed = self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
        if changed {
            info!(%status, "tracker status changed");
        }
    }

    /// Current tracker status.
    pub fn status(&self) -> TrackingStatus {
        *self.status_tx.borrow()
    }

    /// Publish a tracker result, replacing whatever frame was there.
    ///
    /// The frame rate is derived from the gap to the previous timestamp;
    /// the first frame, or a non-increasing timestamp, reports 0.
    pub fn publish(&mut self, landmarks: Vec<Landmark>, timestamp_ms: u64) -> f64 {
        let fps = match self.last_timestamp_ms {
            Some(prev) if timestamp_ms > prev => 1000.0 / (timestamp_ms - prev) as f64,
            _ => 0.0,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        let frame = PoseFrame {
            landmarks,
            timestamp_ms,
            fps,
        };
        // send_replace succeeds even with no live subscribers.
        self.frame_tx.send_replace(Some(frame));
        fps
    }

    /// Drop the current frame (e.g. tracker stopped).
    pub fn clear(&mut self) {
        debug!("pose feed cleared");
        self.last_timestamp_ms = None;
        self.frame_tx.send_replace(None);
    }

    /// Create another subscriber.
    pub fn subscribe(&self) -> PoseSubscriber {
        PoseSubscriber {
            frame_rx: self.frame_tx.subscribe(),
            status_rx: self.status_tx.subscribe(),
        }
    }
}

impl PoseSubscriber {
    /// Most recent frame, if any has been published.
    pub fn latest(&self) -> Option<PoseFrame> {
        self.frame_rx.borrow().clone()
    }

    /// Most recent frame, marking it seen. `None` if nothing new arrived
    /// since the last call.
    pub fn take_new(&mut self) -> Option<PoseFrame> {
        match self.frame_rx.has_changed() {
            Ok(true) => self.frame_rx.borrow_and_update().clone(),
            _ => None,
        }
    }

    /// Current tracker status.
    pub fn status(&self) -> TrackingStatus {
        *self.status_rx.borrow()
    }

    /// Wait until the tracker status changes. Returns `None` once the feed is gone.
    pub async fn status_changed(&mut self) -> Option<TrackingStatus> {
        self.status_rx.changed().await.ok()?;
        Some(*self.status_rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_sees_latest_frame_only() {
        let (mut feed, mut sub) = PoseFeed::channel();
        assert!(sub.latest().is_none());

        feed.publish(vec![Landmark::new(0.1, 0.1)], 100);
        feed.publish(vec![Landmark::new(0.2, 0.2)], 133);

        let frame = sub.take_new().unwrap();
        assert_eq!(frame.timestamp_ms, 133);
        assert_eq!(frame.landmarks[0], Landmark::new(0.2, 0.2));
        assert!(sub.take_new().is_none());
        assert!(sub.latest().is_some());
    }

    #[test]
    fn test_fps_from_timestamps() {
        let (mut feed, _sub) = PoseFeed::channel();
        assert_eq!(feed.publish(Vec::new(), 1000), 0.0);
        assert!((feed.publish(Vec::new(), 1040) - 25.0).abs() < 1e-9);
        assert_eq!(feed.publish(Vec::new(), 1040), 0.0);
    }

    #[test]
    fn test_clear_drops_frame() {
        let (mut feed, sub) = PoseFeed::channel();
        feed.publish(Vec::new(), 5);
        feed.clear();
        assert!(sub.latest().is_none());
    }

    #[tokio::test]
    async fn test_status_changes_propagate() {
        let (feed, mut sub) = PoseFeed::channel();
        assert_eq!(sub.status(), TrackingStatus::Idle);

        feed.set_status(TrackingStatus::Initializing);
        assert_eq!(sub.status_changed().await, Some(TrackingStatus::Initializing));

        feed.set_status(TrackingStatus::Ready);
        assert_eq!(feed.status(), TrackingStatus::Ready);
        assert_eq!(sub.status(), TrackingStatus::Ready);
    }
}
