/// Incremental gallery feed
///
/// Mounting a loader per image is cheap, but mounting hundreds at once is
/// not. The feed bounds how many records are revealed and grows the bound as
/// a trailing sentinel element approaches the viewport, with a short debounce
/// so batches don't pop in instantly.
///
/// There is no network here: "fetching more" only delays local reveal of
/// records that are already in memory, so this path cannot fail.

use super::catalog::ImageRecord;
use super::viewport::{within_margin, Rect};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedConfig {
    /// How many records are revealed on first render
    pub initial_count: usize,
    /// How many records each batch adds
    pub batch_size: usize,
    /// Start revealing when the sentinel is this close to the viewport
    pub sentinel_margin: f32,
    /// Debounce between the sentinel firing and the batch appearing
    pub reveal_delay: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            initial_count: 3,
            batch_size: 2,
            sentinel_margin: 200.0,
            reveal_delay: Duration::from_millis(300),
        }
    }
}

/// Events the host reports to the feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedEvent {
    /// The trailing sentinel element moved relative to the viewport
    SentinelVisible { sentinel: Rect, viewport: Rect },
    /// The debounce timer scheduled with this token fired
    RevealElapsed { token: u64 },
}

/// Side effects the host must perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedAction {
    /// Arm a timer for `delay`, then report `RevealElapsed { token }`
    ScheduleReveal { token: u64, delay: Duration },
}

#[derive(Debug)]
pub struct GalleryFeed {
    records: Vec<ImageRecord>,
    config: FeedConfig,
    revealed: usize,
    is_fetching_more: bool,
    /// Token of the most recently armed timer; stale timers are ignored
    timer_token: u64,
}

impl GalleryFeed {
    pub fn new(records: Vec<ImageRecord>, config: FeedConfig) -> Self {
        let revealed = config.initial_count.min(records.len());
        GalleryFeed {
            records,
            config,
            revealed,
            is_fetching_more: false,
            timer_token: 0,
        }
    }

    /// Feed one event through the state machine.
    pub fn update(&mut self, event: FeedEvent) -> Option<FeedAction> {
        match event {
            FeedEvent::SentinelVisible { sentinel, viewport } => {
                // At most one reveal in flight; repeats are no-ops
                if self.all_revealed() || self.is_fetching_more {
                    return None;
                }
                if !within_margin(&sentinel, &viewport, self.config.sentinel_margin) {
                    return None;
                }
                self.is_fetching_more = true;
                self.timer_token += 1;
                Some(FeedAction::ScheduleReveal {
                    token: self.timer_token,
                    delay: self.config.reveal_delay,
                })
            }
            FeedEvent::RevealElapsed { token } => {
                if !self.is_fetching_more || token != self.timer_token {
                    // A timer that outlived a cancel; ignore it
                    return None;
                }
                self.revealed = (self.revealed + self.config.batch_size).min(self.records.len());
                self.is_fetching_more = false;
                None
            }
        }
    }

    /// Cancel any pending reveal, e.g. because the owning view is going
    /// away before the timer fires. A timer that still fires afterwards is
    /// ignored by token mismatch.
    pub fn cancel_pending(&mut self) {
        self.is_fetching_more = false;
        self.timer_token += 1;
    }

    /// The currently revealed sub-sequence, in original order.
    pub fn visible(&self) -> &[ImageRecord] {
        &self.records[..self.revealed]
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    /// Drives the "Loading more photos..." indicator.
    pub fn is_fetching_more(&self) -> bool {
        self.is_fetching_more
    }

    /// Drives the "all photos loaded" completion message.
    pub fn all_revealed(&self) -> bool {
        self.revealed >= self.records.len()
    }

    /// Whether the trailing sentinel should be rendered at all. Once every
    /// record is revealed the sentinel disappears and no further reveal can
    /// occur.
    pub fn needs_sentinel(&self) -> bool {
        self.revealed < self.records.len()
    }
}
