/// Visibility-driven image loader
///
/// One `ImageLoader` governs exactly when one mounted image's real asset is
/// requested. The host reports events (viewport movement, load completion,
/// load failure) through `update`, and performs whatever `LoaderAction`s come
/// back. All transitions are synchronous and strictly ordered per instance;
/// loaders never observe each other.
///
/// The lifecycle mirrors what the site does in the browser: nothing is
/// fetched until the element is close to the viewport, a tiny placeholder is
/// fetched alongside the real asset for a blur-up, a failed load is terminal
/// until the image is unmounted and mounted again (a fresh loader).

use super::catalog::ImageRecord;
use super::viewport::{intersection_ratio, within_margin, Rect};

/// How a single loader decides to start fetching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoaderConfig {
    /// Load immediately on mount, bypassing visibility checks
    pub priority: bool,
    /// Begin loading when the element is within this many pixels of the
    /// viewport (applied as an inflated-viewport test)
    pub proximity_margin: f32,
    /// Fraction of the element that must be visible to trigger loading
    pub threshold: f32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            priority: false,
            proximity_margin: 100.0,
            threshold: 0.1,
        }
    }
}

impl LoaderConfig {
    /// Config for a high-priority image (above-the-fold hero shots).
    pub fn priority() -> Self {
        LoaderConfig {
            priority: true,
            ..Default::default()
        }
    }
}

/// Load state of one mounted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing fetched yet
    NotRequested,
    /// Placeholder arrived before the primary asset was requested
    PlaceholderReady,
    /// Primary asset request in flight
    Loading,
    /// Primary asset displayed
    Loaded,
    /// Primary asset failed; terminal for this mount
    Errored,
}

/// What the image slot should render right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visual {
    /// Generic pulsing/spinner indicator
    Spinner,
    /// Blurred low-quality placeholder
    Placeholder,
    /// The real asset, faded in
    Final,
    /// "Image unavailable" fallback
    Unavailable,
}

/// Events the host reports to a loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoaderEvent {
    /// The element or the viewport moved
    ViewportChanged { element: Rect, viewport: Rect },
    /// The placeholder payload finished loading
    PlaceholderLoaded,
    /// The primary asset finished loading
    PrimaryLoaded,
    /// The primary asset failed to load
    PrimaryFailed,
}

/// Side effects the host must perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderAction {
    /// Mount the real image element with src/srcset from the record
    RequestPrimary,
    /// Start fetching the placeholder payload
    RequestPlaceholder,
}

/// Primary-asset track, separate from the placeholder track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primary {
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug)]
pub struct ImageLoader {
    record: ImageRecord,
    config: LoaderConfig,
    primary: Primary,
    placeholder_ready: bool,
    /// True while we still care about viewport events
    observing: bool,
}

impl ImageLoader {
    /// Mount a loader for one image.
    ///
    /// Priority images begin their requests immediately; everything else
    /// waits for the visibility condition. The returned actions must be
    /// performed by the host right away.
    pub fn mount(record: ImageRecord, config: LoaderConfig) -> (Self, Vec<LoaderAction>) {
        let mut loader = ImageLoader {
            record,
            config,
            primary: Primary::Idle,
            placeholder_ready: false,
            observing: !config.priority,
        };

        let actions = if config.priority {
            loader.begin_requests()
        } else {
            Vec::new()
        };

        (loader, actions)
    }

    /// Feed one event through the state machine.
    pub fn update(&mut self, event: LoaderEvent) -> Vec<LoaderAction> {
        match event {
            LoaderEvent::ViewportChanged { element, viewport } => {
                if !self.observing || self.primary != Primary::Idle {
                    return Vec::new();
                }
                if self.is_triggered(&element, &viewport) {
                    // First trigger tears down observation; no re-triggering
                    self.observing = false;
                    return self.begin_requests();
                }
                Vec::new()
            }
            LoaderEvent::PlaceholderLoaded => {
                self.placeholder_ready = true;
                Vec::new()
            }
            LoaderEvent::PrimaryLoaded => {
                if self.primary == Primary::Loading {
                    self.primary = Primary::Loaded;
                }
                Vec::new()
            }
            LoaderEvent::PrimaryFailed => {
                if self.primary == Primary::Loading {
                    self.primary = Primary::Errored;
                }
                Vec::new()
            }
        }
    }

    /// Whether the visibility condition is met: enough of the element is
    /// visible, or its box is within the proximity margin of the viewport.
    fn is_triggered(&self, element: &Rect, viewport: &Rect) -> bool {
        intersection_ratio(element, viewport) >= self.config.threshold
            || within_margin(element, viewport, self.config.proximity_margin)
    }

    /// Start the primary request, and the placeholder request if the record
    /// carries a placeholder payload. Same trigger for both; they complete
    /// independently.
    fn begin_requests(&mut self) -> Vec<LoaderAction> {
        self.primary = Primary::Loading;
        let mut actions = vec![LoaderAction::RequestPrimary];
        if self.record.placeholder.is_some() && !self.placeholder_ready {
            actions.push(LoaderAction::RequestPlaceholder);
        }
        actions
    }

    /// Current load state.
    pub fn state(&self) -> LoadState {
        match self.primary {
            Primary::Errored => LoadState::Errored,
            Primary::Loaded => LoadState::Loaded,
            Primary::Loading => LoadState::Loading,
            Primary::Idle => {
                if self.placeholder_ready {
                    LoadState::PlaceholderReady
                } else {
                    LoadState::NotRequested
                }
            }
        }
    }

    /// Whether the placeholder payload has arrived (independent of the
    /// primary track).
    pub fn placeholder_ready(&self) -> bool {
        self.placeholder_ready
    }

    /// True while the host should keep delivering viewport events. Once this
    /// goes false the host can unregister its observer for this element.
    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// What to render for this slot right now.
    pub fn visual(&self) -> Visual {
        match self.primary {
            Primary::Errored => Visual::Unavailable,
            Primary::Loaded => Visual::Final,
            _ => {
                if self.placeholder_ready {
                    Visual::Placeholder
                } else {
                    Visual::Spinner
                }
            }
        }
    }

    pub fn record(&self) -> &ImageRecord {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(placeholder: bool) -> ImageRecord {
        ImageRecord {
            id: "blvd9185".to_string(),
            src: "/images/wedding/blvd9185.webp".to_string(),
            srcset: Vec::new(),
            sizes: Vec::new(),
            placeholder: placeholder.then(|| "data:image/jpeg;base64,AAAA".to_string()),
            alt: "Historic venue romance".to_string(),
            width: 1200,
            height: 800,
            category: "wedding".to_string(),
            priority: false,
        }
    }

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    fn far_below() -> Rect {
        Rect::new(0.0, 5000.0, 400.0, 300.0)
    }

    #[test]
    fn test_priority_loads_on_mount() {
        let (loader, actions) = ImageLoader::mount(record(true), LoaderConfig::priority());
        assert_eq!(
            actions,
            vec![LoaderAction::RequestPrimary, LoaderAction::RequestPlaceholder]
        );
        assert_eq!(loader.state(), LoadState::Loading);
        assert!(!loader.is_observing());
    }

    #[test]
    fn test_no_request_before_proximity() {
        let (mut loader, actions) = ImageLoader::mount(record(true), LoaderConfig::default());
        assert!(actions.is_empty());
        assert_eq!(loader.state(), LoadState::NotRequested);

        let actions = loader.update(LoaderEvent::ViewportChanged {
            element: far_below(),
            viewport: viewport(),
        });
        assert!(actions.is_empty());
        assert_eq!(loader.state(), LoadState::NotRequested);
        assert!(loader.is_observing());
    }

    #[test]
    fn test_entering_margin_triggers_request() {
        let (mut loader, _) = ImageLoader::mount(record(true), LoaderConfig::default());

        // 80px below the fold, inside the default 100px margin
        let actions = loader.update(LoaderEvent::ViewportChanged {
            element: Rect::new(0.0, 880.0, 400.0, 300.0),
            viewport: viewport(),
        });
        assert_eq!(
            actions,
            vec![LoaderAction::RequestPrimary, LoaderAction::RequestPlaceholder]
        );
        assert_eq!(loader.state(), LoadState::Loading);
        assert!(!loader.is_observing());
    }

    #[test]
    fn test_visible_element_triggers_with_zero_margin() {
        let config = LoaderConfig {
            proximity_margin: 0.0,
            threshold: 0.1,
            ..Default::default()
        };
        let (mut loader, _) = ImageLoader::mount(record(false), config);

        // Still fully below the fold: neither condition holds
        let actions = loader.update(LoaderEvent::ViewportChanged {
            element: Rect::new(0.0, 801.0, 400.0, 300.0),
            viewport: viewport(),
        });
        assert!(actions.is_empty());

        // Half visible: well past the 0.1 intersection threshold
        let actions = loader.update(LoaderEvent::ViewportChanged {
            element: Rect::new(0.0, 650.0, 400.0, 300.0),
            viewport: viewport(),
        });
        assert_eq!(actions, vec![LoaderAction::RequestPrimary]);
    }

    #[test]
    fn test_observation_torn_down_after_trigger() {
        let (mut loader, _) = ImageLoader::mount(record(true), LoaderConfig::default());
        loader.update(LoaderEvent::ViewportChanged {
            element: Rect::new(0.0, 100.0, 400.0, 300.0),
            viewport: viewport(),
        });
        assert!(!loader.is_observing());

        // Further viewport events are no-ops, no duplicate requests
        let actions = loader.update(LoaderEvent::ViewportChanged {
            element: Rect::new(0.0, 100.0, 400.0, 300.0),
            viewport: viewport(),
        });
        assert!(actions.is_empty());
        assert_eq!(loader.state(), LoadState::Loading);
    }

    #[test]
    fn test_load_success_fades_in() {
        let (mut loader, _) = ImageLoader::mount(record(true), LoaderConfig::priority());
        assert_eq!(loader.visual(), Visual::Spinner);

        loader.update(LoaderEvent::PlaceholderLoaded);
        assert_eq!(loader.visual(), Visual::Placeholder);
        assert_eq!(loader.state(), LoadState::Loading);

        loader.update(LoaderEvent::PrimaryLoaded);
        assert_eq!(loader.state(), LoadState::Loaded);
        assert_eq!(loader.visual(), Visual::Final);
    }

    #[test]
    fn test_failure_is_terminal_for_the_mount() {
        let (mut loader, _) = ImageLoader::mount(record(true), LoaderConfig::priority());
        loader.update(LoaderEvent::PrimaryFailed);
        assert_eq!(loader.state(), LoadState::Errored);
        assert_eq!(loader.visual(), Visual::Unavailable);

        // No automatic retry: viewport movement and late placeholder arrival
        // change nothing
        let actions = loader.update(LoaderEvent::ViewportChanged {
            element: Rect::new(0.0, 100.0, 400.0, 300.0),
            viewport: viewport(),
        });
        assert!(actions.is_empty());
        loader.update(LoaderEvent::PlaceholderLoaded);
        assert_eq!(loader.state(), LoadState::Errored);
        assert_eq!(loader.visual(), Visual::Unavailable);

        // Remount is the only recovery path
        let (fresh, _) = ImageLoader::mount(record(true), LoaderConfig::default());
        assert_eq!(fresh.state(), LoadState::NotRequested);
    }

    #[test]
    fn test_placeholder_before_trigger_reports_placeholder_ready() {
        let (mut loader, _) = ImageLoader::mount(record(true), LoaderConfig::default());
        loader.update(LoaderEvent::PlaceholderLoaded);
        assert_eq!(loader.state(), LoadState::PlaceholderReady);

        // The trigger then skips the redundant placeholder request
        let actions = loader.update(LoaderEvent::ViewportChanged {
            element: Rect::new(0.0, 100.0, 400.0, 300.0),
            viewport: viewport(),
        });
        assert_eq!(actions, vec![LoaderAction::RequestPrimary]);
    }

    #[test]
    fn test_record_without_placeholder_never_requests_one() {
        let (_, actions) = ImageLoader::mount(record(false), LoaderConfig::priority());
        assert_eq!(actions, vec![LoaderAction::RequestPrimary]);
    }
}
