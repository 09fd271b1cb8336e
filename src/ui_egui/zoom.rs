//! Shared zoom level.
//!
//! Slider, drag bar and Ctrl+wheel all write one value. Every change is
//! persisted to [`SharedStorage`] straight away; other views pick it up on
//! their next poll, so staleness is bounded by the poll interval.

use chrono::{DateTime, Duration, Utc};
use std::rc::Rc;

use super::time_axis::TimeAxis;
use crate::models::settings::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use crate::services::storage::SharedStorage;
use crate::utils::clock::Clock;

pub const ZOOM_STORAGE_KEY: &str = "run_of_show.zoom_level";

/// Handle returned by [`ZoomModel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<'a> = Box<dyn FnMut(i32) + 'a>;

pub fn clamp_zoom(level: i32) -> i32 {
    level.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Response curve for wheel deltas: slow scrolling moves a fraction of a
/// step, fast scrolling moves a lot.
pub fn wheel_curve(delta: f32) -> f32 {
    delta.signum() * (delta.abs() / 10.0).powf(1.5)
}

fn parse_level(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

pub struct ZoomModel<'a> {
    level: i32,
    /// Curve output not yet applied as a whole level.
    wheel_remainder: f32,
    storage: Box<dyn SharedStorage + 'a>,
    clock: Rc<dyn Clock>,
    poll_interval: Duration,
    next_poll: DateTime<Utc>,
    listeners: Vec<(SubscriptionId, Listener<'a>)>,
    next_subscription: u64,
}

impl<'a> ZoomModel<'a> {
    /// Restore the persisted level, falling back to `default_level` when the
    /// stored value is missing or unreadable.
    pub fn new(
        storage: Box<dyn SharedStorage + 'a>,
        clock: Rc<dyn Clock>,
        default_level: i32,
        poll_interval: Duration,
    ) -> Self {
        let default_level = clamp_zoom(default_level);
        let level = match storage.load(ZOOM_STORAGE_KEY) {
            Ok(Some(raw)) => match parse_level(&raw) {
                Some(level) => clamp_zoom(level),
                None => {
                    log::warn!("Ignoring unreadable zoom level {:?}", raw);
                    default_level
                }
            },
            Ok(None) => default_level,
            Err(e) => {
                log::warn!("Failed to read zoom level: {:#}", e);
                default_level
            }
        };
        let next_poll = clock.now() + poll_interval;

        Self {
            level,
            wheel_remainder: 0.0,
            storage,
            clock,
            poll_interval,
            next_poll,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn axis(&self, origin: DateTime<Utc>) -> TimeAxis {
        TimeAxis::new(origin, self.level)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(i32) + 'a) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(candidate, _)| *candidate != id);
        self.listeners.len() != before
    }

    /// Ctrl+wheel input. Fractions accumulate across events, so a run of
    /// small deltas still moves the level. Returns `true` when it changed.
    pub fn apply_wheel(&mut self, delta: f32) -> bool {
        self.wheel_remainder += wheel_curve(delta);
        let step = self.wheel_remainder.round();
        if step == 0.0 {
            return false;
        }
        self.wheel_remainder -= step;
        self.set_level(self.level.saturating_add(step as i32))
    }

    pub fn apply_slider(&mut self, value: i32) -> bool {
        self.set_level(value)
    }

    /// Drag along the zoom bar, one level per pixel.
    pub fn apply_drag_bar(&mut self, delta_px: f32) -> bool {
        self.set_level(self.level.saturating_add(delta_px.round() as i32))
    }

    /// Poll shared storage if the interval has elapsed.
    pub fn tick(&mut self) -> bool {
        self.poll_due() && self.poll()
    }

    /// Whether a poll is due. Claims the slot, so the next one is a full
    /// interval away.
    pub fn poll_due(&mut self) -> bool {
        let now = self.clock.now();
        if now < self.next_poll {
            return false;
        }
        self.next_poll = now + self.poll_interval;
        true
    }

    /// Adopt whatever another view persisted. Returns `true` on change.
    pub fn poll(&mut self) -> bool {
        let raw = match self.storage.load(ZOOM_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                log::warn!("Zoom poll failed: {:#}", e);
                return false;
            }
        };
        let Some(level) = parse_level(&raw) else {
            log::warn!("Ignoring unreadable zoom level {:?}", raw);
            return false;
        };

        let level = clamp_zoom(level);
        if level == self.level {
            return false;
        }
        log::debug!("Zoom level changed elsewhere: {} -> {}", self.level, level);
        self.level = level;
        self.notify();
        true
    }

    fn set_level(&mut self, requested: i32) -> bool {
        let level = clamp_zoom(requested);
        if level == self.level {
            return false;
        }
        self.level = level;
        if let Err(e) = self.storage.store(ZOOM_STORAGE_KEY, &level.to_string()) {
            log::warn!("Failed to persist zoom level {}: {:#}", level, e);
        }
        self.notify();
        true
    }

    fn notify(&mut self) {
        let level = self.level;
        for (_, listener) in self.listeners.iter_mut() {
            listener(level);
        }
    }
}

impl Default for ZoomModel<'static> {
    fn default() -> Self {
        Self::new(
            Box::new(crate::services::storage::MemoryStorage::new()),
            Rc::new(crate::utils::clock::SystemClock),
            DEFAULT_ZOOM,
            Duration::seconds(30),
        )
    }
}
