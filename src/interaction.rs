//! Door, drag, zoom and idle state for one calendar scene.
//!
//! Every input takes the caller's clock as milliseconds since the scene was
//! created; nothing here reads wall time. Deferred transitions are stored as
//! deadlines and fire from [`InteractionState::tick`].

use crate::config::SceneConfig;
use crate::store::StoreEvent;
use crate::{AdventError, Result, DOOR_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What happens outside December when the lock follows the calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffSeason {
    Unlocked,
    Locked,
}

/// Which days may be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockPolicy {
    All,
    /// Days `1..=n` are open; `Through(0)` locks everything.
    Through(u32),
}

impl LockPolicy {
    /// Policy for a calendar date, `month` in `1..=12`.
    pub fn for_date(month: u32, day_of_month: u32, off_season: OffSeason) -> Self {
        match (month, off_season) {
            (12, _) => LockPolicy::Through(day_of_month),
            (_, OffSeason::Unlocked) => LockPolicy::All,
            (_, OffSeason::Locked) => LockPolicy::Through(0),
        }
    }

    pub fn is_unlocked(&self, day: u32) -> bool {
        match *self {
            LockPolicy::All => true,
            LockPolicy::Through(n) => day <= n,
        }
    }

    /// Hover hint for a locked day.
    pub fn hint(&self, day: u32) -> Option<LockHint> {
        let LockPolicy::Through(today) = *self else {
            return None;
        };
        if day <= today {
            return None;
        }
        Some(match (day, day - today) {
            (24, _) => LockHint::ChristmasEve,
            (25, _) => LockHint::Christmas,
            (_, 1) => LockHint::Tomorrow,
            (_, 2..=6) => LockHint::Soon,
            _ => LockHint::Later,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockHint {
    ChristmasEve,
    Christmas,
    Tomorrow,
    Soon,
    Later,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorPhase {
    Closed,
    /// Open, waiting for the view delay.
    Opening,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The pointer travelled too far: this was a drag.
    Suppressed,
    Locked,
    Opened,
    Closed,
}

/// Initial and minimum zoom for a viewport aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub initial: f32,
    pub min: f32,
}

impl ZoomRange {
    pub fn for_aspect(aspect: f32) -> Self {
        if aspect < 0.75 {
            Self { initial: 65.0, min: 28.0 }
        } else if aspect > 1.5 {
            Self { initial: 50.0, min: 22.0 }
        } else {
            Self { initial: 55.0, min: 25.0 }
        }
    }
}

/// Records where a press started so a release can be classified.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    origin: Option<Vec2>,
}

impl DragTracker {
    pub fn press(&mut self, at: Vec2) {
        self.origin = Some(at);
    }

    /// True if the release at `at` is a click. Consumes the press.
    ///
    /// A release with no recorded press counts as a click.
    pub fn release_is_click(&mut self, at: Vec2, threshold: f32) -> bool {
        match self.origin.take() {
            Some(o) => (at.x - o.x).abs() < threshold && (at.y - o.y).abs() < threshold,
            None => true,
        }
    }
}

/// Per-frame hinge swing and hover scale of one door.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorAnimation {
    pub angle: f32,
    pub scale: f32,
}

impl Default for DoorAnimation {
    fn default() -> Self {
        Self { angle: 0.0, scale: 1.0 }
    }
}

const SWING_RATE: f32 = 5.0;
const SCALE_RATE: f32 = 10.0;
const HOVER_SCALE: f32 = 1.08;

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

impl DoorAnimation {
    pub fn step(&mut self, dt: f32, target_angle: f32, raised: bool) {
        self.angle = lerp(self.angle, target_angle, dt * SWING_RATE);
        let target_scale = if raised { HOVER_SCALE } else { 1.0 };
        self.scale = lerp(self.scale, target_scale, dt * SCALE_RATE);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingView {
    day: u32,
    due_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    start_dist: f32,
    start_zoom: f32,
}

/// Session state of the calendar scene.
#[derive(Debug, Clone)]
pub struct InteractionState {
    config: SceneConfig,
    lock: LockPolicy,
    preview: bool,

    opened_doors: BTreeSet<u32>,
    viewing_door: Option<u32>,
    pending_view: Option<PendingView>,
    doors: [DoorAnimation; DOOR_COUNT as usize],
    hovered: Option<u32>,
    tutorial: bool,

    rotation: Vec2,
    idle_offset: Vec2,
    zoom: f32,
    zoom_range: ZoomRange,
    is_dragging: bool,
    last_pointer: Vec2,
    press: DragTracker,
    pinch: Option<Pinch>,

    is_idle: bool,
    idle_since_ms: u64,
    last_interaction_ms: u64,
}

impl InteractionState {
    pub fn new(config: SceneConfig, lock: LockPolicy, aspect: f32) -> Self {
        let zoom_range = ZoomRange::for_aspect(aspect);
        let [rx, ry] = config.initial_rotation;
        Self {
            config,
            lock,
            preview: false,
            opened_doors: BTreeSet::new(),
            viewing_door: None,
            pending_view: None,
            doors: [DoorAnimation::default(); DOOR_COUNT as usize],
            hovered: None,
            tutorial: false,
            rotation: Vec2::new(rx, ry),
            idle_offset: Vec2::default(),
            zoom: zoom_range.initial,
            zoom_range,
            is_dragging: false,
            last_pointer: Vec2::default(),
            press: DragTracker::default(),
            pinch: None,
            is_idle: false,
            idle_since_ms: 0,
            last_interaction_ms: 0,
        }
    }

    /// Back to the state of a freshly opened scene.
    pub fn reset(&mut self, aspect: f32) {
        let preview = self.preview;
        *self = Self::new(self.config.clone(), self.lock, aspect);
        self.preview = preview;
    }

    pub fn set_preview(&mut self, preview: bool) {
        self.preview = preview;
    }

    /// Follow calendar store changes that affect the scene.
    pub fn on_store_event(&mut self, event: &StoreEvent) {
        if let StoreEvent::PreviewModeChanged(on) = *event {
            self.set_preview(on);
        }
    }

    pub fn set_lock_policy(&mut self, lock: LockPolicy) {
        self.lock = lock;
    }

    pub fn is_unlocked(&self, day: u32) -> bool {
        self.preview || self.lock.is_unlocked(day)
    }

    pub fn lock_hint(&self, day: u32) -> Option<LockHint> {
        if self.preview {
            None
        } else {
            self.lock.hint(day)
        }
    }

    pub fn opened_doors(&self) -> &BTreeSet<u32> {
        &self.opened_doors
    }

    pub fn viewing_door(&self) -> Option<u32> {
        self.viewing_door
    }

    pub fn door_phase(&self, day: u32) -> DoorPhase {
        if !self.opened_doors.contains(&day) {
            DoorPhase::Closed
        } else if self.pending_view.is_some_and(|p| p.day == day) {
            DoorPhase::Opening
        } else {
            DoorPhase::Open
        }
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    /// Rotation including the idle sway.
    pub fn effective_rotation(&self) -> Vec2 {
        Vec2::new(self.rotation.x + self.idle_offset.x, self.rotation.y + self.idle_offset.y)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn is_idle(&self) -> bool {
        self.is_idle
    }

    pub fn door_animation(&self, day: u32) -> Option<&DoorAnimation> {
        self.doors.get(day.checked_sub(1)? as usize)
    }

    pub fn show_tutorial(&mut self) {
        self.tutorial = true;
    }

    pub fn tutorial_active(&self) -> bool {
        self.tutorial
    }

    pub fn set_hovered(&mut self, day: Option<u32>) {
        self.hovered = day;
    }

    fn touch(&mut self, now_ms: u64) {
        self.last_interaction_ms = now_ms;
        if self.is_idle {
            self.is_idle = false;
            self.idle_offset = Vec2::default();
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, now_ms: u64) {
        if self.pinch.is_some() {
            return;
        }
        let at = Vec2::new(x, y);
        self.press.press(at);
        self.last_pointer = at;
        self.is_dragging = true;
        self.touch(now_ms);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.pinch.is_some() {
            self.is_dragging = false;
            return;
        }
        if !self.is_dragging {
            return;
        }
        let dx = x - self.last_pointer.x;
        let dy = y - self.last_pointer.y;
        self.rotation.x += dy * self.config.rotate_per_px;
        self.rotation.y += dx * self.config.rotate_per_px;
        self.last_pointer = Vec2::new(x, y);
    }

    /// Pointer released or left the canvas.
    pub fn pointer_up(&mut self) {
        self.is_dragging = false;
    }

    /// Click on a door at release position `(x, y)`.
    pub fn click_door(&mut self, day: u32, x: f32, y: f32, now_ms: u64) -> Result<ClickOutcome> {
        if !(1..=DOOR_COUNT).contains(&day) {
            return Err(AdventError::InvalidDoor(day));
        }
        if !self.press.release_is_click(Vec2::new(x, y), self.config.drag_threshold_px) {
            return Ok(ClickOutcome::Suppressed);
        }
        if !self.is_unlocked(day) {
            return Ok(ClickOutcome::Locked);
        }
        if self.opened_doors.remove(&day) {
            if self.pending_view.is_some_and(|p| p.day == day) {
                self.pending_view = None;
            }
            tracing::debug!(day, "door closed");
            return Ok(ClickOutcome::Closed);
        }
        self.opened_doors.insert(day);
        self.tutorial = false;
        self.pending_view = Some(PendingView { day, due_ms: now_ms + self.config.view_delay_ms });
        tracing::debug!(day, "door opened");
        Ok(ClickOutcome::Opened)
    }

    pub fn close_view(&mut self) {
        self.viewing_door = None;
    }

    pub fn wheel(&mut self, delta_y: f32, now_ms: u64) {
        self.touch(now_ms);
        self.zoom = self.clamp_zoom(self.zoom + delta_y * self.config.wheel_zoom_rate);
    }

    pub fn touch_start(&mut self, touches: &[Vec2], now_ms: u64) {
        if let [a, b] = touches {
            self.is_dragging = false;
            self.pinch = Some(Pinch { start_dist: distance(a, b), start_zoom: self.zoom });
            self.touch(now_ms);
        }
    }

    pub fn touch_move(&mut self, touches: &[Vec2], now_ms: u64) {
        let (Some(pinch), [a, b]) = (self.pinch, touches) else {
            return;
        };
        let dist = distance(a, b);
        if dist <= 0.0 || pinch.start_dist <= 0.0 {
            return;
        }
        // Fingers apart -> smaller zoom value -> camera closer.
        self.zoom = self.clamp_zoom(pinch.start_zoom * pinch.start_dist / dist);
        self.last_interaction_ms = now_ms;
    }

    pub fn touch_end(&mut self, remaining: usize) {
        if remaining < 2 {
            self.pinch = None;
        }
    }

    pub fn resize(&mut self, aspect: f32) {
        let range = ZoomRange::for_aspect(aspect);
        if self.zoom < range.min {
            self.zoom = range.initial;
        }
        self.zoom_range = range;
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.zoom_range.min, self.config.max_zoom)
    }

    /// Advance timers and the idle sway. Returns the day whose view just
    /// became active, if any.
    pub fn tick(&mut self, now_ms: u64) -> Option<u32> {
        let fired = match self.pending_view {
            Some(p) if now_ms >= p.due_ms => {
                self.pending_view = None;
                self.viewing_door = Some(p.day);
                tracing::debug!(day = p.day, "viewing door");
                Some(p.day)
            }
            _ => None,
        };

        let quiet = now_ms.saturating_sub(self.last_interaction_ms);
        if quiet > self.config.idle_timeout_ms && !self.is_dragging {
            if !self.is_idle {
                self.is_idle = true;
                self.idle_since_ms = now_ms;
            }
            let t = now_ms.saturating_sub(self.idle_since_ms) as f32 / 1000.0;
            let amplitude = (t / self.config.idle_fade_secs).min(1.0);
            self.idle_offset = Vec2::new(
                (t * 0.5).sin() * 0.15 * amplitude,
                (t * 0.4).sin() * 0.2 * amplitude,
            );
        } else {
            self.is_idle = false;
            self.idle_offset = Vec2::default();
        }
        fired
    }

    /// Step every door's swing and hover scale by `dt` seconds.
    pub fn animate(&mut self, dt: f32) {
        let open_angle = self.config.door_open_angle;
        for day in 1..=DOOR_COUNT {
            let open = self.opened_doors.contains(&day);
            let lifted = self.hovered == Some(day) || (self.tutorial && day == 1);
            let raised = lifted && !open && self.is_unlocked(day);
            let target = if open { open_angle } else { 0.0 };
            self.doors[(day - 1) as usize].step(dt, target, raised);
        }
    }
}

fn distance(a: &Vec2, b: &Vec2) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}
