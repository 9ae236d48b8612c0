//! Calendar content state, mutated through commands.
//!
//! The store is passed explicitly to whoever needs it. Listeners registered
//! with [`CalendarStore::subscribe`] see each change as a [`StoreEvent`]; the
//! texture pipeline hangs off `MainImageChanged`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorShape {
    #[default]
    Square,
    Circle,
}

/// Persisted calendar record, as exchanged with storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarConfig {
    pub id: String,
    pub title: String,
    pub main_image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
    #[serde(default)]
    pub day_images: BTreeMap<u32, String>,
    #[serde(default)]
    pub day_memos: BTreeMap<u32, String>,
    #[serde(default)]
    pub door_shape: DoorShape,
    pub owner_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetMainImage(Option<String>),
    SetBackgroundImage(Option<String>),
    /// An empty url removes the day's image.
    SetDayImage(u32, String),
    /// An empty memo removes the day's memo.
    SetDayMemo(u32, String),
    SetDoorShape(DoorShape),
    SetPreviewMode(bool),
    Reset,
    LoadConfig(Box<CalendarConfig>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    MainImageChanged(Option<String>),
    BackgroundChanged(Option<String>),
    DayChanged(u32),
    DoorShapeChanged(DoorShape),
    PreviewModeChanged(bool),
}

/// What the scene shows right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarState {
    pub main_image: Option<String>,
    pub background_image: Option<String>,
    pub day_images: BTreeMap<u32, String>,
    pub day_memos: BTreeMap<u32, String>,
    pub door_shape: DoorShape,
    pub preview_mode: bool,
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

#[derive(Default)]
pub struct CalendarStore {
    state: CalendarState,
    listeners: Vec<Listener>,
}

impl CalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CalendarState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn load_config(&mut self, config: CalendarConfig) {
        self.apply(Command::LoadConfig(Box::new(config)));
    }

    pub fn apply(&mut self, command: Command) {
        let mut events = Vec::new();
        let s = &mut self.state;
        match command {
            Command::SetMainImage(url) => set_main_image(s, url, &mut events),
            Command::SetBackgroundImage(url) => set_background(s, url, &mut events),
            Command::SetDayImage(day, url) => {
                if set_or_remove(&mut s.day_images, day, url) {
                    events.push(StoreEvent::DayChanged(day));
                }
            }
            Command::SetDayMemo(day, memo) => {
                if set_or_remove(&mut s.day_memos, day, memo) {
                    events.push(StoreEvent::DayChanged(day));
                }
            }
            Command::SetDoorShape(shape) => set_door_shape(s, shape, &mut events),
            Command::SetPreviewMode(on) => set_preview(s, on, &mut events),
            Command::Reset => replace_state(s, CalendarState::default(), &mut events),
            Command::LoadConfig(config) => {
                let config = *config;
                tracing::info!(id = %config.id, days = config.day_images.len(), "loaded calendar");
                let next = CalendarState {
                    main_image: Some(config.main_image_url).filter(|u| !u.is_empty()),
                    background_image: config.background_image_url.filter(|u| !u.is_empty()),
                    day_images: non_empty(config.day_images),
                    day_memos: non_empty(config.day_memos),
                    door_shape: config.door_shape,
                    preview_mode: s.preview_mode,
                };
                replace_state(s, next, &mut events);
            }
        }
        for event in &events {
            for listener in &mut self.listeners {
                listener(event);
            }
        }
    }
}

fn set_main_image(s: &mut CalendarState, url: Option<String>, events: &mut Vec<StoreEvent>) {
    if s.main_image != url {
        s.main_image = url.clone();
        events.push(StoreEvent::MainImageChanged(url));
    }
}

fn set_background(s: &mut CalendarState, url: Option<String>, events: &mut Vec<StoreEvent>) {
    if s.background_image != url {
        s.background_image = url.clone();
        events.push(StoreEvent::BackgroundChanged(url));
    }
}

fn set_door_shape(s: &mut CalendarState, shape: DoorShape, events: &mut Vec<StoreEvent>) {
    if s.door_shape != shape {
        s.door_shape = shape;
        events.push(StoreEvent::DoorShapeChanged(shape));
    }
}

fn set_preview(s: &mut CalendarState, on: bool, events: &mut Vec<StoreEvent>) {
    if s.preview_mode != on {
        s.preview_mode = on;
        events.push(StoreEvent::PreviewModeChanged(on));
    }
}

/// Swap in a whole new state, emitting one event per field that changed and
/// one `DayChanged` per day whose image or memo differs.
fn replace_state(s: &mut CalendarState, next: CalendarState, events: &mut Vec<StoreEvent>) {
    set_main_image(s, next.main_image, events);
    set_background(s, next.background_image, events);

    let days: BTreeSet<u32> = s
        .day_images
        .keys()
        .chain(s.day_memos.keys())
        .chain(next.day_images.keys())
        .chain(next.day_memos.keys())
        .copied()
        .collect();
    for day in days {
        if s.day_images.get(&day) != next.day_images.get(&day)
            || s.day_memos.get(&day) != next.day_memos.get(&day)
        {
            events.push(StoreEvent::DayChanged(day));
        }
    }
    s.day_images = next.day_images;
    s.day_memos = next.day_memos;

    set_door_shape(s, next.door_shape, events);
    set_preview(s, next.preview_mode, events);
}

/// Returns true if the map changed.
fn set_or_remove(map: &mut BTreeMap<u32, String>, day: u32, value: String) -> bool {
    if value.is_empty() {
        map.remove(&day).is_some()
    } else {
        map.insert(day, value.clone()).as_ref() != Some(&value)
    }
}

fn non_empty(mut map: BTreeMap<u32, String>) -> BTreeMap<u32, String> {
    map.retain(|_, v| !v.is_empty());
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded(store: &mut CalendarStore) -> Rc<RefCell<Vec<StoreEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        store.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        log
    }

    #[test]
    fn main_image_change_notifies_once() {
        let mut store = CalendarStore::new();
        let log = recorded(&mut store);
        store.apply(Command::SetMainImage(Some("a.png".into())));
        store.apply(Command::SetMainImage(Some("a.png".into())));
        store.apply(Command::SetMainImage(None));
        assert_eq!(
            *log.borrow(),
            vec![
                StoreEvent::MainImageChanged(Some("a.png".into())),
                StoreEvent::MainImageChanged(None),
            ]
        );
    }

    #[test]
    fn empty_day_image_removes_key() {
        let mut store = CalendarStore::new();
        store.apply(Command::SetDayImage(3, "three.png".into()));
        store.apply(Command::SetDayMemo(3, "hello".into()));
        let image = store.state().day_images.get(&3).map(String::as_str);
        assert_eq!(image, Some("three.png"));
        store.apply(Command::SetDayImage(3, String::new()));
        store.apply(Command::SetDayMemo(3, String::new()));
        assert!(store.state().day_images.is_empty());
        assert!(store.state().day_memos.is_empty());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = CalendarStore::new();
        let log = recorded(&mut store);
        store.apply(Command::SetMainImage(Some("x".into())));
        store.apply(Command::SetDoorShape(DoorShape::Circle));
        store.apply(Command::Reset);
        assert_eq!(*store.state(), CalendarState::default());
        assert_eq!(log.borrow().last(), Some(&StoreEvent::MainImageChanged(None)));
    }

    #[test]
    fn load_config_from_json() {
        let json = r#"{
            "id": "cal-1",
            "title": "Ours",
            "mainImageUrl": "https://cdn/x.jpg",
            "dayImages": {"1": "d1.jpg", "25": "d25.jpg"},
            "dayMemos": {"1": "first"},
            "doorShape": "circle",
            "ownerId": "u1",
            "createdAt": "2025-12-01T00:00:00Z"
        }"#;
        let config: CalendarConfig = serde_json::from_str(json).unwrap();
        let mut store = CalendarStore::new();
        let log = recorded(&mut store);
        store.load_config(config);
        let s = store.state();
        assert_eq!(s.main_image.as_deref(), Some("https://cdn/x.jpg"));
        assert_eq!(s.background_image, None);
        assert_eq!(s.day_images.len(), 2);
        assert_eq!(s.door_shape, DoorShape::Circle);
        assert_eq!(
            *log.borrow(),
            vec![
                StoreEvent::MainImageChanged(Some("https://cdn/x.jpg".into())),
                StoreEvent::DayChanged(1),
                StoreEvent::DayChanged(25),
                StoreEvent::DoorShapeChanged(DoorShape::Circle),
            ]
        );
    }

    #[test]
    fn load_config_notifies_every_changed_field() {
        let mut store = CalendarStore::new();
        store.apply(Command::SetDayMemo(7, "old".into()));
        store.apply(Command::SetDayImage(9, "same.png".into()));
        let log = recorded(&mut store);
        store.load_config(CalendarConfig {
            main_image_url: "m.png".into(),
            background_image_url: Some("bg.png".into()),
            day_images: [(9, "same.png".to_string()), (12, String::new())].into(),
            door_shape: DoorShape::Circle,
            ..Default::default()
        });
        assert_eq!(
            *log.borrow(),
            vec![
                StoreEvent::MainImageChanged(Some("m.png".into())),
                StoreEvent::BackgroundChanged(Some("bg.png".into())),
                StoreEvent::DayChanged(7),
                StoreEvent::DoorShapeChanged(DoorShape::Circle),
            ]
        );
        assert!(store.state().day_memos.is_empty());
        assert!(!store.state().day_images.contains_key(&12));
    }

    #[test]
    fn reset_notifies_cleared_fields() {
        let mut store = CalendarStore::new();
        store.apply(Command::SetPreviewMode(true));
        store.apply(Command::SetBackgroundImage(Some("bg.png".into())));
        store.apply(Command::SetDayImage(4, "four.png".into()));
        let log = recorded(&mut store);
        store.apply(Command::Reset);
        assert_eq!(
            *log.borrow(),
            vec![
                StoreEvent::BackgroundChanged(None),
                StoreEvent::DayChanged(4),
                StoreEvent::PreviewModeChanged(false),
            ]
        );
    }

    #[test]
    fn config_round_trips_camel_case() {
        let config =
            CalendarConfig { id: "a".into(), door_shape: DoorShape::Circle, ..Default::default() };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["doorShape"], "circle");
        assert!(json.get("backgroundImageUrl").is_none());
    }
}
