//! Lights preference: on/off flag plus the selected neon color.
//!
//! The store is an explicit instance over an injected [`StorageBackend`].
//! Every mutation updates memory, notifies listeners in registration order and
//! then writes the blob through the backend. Storage problems never reach the
//! caller; they are logged and the in-memory state wins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::log::{debug, warn};
use crate::theme::{ColorSpec, palette};

pub const STORAGE_KEY: &str = "lights";
pub const STORAGE_VERSION: u32 = 3;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable key-value slot for the serialized preference.
pub trait StorageBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| StoreError::Io { path, source })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub lights_on: bool,
    pub light: ColorSpec,
}

impl Default for Preference {
    fn default() -> Self {
        Self {
            lights_on: true,
            light: palette()[0].clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Persisted {
    state: Preference,
    version: u32,
}

#[derive(Deserialize)]
struct ExternalBlob {
    state: ExternalState,
    #[serde(default)]
    version: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExternalState {
    lights_on: Option<bool>,
}

pub fn encode_preference(preference: &Preference) -> Result<String, StoreError> {
    let blob = Persisted {
        state: preference.clone(),
        version: STORAGE_VERSION,
    };
    Ok(serde_json::to_string(&blob)?)
}

/// Parses a stored blob. `None` for anything that is not a current-version
/// preference whose light belongs to `palette`.
pub fn decode_preference(raw: &str, palette: &[ColorSpec]) -> Option<Preference> {
    let blob: Persisted = match serde_json::from_str(raw) {
        Ok(blob) => blob,
        Err(err) => {
            warn!(error = %err, "discarding malformed lights preference");
            return None;
        }
    };
    if blob.version != STORAGE_VERSION {
        warn!(
            found = blob.version,
            expected = STORAGE_VERSION,
            "discarding lights preference from another version"
        );
        return None;
    }
    let Some(idx) = palette_position(palette, &blob.state.light) else {
        warn!(light = %blob.state.light.name, "stored light is not in the palette");
        return None;
    };
    Some(Preference {
        lights_on: blob.state.lights_on,
        light: palette[idx].clone(),
    })
}

/// Index of the palette entry with the same hex (any case) or the same name.
fn palette_position(palette: &[ColorSpec], light: &ColorSpec) -> Option<usize> {
    palette
        .iter()
        .position(|c| c.hex.eq_ignore_ascii_case(&light.hex) || c.name == light.name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&Preference)>;

pub struct PreferenceStore<B: StorageBackend> {
    backend: B,
    palette: Vec<ColorSpec>,
    state: Preference,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl<B: StorageBackend> PreferenceStore<B> {
    /// Store over the built-in neon palette, loaded from `backend`.
    pub fn new(backend: B) -> Self {
        Self::build(backend, palette().to_vec())
    }

    pub fn with_palette(backend: B, palette: Vec<ColorSpec>) -> Result<Self, StoreError> {
        if palette.is_empty() {
            return Err(StoreError::EmptyPalette);
        }
        Ok(Self::build(backend, palette))
    }

    fn build(backend: B, palette: Vec<ColorSpec>) -> Self {
        let fallback = Preference {
            lights_on: true,
            light: palette[0].clone(),
        };
        let state = match backend.load(STORAGE_KEY) {
            Ok(Some(raw)) => decode_preference(&raw, &palette).unwrap_or(fallback),
            Ok(None) => fallback,
            Err(err) => {
                warn!(error = %err, "could not read lights preference");
                fallback
            }
        };
        Self {
            backend,
            palette,
            state,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn state(&self) -> &Preference {
        &self.state
    }

    pub fn palette(&self) -> &[ColorSpec] {
        &self.palette
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn set(&mut self, on: bool) {
        self.state.lights_on = on;
        self.commit();
    }

    pub fn toggle(&mut self) {
        self.set(!self.state.lights_on);
    }

    /// Selects the palette entry matching `color`. Anything else leaves the
    /// state untouched and returns `false`.
    pub fn select_color(&mut self, color: &ColorSpec) -> bool {
        let Some(idx) = palette_position(&self.palette, color) else {
            debug!(name = %color.name, hex = %color.hex, "ignoring color outside the palette");
            return false;
        };
        self.state.light = self.palette[idx].clone();
        self.commit();
        true
    }

    pub fn next(&mut self) {
        let len = self.palette.len();
        let idx = self.current_index();
        self.state.light = self.palette[(idx + 1) % len].clone();
        self.commit();
    }

    pub fn prev(&mut self) {
        let len = self.palette.len();
        let idx = self.current_index();
        self.state.light = self.palette[(idx + len - 1) % len].clone();
        self.commit();
    }

    fn current_index(&self) -> usize {
        palette_position(&self.palette, &self.state.light).unwrap_or(0)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Preference) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    /// Applies a blob written by another instance under the same key. Only
    /// `lightsOn` is taken; nothing is written back. Returns whether the
    /// flag changed.
    pub fn apply_external(&mut self, raw: &str) -> bool {
        let blob: ExternalBlob = match serde_json::from_str(raw) {
            Ok(blob) => blob,
            Err(err) => {
                debug!(error = %err, "ignoring unreadable external lights update");
                return false;
            }
        };
        if blob.version.is_some_and(|v| v != STORAGE_VERSION) {
            debug!("ignoring external lights update from another version");
            return false;
        }
        match blob.state.lights_on {
            Some(on) if on != self.state.lights_on => {
                self.state.lights_on = on;
                self.notify();
                true
            }
            _ => false,
        }
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
    }

    fn commit(&mut self) {
        self.notify();
        let saved = encode_preference(&self.state)
            .and_then(|raw| self.backend.save(STORAGE_KEY, &raw));
        if let Err(err) = saved {
            warn!(error = %err, "could not persist lights preference");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn two_colors() -> Vec<ColorSpec> {
        vec![
            ColorSpec::new("Pink", "#ec4fb4"),
            ColorSpec::new("Blue", "#00a6ff"),
        ]
    }

    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Io {
                path: PathBuf::from("/nowhere"),
                source: io::Error::other("offline"),
            })
        }

        fn save(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: PathBuf::from("/nowhere"),
                source: io::Error::other("offline"),
            })
        }
    }

    #[test]
    fn starts_with_default() {
        let store = PreferenceStore::new(MemoryStorage::new());
        assert_eq!(store.state(), &Preference::default());
        assert_eq!(store.state().light.name, "Pink");
    }

    #[test]
    fn next_wraps_two_color_palette() {
        let mut store = PreferenceStore::with_palette(MemoryStorage::new(), two_colors()).unwrap();
        assert!(store.state().lights_on);
        store.next();
        assert_eq!(store.state().light.name, "Blue");
        store.next();
        assert_eq!(store.state().light.name, "Pink");
    }

    #[test]
    fn cycles_full_palette_both_ways() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        let start = store.state().light.clone();
        for _ in 0..store.palette().len() {
            store.next();
        }
        assert_eq!(store.state().light, start);
        store.next();
        store.prev();
        assert_eq!(store.state().light, start);
        store.prev();
        assert_eq!(store.state().light, *store.palette().last().unwrap());
    }

    #[test]
    fn persists_on_every_mutation() {
        for on in [true, false] {
            let mut store = PreferenceStore::new(MemoryStorage::new());
            store.set(!on);
            store.set(on);
            let raw = store.backend().get(STORAGE_KEY).unwrap().to_string();
            let reloaded = PreferenceStore::new(MemoryStorage::with_entry(STORAGE_KEY, &raw));
            assert_eq!(reloaded.state().lights_on, on);
        }
    }

    #[test]
    fn blob_shape() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        store.set(false);
        let raw = store.backend().get(STORAGE_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value["version"], 3);
        assert_eq!(value["state"]["lightsOn"], false);
        assert_eq!(value["state"]["light"]["hex"], "#ec4fb4");
    }

    #[test]
    fn malformed_blob_falls_back() {
        for raw in [
            "{not json",
            r#"{"state":{"lightsOn":"yes"},"version":3}"#,
            r##"{"state":{"lightsOn":false,"light":{"name":"Pink","hex":"#ec4fb4"}},"version":2}"##,
            r##"{"state":{"lightsOn":false,"light":{"name":"Gray","hex":"#808080"}},"version":3}"##,
        ] {
            let store = PreferenceStore::new(MemoryStorage::with_entry(STORAGE_KEY, raw));
            assert_eq!(store.state(), &Preference::default(), "blob: {raw}");
        }
    }

    #[test]
    fn stored_light_resolves_to_palette_entry() {
        for light in [
            r##"{"name":"Pink","hex":"#EC4FB4"}"##,
            r##"{"name":"Hot Pink","hex":"#ec4fb4"}"##,
            r##"{"name":"Blue","hex":"#123456"}"##,
        ] {
            let raw = format!(r#"{{"state":{{"lightsOn":false,"light":{light}}},"version":3}}"#);
            let store = PreferenceStore::with_palette(
                MemoryStorage::with_entry(STORAGE_KEY, &raw),
                two_colors(),
            )
            .unwrap();
            assert!(!store.state().lights_on, "blob: {raw}");
            assert!(store.palette().contains(&store.state().light), "blob: {raw}");
        }

        let raw = r##"{"state":{"lightsOn":true,"light":{"name":"x","hex":"#00A6FF"}},"version":3}"##;
        let storage = MemoryStorage::with_entry(STORAGE_KEY, raw);
        let store = PreferenceStore::with_palette(storage, two_colors()).unwrap();
        assert_eq!(store.state().light, ColorSpec::new("Blue", "#00a6ff"));
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut store = PreferenceStore::new(BrokenStorage);
        store.toggle();
        assert!(!store.state().lights_on);
    }

    #[test]
    fn select_color_rejects_unknown() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        store.subscribe(move |_| *seen.borrow_mut() += 1);

        assert!(!store.select_color(&ColorSpec::new("Gray", "#808080")));
        assert_eq!(*calls.borrow(), 0);
        assert!(store.backend().get(STORAGE_KEY).is_none());

        let aqua = store.palette()[13].clone();
        assert!(store.select_color(&aqua));
        assert_eq!(store.state().light, aqua);
        assert_eq!(*calls.borrow(), 1);

        assert!(store.select_color(&ColorSpec::new("aqua?", &aqua.hex.to_uppercase())));
        assert_eq!(store.state().light, aqua);
    }

    #[test]
    fn listeners_run_in_order_before_return() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        let second = Rc::clone(&log);
        store.subscribe(move |p| first.borrow_mut().push(("a", p.lights_on)));
        let id = store.subscribe(move |p| second.borrow_mut().push(("b", p.lights_on)));
        store.toggle();
        assert_eq!(*log.borrow(), vec![("a", false), ("b", false)]);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.toggle();
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn external_update_only_touches_flag() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        store.subscribe(move |_| *seen.borrow_mut() += 1);

        let raw = r##"{"state":{"lightsOn":false,"light":{"name":"Aqua","hex":"#2bd9fe"}},"version":3}"##;
        assert!(store.apply_external(raw));
        assert!(!store.state().lights_on);
        assert_eq!(store.state().light.name, "Pink");
        assert_eq!(*calls.borrow(), 1);
        assert!(store.backend().get(STORAGE_KEY).is_none());

        assert!(!store.apply_external(raw));
        assert!(!store.apply_external("garbage"));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn matches_current_light_by_hex() {
        let mut store = PreferenceStore::with_palette(MemoryStorage::new(), two_colors()).unwrap();
        store.state.light = ColorSpec::new("Renamed", "#00A6FF");
        store.next();
        assert_eq!(store.state().light.name, "Pink");
    }

    #[test]
    fn unmatched_light_starts_from_first() {
        let mut store = PreferenceStore::with_palette(MemoryStorage::new(), two_colors()).unwrap();
        store.state.light = ColorSpec::new("Gray", "#808080");
        store.prev();
        assert_eq!(store.state().light.name, "Blue");
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(matches!(
            PreferenceStore::with_palette(MemoryStorage::new(), Vec::new()),
            Err(StoreError::EmptyPalette)
        ));
    }
}
