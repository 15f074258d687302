//! Draft persistence.
//!
//! The form's text entries are kept as a flat JSON object under one
//! storage key so an interrupted application can be resumed later.

use std::{cell::RefCell, collections::BTreeMap};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::FormError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draft {
    fields: BTreeMap<String, String>
}

impl Draft {
    /// Collect `(name, value)` entries. A repeated name keeps its last value.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>
    {
        Self {
            fields: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect()
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Result<String, FormError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Kind of form control a saved value is restored into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Radio,
    Checkbox,
    Other
}

impl FieldKind {
    /// From an `<input type=...>` attribute (or tag name for other controls).
    pub fn from_input_type(ty: &str) -> Self {
        match ty {
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            _ => Self::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreAction<'a> {
    /// Check the radio of the group whose value matches.
    CheckRadio(&'a str),
    SetChecked(bool),
    SetValue(&'a str)
}

pub fn restore_action(kind: FieldKind, value: &str) -> RestoreAction<'_> {
    match kind {
        FieldKind::Radio => RestoreAction::CheckRadio(value),
        FieldKind::Checkbox => RestoreAction::SetChecked(value == "on"),
        FieldKind::Other => RestoreAction::SetValue(value)
    }
}

/// Key-value backend for drafts.
pub trait DraftStore {
    fn load(&self, key: &str) -> Result<Option<Draft>, FormError>;
    fn save(&self, key: &str, draft: &Draft) -> Result<(), FormError>;
    fn remove(&self, key: &str) -> Result<(), FormError>;
}

/// Process-local store, used when browser storage is unavailable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Draft>, FormError> {
        self.entries
            .borrow()
            .get(key)
            .map(|json| Draft::from_json(json))
            .transpose()
    }

    fn save(&self, key: &str, draft: &Draft) -> Result<(), FormError> {
        let json = draft.to_json()?;
        self.entries.borrow_mut().insert(key.to_string(), json);
        debug!("draft saved in memory ({} fields)", draft.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), FormError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(feature = "web")]
pub use web::{AutosaveTimer, LocalStore};

#[cfg(feature = "web")]
mod web {
    use std::cell::RefCell;

    use gloo_timers::callback::Timeout;
    use log::debug;

    use super::{Draft, DraftStore};
    use crate::error::FormError;

    /// `window.localStorage` backend.
    pub struct LocalStore {
        storage: web_sys::Storage
    }

    impl LocalStore {
        pub fn open() -> Result<Self, FormError> {
            let window = web_sys::window().ok_or(FormError::DomUnavailable)?;
            let storage = window
                .local_storage()
                .map_err(|_| FormError::Storage("localStorage access denied".into()))?
                .ok_or_else(|| FormError::Storage("localStorage missing".into()))?;
            Ok(Self { storage })
        }
    }

    impl DraftStore for LocalStore {
        fn load(&self, key: &str) -> Result<Option<Draft>, FormError> {
            let raw = self
                .storage
                .get_item(key)
                .map_err(|_| FormError::Storage(format!("getItem({key})")))?;
            raw.as_deref().map(Draft::from_json).transpose()
        }

        fn save(&self, key: &str, draft: &Draft) -> Result<(), FormError> {
            self.storage
                .set_item(key, &draft.to_json()?)
                .map_err(|_| FormError::Storage(format!("setItem({key})")))
        }

        fn remove(&self, key: &str) -> Result<(), FormError> {
            self.storage
                .remove_item(key)
                .map_err(|_| FormError::Storage(format!("removeItem({key})")))
        }
    }

    /// Debounced autosave: each `arm` cancels the pending save.
    pub struct AutosaveTimer {
        delay_ms: u32,
        pending:  RefCell<Option<Timeout>>
    }

    impl AutosaveTimer {
        pub fn new(delay_ms: u32) -> Self {
            Self {
                delay_ms,
                pending: RefCell::new(None)
            }
        }

        pub fn arm<F: FnOnce() + 'static>(&self, save: F) {
            // dropping the previous Timeout cancels it
            let timeout = Timeout::new(self.delay_ms, save);
            if self.pending.borrow_mut().replace(timeout).is_some() {
                debug!("autosave re-armed");
            }
        }

        pub fn cancel(&self) {
            self.pending.borrow_mut().take();
        }
    }
}

/// Save `draft` and log the outcome.
pub fn autosave(store: &dyn DraftStore, key: &str, draft: &Draft) -> Result<(), FormError> {
    store.save(key, draft)?;
    info!("form auto-saved");
    Ok(())
}
