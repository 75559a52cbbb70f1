//! Bounded, ordered list of recently viewed cities with one active selection.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Maximum number of cities kept in the watchlist.
pub const CAPACITY: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    /// Identity key, compared case-insensitively.
    pub name: String,
    pub temperature: f64,
    /// Local display time, "HH:MM".
    pub time: String,
    pub weather_code: i32,
    pub active: bool,
}

impl CityEntry {
    fn placeholder(
        name: &str,
        temperature: f64,
        time: &str,
        weather_code: i32,
        active: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            temperature,
            time: time.to_string(),
            weather_code,
            active,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Fresh readings for one city, applied by [`upsert_entries`].
#[derive(Debug, Clone, PartialEq)]
pub struct CityUpdate {
    pub name: String,
    pub temperature: f64,
    pub time: String,
    pub weather_code: i32,
}

/// Apply `update` to `entries` and return the new ordered list.
///
/// Every entry is deactivated first. A case-insensitive match is updated in
/// place and keeps its position; otherwise the city is inserted at the front
/// and the tail is truncated to `capacity`.
pub fn upsert_entries(
    entries: &[CityEntry],
    update: CityUpdate,
    capacity: usize,
) -> Vec<CityEntry> {
    let mut next = entries.to_vec();
    for entry in &mut next {
        entry.active = false;
    }

    if let Some(existing) = next.iter_mut().find(|entry| entry.matches(&update.name)) {
        existing.temperature = update.temperature;
        existing.time = update.time;
        existing.weather_code = update.weather_code;
        existing.active = true;
        return next;
    }

    let entry = CityEntry {
        name: update.name,
        temperature: update.temperature,
        time: update.time,
        weather_code: update.weather_code,
        active: true,
    };
    next.insert(0, entry);
    next.truncate(capacity);
    next
}

#[derive(Debug, Clone, PartialEq)]
pub struct Watchlist {
    entries: Vec<CityEntry>,
}

impl Watchlist {
    /// Startup placeholders, shown before any search completes.
    pub fn seeded() -> Self {
        Self {
            entries: vec![
                CityEntry::placeholder("kolwezi", 18.0, "09:23", 3, true),
                CityEntry::placeholder("Likasi", 22.0, "10:23", 2, false),
                CityEntry::placeholder("Kipushi", 25.0, "17:23", 0, false),
            ],
        }
    }

    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn upsert(
        &mut self,
        name: &str,
        temperature: f64,
        time: &str,
        weather_code: i32,
    ) -> &[CityEntry] {
        let update = CityUpdate {
            name: name.to_string(),
            temperature,
            time: time.to_string(),
            weather_code,
        };
        self.entries = upsert_entries(&self.entries, update, CAPACITY);
        &self.entries
    }

    pub fn entries(&self) -> &[CityEntry] {
        &self.entries
    }

    pub fn active(&self) -> Option<&CityEntry> {
        self.entries.iter().find(|entry| entry.active)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_shared(self) -> SharedWatchlist {
        Arc::new(Mutex::new(self))
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Watchlist shared between writers; each upsert runs under the lock.
pub type SharedWatchlist = Arc<Mutex<Watchlist>>;
