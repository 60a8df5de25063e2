use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};
use super::services::TagPalette;

/// Stable identifier assigned to a pin when it enters a store.
/// Ids are monotonic per store and never reused, even after deletion.
pub type PinId = u64;

/// Geographic coordinate pair, serialized as a `[lat, lon]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location(pub f64, pub f64);

impl Location {
    pub fn new(lat: f64, lon: f64) -> DomainResult<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(DomainError::LongitudeOutOfRange(lon));
        }
        Ok(Self(lat, lon))
    }

    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lon(&self) -> f64 {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    #[serde(skip)]
    pub id: PinId,
    pub title: String,
    pub location: Location,
    pub note: String,
    pub tags: Vec<String>,
    pub color: String,
}

/// Ordered pin collection. Insertion order is display and persistence order.
#[derive(Debug, Clone, Default)]
pub struct PinStore {
    pins: Vec<Pin>,
    next_id: PinId,
}

impl PinStore {
    /// Rebuilds a store from deserialized pins, assigning fresh ids in order.
    pub fn from_pins(pins: Vec<Pin>) -> Self {
        let mut store = Self::default();
        for mut pin in pins {
            pin.id = store.next_id;
            store.next_id += 1;
            store.pins.push(pin);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter()
    }

    pub fn get(&self, id: PinId) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.id == id)
    }

    pub fn position(&self, id: PinId) -> Option<usize> {
        self.pins.iter().position(|pin| pin.id == id)
    }

    /// Appends a new pin with its color derived from the first tag.
    pub fn add(
        &mut self,
        title: &str,
        location: Location,
        note: &str,
        tags: Vec<String>,
    ) -> DomainResult<PinId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::EmptyTitle);
        }
        Self::validate_tags(&tags)?;

        let id = self.next_id;
        self.next_id += 1;
        self.pins.push(Pin {
            id,
            title: title.to_string(),
            location,
            note: note.trim().to_string(),
            tags: tags.clone(),
            color: TagPalette::derive(&tags),
        });
        Ok(id)
    }

    /// Overwrites title, note, and tags of an existing pin and recomputes its
    /// color. Location is immutable once created.
    pub fn update(
        &mut self,
        id: PinId,
        title: &str,
        note: &str,
        tags: Vec<String>,
    ) -> DomainResult<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::EmptyTitle);
        }
        Self::validate_tags(&tags)?;

        let pin = self
            .pins
            .iter_mut()
            .find(|pin| pin.id == id)
            .ok_or(DomainError::UnknownPin(id))?;
        pin.title = title.to_string();
        pin.note = note.trim().to_string();
        pin.color = TagPalette::derive(&tags);
        pin.tags = tags;
        Ok(())
    }

    pub fn remove(&mut self, id: PinId) -> DomainResult<Pin> {
        let index = self.position(id).ok_or(DomainError::UnknownPin(id))?;
        Ok(self.pins.remove(index))
    }

    /// Reinserts a previously removed pin at its old index, keeping its id.
    pub fn insert(&mut self, index: usize, pin: Pin) {
        self.next_id = self.next_id.max(pin.id + 1);
        let index = index.min(self.pins.len());
        self.pins.insert(index, pin);
    }

    /// Swaps in a full pin record by id. Returns false if the id is gone.
    pub fn replace(&mut self, pin: Pin) -> bool {
        match self.pins.iter_mut().find(|slot| slot.id == pin.id) {
            Some(slot) => {
                *slot = pin;
                true
            }
            None => false,
        }
    }

    /// Pins matching the tag selection, original order preserved. An empty
    /// selection matches everything; otherwise any tag overlap is enough.
    pub fn filter(&self, selected: &[String]) -> Vec<&Pin> {
        self.pins
            .iter()
            .filter(|pin| {
                selected.is_empty() || pin.tags.iter().any(|tag| selected.contains(tag))
            })
            .collect()
    }

    /// All tag strings present across the store, sorted lexicographically.
    pub fn distinct_tags(&self) -> Vec<String> {
        let tags: BTreeSet<&str> = self
            .pins
            .iter()
            .flat_map(|pin| pin.tags.iter())
            .map(String::as_str)
            .collect();
        tags.into_iter().map(str::to_string).collect()
    }

    fn validate_tags(tags: &[String]) -> DomainResult<()> {
        for tag in tags {
            if !TagPalette::is_known(tag) {
                return Err(DomainError::UnknownTag(tag.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rome() -> Location {
        Location(41.9028, 12.4964)
    }

    #[test]
    fn test_add_appends_and_derives_color() {
        let mut store = PinStore::default();
        let id = store
            .add("Rome Trip", rome(), "Colosseum visit", vec!["trips".to_string()])
            .unwrap();

        assert_eq!(store.len(), 1);
        let pin = store.get(id).unwrap();
        assert_eq!(pin.title, "Rome Trip");
        assert_eq!(pin.color, "purple");
        assert_eq!(store.distinct_tags(), vec!["trips".to_string()]);
    }

    #[test]
    fn test_add_is_ordered() {
        let mut store = PinStore::default();
        store.add("First", rome(), "", vec![]).unwrap();
        store.add("Second", rome(), "", vec![]).unwrap();
        store.add("Third", rome(), "", vec![]).unwrap();

        let titles: Vec<&str> = store.iter().map(|pin| pin.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_add_trims_title_and_note() {
        let mut store = PinStore::default();
        let id = store.add("  Rome  ", rome(), "  note  ", vec![]).unwrap();
        let pin = store.get(id).unwrap();
        assert_eq!(pin.title, "Rome");
        assert_eq!(pin.note, "note");
    }

    #[test]
    fn test_add_empty_title_rejected() {
        let mut store = PinStore::default();
        assert_eq!(store.add("", rome(), "", vec![]), Err(DomainError::EmptyTitle));
        assert_eq!(store.add("   ", rome(), "", vec![]), Err(DomainError::EmptyTitle));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_unknown_tag_rejected() {
        let mut store = PinStore::default();
        let result = store.add("Rome", rome(), "", vec!["castles".to_string()]);
        assert_eq!(result, Err(DomainError::UnknownTag("castles".to_string())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_no_tags_gets_default_color() {
        let mut store = PinStore::default();
        let id = store.add("Nowhere", Location(0.0, 0.0), "", vec![]).unwrap();
        assert_eq!(store.get(id).unwrap().color, "blue");
    }

    #[test]
    fn test_first_tag_wins_for_color() {
        let mut store = PinStore::default();
        let id = store
            .add(
                "Lunch",
                rome(),
                "",
                vec!["food".to_string(), "trips".to_string()],
            )
            .unwrap();
        assert_eq!(store.get(id).unwrap().color, "orange");
    }

    #[test]
    fn test_location_bounds() {
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(-90.0, -180.0).is_ok());
        assert_eq!(
            Location::new(90.5, 0.0),
            Err(DomainError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            Location::new(0.0, -180.5),
            Err(DomainError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn test_update_changes_fields_but_not_location() {
        let mut store = PinStore::default();
        store.add("Other", Location(1.0, 2.0), "", vec![]).unwrap();
        let id = store
            .add("Rome Trip", rome(), "old note", vec!["trips".to_string()])
            .unwrap();

        store
            .update(id, "Rome 2024", "new note", vec!["history".to_string()])
            .unwrap();

        let pin = store.get(id).unwrap();
        assert_eq!(pin.title, "Rome 2024");
        assert_eq!(pin.note, "new note");
        assert_eq!(pin.tags, vec!["history".to_string()]);
        assert_eq!(pin.color, "green");
        assert_eq!(pin.location, rome());

        let other = &store.pins()[0];
        assert_eq!(other.title, "Other");
        assert_eq!(other.location, Location(1.0, 2.0));
    }

    #[test]
    fn test_update_to_empty_tags_reverts_to_default_color() {
        let mut store = PinStore::default();
        let id = store
            .add("Lunch", rome(), "", vec!["food".to_string()])
            .unwrap();
        store.update(id, "Lunch", "", vec![]).unwrap();
        assert_eq!(store.get(id).unwrap().color, "blue");
    }

    #[test]
    fn test_update_empty_title_rejected() {
        let mut store = PinStore::default();
        let id = store.add("Keep me", rome(), "", vec![]).unwrap();
        assert_eq!(
            store.update(id, "  ", "", vec![]),
            Err(DomainError::EmptyTitle)
        );
        assert_eq!(store.get(id).unwrap().title, "Keep me");
    }

    #[test]
    fn test_update_unknown_pin() {
        let mut store = PinStore::default();
        assert_eq!(
            store.update(7, "x", "", vec![]),
            Err(DomainError::UnknownPin(7))
        );
    }

    #[test]
    fn test_remove_shifts_positions() {
        let mut store = PinStore::default();
        let a = store.add("A", rome(), "", vec![]).unwrap();
        let b = store.add("B", rome(), "", vec![]).unwrap();
        let c = store.add("C", rome(), "", vec![]).unwrap();

        let removed = store.remove(b).unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(store.len(), 2);
        assert_eq!(store.position(a), Some(0));
        assert_eq!(store.position(c), Some(1));
        assert_eq!(store.remove(b), Err(DomainError::UnknownPin(b)));
    }

    #[test]
    fn test_ids_never_reused_after_removal() {
        let mut store = PinStore::default();
        let a = store.add("A", rome(), "", vec![]).unwrap();
        store.remove(a).unwrap();
        let b = store.add("B", rome(), "", vec![]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_insert_restores_pin_with_id() {
        let mut store = PinStore::default();
        let a = store.add("A", rome(), "", vec![]).unwrap();
        let b = store.add("B", rome(), "", vec![]).unwrap();
        let removed = store.remove(a).unwrap();

        store.insert(0, removed);
        assert_eq!(store.position(a), Some(0));
        assert_eq!(store.position(b), Some(1));

        // A later add must not collide with the restored id.
        let c = store.add("C", rome(), "", vec![]).unwrap();
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn test_filter_empty_selection_returns_all() {
        let mut store = PinStore::default();
        store.add("A", rome(), "", vec!["history".to_string()]).unwrap();
        store.add("B", rome(), "", vec![]).unwrap();

        let all = store.filter(&[]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "A");
        assert_eq!(all[1].title, "B");
    }

    #[test]
    fn test_filter_matches_any_selected_tag() {
        let mut store = PinStore::default();
        store.add("A", rome(), "", vec!["history".to_string()]).unwrap();
        store
            .add(
                "B",
                rome(),
                "",
                vec!["food".to_string(), "trips".to_string()],
            )
            .unwrap();

        let food = store.filter(&["food".to_string()]);
        assert_eq!(food.len(), 1);
        assert_eq!(food[0].title, "B");

        let both = store.filter(&["history".to_string(), "food".to_string()]);
        assert_eq!(both.len(), 2);
        assert_eq!(both[0].title, "A");
    }

    #[test]
    fn test_filter_excludes_untagged_pins_when_selection_active() {
        let mut store = PinStore::default();
        store.add("Tagged", rome(), "", vec!["food".to_string()]).unwrap();
        store.add("Untagged", rome(), "", vec![]).unwrap();

        let filtered = store.filter(&["food".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Tagged");
    }

    #[test]
    fn test_distinct_tags_sorted() {
        let mut store = PinStore::default();
        store
            .add(
                "A",
                rome(),
                "",
                vec!["trips".to_string(), "food".to_string()],
            )
            .unwrap();
        store.add("B", rome(), "", vec!["history".to_string()]).unwrap();
        store.add("C", rome(), "", vec!["food".to_string()]).unwrap();

        assert_eq!(
            store.distinct_tags(),
            vec![
                "food".to_string(),
                "history".to_string(),
                "trips".to_string()
            ]
        );
    }

    #[test]
    fn test_from_pins_assigns_sequential_ids() {
        let pins = vec![
            Pin {
                id: 0,
                title: "A".to_string(),
                location: Location(1.0, 2.0),
                note: String::new(),
                tags: vec![],
                color: "blue".to_string(),
            },
            Pin {
                id: 0,
                title: "B".to_string(),
                location: Location(3.0, 4.0),
                note: String::new(),
                tags: vec![],
                color: "blue".to_string(),
            },
        ];

        let mut store = PinStore::from_pins(pins);
        assert_eq!(store.pins()[0].id, 0);
        assert_eq!(store.pins()[1].id, 1);

        let c = store.add("C", Location(0.0, 0.0), "", vec![]).unwrap();
        assert_eq!(c, 2);
    }
}
