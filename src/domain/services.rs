//! Tag policy and interchange services for the pin store.
//!
//! This module owns the fixed tag vocabulary with its display colors,
//! and CSV import/export of the pin list.

use super::models::{Location, Pin, PinStore};

/// Color assigned to pins whose tag list is empty or starts with an
/// unmapped tag.
pub const DEFAULT_COLOR: &str = "blue";

const TAG_COLORS: &[(&str, &str)] = &[
    ("nick", "red"),
    ("urciuoli", "gray"),
    ("finazzo", "lightblue"),
    ("morgan", "pink"),
    ("history", "green"),
    ("food", "orange"),
    ("trips", "purple"),
];

/// The closed tag vocabulary and its tag-to-color table.
///
/// The table is process-wide static configuration: tags outside it are
/// rejected at create/update time, and a pin's color is always the color of
/// its first tag (or [`DEFAULT_COLOR`] when it has none).
///
/// # Examples
///
/// ```
/// use tpins::domain::TagPalette;
///
/// assert_eq!(TagPalette::color_for("trips"), Some("purple"));
/// assert_eq!(TagPalette::color_for("castles"), None);
/// assert!(TagPalette::is_known("food"));
///
/// let tags = vec!["food".to_string(), "trips".to_string()];
/// assert_eq!(TagPalette::derive(&tags), "orange");
/// assert_eq!(TagPalette::derive(&[]), "blue");
/// ```
pub struct TagPalette;

impl TagPalette {
    /// The full vocabulary with display colors, in fixed presentation order.
    pub fn vocabulary() -> &'static [(&'static str, &'static str)] {
        TAG_COLORS
    }

    pub fn is_known(tag: &str) -> bool {
        TAG_COLORS.iter().any(|(known, _)| *known == tag)
    }

    pub fn color_for(tag: &str) -> Option<&'static str> {
        TAG_COLORS
            .iter()
            .find(|(known, _)| *known == tag)
            .map(|(_, color)| *color)
    }

    /// Derives a pin color from its tag list: first tag wins.
    pub fn derive(tags: &[String]) -> String {
        tags.first()
            .and_then(|tag| Self::color_for(tag))
            .unwrap_or(DEFAULT_COLOR)
            .to_string()
    }
}

/// CSV interchange for the pin list.
///
/// Exports one row per pin with a header line; tags are `;`-joined within
/// their column. Import parses the same shape back into a fresh store,
/// recomputing colors through the palette.
pub struct CsvExporter;

impl CsvExporter {
    pub fn export_to_csv(store: &PinStore, filename: &str) -> Result<String, String> {
        let mut writer = csv::Writer::from_path(filename).map_err(|e| e.to_string())?;

        writer
            .write_record(["title", "latitude", "longitude", "note", "tags", "color"])
            .map_err(|e| e.to_string())?;
        for pin in store.iter() {
            let lat = pin.location.lat().to_string();
            let lon = pin.location.lon().to_string();
            let tags = pin.tags.join(";");
            writer
                .write_record([
                    pin.title.as_str(),
                    lat.as_str(),
                    lon.as_str(),
                    pin.note.as_str(),
                    tags.as_str(),
                    pin.color.as_str(),
                ])
                .map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())?;
        Ok(filename.to_string())
    }

    pub fn import_from_csv(filename: &str) -> Result<PinStore, String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(filename)
            .map_err(|e| e.to_string())?;

        let mut pins = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| e.to_string())?;
            let line = row + 2;

            let title = record.get(0).unwrap_or("").trim();
            if title.is_empty() {
                return Err(format!("Line {}: missing title", line));
            }
            let lat = Self::parse_coordinate(record.get(1), "latitude", line)?;
            let lon = Self::parse_coordinate(record.get(2), "longitude", line)?;
            let note = record.get(3).unwrap_or("").trim();
            let tags: Vec<String> = record
                .get(4)
                .unwrap_or("")
                .split(';')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect();

            pins.push(Pin {
                id: 0,
                title: title.to_string(),
                location: Location(lat, lon),
                note: note.to_string(),
                color: TagPalette::derive(&tags),
                tags,
            });
        }
        Ok(PinStore::from_pins(pins))
    }

    fn parse_coordinate(field: Option<&str>, name: &str, line: usize) -> Result<f64, String> {
        let raw = field.unwrap_or("").trim();
        raw.parse::<f64>()
            .map_err(|_| format!("Line {}: invalid {} '{}'", line, name, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_table() {
        assert_eq!(TagPalette::color_for("nick"), Some("red"));
        assert_eq!(TagPalette::color_for("urciuoli"), Some("gray"));
        assert_eq!(TagPalette::color_for("finazzo"), Some("lightblue"));
        assert_eq!(TagPalette::color_for("morgan"), Some("pink"));
        assert_eq!(TagPalette::color_for("history"), Some("green"));
        assert_eq!(TagPalette::color_for("food"), Some("orange"));
        assert_eq!(TagPalette::color_for("trips"), Some("purple"));
        assert_eq!(TagPalette::color_for("unknown"), None);
    }

    #[test]
    fn test_derive_first_tag_wins() {
        let tags = vec!["trips".to_string(), "food".to_string()];
        assert_eq!(TagPalette::derive(&tags), "purple");
        assert_eq!(TagPalette::derive(&[]), DEFAULT_COLOR);
    }

    #[test]
    fn test_derive_unmapped_tag_falls_back() {
        let tags = vec!["mystery".to_string()];
        assert_eq!(TagPalette::derive(&tags), DEFAULT_COLOR);
    }

    #[test]
    fn test_vocabulary_is_closed() {
        assert_eq!(TagPalette::vocabulary().len(), 7);
        assert!(TagPalette::is_known("history"));
        assert!(!TagPalette::is_known("History"));
        assert!(!TagPalette::is_known(""));
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.csv");
        let path = path.to_str().unwrap();

        let mut store = PinStore::default();
        store
            .add(
                "Rome Trip",
                Location(41.9028, 12.4964),
                "Colosseum, then lunch",
                vec!["trips".to_string(), "food".to_string()],
            )
            .unwrap();
        store.add("North Pole", Location(90.0, 0.0), "", vec![]).unwrap();

        CsvExporter::export_to_csv(&store, path).unwrap();
        let imported = CsvExporter::import_from_csv(path).unwrap();

        assert_eq!(imported.len(), 2);
        let first = &imported.pins()[0];
        assert_eq!(first.title, "Rome Trip");
        assert_eq!(first.location, Location(41.9028, 12.4964));
        assert_eq!(first.note, "Colosseum, then lunch");
        assert_eq!(first.tags, vec!["trips".to_string(), "food".to_string()]);
        assert_eq!(first.color, "purple");
        let second = &imported.pins()[1];
        assert_eq!(second.title, "North Pole");
        assert_eq!(second.tags, Vec::<String>::new());
        assert_eq!(second.color, "blue");
    }

    #[test]
    fn test_csv_import_rejects_bad_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "title,latitude,longitude,note,tags,color\nRome,not-a-number,12.5,,,blue\n",
        )
        .unwrap();

        let result = CsvExporter::import_from_csv(path.to_str().unwrap());
        let error = result.unwrap_err();
        assert!(error.contains("invalid latitude"));
        assert!(error.contains("Line 2"));
    }

    #[test]
    fn test_csv_import_missing_file() {
        assert!(CsvExporter::import_from_csv("no/such/file.csv").is_err());
    }
}
