//! Application state management for the terminal pin manager.
//!
//! This module contains the main application state and mode management
//! for the terminal user interface.

use crate::domain::{DomainError, Location, Pin, PinId, PinStore, TagPalette};
use std::collections::VecDeque;

/// Represents the current mode of the application.
///
/// The application can be in different modes that determine how user input
/// is interpreted and what UI elements are displayed.
#[derive(Debug)]
pub enum AppMode {
    /// Normal navigation mode - arrow keys move selection, shortcuts available
    Normal,
    /// Add-pin form is open
    AddPin,
    /// Edit-pin form is open for an existing pin
    EditPin,
    /// Tag filter popup is open
    Filter,
    /// Help screen is displayed
    Help,
    /// Save dialog is open
    SaveAs,
    /// Load dialog is open
    LoadFile,
    /// CSV export dialog is open
    ExportCsv,
    /// CSV import dialog is open
    ImportCsv,
    /// Search mode - user is typing a search query
    Search,
}

/// Field focus within the add/edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Latitude,
    Longitude,
    Note,
    Tags,
}

/// Input buffers for the add/edit form.
///
/// Latitude and longitude are kept as raw text until submit; they are only
/// parsed (and bounds-checked) when creating a pin, since location is
/// immutable after creation.
#[derive(Debug, Clone)]
pub struct PinForm {
    pub title: String,
    pub latitude: String,
    pub longitude: String,
    pub note: String,
    pub tags: Vec<String>,
    pub focus: FormField,
    pub tag_cursor: usize,
}

impl Default for PinForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            note: String::new(),
            tags: Vec::new(),
            focus: FormField::Title,
            tag_cursor: 0,
        }
    }
}

impl PinForm {
    /// Pre-fills the form from an existing pin for editing.
    pub fn from_pin(pin: &Pin) -> Self {
        Self {
            title: pin.title.clone(),
            latitude: pin.location.lat().to_string(),
            longitude: pin.location.lon().to_string(),
            note: pin.note.clone(),
            tags: pin.tags.clone(),
            focus: FormField::Title,
            tag_cursor: 0,
        }
    }

    /// Moves focus to the next field. Location fields are skipped when
    /// editing an existing pin.
    pub fn next_field(&mut self, editing: bool) {
        self.focus = match self.focus {
            FormField::Title if editing => FormField::Note,
            FormField::Title => FormField::Latitude,
            FormField::Latitude => FormField::Longitude,
            FormField::Longitude => FormField::Note,
            FormField::Note => FormField::Tags,
            FormField::Tags => FormField::Title,
        };
    }

    /// Moves focus to the previous field, mirroring [`PinForm::next_field`].
    pub fn prev_field(&mut self, editing: bool) {
        self.focus = match self.focus {
            FormField::Title => FormField::Tags,
            FormField::Latitude => FormField::Title,
            FormField::Longitude => FormField::Latitude,
            FormField::Note if editing => FormField::Title,
            FormField::Note => FormField::Longitude,
            FormField::Tags => FormField::Note,
        };
    }

    pub fn focused_text(&self) -> Option<&String> {
        match self.focus {
            FormField::Title => Some(&self.title),
            FormField::Latitude => Some(&self.latitude),
            FormField::Longitude => Some(&self.longitude),
            FormField::Note => Some(&self.note),
            FormField::Tags => None,
        }
    }

    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Latitude => Some(&mut self.latitude),
            FormField::Longitude => Some(&mut self.longitude),
            FormField::Note => Some(&mut self.note),
            FormField::Tags => None,
        }
    }

    /// Toggles the vocabulary tag under the cursor in the form's tag list.
    /// Tags keep their toggle order, which decides the derived color.
    pub fn toggle_tag(&mut self) {
        let vocabulary = TagPalette::vocabulary();
        let Some((tag, _)) = vocabulary.get(self.tag_cursor) else {
            return;
        };
        if let Some(position) = self.tags.iter().position(|t| t.as_str() == *tag) {
            self.tags.remove(position);
        } else {
            self.tags.push((*tag).to_string());
        }
    }
}

/// Represents an action that can be undone/redone.
#[derive(Debug, Clone)]
pub enum UndoAction {
    /// Pin was appended at the given position
    PinAdded { index: usize, pin: Pin },
    /// Pin was removed from the given position
    PinRemoved { index: usize, pin: Pin },
    /// Pin contents were overwritten (location never changes)
    PinModified { old: Pin, new: Pin },
}

/// Main application state containing the pin store and UI state.
///
/// This structure holds all the data needed to render the terminal UI
/// and manage user interactions with the pin collection.
///
/// # Examples
///
/// ```
/// use tpins::application::App;
///
/// let app = App::default();
/// assert_eq!(app.selected, 0);
/// assert!(app.store.is_empty());
/// ```
#[derive(Debug)]
pub struct App {
    /// The authoritative pin collection for this session
    pub store: PinStore,
    /// Currently selected row, as an index into the filtered view
    pub selected: usize,
    /// Top row visible in the viewport
    pub scroll: usize,
    /// Current application mode
    pub mode: AppMode,
    /// Add/edit form buffers
    pub form: PinForm,
    /// Id of the pin being edited, None while adding
    pub editing_id: Option<PinId>,
    /// Active tag filter; empty means show everything
    pub selected_tags: Vec<String>,
    /// Cursor within the filter popup
    pub filter_cursor: usize,
    /// Cursor position within the focused text buffer
    pub cursor_position: usize,
    /// Current filename (if the store has been saved/loaded)
    pub filename: Option<String>,
    /// Input buffer for filename entry
    pub filename_input: String,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Undo stack for tracking changes
    pub undo_stack: VecDeque<UndoAction>,
    /// Redo stack for tracking undone changes
    pub redo_stack: VecDeque<UndoAction>,
    /// Search query input buffer
    pub search_query: String,
    /// Search results as pin ids
    pub search_results: Vec<PinId>,
    /// Current search result index
    pub search_result_index: usize,
    /// Viewport height in rows (for scrolling calculations)
    pub viewport_rows: usize,
}

impl Default for App {
    fn default() -> Self {
        Self {
            store: PinStore::default(),
            selected: 0,
            scroll: 0,
            mode: AppMode::Normal,
            form: PinForm::default(),
            editing_id: None,
            selected_tags: Vec::new(),
            filter_cursor: 0,
            cursor_position: 0,
            filename: None,
            filename_input: String::new(),
            status_message: None,
            help_scroll: 0,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            search_query: String::new(),
            search_results: Vec::new(),
            search_result_index: 0,
            viewport_rows: 20,
        }
    }
}

impl App {
    /// The pins currently visible under the active tag filter, in store order.
    pub fn visible_pins(&self) -> Vec<&Pin> {
        self.store.filter(&self.selected_tags)
    }

    pub fn selected_pin(&self) -> Option<&Pin> {
        self.visible_pins().get(self.selected).copied()
    }

    pub fn selected_pin_id(&self) -> Option<PinId> {
        self.selected_pin().map(|pin| pin.id)
    }

    /// Opens the add-pin form with empty buffers.
    pub fn start_add_pin(&mut self) {
        self.mode = AppMode::AddPin;
        self.form = PinForm::default();
        self.editing_id = None;
        self.cursor_position = 0;
        self.status_message = None;
    }

    /// Opens the edit form pre-filled from the selected pin.
    ///
    /// Does nothing but report when the visible list is empty.
    pub fn start_edit_pin(&mut self) {
        let Some(pin) = self.selected_pin().cloned() else {
            self.status_message = Some("No pin selected".to_string());
            return;
        };
        self.mode = AppMode::EditPin;
        self.form = PinForm::from_pin(&pin);
        self.editing_id = Some(pin.id);
        self.cursor_position = self.form.title.len();
        self.status_message = None;
    }

    /// Discards the form and returns to normal mode without touching the store.
    pub fn cancel_form(&mut self) {
        self.mode = AppMode::Normal;
        self.form = PinForm::default();
        self.editing_id = None;
        self.cursor_position = 0;
    }

    /// Applies the form as a create or update.
    ///
    /// Validation failures keep the form open and surface the message in the
    /// status bar; the store is untouched. Returns true when the store was
    /// mutated, so the caller knows to sync the backing file.
    pub fn submit_form(&mut self) -> bool {
        match self.editing_id {
            Some(id) => self.apply_edit(id),
            None => self.apply_add(),
        }
    }

    fn apply_add(&mut self) -> bool {
        let location = match self.parse_location() {
            Ok(location) => location,
            Err(message) => {
                self.status_message = Some(message);
                return false;
            }
        };

        let index = self.store.len();
        match self
            .store
            .add(&self.form.title, location, &self.form.note, self.form.tags.clone())
        {
            Ok(id) => {
                if let Some(pin) = self.store.get(id).cloned() {
                    self.status_message = Some(format!("Added pin '{}'", pin.title));
                    self.record_action(UndoAction::PinAdded { index, pin });
                }
                let position = self.visible_pins().iter().position(|pin| pin.id == id);
                if let Some(position) = position {
                    self.selected = position;
                }
                self.mode = AppMode::Normal;
                self.form = PinForm::default();
                self.cursor_position = 0;
                self.clamp_selection();
                true
            }
            Err(error) => {
                self.status_message = Some(error.to_string());
                false
            }
        }
    }

    fn apply_edit(&mut self, id: PinId) -> bool {
        let Some(old) = self.store.get(id).cloned() else {
            self.status_message = Some(DomainError::UnknownPin(id).to_string());
            self.cancel_form();
            return false;
        };

        match self
            .store
            .update(id, &self.form.title, &self.form.note, self.form.tags.clone())
        {
            Ok(()) => {
                if let Some(new) = self.store.get(id).cloned() {
                    self.status_message = Some(format!("Updated pin '{}'", new.title));
                    self.record_action(UndoAction::PinModified { old, new });
                }
                self.mode = AppMode::Normal;
                self.form = PinForm::default();
                self.editing_id = None;
                self.cursor_position = 0;
                self.clamp_selection();
                true
            }
            Err(error) => {
                self.status_message = Some(error.to_string());
                false
            }
        }
    }

    fn parse_location(&self) -> Result<Location, String> {
        let lat = self
            .form
            .latitude
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("Invalid latitude: '{}'", self.form.latitude))?;
        let lon = self
            .form
            .longitude
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("Invalid longitude: '{}'", self.form.longitude))?;
        Location::new(lat, lon).map_err(|e| e.to_string())
    }

    /// Deletes the pin under the selection in the filtered view.
    ///
    /// The filtered position is resolved to the pin's id first, so deleting
    /// through a filter always removes the pin the user is looking at.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_pin_id() else {
            self.status_message = Some("No pin selected".to_string());
            return false;
        };
        let Some(index) = self.store.position(id) else {
            return false;
        };
        match self.store.remove(id) {
            Ok(pin) => {
                self.status_message = Some(format!("Deleted pin '{}'", pin.title));
                self.record_action(UndoAction::PinRemoved { index, pin });
                self.clamp_selection();
                true
            }
            Err(error) => {
                self.status_message = Some(error.to_string());
                false
            }
        }
    }

    pub fn focus_next_form_field(&mut self) {
        self.form.next_field(self.editing_id.is_some());
        self.cursor_position = self.form.focused_text().map(String::len).unwrap_or(0);
    }

    pub fn focus_prev_form_field(&mut self) {
        self.form.prev_field(self.editing_id.is_some());
        self.cursor_position = self.form.focused_text().map(String::len).unwrap_or(0);
    }

    /// Opens the tag filter popup.
    pub fn start_filter(&mut self) {
        self.mode = AppMode::Filter;
        self.filter_cursor = 0;
        self.status_message = None;
    }

    pub fn close_filter(&mut self) {
        self.mode = AppMode::Normal;
        self.clamp_selection();
    }

    /// Tags offered in the filter popup: every tag present across the store.
    pub fn filter_options(&self) -> Vec<String> {
        self.store.distinct_tags()
    }

    pub fn toggle_filter_tag(&mut self) {
        let options = self.filter_options();
        let Some(tag) = options.get(self.filter_cursor) else {
            return;
        };
        if let Some(position) = self.selected_tags.iter().position(|t| t == tag) {
            self.selected_tags.remove(position);
        } else {
            self.selected_tags.push(tag.clone());
        }
        self.clamp_selection();
    }

    pub fn select_all_filter_tags(&mut self) {
        self.selected_tags = self.filter_options();
        self.clamp_selection();
    }

    pub fn clear_filter(&mut self) {
        self.selected_tags.clear();
        self.clamp_selection();
    }

    /// Switches to save-as mode to prompt for a filename.
    pub fn start_save_as(&mut self) {
        self.mode = AppMode::SaveAs;
        self.filename_input = self
            .filename
            .clone()
            .unwrap_or_else(|| "data/pins_data.json".to_string());
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    /// Switches to load-file mode to prompt for a filename.
    pub fn start_load_file(&mut self) {
        self.mode = AppMode::LoadFile;
        self.filename_input = self
            .filename
            .clone()
            .unwrap_or_else(|| "data/pins_data.json".to_string());
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    /// Cancels filename input and returns to normal mode.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    pub fn get_save_filename(&self) -> String {
        if self.filename_input.is_empty() {
            "data/pins_data.json".to_string()
        } else {
            self.filename_input.clone()
        }
    }

    pub fn get_load_filename(&self) -> String {
        if self.filename_input.is_empty() {
            "data/pins_data.json".to_string()
        } else {
            self.filename_input.clone()
        }
    }

    /// Filename the automatic after-mutation save writes to.
    pub fn get_autosave_filename(&self) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| "data/pins_data.json".to_string())
    }

    /// Processes the result of an explicit save operation.
    pub fn set_save_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.filename = Some(filename.clone());
                self.status_message = Some(format!("Saved to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Save failed: {}", error));
            }
        }

        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Processes the result of the automatic after-mutation save.
    ///
    /// Success keeps whatever status the mutation set; failure overrides it,
    /// since a desynced backing file is the more important message.
    pub fn set_autosave_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.filename = Some(filename);
            }
            Err(error) => {
                self.status_message = Some(format!("Save failed: {}", error));
            }
        }
    }

    /// Processes the result of a load operation, replacing the store.
    pub fn set_load_result(&mut self, result: Result<(PinStore, String), String>) {
        match result {
            Ok((store, filename)) => {
                self.store = store;
                self.filename = Some(filename.clone());
                self.selected = 0;
                self.scroll = 0;
                self.selected_tags.clear();
                self.undo_stack.clear();
                self.redo_stack.clear();
                self.status_message = Some(format!("Loaded from {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Load failed: {}", error));
            }
        }

        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Switches to CSV export mode to prompt for a filename.
    pub fn start_csv_export(&mut self) {
        self.mode = AppMode::ExportCsv;
        self.filename_input = self
            .filename
            .as_ref()
            .map(|f| f.replace(".json", ".csv"))
            .unwrap_or_else(|| "pins.csv".to_string());
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    pub fn get_csv_export_filename(&self) -> String {
        if self.filename_input.is_empty() {
            "pins.csv".to_string()
        } else {
            self.filename_input.clone()
        }
    }

    pub fn set_csv_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Exported to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Export failed: {}", error));
            }
        }

        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Switches to CSV import mode to prompt for a filename.
    pub fn start_csv_import(&mut self) {
        self.mode = AppMode::ImportCsv;
        self.filename_input = "pins.csv".to_string();
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    pub fn get_csv_import_filename(&self) -> String {
        if self.filename_input.is_empty() {
            "pins.csv".to_string()
        } else {
            self.filename_input.clone()
        }
    }

    /// Processes the result of a CSV import, replacing the store on success.
    pub fn set_csv_import_result(&mut self, result: Result<PinStore, String>) {
        match result {
            Ok(store) => {
                self.store = store;
                self.selected = 0;
                self.scroll = 0;
                self.selected_tags.clear();
                self.undo_stack.clear();
                self.redo_stack.clear();
                self.status_message = Some("CSV data imported successfully".to_string());
            }
            Err(error) => {
                self.status_message = Some(format!("Import failed: {}", error));
            }
        }

        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Records an action for undo/redo functionality.
    ///
    /// Adds the action to the undo stack and clears the redo stack.
    /// Limits the undo stack to 100 actions.
    fn record_action(&mut self, action: UndoAction) {
        const MAX_UNDO_STACK_SIZE: usize = 100;

        self.undo_stack.push_back(action);
        if self.undo_stack.len() > MAX_UNDO_STACK_SIZE {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// Reverts the last action and moves it to the redo stack.
    /// Returns true when the store changed.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.undo_stack.pop_back() else {
            return false;
        };
        match action.clone() {
            UndoAction::PinAdded { pin, .. } => {
                let _ = self.store.remove(pin.id);
            }
            UndoAction::PinRemoved { index, pin } => {
                self.store.insert(index, pin);
            }
            UndoAction::PinModified { old, .. } => {
                self.store.replace(old);
            }
        }
        self.redo_stack.push_back(action);
        self.clamp_selection();
        true
    }

    /// Reapplies the last undone action and moves it back to the undo stack.
    /// Returns true when the store changed.
    pub fn redo(&mut self) -> bool {
        let Some(action) = self.redo_stack.pop_back() else {
            return false;
        };
        match action.clone() {
            UndoAction::PinAdded { index, pin } => {
                self.store.insert(index, pin);
            }
            UndoAction::PinRemoved { pin, .. } => {
                let _ = self.store.remove(pin.id);
            }
            UndoAction::PinModified { new, .. } => {
                self.store.replace(new);
            }
        }
        self.undo_stack.push_back(action);
        self.clamp_selection();
        true
    }

    /// Starts search mode and initializes search state.
    pub fn start_search(&mut self) {
        self.mode = AppMode::Search;
        self.search_query.clear();
        self.search_results.clear();
        self.search_result_index = 0;
        self.cursor_position = 0;
        self.status_message = None;
    }

    /// Cancels search mode and returns to normal mode.
    pub fn cancel_search(&mut self) {
        self.mode = AppMode::Normal;
        self.search_query.clear();
        self.search_results.clear();
        self.search_result_index = 0;
        self.cursor_position = 0;
    }

    /// Searches title, note, and tags of the visible pins, case-insensitive.
    pub fn perform_search(&mut self) {
        self.search_results.clear();
        self.search_result_index = 0;

        if self.search_query.is_empty() {
            return;
        }

        let query = self.search_query.to_lowercase();
        let matches: Vec<PinId> = self
            .visible_pins()
            .iter()
            .filter(|pin| {
                pin.title.to_lowercase().contains(&query)
                    || pin.note.to_lowercase().contains(&query)
                    || pin.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
            })
            .map(|pin| pin.id)
            .collect();
        self.search_results = matches;

        if !self.search_results.is_empty() {
            self.go_to_current_search_result();
        }
    }

    /// Moves to the next search result.
    pub fn next_search_result(&mut self) {
        if !self.search_results.is_empty() {
            self.search_result_index = (self.search_result_index + 1) % self.search_results.len();
            self.go_to_current_search_result();
        }
    }

    /// Moves to the previous search result.
    pub fn previous_search_result(&mut self) {
        if !self.search_results.is_empty() {
            if self.search_result_index == 0 {
                self.search_result_index = self.search_results.len() - 1;
            } else {
                self.search_result_index -= 1;
            }
            self.go_to_current_search_result();
        }
    }

    /// Moves the selection to the current search result.
    fn go_to_current_search_result(&mut self) {
        let Some(&id) = self.search_results.get(self.search_result_index) else {
            return;
        };
        let position = self.visible_pins().iter().position(|pin| pin.id == id);
        if let Some(position) = position {
            self.selected = position;
            self.ensure_selected_visible();
        }
    }

    /// Finishes search and returns to normal mode while keeping the selection.
    pub fn finish_search(&mut self) {
        self.mode = AppMode::Normal;

        let num_results = self.search_results.len();
        if num_results > 0 {
            self.status_message = Some(format!(
                "Search completed: {} result{} found for '{}'",
                num_results,
                if num_results == 1 { "" } else { "s" },
                self.search_query
            ));
        } else {
            self.status_message = Some(format!("No results found for '{}'", self.search_query));
        }

        self.search_query.clear();
        self.cursor_position = 0;
    }

    /// Updates the viewport size for proper scrolling calculations.
    pub fn update_viewport_size(&mut self, rows: usize) {
        self.viewport_rows = rows;
    }

    /// Keeps the selection inside the visible list after it shrinks.
    pub fn clamp_selection(&mut self) {
        let len = self.visible_pins().len();
        if len == 0 {
            self.selected = 0;
            self.scroll = 0;
            return;
        }
        if self.selected >= len {
            self.selected = len - 1;
        }
        self.ensure_selected_visible();
    }

    /// Ensures the selected row is visible by adjusting the scroll position.
    pub fn ensure_selected_visible(&mut self) {
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + self.viewport_rows {
            self.scroll = (self.selected + 1).saturating_sub(self.viewport_rows.max(1));
        }
    }
}
