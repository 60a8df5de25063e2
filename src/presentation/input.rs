use crate::application::{App, AppMode, FormField};
use crate::domain::{CsvExporter, TagPalette};
use crate::infrastructure::FileRepository;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::AddPin | AppMode::EditPin => Self::handle_form_mode(app, key),
            AppMode::Filter => Self::handle_filter_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::SaveAs => Self::handle_filename_input_mode(app, key, "save"),
            AppMode::LoadFile => Self::handle_filename_input_mode(app, key, "load"),
            AppMode::ExportCsv => Self::handle_filename_input_mode(app, key, "csv_export"),
            AppMode::ImportCsv => Self::handle_filename_input_mode(app, key, "csv_import"),
            AppMode::Search => Self::handle_search_mode(app, key),
        }
    }

    /// Rewrites the backing file after a store mutation, so memory and disk
    /// stay in sync without an explicit save step.
    fn persist(app: &mut App) {
        let filename = app.get_autosave_filename();
        let result =
            FileRepository::save_pins(&app.store, &filename).map_err(|e| e.to_string());
        app.set_autosave_result(result);
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') => {
                    app.start_save_as();
                    return;
                }
                KeyCode::Char('o') => {
                    app.start_load_file();
                    return;
                }
                KeyCode::Char('e') => {
                    app.start_csv_export();
                    return;
                }
                KeyCode::Char('i') | KeyCode::Char('l') => {
                    app.start_csv_import();
                    return;
                }
                KeyCode::Char('z') => {
                    if app.undo() {
                        Self::persist(app);
                    }
                    return;
                }
                KeyCode::Char('y') => {
                    if app.redo() {
                        Self::persist(app);
                    }
                    return;
                }
                _ => {}
            }
        }

        app.status_message = None;

        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                if app.selected > 0 {
                    app.selected -= 1;
                    app.ensure_selected_visible();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if app.selected + 1 < app.visible_pins().len() {
                    app.selected += 1;
                    app.ensure_selected_visible();
                }
            }
            KeyCode::Home | KeyCode::Char('g') => {
                app.selected = 0;
                app.ensure_selected_visible();
            }
            KeyCode::End | KeyCode::Char('G') => {
                let len = app.visible_pins().len();
                if len > 0 {
                    app.selected = len - 1;
                    app.ensure_selected_visible();
                }
            }
            KeyCode::PageUp => {
                app.selected = app.selected.saturating_sub(app.viewport_rows);
                app.ensure_selected_visible();
            }
            KeyCode::PageDown => {
                let len = app.visible_pins().len();
                if len > 0 {
                    app.selected = (app.selected + app.viewport_rows).min(len - 1);
                    app.ensure_selected_visible();
                }
            }
            KeyCode::Char('a') => {
                app.start_add_pin();
            }
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::F(2) => {
                app.start_edit_pin();
            }
            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                if app.delete_selected() {
                    Self::persist(app);
                }
            }
            KeyCode::Char('f') => {
                app.start_filter();
            }
            KeyCode::Char('/') => {
                app.start_search();
            }
            KeyCode::Char('n') => {
                if !app.search_results.is_empty() {
                    app.next_search_result();
                }
            }
            KeyCode::Char('N') => {
                if !app.search_results.is_empty() {
                    app.previous_search_result();
                }
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_form_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                if app.submit_form() {
                    Self::persist(app);
                }
            }
            KeyCode::Esc => {
                app.cancel_form();
            }
            KeyCode::Tab | KeyCode::Down => {
                app.focus_next_form_field();
            }
            KeyCode::BackTab | KeyCode::Up => {
                app.focus_prev_form_field();
            }
            key if app.form.focus == FormField::Tags => match key {
                KeyCode::Left => {
                    if app.form.tag_cursor > 0 {
                        app.form.tag_cursor -= 1;
                    }
                }
                KeyCode::Right => {
                    if app.form.tag_cursor + 1 < TagPalette::vocabulary().len() {
                        app.form.tag_cursor += 1;
                    }
                }
                KeyCode::Char(' ') => {
                    app.form.toggle_tag();
                }
                _ => {}
            },
            KeyCode::Backspace => {
                let cursor = app.cursor_position;
                if let Some(text) = app.form.focused_text_mut() {
                    if cursor > 0 && cursor <= text.len() {
                        text.remove(cursor - 1);
                        app.cursor_position -= 1;
                    }
                }
            }
            KeyCode::Delete => {
                let cursor = app.cursor_position;
                if let Some(text) = app.form.focused_text_mut() {
                    if cursor < text.len() {
                        text.remove(cursor);
                    }
                }
            }
            KeyCode::Left => {
                if app.cursor_position > 0 {
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Right => {
                if let Some(text) = app.form.focused_text() {
                    if app.cursor_position < text.len() {
                        app.cursor_position += 1;
                    }
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.form.focused_text().map(String::len).unwrap_or(0);
            }
            KeyCode::Char(c) => {
                let cursor = app.cursor_position;
                if let Some(text) = app.form.focused_text_mut() {
                    text.insert(cursor.min(text.len()), c);
                    app.cursor_position += 1;
                }
            }
            _ => {}
        }
    }

    fn handle_filter_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('f') => {
                app.close_filter();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.filter_cursor > 0 {
                    app.filter_cursor -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if app.filter_cursor + 1 < app.filter_options().len() {
                    app.filter_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                app.toggle_filter_tag();
            }
            KeyCode::Char('a') => {
                app.select_all_filter_tags();
            }
            KeyCode::Char('c') => {
                app.clear_filter();
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.help_scroll > 0 {
                    app.help_scroll -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode, mode: &str) {
        match key {
            KeyCode::Enter => {
                match mode {
                    "save" => {
                        let filename = app.get_save_filename();
                        let result = FileRepository::save_pins(&app.store, &filename)
                            .map_err(|e| e.to_string());
                        app.set_save_result(result);
                    }
                    "load" => {
                        let filename = app.get_load_filename();
                        let result =
                            FileRepository::load_pins(&filename).map_err(|e| e.to_string());
                        app.set_load_result(result);
                    }
                    "csv_export" => {
                        let filename = app.get_csv_export_filename();
                        let result = CsvExporter::export_to_csv(&app.store, &filename);
                        app.set_csv_export_result(result);
                    }
                    "csv_import" => {
                        let filename = app.get_csv_import_filename();
                        let result = CsvExporter::import_from_csv(&filename);
                        let imported = result.is_ok();
                        app.set_csv_import_result(result);
                        if imported {
                            Self::persist(app);
                        }
                    }
                    _ => {}
                }
            }
            KeyCode::Esc => {
                app.cancel_filename_input();
            }
            KeyCode::Backspace => {
                if app.cursor_position > 0 {
                    app.filename_input.remove(app.cursor_position - 1);
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Delete => {
                if app.cursor_position < app.filename_input.len() {
                    app.filename_input.remove(app.cursor_position);
                }
            }
            KeyCode::Left => {
                if app.cursor_position > 0 {
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Right => {
                if app.cursor_position < app.filename_input.len() {
                    app.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.filename_input.len();
            }
            KeyCode::Char(c) => {
                app.filename_input.insert(app.cursor_position, c);
                app.cursor_position += 1;
            }
            _ => {}
        }
    }

    fn handle_search_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                app.perform_search();
                app.finish_search();
            }
            KeyCode::Esc => {
                app.cancel_search();
            }
            KeyCode::Backspace => {
                if app.cursor_position > 0 {
                    app.search_query.remove(app.cursor_position - 1);
                    app.cursor_position -= 1;
                    app.perform_search();
                }
            }
            KeyCode::Delete => {
                if app.cursor_position < app.search_query.len() {
                    app.search_query.remove(app.cursor_position);
                    app.perform_search();
                }
            }
            KeyCode::Left => {
                if app.cursor_position > 0 {
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Right => {
                if app.cursor_position < app.search_query.len() {
                    app.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.search_query.len();
            }
            KeyCode::Down | KeyCode::Char('n') => {
                app.next_search_result();
            }
            KeyCode::Up | KeyCode::Char('p') => {
                app.previous_search_result();
            }
            KeyCode::Char(c) => {
                app.search_query.insert(app.cursor_position, c);
                app.cursor_position += 1;
                app.perform_search();
            }
            _ => {}
        }
    }
}
