use crate::application::{App, AppMode, FormField};
use crate::domain::{Pin, TagPalette};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_pin_table(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    match app.mode {
        AppMode::Help => render_help_popup(f, app.help_scroll),
        AppMode::AddPin | AppMode::EditPin => render_form_popup(f, app),
        AppMode::Filter => render_filter_popup(f, app),
        _ => {}
    }
}

/// Terminal color used to tint a row with the pin's marker color.
fn marker_color(name: &str) -> Color {
    match name {
        "red" => Color::Red,
        "gray" => Color::Gray,
        "lightblue" => Color::LightBlue,
        "pink" => Color::LightMagenta,
        "green" => Color::Green,
        "orange" => Color::Rgb(255, 165, 0),
        "purple" => Color::Magenta,
        _ => Color::Blue,
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let filter = if app.selected_tags.is_empty() {
        "all".to_string()
    } else {
        app.selected_tags.join(", ")
    };
    let header = Paragraph::new(format!(
        "tpins - Terminal Map Pins | {}/{} pins | filter: {}",
        app.visible_pins().len(),
        app.store.len(),
        filter
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_pin_table(f: &mut Frame, app: &App, area: Rect) {
    let visible_rows = area.height.saturating_sub(3) as usize;
    let pins = app.visible_pins();

    let header_style = Style::default().fg(Color::Yellow);
    let header = Row::new(vec![
        Cell::from("Title").style(header_style),
        Cell::from("Lat").style(header_style),
        Cell::from("Lon").style(header_style),
        Cell::from("Tags").style(header_style),
        Cell::from("Note").style(header_style),
    ])
    .height(1);

    let mut rows = vec![header];
    for (index, pin) in pins
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(visible_rows)
    {
        let style = if index == app.selected {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(marker_color(&pin.color))
        };
        rows.push(pin_row(pin).style(style));
    }

    let widths = [
        Constraint::Percentage(24),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Percentage(22),
        Constraint::Percentage(34),
    ];
    let table = Table::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title("Pins"))
        .column_spacing(1);

    f.render_widget(table, area);
}

fn pin_row(pin: &Pin) -> Row<'_> {
    Row::new(vec![
        Cell::from(pin.title.as_str()),
        Cell::from(format!("{:.5}", pin.location.lat())),
        Cell::from(format!("{:.5}", pin.location.lon())),
        Cell::from(pin.tags.join(", ")),
        Cell::from(pin.note.as_str()),
    ])
    .height(1)
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                let filename = app.filename.as_deref().unwrap_or("unsaved");
                format!(
                    "File: {} | a: add | Enter: edit | d: delete | f: filter | /: search | Ctrl+S: save | Ctrl+O: load | Ctrl+E: export CSV | Ctrl+I: import CSV | F1/?: help | q: quit",
                    filename
                )
            }
        }
        AppMode::AddPin => {
            "Add pin: Tab next field, Space toggles tag, Enter to save, Esc to cancel".to_string()
        }
        AppMode::EditPin => {
            "Edit pin: Tab next field, Space toggles tag, Enter to save, Esc to cancel".to_string()
        }
        AppMode::Filter => {
            "Filter tags: Space toggle, a all, c clear, Enter/Esc to close".to_string()
        }
        AppMode::Help => {
            "Up/Down/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
        }
        AppMode::SaveAs => format!("Save as: {} (Enter to save, Esc to cancel)", app.filename_input),
        AppMode::LoadFile => format!("Load file: {} (Enter to load, Esc to cancel)", app.filename_input),
        AppMode::ExportCsv => format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input),
        AppMode::ImportCsv => format!("Import CSV from: {} (Enter to import, Esc to cancel)", app.filename_input),
        AppMode::Search => format!(
            "Search: {} ({} match{}) (Enter to finish, Esc to cancel)",
            app.search_query,
            app.search_results.len(),
            if app.search_results.len() == 1 { "" } else { "es" }
        ),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::AddPin | AppMode::EditPin => Style::default().fg(Color::Green),
            AppMode::Filter => Style::default().fg(Color::Magenta),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::SaveAs => Style::default().fg(Color::Yellow),
            AppMode::LoadFile => Style::default().fg(Color::Yellow),
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
            AppMode::ImportCsv => Style::default().fg(Color::Green),
            AppMode::Search => Style::default().fg(Color::Green),
        });
    f.render_widget(input, area);
}

fn render_form_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 8,
        y: area.height / 6,
        width: area.width * 3 / 4,
        height: (area.height * 2 / 3).max(10),
    };

    f.render_widget(Clear, popup_area);

    let editing = matches!(app.mode, AppMode::EditPin);
    let title = if editing { "Edit Pin" } else { "Add Pin" };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().fg(Color::Green));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // latitude
            Constraint::Length(1), // longitude
            Constraint::Length(1), // note
            Constraint::Length(1), // spacer
            Constraint::Length(1), // tags
            Constraint::Min(0),
        ])
        .split(inner);

    render_form_text_field(f, rows[0], "Title", &app.form.title, app.form.focus == FormField::Title);
    let location_locked = editing;
    render_form_location_field(
        f,
        rows[1],
        "Latitude",
        &app.form.latitude,
        app.form.focus == FormField::Latitude,
        location_locked,
    );
    render_form_location_field(
        f,
        rows[2],
        "Longitude",
        &app.form.longitude,
        app.form.focus == FormField::Longitude,
        location_locked,
    );
    render_form_text_field(f, rows[3], "Note", &app.form.note, app.form.focus == FormField::Note);
    render_form_tags_field(f, rows[5], app);
}

fn render_form_text_field(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let marker = if focused { ">" } else { " " };
    let field = Paragraph::new(format!("{} {:<10} {}", marker, format!("{}:", label), value))
        .style(style);
    f.render_widget(field, area);
}

fn render_form_location_field(
    f: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    locked: bool,
) {
    if locked {
        let field = Paragraph::new(format!("  {:<10} {} (fixed)", format!("{}:", label), value))
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(field, area);
    } else {
        render_form_text_field(f, area, label, value, focused);
    }
}

fn render_form_tags_field(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.form.focus == FormField::Tags;
    let marker = if focused { ">" } else { " " };
    let mut spans = vec![Span::raw(format!("{} {:<10} ", marker, "Tags:"))];

    for (index, (tag, color)) in TagPalette::vocabulary().iter().enumerate() {
        let checked = app.form.tags.iter().any(|t| t.as_str() == *tag);
        let box_mark = if checked { "[x]" } else { "[ ]" };
        let style = if focused && index == app.form.tag_cursor {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(marker_color(color))
        };
        spans.push(Span::styled(format!("{} {}", box_mark, tag), style));
        spans.push(Span::raw("  "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_filter_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 4,
        y: area.height / 6,
        width: area.width / 2,
        height: (area.height * 2 / 3).max(6),
    };

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Filter by Tags")
        .style(Style::default().fg(Color::Magenta));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let options = app.filter_options();
    if options.is_empty() {
        let empty = Paragraph::new("No tags yet - tagged pins will show up here")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, inner);
        return;
    }

    let mut lines = Vec::new();
    for (index, tag) in options.iter().enumerate().take(inner.height as usize) {
        let checked = app.selected_tags.contains(tag);
        let box_mark = if checked { "[x]" } else { "[ ]" };
        let style = if index == app.filter_cursor {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(marker_color(
                TagPalette::color_for(tag).unwrap_or("blue"),
            ))
        };
        lines.push(Line::from(Span::styled(
            format!("{} {}", box_mark, tag),
            style,
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("tpins Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> String {
    r#"TPINS REFERENCE

=== BASIC CONCEPTS ===
- A pin is a labeled, located, tagged map annotation
- Pins keep their creation order in the list and in the data file
- Every change is written back to the data file immediately
- Tags come from a fixed vocabulary; the first tag decides the pin color
  nick=red urciuoli=gray finazzo=lightblue morgan=pink
  history=green food=orange trips=purple (no tags: blue)

=== NAVIGATION ===
Arrow keys / jk  Move selection up/down
Home / g         Jump to first pin
End / G          Jump to last pin
PgUp / PgDn      Move a page at a time

=== PIN OPERATIONS ===
a                Add a pin (title, latitude, longitude, note, tags)
Enter / e / F2   Edit the selected pin (location is fixed after creation)
d / Del          Delete the selected pin
Ctrl+Z           Undo last add/edit/delete
Ctrl+Y           Redo

=== FORMS ===
Tab / Shift+Tab  Move between fields
Space            Toggle the highlighted tag (in the tag row)
Enter            Save the pin
Esc              Cancel without saving
A pin needs a non-empty title; latitude must be in [-90, 90] and
longitude in [-180, 180].

=== FILTERING ===
f                Open the tag filter
Space            Toggle a tag in the filter
a / c            Select all / clear the filter
With no tags selected every pin is shown; otherwise a pin is shown
when it carries at least one selected tag. Edits and deletes apply
to the pin you see, also while a filter is active.

=== SEARCH ===
/                Search title, note, and tags while you type
n / N            Next / previous match (also after closing search)
Enter / Esc      Keep selection / cancel

=== FILE OPERATIONS ===
Ctrl+S           Save pins to a file
Ctrl+O           Load pins from a file
Ctrl+E           Export pins to a CSV file
Ctrl+I           Import pins from a CSV file
Pins are stored as a JSON array in "data/pins_data.json" by default,
and the file is rewritten after every change.

=== HELP NAVIGATION ===
Up/Down or j/k   Scroll help text up/down one line
Page Up/Down     Scroll help text up/down 5 lines
Home             Jump to top of help text
Esc/F1/?/q       Close this help window"#.to_string()
}
