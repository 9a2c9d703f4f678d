use std::mem;
use std::path::PathBuf;

use anyhow::{Context, Error, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::calendar::Clock;
use crate::config::AppConfig;
use crate::export::{export_snapshot, open_export};
use crate::invoice::InvoiceSnapshot;
use crate::items::LineItemEditor;
use crate::logo::Logo;
use crate::models::{InvoiceDetails, LineField, LineItem};
use crate::preferences::Preferences;
use crate::sequence::{InvoiceNumber, SequenceGenerator};
use crate::store::SettingsStore;
use crate::totals::{format_amount, format_decimal};

use super::forms::{ColorField, ColorForm, DetailsField, DetailsForm, ItemForm, LogoForm};
use super::helpers::{centered_rect, fit, fit_right, rgb, surface_error, Palette};
use super::screens::{EditorScreen, PreviewScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows taken by the details panel (four fields plus borders).
const DETAILS_HEIGHT: u16 = 6;
/// Column widths of the item table.
const QTY_WIDTH: usize = 6;
const MONEY_WIDTH: usize = 14;

/// High-level navigation states.
enum Screen {
    Editor,
    Preview(PreviewScreen),
}

/// Modal interactions layered over the current screen.
enum Mode {
    Normal,
    EditingItem(ItemForm),
    EditingDetails(DetailsForm),
    EditingColors(ColorForm),
    LoadingLogo(LogoForm),
    ConfirmSequenceReset,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the invoice being edited, the numbering, the
/// persisted preferences and the active screen.
pub struct App<S: SettingsStore, C: Clock> {
    store: S,
    sequence: SequenceGenerator<C>,
    preferences: Preferences,
    details: InvoiceDetails,
    items: LineItemEditor,
    editor: EditorScreen,
    logo: Option<Logo>,
    export_dir: PathBuf,
    open_exports: bool,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<S: SettingsStore, C: Clock> App<S, C> {
    /// Load preferences and the invoice sequence from `store` and start on an
    /// empty invoice.
    pub fn new(store: S, clock: C, config: &AppConfig) -> Self {
        let preferences = Preferences::load(&store);
        let sequence = SequenceGenerator::load(&store, clock);
        info!(number = %sequence.current_number(), "invoice editor ready");

        Self {
            store,
            sequence,
            preferences,
            details: InvoiceDetails::default(),
            items: LineItemEditor::new(),
            editor: EditorScreen::default(),
            logo: None,
            export_dir: config.export_dir.clone(),
            open_exports: config.open_exports,
            screen: Screen::Editor,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn invoice_number(&self) -> InvoiceNumber {
        self.sequence.current_number()
    }

    pub fn items(&self) -> &[LineItem] {
        self.items.items()
    }

    pub fn details(&self) -> &InvoiceDetails {
        &self.details
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn logo(&self) -> Option<&Logo> {
        self.logo.as_ref()
    }

    /// Running total formatted with the current currency symbol.
    pub fn total_display(&self) -> String {
        format_amount(self.items.total(), &self.preferences.currency)
    }

    /// Route one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::EditingItem(form) => self.handle_edit_item(code, form),
            Mode::EditingDetails(form) => self.handle_edit_details(code, form),
            Mode::EditingColors(form) => self.handle_edit_colors(code, form),
            Mode::LoadingLogo(form) => self.handle_load_logo(code, form),
            Mode::ConfirmSequenceReset => self.handle_confirm_reset(code),
        };

        Ok(exit)
    }

    /// Ctrl-P prints: from the editor it opens the preview, from the preview
    /// it exports.
    pub(crate) fn handle_ctrl_p(&mut self) -> Result<()> {
        if !matches!(self.mode, Mode::Normal) {
            return Ok(());
        }
        match self.screen {
            Screen::Editor => self.open_preview(),
            Screen::Preview(_) => self.export_preview(),
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Editor => {
                let len = self.items.len();
                let editor = &mut self.editor;
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Up => editor.move_selection(-1, len),
                    KeyCode::Down => editor.move_selection(1, len),
                    KeyCode::PageUp => editor.move_selection(-5, len),
                    KeyCode::PageDown => editor.move_selection(5, len),
                    KeyCode::Home => editor.selected = 0,
                    KeyCode::End => editor.select_last(len),
                    KeyCode::Char('+') | KeyCode::Char('a') => {
                        let index = self.items.add();
                        editor.selected = index;
                        let form = self.item_form(index);
                        self.clear_status();
                        if let Some(form) = form {
                            return Ok(Mode::EditingItem(form));
                        }
                    }
                    KeyCode::Char('-') | KeyCode::Delete => {
                        let index = editor.selected;
                        if let Some(removed) = self.items.remove(index) {
                            editor.clamp(self.items.len());
                            let label = if removed.description.trim().is_empty() {
                                format!("item {}", index + 1)
                            } else {
                                format!("\"{}\"", removed.description.trim())
                            };
                            self.set_status(format!("Removed {label}."), StatusKind::Info);
                        }
                    }
                    KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                        let index = editor.selected;
                        if let Some(form) = self.item_form(index) {
                            self.clear_status();
                            return Ok(Mode::EditingItem(form));
                        }
                    }
                    KeyCode::Char('d') | KeyCode::Char('D') => {
                        self.clear_status();
                        return Ok(Mode::EditingDetails(DetailsForm::from_details(
                            &self.details,
                        )));
                    }
                    KeyCode::Char('c') | KeyCode::Char('C') => self.cycle_currency(),
                    KeyCode::Char('t') | KeyCode::Char('T') => self.toggle_theme(),
                    KeyCode::Char('k') => {
                        self.clear_status();
                        return Ok(Mode::EditingColors(ColorForm::from_preferences(
                            &self.preferences,
                        )));
                    }
                    KeyCode::Char('K') => self.reset_colors(),
                    KeyCode::Char('l') => {
                        self.clear_status();
                        return Ok(Mode::LoadingLogo(LogoForm::default()));
                    }
                    KeyCode::Char('L') => {
                        if self.logo.take().is_some() {
                            self.set_status("Logo removed.", StatusKind::Info);
                        }
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.clear_status();
                        return Ok(Mode::ConfirmSequenceReset);
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => self.open_preview(),
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Preview(ref mut preview) => {
                let palette = Palette::for_theme(self.preferences.theme);
                let lines = preview_lines(preview, 0, &palette).len();
                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                        self.screen = Screen::Editor;
                        self.clear_status();
                    }
                    KeyCode::Up => preview.scroll_by(-1, lines),
                    KeyCode::Down => preview.scroll_by(1, lines),
                    KeyCode::PageUp => preview.scroll_by(-10, lines),
                    KeyCode::PageDown => preview.scroll_by(10, lines),
                    KeyCode::Home => preview.scroll = 0,
                    KeyCode::Char('x') | KeyCode::Char('X') => self.export_preview(),
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_edit_item(&mut self, code: KeyCode, mut form: ItemForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.items.replace(form.index, form.original.clone());
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                let total = self.total_display();
                self.set_status(
                    format!("Item {} saved. Total {total}.", form.index + 1),
                    StatusKind::Info,
                );
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => {
                if form.backspace() {
                    self.apply_item_field(&form, form.active);
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    self.apply_item_field(&form, form.active);
                }
            }
            _ => {}
        }
        Mode::EditingItem(form)
    }

    fn item_form(&self, index: usize) -> Option<ItemForm> {
        self.items
            .get(index)
            .map(|item| ItemForm::from_item(index, item))
    }

    fn apply_item_field(&mut self, form: &ItemForm, field: LineField) {
        self.items.edit(form.index, field, form.value(field));
    }

    fn handle_edit_details(&mut self, code: KeyCode, mut form: DetailsForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                self.details = form.into_details();
                self.set_status("Invoice details updated.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Mode::EditingDetails(form)
    }

    fn handle_edit_colors(&mut self, code: KeyCode, mut form: ColorForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Color change cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => match form.parse_inputs() {
                Ok((background, text)) => {
                    match self
                        .preferences
                        .set_colors(&self.store, background, text)
                        .context("failed to store colors")
                    {
                        Ok(()) => self.set_status("Preview colors saved.", StatusKind::Info),
                        Err(err) => self.report_error(err),
                    }
                    return Mode::Normal;
                }
                Err(err) => form.error = Some(err.to_string()),
            },
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.toggle_field();
                form.error = None;
            }
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::EditingColors(form)
    }

    fn handle_load_logo(&mut self, code: KeyCode, mut form: LogoForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Logo unchanged.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                let loaded = form
                    .parse_inputs()
                    .and_then(|path| Logo::load(&path).map_err(Error::from));
                match loaded {
                    Ok(logo) => {
                        let text = format!("Loaded logo {}.", logo.file_name);
                        self.set_status(text, StatusKind::Info);
                        self.logo = Some(logo);
                        return Mode::Normal;
                    }
                    Err(err) => {
                        warn!(error = %err, "logo not loaded");
                        form.error = Some(surface_error(&err));
                    }
                }
            }
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::LoadingLogo(form)
    }

    fn handle_confirm_reset(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.sequence.reset(&self.store) {
                    Ok(number) => self.set_status(
                        format!("Invoice number reset to {number}."),
                        StatusKind::Info,
                    ),
                    Err(err) => self.report_error(
                        Error::from(err).context("failed to store invoice sequence"),
                    ),
                }
                Mode::Normal
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Reset cancelled.", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmSequenceReset,
        }
    }

    /// Advance the invoice number, then freeze the current invoice into the
    /// preview screen.
    fn open_preview(&mut self) {
        self.clear_status();
        if let Err(err) = self.sequence.advance(&self.store) {
            self.report_error(Error::from(err).context("failed to store invoice sequence"));
        }
        let snapshot = InvoiceSnapshot::capture(
            self.sequence.current_number(),
            &self.details,
            &self.items,
            &self.preferences,
            self.logo.as_ref(),
        );
        info!(number = %snapshot.number, total = %snapshot.total, "opened preview");
        self.screen = Screen::Preview(PreviewScreen::new(snapshot));
    }

    fn export_preview(&mut self) {
        let Screen::Preview(ref mut preview) = self.screen else {
            return;
        };
        let path = match export_snapshot(&preview.snapshot, &self.export_dir) {
            Ok(path) => path,
            Err(err) => {
                self.report_error(err.into());
                return;
            }
        };
        preview.exported = Some(path.clone());

        if self.open_exports {
            if let Err(err) = open_export(&path) {
                self.report_error(err.into());
                return;
            }
        }
        self.set_status(format!("Saved {}.", path.display()), StatusKind::Info);
    }

    fn cycle_currency(&mut self) {
        match self.preferences.cycle_currency(&self.store) {
            Ok(()) => {
                let code = self.preferences.currency_code().unwrap_or("custom");
                let text = format!("Currency: {} ({code}).", self.preferences.currency);
                self.set_status(text, StatusKind::Info);
            }
            Err(err) => self.report_error(Error::from(err).context("failed to store currency")),
        }
    }

    fn toggle_theme(&mut self) {
        match self.preferences.toggle_theme(&self.store) {
            Ok(theme) => self.set_status(format!("Theme: {}.", theme.as_str()), StatusKind::Info),
            Err(err) => self.report_error(Error::from(err).context("failed to store theme")),
        }
    }

    fn reset_colors(&mut self) {
        match self.preferences.reset_colors(&self.store) {
            Ok(()) => self.set_status("Preview colors reset.", StatusKind::Info),
            Err(err) => self.report_error(Error::from(err).context("failed to reset colors")),
        }
    }

    fn report_error(&mut self, err: Error) {
        warn!(error = %format!("{err:#}"), "action failed");
        self.set_status(surface_error(&err), StatusKind::Error);
    }

    fn set_status<T: Into<String>>(&mut self, text: T, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = Palette::for_theme(self.preferences.theme);
        frame.render_widget(Block::default().style(palette.base), area);

        // Tiny terminals get the content only; the footer would cover it.
        let footer_area = (area.height > FOOTER_HEIGHT).then(|| {
            Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
                .split(area)
        });
        let content_area = footer_area.as_ref().map_or(area, |chunks| chunks[0]);

        match &self.screen {
            Screen::Editor => self.draw_editor(frame, content_area, &palette),
            Screen::Preview(preview) => draw_preview(frame, content_area, preview, &palette),
        }

        if let Some(chunks) = &footer_area {
            self.draw_footer(frame, chunks[1], &palette);
        }

        match &self.mode {
            Mode::EditingItem(form) => self.draw_item_form(frame, area, form),
            Mode::EditingDetails(form) => self.draw_details_form(frame, area, form),
            Mode::EditingColors(form) => self.draw_color_form(frame, area, form),
            Mode::LoadingLogo(form) => self.draw_logo_form(frame, area, form),
            Mode::ConfirmSequenceReset => self.draw_confirm_reset(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_editor(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(DETAILS_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.draw_header(frame, chunks[0], palette);
        self.draw_details(frame, chunks[1], palette);
        self.draw_items(frame, chunks[2], palette);

        let total = Line::from(vec![
            Span::raw("Total: "),
            Span::styled(
                self.total_display(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ])
        .alignment(Alignment::Right);
        frame.render_widget(Paragraph::new(total), chunks[3]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                " Invoice Generator ",
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let prefs = &self.preferences;
        let logo = self
            .logo
            .as_ref()
            .map(|logo| logo.file_name.as_str())
            .unwrap_or("none");
        let muted = Style::default().fg(palette.muted);
        let line = Line::from(vec![
            Span::raw("Invoice # "),
            Span::styled(
                self.invoice_number().to_string(),
                Style::default()
                    .fg(palette.active)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Currency ", muted),
            Span::raw(prefs.currency.clone()),
            Span::styled("   Colors ", muted),
            Span::styled(
                format!("{}/{}", prefs.background, prefs.text),
                Style::default().fg(rgb(prefs.text)).bg(rgb(prefs.background)),
            ),
            Span::styled("   Logo ", muted),
            Span::raw(logo.to_string()),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn draw_details(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default().borders(Borders::ALL).title(" Details ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let form = DetailsForm::from_details(&self.details);
        let lines: Vec<Line> = DetailsField::ALL
            .iter()
            .map(|field| {
                let value = form.value(*field);
                let (text, style) = if value.is_empty() {
                    ("—".to_string(), Style::default().fg(palette.muted))
                } else {
                    (value.to_string(), Style::default())
                };
                Line::from(vec![
                    Span::styled(
                        format!("{:<9}", field.label()),
                        Style::default().fg(palette.muted),
                    ),
                    Span::styled(text, style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_items(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Items ({}) ", self.items.len()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            return;
        }
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let width = inner.width as usize;
        let description_width = width.saturating_sub(4 + QTY_WIDTH + 2 * MONEY_WIDTH + 3);
        let header = format!(
            "{} {} {} {} {}",
            fit("#", 3),
            fit("Description", description_width),
            fit_right("Qty", QTY_WIDTH),
            fit_right("Unit price", MONEY_WIDTH),
            fit_right("Amount", MONEY_WIDTH),
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                header,
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::UNDERLINED),
            )),
            rows[0],
        );

        let currency = &self.preferences.currency;
        let list_items: Vec<ListItem> = self
            .items
            .items()
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let description = if item.description.is_empty() {
                    "<blank>"
                } else {
                    item.description.as_str()
                };
                ListItem::new(format!(
                    "{} {} {} {} {}",
                    fit(&format!("{}.", idx + 1), 3),
                    fit(description, description_width),
                    fit_right(&item.quantity.to_string(), QTY_WIDTH),
                    fit_right(&format_amount(item.unit_price, currency), MONEY_WIDTH),
                    fit_right(&format_amount(item.amount(), currency), MONEY_WIDTH),
                ))
            })
            .collect();

        let list = List::new(list_items).highlight_style(palette.highlight);
        let mut state = ListState::default();
        state.select(Some(self.editor.selected));
        frame.render_stateful_widget(list, rows[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions(palette);

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self, palette: &Palette) -> Line<'static> {
        let key_style = Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::EditingItem(_)) | (_, Mode::EditingDetails(_)) => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::EditingColors(_)) | (_, Mode::LoadingLogo(_)) => {
                &[("[Enter]", " Apply   "), ("[Esc]", " Cancel")]
            }
            (_, Mode::ConfirmSequenceReset) => &[("[Y]", " Reset   "), ("[N]", " Keep")],
            (Screen::Preview(_), Mode::Normal) => &[
                ("[x]", " Export & print   "),
                ("[↑↓]", " Scroll   "),
                ("[Esc]", " Back   "),
                ("[q]", " Quit"),
            ],
            (Screen::Editor, Mode::Normal) => &[
                ("[↑↓]", " Select   "),
                ("[+/-]", " Add/Remove   "),
                ("[Enter]", " Edit   "),
                ("[d]", " Details   "),
                ("[c]", " Currency   "),
                ("[t]", " Theme   "),
                ("[k/K]", " Colors   "),
                ("[l/L]", " Logo   "),
                ("[r]", " Reset #   "),
                ("[p]", " Preview   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_item_form(&self, frame: &mut Frame, area: Rect, form: &ItemForm) {
        let mut lines: Vec<Line<'static>> =
            LineField::ALL.iter().map(|field| form.build_line(*field)).collect();
        let amount = self
            .items
            .get(form.index)
            .map(|item| format_amount(item.amount(), &self.preferences.currency))
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("Line amount: {amount}   Invoice total: {}", self.total_display()),
            Style::default().fg(Color::Gray),
        )));

        let row = LineField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let column = (form.active.label().len() + 2 + form.value_len(form.active)) as u16;
        let title = format!("Item {}", form.index + 1);
        draw_modal(
            frame,
            area,
            &title,
            lines,
            None,
            "Enter to save • Tab to switch • Esc to revert",
            Some((column, row)),
        );
    }

    fn draw_details_form(&self, frame: &mut Frame, area: Rect, form: &DetailsForm) {
        let lines = DetailsField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        let row = DetailsField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let column = (form.active.label().len() + 2 + form.value_len(form.active)) as u16;
        draw_modal(
            frame,
            area,
            "Company & Customer",
            lines,
            None,
            "Enter to save • Tab to switch • Esc to cancel",
            Some((column, row)),
        );
    }

    fn draw_color_form(&self, frame: &mut Frame, area: Rect, form: &ColorForm) {
        let lines = vec![
            form.build_line(ColorField::Background),
            form.build_line(ColorField::Text),
        ];
        let (row, prefix) = match form.active {
            ColorField::Background => (0, "Background: ".len()),
            ColorField::Text => (1, "Text: ".len()),
        };
        let column = (prefix + form.value_len(form.active)) as u16;
        draw_modal(
            frame,
            area,
            "Preview Colors",
            lines,
            form.error.as_deref(),
            "Enter to save • Tab to switch • Esc to cancel • K resets defaults",
            Some((column, row)),
        );
    }

    fn draw_logo_form(&self, frame: &mut Frame, area: Rect, form: &LogoForm) {
        let column = ("Path: ".len() + form.path.chars().count()) as u16;
        draw_modal(
            frame,
            area,
            "Load Logo",
            vec![form.build_line()],
            form.error.as_deref(),
            "Enter to load • Esc to cancel",
            Some((column, 0)),
        );
    }

    fn draw_confirm_reset(&self, frame: &mut Frame, area: Rect) {
        let today = self.sequence.clock().today();
        let lines = vec![
            Line::from(format!("Current invoice number: {}", self.invoice_number())),
            Line::from(format!("Restart numbering at {}-1000?", today.key())),
        ];
        draw_modal(
            frame,
            area,
            "Reset Invoice Number",
            lines,
            None,
            "Press Y to confirm or N / Esc to cancel.",
            None,
        );
    }
}

fn draw_preview(frame: &mut Frame, area: Rect, preview: &PreviewScreen, palette: &Palette) {
    let prefs = &preview.snapshot.preferences;
    let paper = Style::default().fg(rgb(prefs.text)).bg(rgb(prefs.background));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(format!(" Preview {} ", preview.snapshot.number))
        .style(paper);
    let width = block.inner(area).width.saturating_sub(2) as usize;

    let paragraph = Paragraph::new(preview_lines(preview, width, palette))
        .block(block)
        .scroll((preview.scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Lines of the preview page, one per printed row, so the line count doubles
/// as the scroll limit.
fn preview_lines(preview: &PreviewScreen, width: usize, palette: &Palette) -> Vec<Line<'static>> {
    let snapshot = &preview.snapshot;
    let prefs = &snapshot.preferences;
    let paper = Style::default().fg(rgb(prefs.text)).bg(rgb(prefs.background));
    let bold = paper.add_modifier(Modifier::BOLD);

    let description_width = width.saturating_sub(QTY_WIDTH + 2 * MONEY_WIDTH + 3);
    let or_dash = |value: &str| {
        if value.trim().is_empty() {
            "—".to_string()
        } else {
            value.to_string()
        }
    };

    let mut lines = Vec::new();
    if let Some(logo) = &snapshot.logo {
        lines.push(Line::styled(format!("[logo: {}]", logo.file_name), paper));
    }
    lines.push(Line::styled(or_dash(&snapshot.details.company_name), bold));
    lines.push(Line::styled(snapshot.details.company_address.clone(), paper));
    lines.push(Line::styled(snapshot.details.company_phone.clone(), paper));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Invoice #: ", bold),
        Span::styled(snapshot.number.to_string(), paper),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Date:      ", bold),
        Span::styled(snapshot.number.date.to_string(), paper),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Bill to:   ", bold),
        Span::styled(or_dash(&snapshot.details.buyer_name), paper),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::styled(
        format!(
            "{} {} {} {}",
            fit("Description", description_width),
            fit_right("Qty", QTY_WIDTH),
            fit_right("Unit price", MONEY_WIDTH),
            fit_right("Amount", MONEY_WIDTH),
        ),
        bold.add_modifier(Modifier::UNDERLINED),
    ));
    for item in snapshot.printable_items() {
        lines.push(Line::styled(
            format!(
                "{} {} {} {}",
                fit(&item.description, description_width),
                fit_right(&item.quantity.to_string(), QTY_WIDTH),
                fit_right(&snapshot.money(item.unit_price), MONEY_WIDTH),
                fit_right(&snapshot.money(item.amount()), MONEY_WIDTH),
            ),
            paper,
        ));
    }
    lines.push(Line::styled("─".repeat(width), paper));
    lines.push(
        Line::styled(
            format!("Total: {}{}", prefs.currency, format_decimal(snapshot.total)),
            bold,
        )
        .alignment(Alignment::Right),
    );
    if let Some(path) = &preview.exported {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            format!("Exported to {}", path.display()),
            Style::default().fg(palette.muted).bg(rgb(prefs.background)),
        ));
    }
    lines
}

/// Shared chrome for the modal forms: border, field lines, error or hint
/// line, and the cursor placed after the active value.
fn draw_modal(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    mut lines: Vec<Line<'static>>,
    error: Option<&str>,
    hint: &str,
    cursor: Option<(u16, u16)>,
) {
    let popup_area = centered_rect(70, 50, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    lines.push(Line::from(""));
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);

    if let Some((column, row)) = cursor {
        let x = (inner.x + column).min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y + row));
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use rust_decimal::Decimal;

    use super::*;
    use crate::calendar::{CalendarDay, FixedClock};
    use crate::store::{keys, MemoryStore};

    fn may_first() -> CalendarDay {
        CalendarDay::from_ymd(2024, 5, 1).unwrap()
    }

    fn app_with(store: MemoryStore) -> App<MemoryStore, FixedClock> {
        let config = AppConfig::with_data_dir(std::env::temp_dir().join("invoice-generator-tests"));
        App::new(store, FixedClock::new(may_first()), &config)
    }

    fn press(app: &mut App<MemoryStore, FixedClock>, keys: &[KeyCode]) {
        for key in keys {
            app.handle_key(*key).unwrap();
        }
    }

    fn type_text(app: &mut App<MemoryStore, FixedClock>, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn render(app: &App<MemoryStore, FixedClock>) -> String {
        render_sized(app, 120, 40)
    }

    fn render_sized(app: &App<MemoryStore, FixedClock>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn starts_with_todays_first_number() {
        let app = app_with(MemoryStore::new());
        assert_eq!(app.invoice_number().to_string(), "20240501-1000");
        assert_eq!(app.items(), &[LineItem::blank()]);
        assert_eq!(app.total_display(), "$0.00");
    }

    #[test]
    fn each_preview_advances_the_number() {
        let mut app = app_with(MemoryStore::new());
        for expected in ["20240501-1001", "20240501-1002", "20240501-1003"] {
            press(&mut app, &[KeyCode::Char('p')]);
            assert_eq!(app.invoice_number().to_string(), expected);
            assert!(render(&app).contains(expected));
            press(&mut app, &[KeyCode::Esc]);
        }
        assert_eq!(app.store.get(keys::INVOICE_SEQUENCE).as_deref(), Some("1003"));
    }

    #[test]
    fn typing_into_item_form_updates_total_live() {
        let mut app = app_with(MemoryStore::new());
        press(&mut app, &[KeyCode::Enter]);
        type_text(&mut app, "Consulting");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "2");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "10.5");
        assert_eq!(app.total_display(), "$21.00");
        press(&mut app, &[KeyCode::Enter]);

        press(&mut app, &[KeyCode::Char('+')]);
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "1");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "5");
        press(&mut app, &[KeyCode::Enter]);

        assert_eq!(app.items().len(), 2);
        assert_eq!(app.items()[0].unit_price, Decimal::new(105, 1));
        assert_eq!(app.total_display(), "$26.00");
        assert!(render(&app).contains("$26.00"));
    }

    #[test]
    fn cancelled_item_edit_reverts_the_row() {
        let mut app = app_with(MemoryStore::new());
        press(&mut app, &[KeyCode::Enter, KeyCode::Tab]);
        type_text(&mut app, "7");
        assert_eq!(app.items()[0].quantity, 7);
        press(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.items(), &[LineItem::blank()]);
    }

    #[test]
    fn removing_everything_leaves_one_blank_row() {
        let mut app = app_with(MemoryStore::new());
        press(&mut app, &[KeyCode::Char('+'), KeyCode::Tab]);
        type_text(&mut app, "3");
        press(&mut app, &[KeyCode::Enter]);
        press(&mut app, &[KeyCode::Char('-'), KeyCode::Char('-')]);

        assert_eq!(app.items(), &[LineItem::blank()]);
        assert_eq!(app.total_display(), "$0.00");
    }

    #[test]
    fn reset_requires_confirmation() {
        let store = MemoryStore::with_entries([
            (keys::LAST_INVOICE_DATE, "20240501"),
            (keys::INVOICE_SEQUENCE, "1010"),
        ]);
        let mut app = app_with(store);
        press(&mut app, &[KeyCode::Char('r'), KeyCode::Char('n')]);
        assert_eq!(app.invoice_number().sequence, 1010);

        press(&mut app, &[KeyCode::Char('r')]);
        assert!(render(&app).contains("Reset Invoice Number"));
        press(&mut app, &[KeyCode::Char('y')]);
        assert_eq!(app.invoice_number().to_string(), "20240501-1000");
        assert_eq!(app.store.get(keys::INVOICE_SEQUENCE).as_deref(), Some("1000"));
    }

    #[test]
    fn preferences_keys_persist() {
        let mut app = app_with(MemoryStore::new());
        press(&mut app, &[KeyCode::Char('c'), KeyCode::Char('t')]);
        assert_eq!(app.preferences().currency, "€");
        assert_eq!(app.store.get(keys::CURRENCY).as_deref(), Some("€"));
        assert_eq!(app.store.get(keys::THEME).as_deref(), Some("dark"));

        press(&mut app, &[KeyCode::Char('k')]);
        for _ in 0..7 {
            press(&mut app, &[KeyCode::Backspace]);
        }
        type_text(&mut app, "#223344");
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.store.get(keys::BG_COLOR).as_deref(), Some("#223344"));

        press(&mut app, &[KeyCode::Char('K')]);
        assert_eq!(app.store.get(keys::BG_COLOR), None);
        assert_eq!(app.preferences().background.to_string(), "#ffffff");
    }

    #[test]
    fn invalid_color_keeps_form_open() {
        let mut app = app_with(MemoryStore::new());
        press(&mut app, &[KeyCode::Char('k')]);
        for _ in 0..3 {
            press(&mut app, &[KeyCode::Backspace]);
        }
        press(&mut app, &[KeyCode::Enter]);
        assert!(matches!(app.mode, Mode::EditingColors(ref form) if form.error.is_some()));
        assert_eq!(app.store.get(keys::BG_COLOR), None);
    }

    #[test]
    fn missing_logo_file_leaves_logo_unset() {
        let mut app = app_with(MemoryStore::new());
        press(&mut app, &[KeyCode::Char('l')]);
        type_text(&mut app, "/definitely/not/here.png");
        press(&mut app, &[KeyCode::Enter]);
        assert!(app.logo().is_none());
        assert!(matches!(app.mode, Mode::LoadingLogo(ref form) if form.error.is_some()));
        press(&mut app, &[KeyCode::Esc]);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn export_from_preview_writes_html() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::with_data_dir(dir.path().to_path_buf());
        let mut app = App::new(MemoryStore::new(), FixedClock::new(may_first()), &config);

        press(&mut app, &[KeyCode::Char('d')]);
        type_text(&mut app, "Acme");
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('p'), KeyCode::Char('x')]);

        let exported = config.export_dir.join("invoice-20240501-1001.html");
        assert!(exported.exists());
        assert!(render(&app).contains("Exported to"));
    }

    #[test]
    fn selection_survives_preview_round_trip() {
        let mut app = app_with(MemoryStore::new());
        press(&mut app, &[KeyCode::Char('+'), KeyCode::Enter]);
        press(&mut app, &[KeyCode::Char('+'), KeyCode::Enter]);
        press(&mut app, &[KeyCode::Up]);
        assert_eq!(app.editor.selected, 1);

        press(&mut app, &[KeyCode::Char('p'), KeyCode::Esc]);
        assert!(matches!(app.screen, Screen::Editor));
        assert_eq!(app.editor.selected, 1);
    }

    #[test]
    fn preview_scroll_is_bounded_by_content() {
        let mut app = app_with(MemoryStore::new());
        press(&mut app, &[KeyCode::Char('p')]);
        for _ in 0..50 {
            press(&mut app, &[KeyCode::PageDown]);
        }
        let Screen::Preview(ref preview) = app.screen else {
            panic!("expected the preview screen");
        };
        let palette = Palette::for_theme(app.preferences.theme);
        let lines = preview_lines(preview, 0, &palette).len();
        assert_eq!(preview.scroll as usize, lines - 1);
    }

    #[test]
    fn tiny_terminal_skips_footer() {
        let app = app_with(MemoryStore::new());
        assert!(!render_sized(&app, 120, 3).contains("[Enter]"));
        assert!(render_sized(&app, 120, 4).contains("[Enter]"));
    }

    #[test]
    fn quit_from_editor() {
        let mut app = app_with(MemoryStore::new());
        assert!(!app.handle_key(KeyCode::Char('x')).unwrap());
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
