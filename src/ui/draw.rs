use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::line::NORMAL as LINE;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
// Use Popup from tui-widgets to render modals
use tui_widgets::popup::Popup;

use crate::config::RgbColor;
use crate::footer::Severity;
use crate::view::birthdays::BirthdayLine;
use crate::view::state::ViewMode;
use crate::view::tiles::{palette_pick, Tile, TileBody};

use super::app::App;
use super::panes::{Focus, Screen, DB_MENU};

const LIST_HELP: &str = "/: пошук  Enter: розгорнути  i: інфо  e: редагувати  x: видалити  n: новий  F1: довідка";
const BIRTHDAY_HELP: &str = "Enter/i: інфо  b/Esc: назад до списку  F1: довідка";
const SEARCH_HELP: &str = "Введіть текст для пошуку  Enter/Esc: до списку";
const ACCOUNT_HELP: &str = "u: ім'я  p: пароль  P: скидання  a: аватар  m: основний  x: видалити  Esc: назад";
const FORM_HELP: &str = "Tab: поле  Enter: зберегти  F3/F4: +/- телефон  F5: тип  Esc: закрити";
const PROMPT_HELP: &str = "Tab: поле  Enter: підтвердити  Esc: скасувати";
const MENU_HELP: &str = "j/k: вибір  Enter: виконати  Esc: закрити";
const CONFIRM_HELP: &str = "Y/Enter: підтвердити  N/Esc: скасувати";
const ALERT_HELP: &str = "Enter/Esc: закрити";
const HELP_MODAL_FOOTER: &str = "j/k: прокрутка  Esc/q: закрити";

pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    let size = frame.area();
    let footer_height = footer_height(app);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(footer_height),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, layout[0], app);
    match app.screen {
        Screen::Contacts => {
            draw_search(frame, layout[1], app);
            draw_contacts(frame, layout[2], app);
        }
        Screen::Account => {
            draw_account_header(frame, layout[1], app);
            draw_account(frame, layout[2], app);
        }
    }
    draw_footer_log(frame, layout[3], app);
    draw_status(frame, layout[4], app);

    draw_form_modal(frame, size, app);
    draw_prompt_modal(frame, size, app);
    draw_db_menu(frame, size, app);
    draw_info_modal(frame, size, app);
    draw_confirm_modal(frame, size, app);
    draw_alert(frame, size, app);
    draw_help_modal(frame, size, app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let state = app.view.state();
    let header_style = header_text_style(app);
    let mut spans: Vec<Span> = vec![
        Span::styled(format!(" KONTAKTY · {} ", app.screen.title()), selection_style(app)),
        Span::raw("  "),
    ];

    for mode in ViewMode::ALL {
        let label = format!(" {} {} ", mode.number(), mode.title());
        let style = if mode == state.mode {
            selection_style(app)
        } else {
            header_style
        };
        spans.push(Span::styled(label, style));
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("Сортування {}", state.sort.arrow()),
        header_style,
    ));
    if state.birthday_mode {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Дні Народження", selection_style(app)));
    }
    if app.is_busy() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Завантаження...", header_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_search(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = app.focus == Focus::Search;
    let link = Span::styled(
        format!(" GET {} ", app.view.api_link()),
        Style::default().fg(color(app.ui_colors().link_fg)),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, active))
        .title(Line::from(Span::styled(" Пошук ", header_text_style(app))))
        .title(Line::from(link).alignment(Alignment::Right));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let value = app.search_input.value();
    let paragraph = if value.is_empty() && !active {
        Paragraph::new(Span::styled(
            "Ім'я або прізвище...",
            Style::default().add_modifier(Modifier::DIM),
        ))
    } else {
        Paragraph::new(value.to_string())
    };
    frame.render_widget(paragraph, inner);

    if active {
        let x = inner.x.saturating_add(app.search_input.visual_cursor() as u16);
        frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

fn draw_contacts(frame: &mut Frame<'_>, area: Rect, app: &App) {
    if app.view.state().birthday_mode {
        draw_birthdays(frame, area, app);
    } else {
        draw_tiles(frame, area, app);
    }
}

fn draw_tiles(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let tiles = app.tiles();
    let title = format!(" Контакти ({}) ", tiles.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, app.focus == Focus::Tiles))
        .title(Line::from(Span::styled(title, header_text_style(app))));

    if tiles.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let text = if app.view.is_loading() {
            "Завантаження..."
        } else {
            "контактів не знайдено"
        };
        render_centered_words(frame, inner, text);
        return;
    }

    let items: Vec<ListItem> = tiles.iter().map(|tile| tile_item(tile, app)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(selection_style(app).add_modifier(Modifier::BOLD))
        .highlight_symbol("▌");

    let mut state = ListState::default();
    state.select(Some(app.selected.min(tiles.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}

fn avatar_span(tile: &Tile, app: &App) -> Span<'static> {
    let palette = &app.config().ui.avatar_palette;
    let background = palette
        .get(palette_pick(tile.color_seed, palette.len()))
        .copied()
        .unwrap_or(app.ui_colors().border);
    Span::styled(
        format!(" {:<2} ", tile.initials),
        Style::default()
            .fg(color(app.ui_colors().avatar_fg))
            .bg(color(background))
            .add_modifier(Modifier::BOLD),
    )
}

fn tile_item(tile: &Tile, app: &App) -> ListItem<'static> {
    let avatar = avatar_span(tile, app);
    let dim = header_text_style(app);
    let lines = match &tile.body {
        TileBody::Mini => vec![Line::from(vec![
            avatar,
            Span::raw(" "),
            Span::styled(tile.title.clone(), dim),
        ])],
        TileBody::Named { first, last } => vec![Line::from(vec![
            avatar,
            Span::raw(" "),
            Span::raw(first.clone()),
            Span::raw(" "),
            Span::raw(last.clone()),
        ])],
        TileBody::Summary {
            name,
            birthday,
            email,
            phone,
        } => vec![Line::from(vec![
            avatar,
            Span::raw(" "),
            Span::styled(format!("{name:<28}"), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" {birthday:<10}  {email:<28}  {phone}")),
        ])],
        TileBody::Full(card) => {
            let mut lines = vec![Line::from(vec![
                avatar,
                Span::raw(" "),
                Span::styled(card.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            ])];
            lines.extend(
                tile.text_lines()
                    .into_iter()
                    .skip(1)
                    .map(|text| Line::from(format!("     {text}"))),
            );
            lines.push(Line::from(""));
            lines
        }
    };
    ListItem::new(Text::from(lines))
}

fn draw_birthdays(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true))
        .title(Line::from(Span::styled(
            " Дні Народження ",
            header_text_style(app),
        )));

    let colors = app.ui_colors();
    let mut entry_index = 0usize;
    let mut selected_line = None;
    let lines: Vec<BirthdayLine> = app.view.birthdays().lines();
    let items: Vec<ListItem> = lines
        .iter()
        .enumerate()
        .map(|(line_idx, line)| {
            let style = match line {
                BirthdayLine::Heading(_) => Style::default()
                    .fg(color(colors.header_fg))
                    .add_modifier(Modifier::BOLD),
                BirthdayLine::Error(_) => Style::default().fg(color(colors.error)),
                BirthdayLine::Notice(_) | BirthdayLine::Separator => header_text_style(app),
                BirthdayLine::Entry(_) => {
                    if entry_index == app.selected {
                        selected_line = Some(line_idx);
                    }
                    entry_index += 1;
                    Style::default()
                }
            };
            ListItem::new(Line::from(Span::styled(line.text(), style)))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(selection_style(app));
    let mut state = ListState::default();
    state.select(selected_line);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_account_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, false));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let text = match &app.account.profile {
        Some(profile) => format!("Ви увійшли як {}", profile.username),
        None if app.account.loaded => "Профіль недоступний".to_string(),
        None => "Завантаження...".to_string(),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, header_text_style(app))),
        inner,
    );
}

fn draw_account(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let profile_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, false))
        .title(Line::from(Span::styled(" Профіль ", header_text_style(app))));

    let mut lines: Vec<Line> = Vec::new();
    if let Some(profile) = &app.account.profile {
        let field = |label: &str, value: Option<&str>| {
            Line::from(vec![
                Span::styled(format!("{label:<18}"), header_text_style(app)),
                Span::raw(value.unwrap_or("-").to_string()),
            ])
        };
        let id = profile.id.map(|id| id.to_string());
        lines.push(field("Ім'я користувача", Some(&profile.username)));
        lines.push(field("Email", profile.email.as_deref()));
        lines.push(field("Роль", profile.role.as_deref()));
        lines.push(field("ID", id.as_deref()));
        lines.push(field("Створено", profile.created_at.as_deref()));
        lines.push(field("Оновлено", profile.updated_at.as_deref()));
        lines.push(field("Аватар", profile.avatar_url.as_deref()));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(profile_block)
            .wrap(Wrap { trim: true }),
        chunks[0],
    );

    let gallery = &app.account.gallery;
    let avatar_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true))
        .title(Line::from(Span::styled(
            format!(" Аватари ({}) ", gallery.avatars().len()),
            header_text_style(app),
        )));

    if gallery.avatars().is_empty() {
        let inner = avatar_block.inner(chunks[1]);
        frame.render_widget(avatar_block, chunks[1]);
        render_centered_words(frame, inner, "Аватарів немає");
        return;
    }

    let items: Vec<ListItem> = gallery
        .avatars()
        .iter()
        .map(|avatar| {
            let marker = if avatar.is_main { "★" } else { " " };
            ListItem::new(format!(
                "{marker} #{:<4} {}",
                avatar.id,
                avatar.file_path.as_deref().unwrap_or("-")
            ))
        })
        .collect();
    let list = List::new(items)
        .block(avatar_block)
        .highlight_style(selection_style(app));
    let mut state = ListState::default();
    state.select(Some(gallery.selected_index()));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn footer_height(app: &App) -> u16 {
    let footer = app.footer().borrow();
    (footer.visible().len().max(1) + 2) as u16
}

fn severity_style(app: &App, severity: Severity) -> Style {
    let colors = app.ui_colors();
    let rgb = match severity {
        Severity::Info => colors.info,
        Severity::Success => colors.success,
        Severity::Warn => colors.warn,
        Severity::Error => colors.error,
    };
    Style::default().fg(color(rgb))
}

fn draw_footer_log(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let footer = app.footer().borrow();
    let toggle = if !footer.can_expand() {
        String::new()
    } else if footer.is_expanded() {
        format!(" {}: згорнути ", app.config().keys.global.footer.join("/"))
    } else {
        format!(" {}: показати більше ", app.config().keys.global.footer.join("/"))
    };

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(separator_style(app))
        .title(Line::from(Span::styled(" Журнал ", header_text_style(app))))
        .title(Line::from(Span::styled(toggle, header_text_style(app))).alignment(Alignment::Right));

    let lines: Vec<Line> = footer
        .visible()
        .into_iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(format!("{} ", entry.time_label()), header_text_style(app)),
                Span::styled(entry.msg.clone(), severity_style(app, entry.severity)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let message = if app.help_modal.is_some() {
        HELP_MODAL_FOOTER
    } else if app.alert.is_some() || app.info_modal.is_some() {
        ALERT_HELP
    } else if app.confirm_modal.is_some() {
        CONFIRM_HELP
    } else if app.prompt.is_some() {
        PROMPT_HELP
    } else if app.form.is_some() {
        FORM_HELP
    } else if app.db_menu.is_some() {
        MENU_HELP
    } else {
        match app.screen {
            Screen::Account => ACCOUNT_HELP,
            Screen::Contacts if app.focus == Focus::Search => SEARCH_HELP,
            Screen::Contacts if app.view.state().birthday_mode => BIRTHDAY_HELP,
            Screen::Contacts => LIST_HELP,
        }
    };
    let colors = app.ui_colors();
    let style = Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg));
    frame.render_widget(Paragraph::new(message).style(style), area);
}

/// Centered rectangle of `width` columns and `height` rows, clamped to `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn modal_block<'t>(app: &App, title: impl Into<String>, footer: &'t str) -> Block<'t> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true))
        .title(Line::from(Span::styled(title.into(), header_text_style(app))))
        .title_bottom(Line::from(Span::styled(format!(" {footer} "), header_text_style(app))))
        .title_alignment(Alignment::Center)
}

fn draw_form_modal(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(modal) = app.form.as_ref() else {
        return;
    };

    let fields = modal.form.fields();
    let height = fields.len() as u16 + 6;
    let modal_area = centered(area, area.width.saturating_mul(3) / 4, height);
    frame.render_widget(Clear, modal_area);

    let block = modal_block(app, format!(" {} ", modal.form.title()), FORM_HELP);
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let label_width = 20usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor = None;
    for (idx, field) in fields.iter().enumerate() {
        let focused = idx == modal.focus;
        let value = if focused {
            modal.editor.value().to_string()
        } else {
            modal.form.value(*field).to_string()
        };
        let label = format!("{:<width$}", field.label(), width = label_width);
        let label_style = if focused {
            selection_style(app)
        } else {
            header_text_style(app)
        };
        let mut spans = vec![
            Span::styled(label, label_style),
            Span::raw(" "),
            Span::raw(value),
        ];
        if let crate::form::FormField::Phone(row) = field {
            if let Some(phone) = modal.form.phones.get(*row) {
                spans.push(Span::styled(
                    format!("  [{}]", phone.label),
                    header_text_style(app),
                ));
            }
        }
        if focused {
            cursor = Some((
                inner.x + label_width as u16 + 1 + modal.editor.visual_cursor() as u16,
                inner.y + idx as u16,
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    if modal.saving {
        lines.push(Line::from(Span::styled(
            "Збереження...",
            header_text_style(app),
        )));
    } else if let Some(error) = &modal.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            severity_style(app, Severity::Error),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
    if let Some((x, y)) = cursor {
        frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), y));
    }
}

fn draw_prompt_modal(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(prompt) = app.prompt.as_ref() else {
        return;
    };

    let height = prompt.fields.len() as u16 + 5;
    let modal_area = centered(area, area.width.saturating_mul(2) / 3, height);
    frame.render_widget(Clear, modal_area);

    let block = modal_block(app, format!(" {} ", prompt.kind.title()), PROMPT_HELP);
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let label_width = 18usize;
    let mut lines: Vec<Line> = Vec::new();
    for (idx, field) in prompt.fields.iter().enumerate() {
        let style = if idx == prompt.focus {
            selection_style(app)
        } else {
            header_text_style(app)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<width$}", field.label, width = label_width), style),
            Span::raw(" "),
            Span::raw(field.display()),
        ]));
    }
    lines.push(Line::from(""));
    if let Some(error) = &prompt.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            severity_style(app, Severity::Error),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    if let Some(field) = prompt.fields.get(prompt.focus) {
        let x = inner.x + label_width as u16 + 1 + field.input.visual_cursor() as u16;
        let y = inner.y + prompt.focus as u16;
        frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), y));
    }
}

fn draw_db_menu(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(menu) = app.db_menu.as_ref() else {
        return;
    };

    let modal_area = centered(area, 44, DB_MENU.len() as u16 + 2);
    frame.render_widget(Clear, modal_area);

    let items: Vec<ListItem> = DB_MENU
        .iter()
        .map(|action| {
            let style = if action.needs_confirmation() {
                severity_style(app, Severity::Warn)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(format!(" {}", action.label()), style)))
        })
        .collect();

    let list = List::new(items)
        .block(modal_block(app, " База даних ", MENU_HELP))
        .highlight_style(selection_style(app));
    let mut state = ListState::default();
    state.select(Some(menu.selected));
    frame.render_stateful_widget(list, modal_area, &mut state);
}

fn draw_info_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(modal) = app.info_modal.as_ref() else {
        return;
    };

    let lines: Vec<Line> = modal
        .lines
        .iter()
        .map(|line| Line::from(line.clone()))
        .collect();
    let title_line = Line::from(Span::styled(modal.title.clone(), header_text_style(app)));
    let popup = Popup::new(Text::from(lines))
        .title(title_line)
        .border_style(border_style(app, true));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn draw_confirm_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(modal) = app.confirm_modal.as_ref() else {
        return;
    };

    let body_text = Text::from(vec![
        Line::from(modal.message.clone()),
        Line::from(""),
        Line::from(CONFIRM_HELP),
    ]);
    let title_line = Line::from(Span::styled(modal.title.clone(), header_text_style(app)));
    let popup = Popup::new(body_text)
        .title(title_line)
        .border_style(border_style(app, true));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn draw_alert(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(alert) = app.alert.as_ref() else {
        return;
    };

    let mut lines: Vec<Line> = alert
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), severity_style(app, Severity::Error))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(ALERT_HELP));

    let title_line = Line::from(Span::styled(" Помилка ", header_text_style(app)));
    let popup = Popup::new(Text::from(lines))
        .title(title_line)
        .border_style(severity_style(app, Severity::Error));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn draw_help_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    if app.help_modal.is_none() {
        return;
    }

    // Calculate modal size: 2/3 width, 80% height
    let width = area.width.saturating_mul(2).saturating_div(3).max(40).min(area.width);
    let height = area.height.saturating_mul(4).saturating_div(5).max(10).min(area.height);
    let modal_area = centered(area, width, height);
    frame.render_widget(Clear, modal_area);

    let header_style = header_text_style(app);
    let border_s = border_style(app, true);

    let sections = app.help_entries();
    let mut lines: Vec<Line> = Vec::new();
    let content_width = width.saturating_sub(4) as usize;
    let action_width = 22usize;

    for (section_idx, section) in sections.iter().enumerate() {
        let header_text = format!(" {} ", section.title);
        let padding_total = content_width.saturating_sub(header_text.chars().count());
        let left_pad = padding_total / 2;
        let right_pad = padding_total - left_pad;
        let header_line = format!(
            "{}{}{}",
            LINE.horizontal.repeat(left_pad),
            header_text,
            LINE.horizontal.repeat(right_pad)
        );
        lines.push(Line::from(Span::styled(header_line, header_style)));

        for entry in &section.entries {
            let action = format!("{:<width$}", entry.action, width = action_width);
            lines.push(Line::from(vec![
                Span::styled(action, Style::default()),
                Span::styled(entry.keys.clone(), header_style),
            ]));
        }

        if section_idx < sections.len() - 1 {
            lines.push(Line::from(""));
        }
    }

    let total_lines = lines.len();
    let inner_height = height.saturating_sub(2) as usize;

    let Some(modal) = app.help_modal.as_mut() else {
        return;
    };
    modal.total_lines = total_lines;
    modal.viewport_height = inner_height;
    let max_scroll = modal.total_lines.saturating_sub(modal.viewport_height);
    if modal.scroll > max_scroll {
        modal.scroll = max_scroll;
    }

    let scroll_indicator = match (modal.can_scroll_up(), modal.can_scroll_down()) {
        (true, true) => "▲▼",
        (true, false) => "▲ ",
        (false, true) => " ▼",
        (false, false) => "  ",
    };
    let visible_lines: Vec<Line> = lines
        .into_iter()
        .skip(modal.scroll)
        .take(modal.viewport_height)
        .collect();

    let title = Line::from(vec![
        Span::styled(" ДОВІДКА ", header_style),
        Span::styled(scroll_indicator, header_style),
    ]);
    let footer = Line::from(Span::styled(
        format!(" {} ", HELP_MODAL_FOOTER),
        header_style,
    ));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_s)
        .title(title)
        .title_bottom(footer)
        .title_alignment(Alignment::Center);

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);
    frame.render_widget(Paragraph::new(visible_lines), inner);
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn border_style(app: &App, active: bool) -> Style {
    let colors = app.ui_colors();
    let style = Style::default().fg(color(colors.border));
    if active {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn header_text_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.header_fg))
}

fn separator_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.border))
}

fn render_centered_words(frame: &mut Frame<'_>, area: Rect, text: &str) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let target = centered(area, area.width, 1);
    frame.render_widget(Paragraph::new(text.to_string()).alignment(Alignment::Center), target);
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_clamps_to_area() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered(area, 40, 10), Rect::new(20, 7, 40, 10));
        assert_eq!(centered(area, 200, 50), area);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(color(RgbColor::new(1, 2, 3)), Color::Rgb(1, 2, 3));
    }
}
