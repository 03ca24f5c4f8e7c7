//! Merge Creatures rendering.
//!
//! Layout: header (coins + income), the 3×4 board, trash bin, and the action
//! panel. The offline-earnings popup is a full-screen replacement while it is
//! open, like an overlay.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::ClickableList;

use super::actions::*;
use super::economy::format_coins;
use super::grid::{highest_level, spawn_ad_level, spawn_free_level};
use super::state::{level_color, level_sticker, Cell, GameState, GRID_COLS, GRID_ROWS};
use super::MergeGame;

/// Terminal rows per board cell, borders included.
const CELL_HEIGHT: u16 = 3;
/// Board height: four cell rows plus the outer border.
pub const BOARD_HEIGHT: u16 = GRID_ROWS as u16 * CELL_HEIGHT + 2;

pub fn render(game: &MergeGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    if let Some(popup) = game.state.offline_popup {
        render_offline_popup(popup.coins, popup.can_double, f, area, click_state);
        return;
    }

    if is_narrow_layout(area.width) {
        render_narrow(game, f, area, click_state);
    } else {
        render_wide(game, f, area, click_state);
    }
}

fn render_wide(
    game: &MergeGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let board_cols = GRID_COLS as u16 * 8 + 2;
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_cols), Constraint::Min(24)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),            // header
            Constraint::Length(BOARD_HEIGHT), // board
            Constraint::Length(3),            // trash bin
        ])
        .split(h_chunks[0]);

    render_header(&game.state, f, left[0]);
    render_board(game, f, left[1], click_state);
    render_trash(game, f, left[2], click_state);
    render_actions(game, f, h_chunks[1], click_state, false);
}

fn render_narrow(
    game: &MergeGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(BOARD_HEIGHT),
            Constraint::Min(6),
        ])
        .split(area);

    render_header(&game.state, f, chunks[0]);
    render_board(game, f, chunks[1], click_state);
    render_actions(game, f, chunks[2], click_state, true);
}

fn render_header(state: &GameState, f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" 🪙 {}", format_coins(state.coins)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  +{}/s", format_coins(state.income_per_second)),
            Style::default().fg(Color::Green),
        ),
    ]);
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Merge Creatures "),
    );
    f.render_widget(header, area);
}

fn render_board(
    game: &MergeGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cell_w = inner.width / GRID_COLS as u16;
    if cell_w == 0 || inner.height == 0 {
        return;
    }

    let mut cs = click_state.borrow_mut();
    for (index, cell) in game.state.grid.iter().enumerate() {
        let col = (index % GRID_COLS) as u16;
        let row = (index / GRID_COLS) as u16;
        let rect = Rect::new(
            inner.x + col * cell_w,
            inner.y + row * CELL_HEIGHT,
            cell_w,
            CELL_HEIGHT.min(inner.height.saturating_sub(row * CELL_HEIGHT)),
        );
        if rect.height == 0 {
            continue;
        }

        render_cell(game, index, cell, f, rect);
        cs.add_click_target(rect, CELL_BASE + index as u16);
    }
}

fn render_cell(game: &MergeGame, index: usize, cell: &Cell, f: &mut Frame, rect: Rect) {
    let flashing = matches!(game.merge_flash, Some((i, _)) if i == index);

    let border_style = if game.selected == Some(index) {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if flashing {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else if game.cursor == index {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = match cell {
        Cell::Empty => Line::from(""),
        Cell::Item { level } => {
            let mut style = Style::default()
                .fg(level_color(*level))
                .add_modifier(Modifier::BOLD);
            if flashing {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(
                format!("{} {}", level_sticker(*level), level),
                style,
            ))
        }
        Cell::Locked { price } => Line::from(Span::styled(
            format!("🔒{}", format_coins(*price)),
            Style::default().fg(Color::DarkGray),
        )),
    };

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border_style));
    f.render_widget(widget, rect);
}

fn render_trash(
    game: &MergeGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    // Lights up while an item is held, since that is when a drop can land here.
    let style = if game.selected.is_some() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let widget = Paragraph::new(Line::from(Span::styled("[X] 🗑 Trash", style)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    f.render_widget(widget, area);

    click_state.borrow_mut().add_click_target(area, TRASH);
}

fn render_actions(
    game: &MergeGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
    include_trash: bool,
) {
    let state = &game.state;
    let mut cl = ClickableList::new();

    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                " [F] ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("Free creature (Lv {})", spawn_free_level(state)),
                Style::default().fg(Color::White),
            ),
        ]),
        SPAWN_FREE,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                " [A] ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("Watch ad → creature (Lv {})", spawn_ad_level(state)),
                Style::default().fg(Color::White),
            ),
        ]),
        SPAWN_AD,
    );

    if state.auto_merge_enabled {
        let remaining = state
            .auto_merge_expires_at
            .map(|deadline| format_duration(deadline - state.last_updated_at))
            .unwrap_or_default();
        cl.push(Line::from(Span::styled(
            format!(" ⚙ Auto-merge active ({remaining})"),
            Style::default().fg(Color::Cyan),
        )));
    } else {
        cl.push_clickable(
            Line::from(vec![
                Span::styled(
                    " [M] ",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        "Auto-merge, 24h — 🪙 {}",
                        format_coins(super::state::AUTO_MERGE_PRICE)
                    ),
                    Style::default().fg(Color::White),
                ),
            ]),
            BUY_AUTO_MERGE,
        );
    }

    if include_trash {
        cl.push_clickable(
            Line::from(vec![
                Span::styled(
                    " [X] ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled("🗑 Trash held creature", Style::default().fg(Color::White)),
            ]),
            TRASH,
        );
    }

    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        format!(" Best creature: Lv {}", highest_level(state)),
        Style::default().fg(Color::Gray),
    )));
    match state.queue {
        Some(q) => cl.push(Line::from(Span::styled(
            format!(" Waiting for space: {} Lv {}", level_sticker(q.level), q.level),
            Style::default().fg(Color::Magenta),
        ))),
        None => cl.push(Line::from(Span::styled(
            " Waiting for space: —",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" ▶ Actions (tap to use) ");

    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(area, &mut cs, 1, 1);
    }
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

/// Full-screen welcome-back popup. Its buttons are registered after
/// everything else would be, so they always win the hit test.
fn render_offline_popup(
    coins: f64,
    can_double: bool,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(6)])
        .split(area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " ★ Welcome back! ★",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Your creatures earned 🪙 {} while you were away.", format_coins(coins)),
            Style::default().fg(Color::White),
        )),
    ];
    if can_double {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " You were gone a long time — double it with an ad?",
            Style::default().fg(Color::Cyan),
        )));
    }
    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Offline earnings "),
    );
    f.render_widget(body, chunks[0]);

    let mut cl = ClickableList::new();
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                " [C] ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("Collect", Style::default().fg(Color::White)),
        ]),
        COLLECT_OFFLINE,
    );
    if can_double {
        cl.push_clickable(
            Line::from(vec![
                Span::styled(
                    " [D] ",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("Watch ad, collect ×2", Style::default().fg(Color::White)),
            ]),
            DOUBLE_OFFLINE,
        );
    }

    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(chunks[1], &mut cs, 1, 1);
    }
    f.render_widget(
        Paragraph::new(cl.into_lines()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        chunks[1],
    );
}

/// Compact remaining-time label, e.g. "23h 59m" or "4m".
fn format_duration(ms: f64) -> String {
    let total_minutes = (ms.max(0.0) / 60_000.0).ceil() as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
