mod game;
mod input;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use game::MergeGame;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use time::{GameTime, TICKS_PER_SECOND};

/// Query the grid container's bounding rect and convert pixel coordinates
/// to a terminal cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

/// Build the initial game: restore the save, then settle offline earnings
/// against the last-seen marker (the moment the previous session went
/// hidden or closed).
fn initial_game(now_ms: f64) -> MergeGame {
    #[allow(unused_mut)]
    let mut state = game::state::GameState::new(now_ms);

    #[cfg(target_arch = "wasm32")]
    {
        if game::save::load_game(&mut state) {
            game::offline::reconcile_on_startup(&mut state, game::save::take_last_seen(), now_ms);
        }
    }

    MergeGame::from_state(state)
}

/// Save when the tab goes hidden or the page unloads, and stamp the
/// last-seen marker that seeds the next session's offline earnings.
#[cfg(target_arch = "wasm32")]
fn install_lifecycle_hooks(game: Rc<RefCell<MergeGame>>) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let window = match web_sys::window() {
        Some(w) => w,
        None => return,
    };
    let document = match window.document() {
        Some(d) => d,
        None => return,
    };

    let on_visibility = {
        let game = game.clone();
        let document = document.clone();
        Closure::wrap(Box::new(move || {
            if document.hidden() {
                game::save::save_game(&game.borrow().state);
                game::save::save_last_seen(js_sys::Date::now());
            }
        }) as Box<dyn FnMut()>)
    };
    let _ = document.add_event_listener_with_callback(
        "visibilitychange",
        on_visibility.as_ref().unchecked_ref(),
    );
    on_visibility.forget();

    let on_unload = Closure::wrap(Box::new(move || {
        game::save::save_game(&game.borrow().state);
        game::save::save_last_seen(js_sys::Date::now());
    }) as Box<dyn FnMut()>);
    let _ =
        window.add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref());
    on_unload.forget();
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let game = Rc::new(RefCell::new(initial_game(js_sys::Date::now())));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    #[cfg(target_arch = "wasm32")]
    install_lifecycle_hooks(game.clone());

    // Mouse/touch handler: pixel → terminal cell → registered action.
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.kind != MouseEventKind::ButtonDown(MouseButton::Left) {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let action = cs.hit_test(mouse_event.col, mouse_event.row);
            drop(cs);

            if let Some(action_id) = action {
                game.borrow_mut()
                    .handle_input(&InputEvent::Click(action_id), js_sys::Date::now());
            }
        }
    });

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            let key = match key_event.code {
                KeyCode::Char(c) => Some(c.to_ascii_lowercase()),
                KeyCode::Left => Some('h'),
                KeyCode::Down => Some('j'),
                KeyCode::Up => Some('k'),
                KeyCode::Right => Some('l'),
                KeyCode::Enter => Some(' '),
                KeyCode::Esc => {
                    game.borrow_mut().clear_selection();
                    None
                }
                _ => None,
            };
            if let Some(key) = key {
                game.borrow_mut()
                    .handle_input(&InputEvent::Key(key), js_sys::Date::now());
            }
        }
    });

    let game_time = RefCell::new(GameTime::new(TICKS_PER_SECOND));
    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let now_ms = js_sys::Date::now();
            let ticks = game_time.borrow_mut().update(now_ms);

            let mut g = game.borrow_mut();
            g.tick(ticks, now_ms);

            if g.take_dirty() {
                #[cfg(target_arch = "wasm32")]
                game::save::save_game(&g.state);
            }

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            game::render::render(&g, f, size, &click_state);
        }
    });

    Ok(())
}
