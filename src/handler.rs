use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::warn;
use vidspark_core::{to_plain_text, Action};

use crate::app::{App, FocusPane, FormField, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Response(response) => app.apply_response(response),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // A popup notice captures input until dismissed
    if app.notice.is_some() {
        handle_notice(app, key);
        return;
    }

    app.flash = None;
    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_notice(app: &mut App, key: KeyEvent) {
    let upsell = app.notice.as_ref().is_some_and(|n| n.is_upsell());
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.notice = None,
        KeyCode::Char('s') if upsell => {
            app.notice = None;
            app.start_subscribe();
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Tab => app.focus = app.focus.next(),

        // Start typing in the focused pane
        KeyCode::Char('i') | KeyCode::Enter => match app.focus {
            FocusPane::Form | FocusPane::Refine => app.input_mode = InputMode::Editing,
            FocusPane::Result => {}
        },

        KeyCode::Char('g') => {
            if !app.session.is_busy(Action::Generate) {
                app.start_generate();
            }
        }
        KeyCode::Char('r') => {
            app.focus = FocusPane::Refine;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('s') => {
            if !app.session.is_busy(Action::Subscribe) {
                app.start_subscribe();
            }
        }
        KeyCode::Char('c') => {
            if app.session.current_idea().is_some() {
                copy_to_clipboard(&to_plain_text(app.session.blocks()));
                app.flash = Some("Copied!".to_string());
            }
        }
        KeyCode::Char('t') => app.toggle_theme(),

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Form => app.form_field = app.form_field.next(),
            _ => app.scroll_down(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Form => app.form_field = app.form_field.prev(),
            _ => app.scroll_up(1),
        },
        KeyCode::Char('h') | KeyCode::Left if app.focus == FocusPane::Form => {
            app.cycle_field(false)
        }
        KeyCode::Char('l') | KeyCode::Right if app.focus == FocusPane::Form => {
            app.cycle_field(true)
        }

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(10);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(10);
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,

        KeyCode::Enter => match app.focus {
            FocusPane::Refine => {
                if !app.session.is_busy(Action::Refine) {
                    app.start_refine();
                }
            }
            _ => {
                if !app.session.is_busy(Action::Generate) {
                    app.start_generate();
                }
            }
        },

        KeyCode::Tab if app.focus == FocusPane::Form => app.form_field = app.form_field.next(),
        KeyCode::BackTab if app.focus == FocusPane::Form => {
            app.form_field = app.form_field.prev()
        }
        KeyCode::Down if app.focus == FocusPane::Form => app.form_field = app.form_field.next(),
        KeyCode::Up if app.focus == FocusPane::Form => app.form_field = app.form_field.prev(),
        KeyCode::Tab => {
            app.focus = app.focus.next();
            app.input_mode = InputMode::Normal;
        }

        // Selector fields cycle with the arrow keys
        KeyCode::Left if selector_focused(app) => app.cycle_field(false),
        KeyCode::Right if selector_focused(app) => app.cycle_field(true),

        code => {
            if let Some(input) = app.active_input() {
                match code {
                    KeyCode::Char(c) => input.insert(c),
                    KeyCode::Backspace => input.backspace(),
                    KeyCode::Delete => input.delete(),
                    KeyCode::Left => input.left(),
                    KeyCode::Right => input.right(),
                    KeyCode::Home => input.home(),
                    KeyCode::End => input.end(),
                    _ => {}
                }
            }
        }
    }
}

fn selector_focused(app: &App) -> bool {
    app.focus == FocusPane::Form && app.form_field != FormField::Business
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let over_result = app
        .result_area
        .is_some_and(|area| point_in_rect(mouse.column, mouse.row, area));
    if !over_result {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

/// Pipe text into the first clipboard tool that starts.
fn copy_to_clipboard(text: &str) {
    use std::io::Write;
    use std::process::{Command, Stdio};

    const TOOLS: &[(&str, &[&str])] = &[
        ("pbcopy", &[]),
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
    ];

    for (tool, args) in TOOLS {
        if let Ok(mut child) = Command::new(tool).args(*args).stdin(Stdio::piped()).spawn() {
            if let Some(mut stdin) = child.stdin.take() {
                let _ = stdin.write_all(text.as_bytes());
            }
            let _ = child.wait();
            return;
        }
    }
    warn!("no clipboard tool available");
}
