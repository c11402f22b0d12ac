//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use wedding_rsvp_core::models::DietaryChoice;
use wedding_rsvp_core::wizard::DraftEdit;

use crate::app::{
    can_add_email_char, can_add_name_char, can_add_password_char, can_add_text_char,
    visible_fields, App, AppState, DashboardFocus, LoginFocus, PlaylistFocus, Tab, WizardField,
};

/// Direction for cycling through choices
#[derive(Clone, Copy)]
enum CycleDirection {
    Forward,
    Backward,
}

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => {
            handle_login_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('s' | 'S' | 'y' | 'Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => app.state = AppState::Normal,
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('s' | 'S' | 'y' | 'Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    app.pending_delete = None;
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::F(1) => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Tab => {
            switch_tab(app, app.current_tab.next());
            return Ok(false);
        }
        KeyCode::BackTab => {
            switch_tab(app, app.current_tab.prev());
            return Ok(false);
        }
        _ => {}
    }

    // Tab-specific input
    match app.current_tab {
        Tab::Rsvp if app.is_editing() => handle_wizard_input(app, key),
        Tab::Rsvp => handle_search_input(app, key),
        Tab::Playlist => handle_playlist_input(app, key),
        Tab::Dashboard => handle_dashboard_input(app, key),
    }

    Ok(false)
}

fn switch_tab(app: &mut App, tab: Tab) {
    app.current_tab = tab;
    if tab == Tab::Dashboard {
        app.enter_dashboard();
    }
}

// ============================================================================
// RSVP
// ============================================================================

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.move_group_selection(-1),
        KeyCode::Down => app.move_group_selection(1),
        KeyCode::Enter => app.begin_wizard(),
        KeyCode::Esc => app.set_search_query(String::new()),
        KeyCode::Backspace => {
            let mut query = app.wizard.query().to_string();
            query.pop();
            app.set_search_query(query);
        }
        KeyCode::Char(c) => {
            let query = app.wizard.query();
            if can_add_name_char(query, c) {
                let query = format!("{}{}", query, c);
                app.set_search_query(query);
            }
        }
        _ => {}
    }
}

fn handle_wizard_input(app: &mut App, key: KeyEvent) {
    // Drafts are frozen while a submission is in flight
    if app.submitting {
        return;
    }

    let field_count = visible_fields(&app.wizard).len();
    match key.code {
        KeyCode::Up => {
            app.field_selection = app.field_selection.saturating_sub(1);
            return;
        }
        KeyCode::Down => {
            app.field_selection = (app.field_selection + 1).min(field_count.saturating_sub(1));
            return;
        }
        KeyCode::Enter => {
            if app.wizard.is_last_step() {
                app.submit_wizard();
            } else {
                app.next_step();
            }
            return;
        }
        KeyCode::Esc => {
            app.previous_step();
            return;
        }
        _ => {}
    }

    let Some(field) = app.current_field() else {
        return;
    };
    let Some(draft) = app.current_draft().cloned() else {
        return;
    };

    match (field, key.code) {
        (WizardField::Attending, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
            app.edit_current(DraftEdit::Attending(!draft.attending));
        }
        (WizardField::SharedTransport, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
            app.toggle_shared_transport();
        }
        (WizardField::Dietary, KeyCode::Left) => {
            cycle_dietary(app, draft.dietary, CycleDirection::Backward);
        }
        (WizardField::Dietary, KeyCode::Right | KeyCode::Char(' ')) => {
            cycle_dietary(app, draft.dietary, CycleDirection::Forward);
        }
        (WizardField::Departure, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
            app.edit_current(DraftEdit::Departure(draft.departure.next()));
        }
        (WizardField::Return, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
            app.edit_current(DraftEdit::Return(draft.return_trip.next()));
        }
        (WizardField::DietaryOther, KeyCode::Backspace) => {
            let mut text = draft.dietary_other;
            text.pop();
            app.edit_current(DraftEdit::DietaryOther(text));
        }
        (WizardField::DietaryOther, KeyCode::Char(c)) => {
            if can_add_text_char(&draft.dietary_other, c) {
                app.edit_current(DraftEdit::DietaryOther(format!("{}{}", draft.dietary_other, c)));
            }
        }
        (WizardField::Notes, KeyCode::Backspace) => {
            let mut text = draft.notes;
            text.pop();
            app.edit_current(DraftEdit::Notes(text));
        }
        (WizardField::Notes, KeyCode::Char(c)) => {
            if can_add_text_char(&draft.notes, c) {
                app.edit_current(DraftEdit::Notes(format!("{}{}", draft.notes, c)));
            }
        }
        _ => {}
    }
}

fn cycle_dietary(app: &mut App, current: DietaryChoice, direction: CycleDirection) {
    let next = match direction {
        CycleDirection::Forward => current.next(),
        CycleDirection::Backward => current.prev(),
    };
    app.edit_current(DraftEdit::Dietary(next));
}

// ============================================================================
// Playlist
// ============================================================================

fn handle_playlist_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Down => {
            app.playlist_focus = match app.playlist_focus {
                PlaylistFocus::Song => PlaylistFocus::Artist,
                PlaylistFocus::Artist => PlaylistFocus::Song,
            };
        }
        KeyCode::Enter => match app.playlist_focus {
            PlaylistFocus::Song => app.playlist_focus = PlaylistFocus::Artist,
            PlaylistFocus::Artist => app.submit_song(),
        },
        KeyCode::Backspace => {
            focused_playlist_input(app).pop();
        }
        KeyCode::Char(c) => {
            let input = focused_playlist_input(app);
            if can_add_text_char(input, c) {
                input.push(c);
            }
        }
        _ => {}
    }
}

fn focused_playlist_input(app: &mut App) -> &mut String {
    match app.playlist_focus {
        PlaylistFocus::Song => &mut app.song_input,
        PlaylistFocus::Artist => &mut app.artist_input,
    }
}

// ============================================================================
// Dashboard
// ============================================================================

fn handle_dashboard_input(app: &mut App, key: KeyEvent) {
    if !app.is_host_authenticated() {
        if key.code == KeyCode::Enter {
            app.start_login();
        }
        return;
    }

    match app.dashboard_focus {
        DashboardFocus::List => handle_guest_list_input(app, key),
        DashboardFocus::NewName | DashboardFocus::NewGroup => handle_new_guest_input(app, key),
    }
}

fn handle_guest_list_input(app: &mut App, key: KeyEvent) {
    let max_index = app.filtered_guests().len().saturating_sub(1);
    match key.code {
        KeyCode::Up => {
            app.guest_selection = app.guest_selection.saturating_sub(1);
        }
        KeyCode::Down => {
            app.guest_selection = (app.guest_selection + 1).min(max_index);
        }
        KeyCode::Home => app.guest_selection = 0,
        KeyCode::End => app.guest_selection = max_index,
        KeyCode::Char('f') | KeyCode::Right => app.cycle_filter(),
        KeyCode::Char('r') => app.load_guests(),
        KeyCode::Char('n') => app.dashboard_focus = DashboardFocus::NewName,
        KeyCode::Char('x') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('s') => app.sign_out(),
        _ => {}
    }
}

fn handle_new_guest_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.dashboard_focus = DashboardFocus::List,
        KeyCode::Up | KeyCode::Down => {
            app.dashboard_focus = match app.dashboard_focus {
                DashboardFocus::NewName => DashboardFocus::NewGroup,
                _ => DashboardFocus::NewName,
            };
        }
        KeyCode::Enter => match app.dashboard_focus {
            DashboardFocus::NewName => app.dashboard_focus = DashboardFocus::NewGroup,
            _ => app.add_guest(),
        },
        KeyCode::Backspace => {
            if let Some(input) = focused_new_guest_input(app) {
                input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(input) = focused_new_guest_input(app) {
                if can_add_name_char(input, c) {
                    input.push(c);
                }
            }
        }
        _ => {}
    }
}

fn focused_new_guest_input(app: &mut App) -> Option<&mut String> {
    match app.dashboard_focus {
        DashboardFocus::NewName => Some(&mut app.new_guest_name),
        DashboardFocus::NewGroup => Some(&mut app.new_guest_group),
        DashboardFocus::List => None,
    }
}

// ============================================================================
// Login
// ============================================================================

fn handle_login_input(app: &mut App, key: KeyEvent) {
    if app.login_busy {
        return;
    }

    match key.code {
        KeyCode::Esc => {
            // Back out of sign-in; the dashboard stays locked
            app.state = AppState::Normal;
            app.login_password.clear();
            if app.current_tab == Tab::Dashboard && !app.is_host_authenticated() {
                app.current_tab = Tab::Rsvp;
            }
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                app.login_focus = LoginFocus::Button;
                app.attempt_login();
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(&app.login_email, c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(&app.login_password, c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
}
