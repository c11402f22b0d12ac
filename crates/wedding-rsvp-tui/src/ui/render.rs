use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab, ToastKind};
use crate::utils::truncate_string;

use super::styles;
use super::tabs::{dashboard, playlist, rsvp};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  ♥ {}", app.config.event_title);
    let mode = if app.backend.is_demo() { "[demo] " } else { "" };
    let help_hint = format!("{}[F1] Ayuda", mode);
    let used = title.chars().count() + help_hint.chars().count() + 4;

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [Tab::Rsvp, Tab::Playlist, Tab::Dashboard];

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *tab == app.current_tab {
            spans.push(Span::styled(tab.title(), styles::tab_style(true)));
        } else {
            spans.push(Span::styled(tab.title(), styles::muted_style()));
        }
    }

    // Signed-in host on the right
    if let Some(email) = app.session.email().filter(|_| app.session.is_valid()) {
        let host = format!("Anfitrión: {}", email);
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(used + host.chars().count() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(host, styles::muted_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Rsvp => rsvp::render(frame, app, area),
        Tab::Playlist => playlist::render(frame, app, area),
        Tab::Dashboard => dashboard::render(frame, app, area),
    }
}

/// Key hints for the current screen
fn shortcuts(app: &App) -> &'static str {
    match app.current_tab {
        Tab::Rsvp if app.is_editing() => "[↑↓] campo | [←→] cambiar | [Enter] siguiente | [Esc] atrás",
        Tab::Rsvp => "[↑↓] grupo | [Enter] continuar | [Tab] pestaña",
        Tab::Playlist => "[↑↓] campo | [Enter] añadir | [Tab] pestaña",
        Tab::Dashboard => "[n] nuevo | [Supr] eliminar | [f] filtro | [r] recargar",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let right_text = format!(" {} ", shortcuts(app));

    let (left_text, left_style) = match &app.toast {
        Some(toast) => {
            let style = match toast.kind {
                ToastKind::Info => styles::success_style(),
                ToastKind::Destructive => styles::error_style(),
            };
            let room = width.saturating_sub(right_text.chars().count() + 2);
            let text = format!(" {}: {}", toast.title, toast.description);
            (truncate_string(&text, room), style)
        }
        None if app.submitting => (" Enviando confirmación...".to_string(), styles::highlight_style()),
        None => (String::new(), styles::muted_style()),
    };

    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc.to_string(), styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(56, 26, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("   Confirmación de asistencia", styles::title_style())),
        Line::from(Span::styled(
            format!("   versión {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" General", styles::highlight_style())),
        help_line("Tab", "Siguiente pestaña"),
        help_line("Shift+Tab", "Pestaña anterior"),
        help_line("F1", "Mostrar/ocultar ayuda"),
        help_line("Ctrl+Q", "Salir"),
        Line::from(""),
        Line::from(Span::styled(" Confirmar asistencia", styles::highlight_style())),
        help_line("texto", "Busca tu nombre (mínimo 3 letras)"),
        help_line("↑/↓", "Elegir grupo o campo"),
        help_line("←/→ Espacio", "Cambiar la respuesta"),
        help_line("Enter", "Continuar / siguiente invitado / enviar"),
        help_line("Esc", "Invitado anterior / volver a buscar"),
        Line::from(""),
        Line::from(Span::styled(" Panel", styles::highlight_style())),
        help_line("n", "Añadir invitado"),
        help_line("Supr / x", "Eliminar invitado"),
        help_line("f", "Filtrar por estado"),
        help_line("r / s", "Recargar / cerrar sesión"),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Pulsa ", styles::muted_style()),
            Span::styled("F1", styles::help_key_style()),
            Span::styled(" o ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" para cerrar", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(52, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Acceso para los novios", styles::title_style())),
        Line::from(""),
    ];

    // Email field
    let email_focused = app.login_focus == LoginFocus::Email;
    let email_style = if email_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let email_display = format!("{:<26}", truncate_string(&app.login_email, 26));
    let cursor = if email_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Email:      [", styles::muted_style()),
        Span::styled(format!("{}{}", email_display, cursor), email_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Password field
    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.chars().count().min(26));
    let password_display = format!("{:<26}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Contraseña: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Sign-in button
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let label = match (app.login_busy, button_focused) {
        (true, _) => "  Entrando...  ",
        (false, true) => " ▶ Entrar ◀  ",
        (false, false) => "    Entrar     ",
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("               ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    // Error message
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_confirm_overlay(frame: &mut Frame, question: Line<'static>, yes: &str) {
    let area = centered_rect_fixed(52, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        question,
        Line::from(""),
        Line::from(vec![
            Span::styled("   Pulsa ", styles::muted_style()),
            Span::styled("[S]", styles::help_key_style()),
            Span::styled(format!(" para {}, ", yes), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" para cancelar", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let question = Line::from(Span::styled(
        "   ¿Seguro que quieres salir?",
        styles::highlight_style(),
    ));
    render_confirm_overlay(frame, question, "salir");
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let name = app
        .pending_delete
        .as_ref()
        .map(|g| truncate_string(&g.name, 24))
        .unwrap_or_default();
    let question = Line::from(vec![
        Span::styled("   ¿Eliminar a ", styles::highlight_style()),
        Span::styled(name, styles::error_style()),
        Span::styled("?", styles::highlight_style()),
    ]);
    render_confirm_overlay(frame, question, "eliminar");
}
