use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use wedding_rsvp_core::models::{group_by_label, Guest, GuestStats};

use crate::app::{App, DashboardFocus};
use crate::ui::styles;
use crate::utils::{format_added, percent_bar, truncate_string};

/// Width of the text bars in the stats panel
const BAR_WIDTH: usize = 16;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if !app.is_host_authenticated() {
        render_locked(frame, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(42), Constraint::Min(30)])
        .split(area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(5)])
        .split(columns[1]);

    render_stats(frame, app, columns[0]);
    render_guest_list(frame, app, right[0]);
    render_add_form(frame, app, right[1]);
}

fn render_locked(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::styled("  Este panel es solo para los novios.", styles::highlight_style()),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [Enter] ", styles::help_key_style()),
            Span::styled("Iniciar sesión", styles::muted_style()),
        ]),
    ];
    let block = Block::default()
        .title(" Panel ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn stat_line(label: &str, count: usize, stats: &GuestStats) -> Line<'static> {
    let percent = stats.percent(count);
    Line::from(vec![
        Span::styled(format!(" {:<12}", label), styles::list_item_style()),
        Span::styled(format!("{:>4} ", count), styles::highlight_style()),
        Span::styled(percent_bar(percent, BAR_WIDTH), styles::muted_style()),
        Span::styled(format!(" {:>3}%", percent), styles::muted_style()),
    ])
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = &app.guest_list.stats;

    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Invitados   ", styles::list_item_style()),
            Span::styled(format!("{:>4}", stats.total), styles::title_style()),
        ]),
        Line::from(""),
        stat_line("Confirmados", stats.attending, stats),
        stat_line("No asisten", stats.not_attending, stats),
        stat_line("Pendientes", stats.pending, stats),
        Line::from(""),
        Line::styled(" Autobús", styles::highlight_style()),
        Line::from(format!(
            " Ida     {:>3}  (Madrid {}, Móstoles {})",
            stats.departure.total, stats.departure.madrid, stats.departure.mostoles
        )),
        Line::from(format!(
            " Vuelta  {:>3}  (Madrid {}, Móstoles {})",
            stats.return_trip.total, stats.return_trip.madrid, stats.return_trip.mostoles
        )),
        Line::from(""),
    ];

    let groups = group_by_label(&app.guest_list.guests);
    lines.push(Line::styled(
        format!(" Grupos ({})", groups.len()),
        styles::highlight_style(),
    ));
    for group in &groups {
        let confirmed = group
            .members()
            .iter()
            .filter(|g| g.attending == Some(true))
            .count();
        lines.push(Line::from(vec![
            Span::raw(format!(" {:<28}", truncate_string(group.title(), 28))),
            Span::styled(
                format!("{}/{}", confirmed, group.len()),
                styles::muted_style(),
            ),
        ]));
    }

    let block = Block::default()
        .title(" Resumen ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn guest_item(guest: &Guest, name_width: usize, selected: bool) -> ListItem<'static> {
    let group = guest.group_label().unwrap_or("-");
    let line = Line::from(vec![
        Span::raw(format!(
            "{:<width$} ",
            truncate_string(&guest.name, name_width),
            width = name_width
        )),
        Span::styled(
            format!("{:<12}", guest.attendance().to_string()),
            styles::attendance_style(guest.attending),
        ),
        Span::styled(
            format!("{:<22}", truncate_string(group, 22)),
            styles::muted_style(),
        ),
        Span::styled(format_added(guest.created_at), styles::muted_style()),
    ]);

    let style = if selected {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    ListItem::new(line).style(style)
}

fn render_guest_list(frame: &mut Frame, app: &App, area: Rect) {
    let guests = app.filtered_guests();
    let focused = app.dashboard_focus == DashboardFocus::List;
    let name_width = (area.width as usize).saturating_sub(48).clamp(12, 32);

    let title = format!(
        " Invitados: {} ({}) ",
        app.dashboard_filter.title(),
        guests.len()
    );
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if !app.guests_loaded {
        let paragraph = Paragraph::new(Line::styled(" Cargando...", styles::muted_style()))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = guests
        .iter()
        .enumerate()
        .map(|(i, guest)| guest_item(guest, name_width, focused && i == app.guest_selection))
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    if !guests.is_empty() {
        state.select(Some(app.guest_selection));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_add_form(frame: &mut Frame, app: &App, area: Rect) {
    let name_focused = app.dashboard_focus == DashboardFocus::NewName;
    let group_focused = app.dashboard_focus == DashboardFocus::NewGroup;
    let focused = name_focused || group_focused;

    let field = |label: &str, value: &str, active: bool| {
        let cursor = if active { "▌" } else { "" };
        Line::from(vec![
            Span::styled(format!(" {:<8}", label), styles::list_item_style()),
            Span::styled(format!("{}{}", value, cursor), styles::input_style(active)),
        ])
    };

    let lines = vec![
        field("Nombre", &app.new_guest_name, name_focused),
        field("Grupo", &app.new_guest_group, group_focused),
        Line::styled(
            if focused {
                " [Enter] añadir  [Esc] cancelar"
            } else {
                " [n] añadir invitado"
            },
            styles::muted_style(),
        ),
    ];

    let block = Block::default()
        .title(" Nuevo invitado ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
