use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use wedding_rsvp_core::models::GuestGroup;
use wedding_rsvp_core::wizard::{is_searchable, GuestDraft, MIN_QUERY_LEN};

use crate::app::{visible_fields, App, WizardField};
use crate::ui::styles;
use crate::utils::truncate_string;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.is_editing() {
        render_wizard(frame, app, area);
    } else {
        render_search(frame, app, area);
    }
}

// ============================================================================
// Search
// ============================================================================

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let query = app.wizard.query();
    let search = Paragraph::new(Line::from(vec![
        Span::styled(query.to_string(), styles::input_style(true)),
        Span::styled("▌", styles::input_style(true)),
    ]))
    .block(
        Block::default()
            .title(" Busca tu nombre ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(search, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_group_list(frame, app, body[0]);
    render_group_members(frame, app, body[1]);
}

fn render_group_list(frame: &mut Frame, app: &App, area: Rect) {
    let groups = app.wizard.groups();
    let block = Block::default()
        .title(format!(" Grupos ({}) ", groups.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if groups.is_empty() {
        let query = app.wizard.query();
        let message = if !is_searchable(query.trim()) {
            format!("Escribe al menos {} letras de tu nombre", MIN_QUERY_LEN)
        } else if app.wizard.is_searching() {
            "Buscando...".to_string()
        } else {
            "No encontramos a nadie con ese nombre".to_string()
        };
        let paragraph = Paragraph::new(Line::styled(message, styles::muted_style()))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(12) as usize;
    let items: Vec<ListItem> = groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let title = match group {
                GuestGroup::Named { label, .. } => label.clone(),
                GuestGroup::Individual(guest) => format!("{} (individual)", guest.name),
            };
            let line = Line::from(format!(
                "{} ({})",
                truncate_string(&title, width),
                group.len()
            ));

            let style = if app.wizard.selected_index() == Some(i) {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(app.wizard.selected_index());
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_group_members(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(group) = app.wizard.selected_group() else {
        let hint = if app.wizard.groups().len() > 1 {
            "Selecciona tu grupo con ↑/↓"
        } else {
            ""
        };
        let paragraph = Paragraph::new(Line::styled(hint, styles::muted_style())).block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let mut lines = vec![
        Line::styled(group.title().to_string(), styles::title_style()),
        Line::from(""),
    ];
    for guest in group.members() {
        lines.push(Line::from(vec![
            Span::raw("  • "),
            Span::styled(guest.name.clone(), styles::list_item_style()),
            Span::raw("  "),
            Span::styled(
                guest.attendance().to_string(),
                styles::attendance_style(guest.attending),
            ),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[Enter]", styles::help_key_style()),
        Span::styled(" Continuar", styles::muted_style()),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Wizard
// ============================================================================

fn render_wizard(frame: &mut Frame, app: &App, area: Rect) {
    let Some(draft) = app.wizard.current_draft() else {
        return;
    };

    let title = format!(
        " Invitado {} de {}: {} ",
        app.wizard.step() + 1,
        app.wizard.step_count(),
        draft.name
    );
    let group = app
        .wizard
        .active_group()
        .map(|g| g.title().to_string())
        .unwrap_or_default();

    let mut lines = vec![
        Line::styled(group, styles::muted_style()),
        Line::from(""),
    ];

    for (i, field) in visible_fields(&app.wizard).into_iter().enumerate() {
        let selected = i == app.field_selection;
        lines.push(field_line(app, draft, field, selected));
    }

    lines.push(Line::from(""));
    let action = if app.submitting {
        "Enviando..."
    } else if app.wizard.is_last_step() {
        "Confirmar asistencia"
    } else {
        "Siguiente invitado"
    };
    lines.push(Line::from(vec![
        Span::styled("[Enter] ", styles::help_key_style()),
        Span::styled(action, styles::highlight_style()),
        Span::raw("    "),
        Span::styled("[Esc] ", styles::help_key_style()),
        Span::styled(
            if app.wizard.step() == 0 { "Volver a buscar" } else { "Anterior" },
            styles::muted_style(),
        ),
    ]));

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn field_line(app: &App, draft: &GuestDraft, field: WizardField, selected: bool) -> Line<'static> {
    let value = match field {
        WizardField::Attending => {
            if draft.attending {
                "Sí".to_string()
            } else {
                "No".to_string()
            }
        }
        WizardField::SharedTransport => {
            if app.wizard.shared_transport_enabled() {
                "[x]".to_string()
            } else {
                "[ ]".to_string()
            }
        }
        WizardField::Dietary => draft.dietary.label().to_string(),
        WizardField::DietaryOther => draft.dietary_other.clone(),
        WizardField::Departure => draft.departure_label().to_string(),
        WizardField::Return => draft.return_label().to_string(),
        WizardField::Notes => draft.notes.clone(),
    };

    let (marker, label_style) = if selected {
        ("▶ ", styles::selected_style())
    } else {
        ("  ", styles::list_item_style())
    };
    let value = if field.is_text() {
        let cursor = if selected { "▌" } else { "" };
        format!("{}{}", value, cursor)
    } else if selected {
        format!("◀ {} ▶", value)
    } else {
        value
    };

    Line::from(vec![
        Span::styled(marker, styles::highlight_style()),
        Span::styled(format!("{:<34}", field.label()), label_style),
        Span::styled(value, styles::input_style(selected)),
    ])
}
