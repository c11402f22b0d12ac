use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, PlaylistFocus};
use crate::ui::styles;

fn input_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let cursor = if focused { "▌" } else { "" };
    let marker = if focused { "▶ " } else { "  " };
    Line::from(vec![
        Span::styled(marker, styles::highlight_style()),
        Span::styled(format!("{:<20}", label), styles::list_item_style()),
        Span::styled(format!("{}{}", value, cursor), styles::input_style(focused)),
    ])
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::styled(
            "¿Qué canción no puede faltar en la fiesta?",
            styles::highlight_style(),
        ),
        Line::from(""),
        input_line(
            "Canción",
            &app.song_input,
            app.playlist_focus == PlaylistFocus::Song,
        ),
        input_line(
            "Artista",
            &app.artist_input,
            app.playlist_focus == PlaylistFocus::Artist,
        ),
        Line::from(""),
    ];

    let action = if app.playlist_busy {
        "Añadiendo..."
    } else {
        "Añadir a la playlist"
    };
    lines.push(Line::from(vec![
        Span::styled("[Enter] ", styles::help_key_style()),
        Span::styled(action, styles::muted_style()),
    ]));

    let block = Block::default()
        .title(" Sugiere una canción ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
