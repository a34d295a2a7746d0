use ratatui::{
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};
use vidspark_core::{BlockBody, DisplayTier, Theme};

use crate::app::{App, FocusPane, FormField, InputMode};

/// Colors that change with the theme.
struct Palette {
    fg: Color,
    bg: Color,
    accent: Color,
    muted: Color,
    heading: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                fg: Color::White,
                bg: Color::Reset,
                accent: Color::Cyan,
                muted: Color::DarkGray,
                heading: Color::Yellow,
            },
            Theme::Light => Self {
                fg: Color::Black,
                bg: Color::White,
                accent: Color::Blue,
                muted: Color::Gray,
                heading: Color::Magenta,
            },
        }
    }

    fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.accent } else { self.muted })
    }
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = Palette::for_theme(app.theme);

    frame.render_widget(
        Block::default().style(Style::default().fg(palette.fg).bg(palette.bg)),
        area,
    );

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [form_area, right_area] =
        Layout::horizontal([Constraint::Length(40), Constraint::Min(0)]).areas(body_area);
    let [result_area, refine_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(right_area);

    render_header(app, frame, header_area, &palette);
    render_form(app, frame, form_area, &palette);
    render_result(app, frame, result_area, &palette);
    render_refine(app, frame, refine_area, &palette);
    render_footer(app, frame, footer_area);

    // Popups: a notice wins over the busy overlay
    if app.notice.is_some() {
        render_notice(app, frame, area, &palette);
    } else if app.session.busy_action().is_some() {
        render_busy(app, frame, area, &palette);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let tier = app.session.tier();
    let badge_style = match tier {
        DisplayTier::Premium => Style::default().bg(Color::Green).fg(Color::Black).bold(),
        DisplayTier::TrialExpired => Style::default().bg(Color::Red).fg(Color::White).bold(),
        DisplayTier::FreeTrialAvailable => {
            Style::default().bg(Color::Yellow).fg(Color::Black).bold()
        }
    };

    let title = Line::from(vec![
        Span::styled(" VidSpark ", Style::default().fg(palette.accent).bold()),
        Span::styled(format!(" {} ", tier.label()), badge_style),
        Span::raw(" "),
        Span::styled(
            format!("theme: {}", app.theme.as_str()),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_form(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let focused = app.focus == FocusPane::Form;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(focused))
        .title(" Your Business ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for field in FormField::ALL {
        let selected = focused && app.form_field == field;
        let label_style = if selected {
            Style::default().fg(palette.accent).bold()
        } else {
            Style::default().fg(palette.muted)
        };
        lines.push(Line::from(Span::styled(field.label(), label_style)));

        let value = app.field_value(field);
        let value_line = match field {
            FormField::Business if value.is_empty() => Line::from(Span::styled(
                "  e.g. small chops, hair salon",
                Style::default().fg(palette.muted).italic(),
            )),
            FormField::Business => Line::from(format!("  {}", value)),
            _ if selected => Line::from(vec![
                Span::styled("  < ", Style::default().fg(palette.accent)),
                Span::styled(value.to_string(), Style::default().bold()),
                Span::styled(" >", Style::default().fg(palette.accent)),
            ]),
            _ => Line::from(format!("  {}", value)),
        };
        lines.push(value_line);
        lines.push(Line::default());
    }

    frame.render_widget(Paragraph::new(lines), inner);

    // Cursor in the business field while typing
    if focused && app.input_mode == InputMode::Editing && app.form_field == FormField::Business {
        let cursor_x = (app.business_input.cursor as u16 + 2).min(inner.width.saturating_sub(1));
        frame.set_cursor_position((inner.x + cursor_x, inner.y + 1));
    }
}

fn render_result(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    app.result_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(app.focus == FocusPane::Result))
        .title(" Your Video Strategy ");
    let inner = block.inner(area);

    let blocks = app.session.blocks();
    if blocks.is_empty() {
        let placeholder = Paragraph::new("Fill in your business and press Enter to get an idea")
            .style(Style::default().fg(palette.muted))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for display in blocks {
        lines.push(Line::from(Span::styled(
            display.title.to_uppercase(),
            Style::default().fg(palette.heading).bold(),
        )));
        match &display.body {
            BlockBody::Text(text) => lines.extend(text.lines().map(parse_markdown_line)),
            BlockBody::Steps(steps) => {
                for (idx, step) in steps.iter().enumerate() {
                    let mut line = parse_markdown_line(step);
                    line.spans.insert(
                        0,
                        Span::styled(format!("{}. ", idx + 1), Style::default().fg(palette.accent)),
                    );
                    lines.push(line);
                }
            }
        }
        lines.push(Line::default());
    }

    // Approximate wrapped height for scroll clamping
    let width = inner.width.max(1) as usize;
    let total_lines: u16 = lines
        .iter()
        .map(|l| (l.width().max(1).div_ceil(width)) as u16)
        .sum();
    let max_scroll = total_lines.saturating_sub(inner.height);
    app.result_scroll = app.result_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.result_scroll, 0));
    frame.render_widget(paragraph, area);

    if total_lines > inner.height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let mut scrollbar_state =
            ScrollbarState::new(max_scroll as usize).position(app.result_scroll as usize);
        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_refine(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let focused = app.focus == FocusPane::Refine;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(focused))
        .title(" Refine (e.g. make it funnier) ");
    let inner = block.inner(area);

    let input = if app.refine_input.value.is_empty() && !focused {
        Paragraph::new("Press r to refine the current idea")
            .style(Style::default().fg(palette.muted))
    } else {
        Paragraph::new(app.refine_input.value.as_str())
    };
    frame.render_widget(input.block(block), area);

    if focused && app.input_mode == InputMode::Editing {
        let cursor_x = (app.refine_input.cursor as u16).min(inner.width.saturating_sub(1));
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = hint_label_style(true);

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };
    // Generating is dimmed once the free trial is used up
    let generate_hint = |key: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(
                " generate ",
                hint_label_style(app.session.tier().can_generate()),
            ),
        ]
    };

    let mut hints: Vec<Span> = match (app.input_mode, app.focus) {
        (InputMode::Editing, FocusPane::Refine) => {
            [hint("Enter", "refine"), hint("Esc", "stop typing")].concat()
        }
        (InputMode::Editing, _) => [
            generate_hint("Enter"),
            hint("Up/Down", "field"),
            hint("Left/Right", "option"),
            hint("Esc", "stop typing"),
        ]
        .concat(),
        (InputMode::Normal, focus) => {
            let mut hints = vec![hint("Tab", "focus")];
            match focus {
                FocusPane::Form => hints.push(hint("h/l", "option")),
                _ => hints.push(hint("j/k", "scroll")),
            }
            hints.extend([
                generate_hint("g"),
                hint("r", "refine"),
                hint("c", "copy"),
                hint("s", "subscribe"),
                hint("t", "theme"),
                hint("q", "quit"),
            ]);
            hints.concat()
        }
    };

    if let Some(flash) = &app.flash {
        hints.push(Span::styled(
            format!(" {} ", flash),
            Style::default().fg(Color::Green).bg(Color::Black).bold(),
        ));
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn hint_label_style(enabled: bool) -> Style {
    let style = Style::default().bg(Color::Black);
    if enabled {
        style.fg(Color::White)
    } else {
        style.fg(Color::DarkGray)
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(2));
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn render_busy(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let Some(action) = app.session.busy_action() else {
        return;
    };

    let popup_area = centered(area, 36, 3);
    frame.render_widget(Clear, popup_area);

    let dots = ".".repeat(app.animation_frame as usize + 1);
    let text = format!("{}{:<3}", action.busy_label(), dots);
    let popup = Paragraph::new(text)
        .style(Style::default().fg(palette.accent).bold())
        .centered()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent)),
        );
    frame.render_widget(popup, popup_area);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let Some(notice) = &app.notice else {
        return;
    };

    let popup_area = centered(area, 54, 8);
    frame.render_widget(Clear, popup_area);

    let border_color = if notice.is_upsell() { Color::Magenta } else { Color::Yellow };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", notice.title()));

    let mut lines = vec![Line::from(notice.text()), Line::default()];
    if notice.is_upsell() {
        lines.push(Line::from(vec![
            Span::styled(" s ", Style::default().bg(Color::Magenta).fg(Color::White).bold()),
            Span::raw(" Upgrade now   "),
            Span::styled(" Esc ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" maybe later"),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            "Press Enter or Esc to close",
            Style::default().fg(palette.muted),
        )));
    }

    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(popup, popup_area);
}
