use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use super::{bold, code_lines, dim, italic, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::{
    app::App,
    session::Phase,
    util::{format_clock, is_running_low},
};

/// A UI Screen boundary: renders one phase of the game
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Track menu
pub struct SelectScreen;

impl Screen for SelectScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3), // title
                Constraint::Min(1),    // tracks
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(f.area());

        let title = Paragraph::new(vec![
            Line::from(Span::styled("bughunt", bold().fg(Color::Cyan))),
            Line::from(Span::styled(
                "Find the planted bugs before the clock runs out",
                italic(),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        let catalog = app.controller.catalog();
        let items: Vec<Line> = catalog
            .tracks()
            .enumerate()
            .map(|(idx, track)| {
                let highlighted = idx == app.menu_index();
                let style = if highlighted {
                    bold().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(if highlighted { "▶ " } else { "  " }, style),
                    Span::styled(
                        format!("{}. {:<8} {}", idx + 1, track.language(), track.title()),
                        style,
                    ),
                    Span::styled(
                        format!(
                            "  ({} bugs, {})",
                            track.bugs().len(),
                            track.difficulty()
                        ),
                        dim(),
                    ),
                ])
            })
            .collect();
        let menu = Paragraph::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" pick a track "),
        );
        f.render_widget(menu, chunks[1]);

        if let Some(status) = app.status() {
            let status = Paragraph::new(Span::styled(status.to_string(), bold().fg(Color::Red)))
                .alignment(Alignment::Center);
            f.render_widget(status, chunks[2]);
        }

        let legend = Paragraph::new(Span::styled(
            "(↑/↓) move / (enter) pick / (1-9) quick pick / (r)andom / (esc)ape",
            italic(),
        ));
        f.render_widget(legend, chunks[3]);
    }
}

/// Countdown, code panel and selection; also shows results while the reveal
/// delay runs
pub struct PlayScreen;

impl Screen for PlayScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(1), // progress
                Constraint::Min(3),    // body
                Constraint::Length(1), // legend
            ])
            .split(f.area());

        render_header(app, f, chunks[0]);
        render_progress(app, f, chunks[1]);

        let session = app.controller.session();
        if session.started() {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
                .split(chunks[2]);
            render_code(app, f, body[0]);
            render_side_panel(app, f, body[1]);
        } else {
            render_ready(app, f, chunks[2]);
        }

        let legend = match app.controller.phase() {
            Phase::Submitted => "revealing results... / (esc)ape",
            _ if !session.started() => "(enter) start / (backspace) back / (esc)ape",
            _ => "(↑/↓) move / (space) mark / (x) unmark / (enter) submit / (esc)ape",
        };
        f.render_widget(
            Paragraph::new(Span::styled(legend, italic())),
            chunks[3],
        );
    }
}

fn render_header(app: &App, f: &mut Frame, area: Rect) {
    let Some(track) = app.controller.track() else {
        return;
    };
    let remaining = app.controller.remaining_secs();
    let clock_style = if app.controller.session().started() && is_running_low(remaining) {
        bold().fg(Color::Red)
    } else {
        bold()
    };
    let status = Line::from(vec![
        Span::styled(format!("Score: {}", app.controller.score()), bold()),
        Span::raw("   "),
        Span::styled(format_clock(remaining), clock_style),
    ]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(status.width() as u16)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(track.language().to_string(), bold().fg(Color::Cyan)),
        Span::raw(" · "),
        Span::styled(track.title().to_string(), bold()),
    ]));
    f.render_widget(title, chunks[0]);
    f.render_widget(Paragraph::new(status).alignment(Alignment::Right), chunks[1]);
}

fn render_progress(app: &App, f: &mut Frame, area: Rect) {
    let percent = app.controller.snapshot().progress_percent;
    let color = if is_running_low(app.controller.remaining_secs()) {
        Color::Red
    } else {
        Color::Green
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{percent:.0}% of time used"));
    f.render_widget(gauge, area);
}

fn render_ready(app: &App, f: &mut Frame, area: Rect) {
    let Some(track) = app.controller.track() else {
        return;
    };
    let text = vec![
        Line::from(Span::styled(
            format!("{} ({})", track.title(), track.language()),
            bold(),
        )),
        Line::from(""),
        Line::from(format!(
            "{} bugs hide in {} lines of code",
            track.bugs().len(),
            track.line_count()
        )),
        Line::from(format!(
            "You have {} to find them",
            format_clock(app.controller.settings().time_limit_secs)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to start",
            bold().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
        )),
    ];
    let top = area.height.saturating_sub(text.len() as u16) / 2;
    let inner = Rect {
        y: area.y + top,
        height: area.height - top,
        ..area
    };
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn render_code(app: &App, f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" code ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(code_lines(app, inner)), inner);
}

fn render_side_panel(app: &App, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    let selected = app.controller.snapshot().selected_lines;
    let selected_text = if selected.is_empty() {
        Span::styled("none yet", dim())
    } else {
        Span::raw(selected.iter().join(", "))
    };
    f.render_widget(
        Paragraph::new(selected_text)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" selected ({}) ", selected.len())),
            ),
        chunks[0],
    );

    let block = Block::default().borders(Borders::ALL).title(" results ");
    let lines = match app.controller.session().score() {
        Some(score) => {
            let mut lines = vec![Line::from(Span::styled(
                format!("Found {} of {}", score.found, score.total),
                bold(),
            ))];
            lines.extend(app.controller.findings().into_iter().map(|finding| {
                let (symbol, style) = if finding.found {
                    ("✓", Style::default().fg(Color::Green))
                } else {
                    ("✗", Style::default().fg(Color::Red))
                };
                Line::from(Span::styled(
                    format!("{symbol} L{}  {}", finding.bug.line, finding.bug.description),
                    style,
                ))
            }));
            lines
        }
        None => vec![
            Line::from(Span::styled("space  mark the line", dim())),
            Line::from(Span::styled("x      unmark it", dim())),
            Line::from(Span::styled("enter  submit your picks", dim())),
        ],
    };
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        chunks[1],
    );
}

/// Final results
pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let (Some(track), Some(score)) = (app.controller.track(), app.controller.session().score())
        else {
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled("Round complete", bold().fg(Color::Cyan))),
            Line::from(""),
            Line::from(Span::styled(
                format!("Score: {} / {}", score.points(), score.max_points()),
                bold(),
            )),
            Line::from(format!("Bugs found: {} of {}", score.found, score.total)),
            Line::from(format!("Accuracy: {}%", score.accuracy_percent())),
            Line::from(format!("Language: {}", track.language())),
            Line::from(""),
        ];
        lines.extend(app.controller.findings().into_iter().map(|finding| {
            let (symbol, color) = if finding.found {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };
            Line::from(vec![
                Span::styled(format!("{symbol} line {:>3}  ", finding.bug.line), bold().fg(color)),
                Span::raw(finding.bug.description.clone()),
            ])
        }));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("(r)estart / (esc)ape", italic())));

        let area = f.area();
        let inner = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([Constraint::Min(1)])
            .split(area)[0];
        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::SelectingTrack => Box::new(SelectScreen),
        Phase::Playing | Phase::Submitted => Box::new(PlayScreen),
        Phase::Finished => Box::new(SummaryScreen),
    }
}
