pub mod screen;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::{app::App, catalog::LineNo, scoring::LineMark};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const TAB_WIDTH: usize = 4;
/// `"▶ 123 │ "`
const GUTTER_WIDTH: usize = 8;

/// Draw whichever screen matches the current phase
pub fn draw(app: &App, f: &mut Frame) {
    let screen = screen::current_screen(app.controller.phase());
    screen.render(app, f);
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn mark_style(mark: LineMark) -> Style {
    match mark {
        LineMark::Correct => bold().fg(Color::Green),
        LineMark::Incorrect => bold().fg(Color::Red),
        LineMark::Missed => bold().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
        LineMark::Neutral => Style::default(),
    }
}

fn mark_symbol(mark: LineMark) -> &'static str {
    match mark {
        LineMark::Correct => "✓",
        LineMark::Incorrect => "✗",
        LineMark::Missed => "!",
        LineMark::Neutral => " ",
    }
}

/// First and last line (inclusive, 1-based) of a `height`-line window that
/// keeps `cursor` roughly centred
pub fn visible_window(cursor: LineNo, total: LineNo, height: u16) -> (LineNo, LineNo) {
    if total == 0 || height == 0 {
        return (1, 0);
    }
    let height = LineNo::from(height).min(total);
    let cursor = cursor.clamp(1, total);
    let start = cursor
        .saturating_sub(height / 2)
        .max(1)
        .min(total - height + 1);
    (start, start + height - 1)
}

/// Expand tabs and cut `text` so it occupies at most `max_width` columns
pub fn clip_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        if c == '\t' {
            let pad = TAB_WIDTH - used % TAB_WIDTH;
            if used + pad > max_width {
                break;
            }
            out.extend(std::iter::repeat(' ').take(pad));
            used += pad;
            continue;
        }
        let w = c.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out
}

/// Numbered, styled source lines for the code panel
fn code_lines(app: &App, area: Rect) -> Vec<Line<'static>> {
    let Some(track) = app.controller.track() else {
        return Vec::new();
    };
    let total = track.line_count() as LineNo;
    let (first, last) = visible_window(app.cursor(), total, area.height);
    let text_width = (area.width as usize).saturating_sub(GUTTER_WIDTH);
    let submitted = app.controller.session().is_submitted();

    (first..=last)
        .filter_map(|n| track.line(n).map(|text| (n, text)))
        .map(|(n, text)| {
            let at_cursor = n == app.cursor();
            let selected = app.controller.is_selected(n);

            let (marker, mut style) = if submitted {
                let mark = app.controller.line_mark(n).unwrap_or(LineMark::Neutral);
                (mark_symbol(mark), mark_style(mark))
            } else if selected {
                ("●", bold().fg(Color::Yellow))
            } else {
                (" ", Style::default())
            };
            if at_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }

            Line::from(vec![
                Span::styled(format!("{marker} {n:>3} │ "), dim()),
                Span::styled(clip_to_width(text, text_width), style),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Bug, Catalog, Difficulty, Track};
    use crate::controller::SessionSettings;
    use crate::timer::{ManualScheduler, TimerKind};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::sync::Arc;

    fn test_app(time_limit_secs: u32) -> (App, ManualScheduler) {
        let code = (1..=40)
            .map(|n| format!("stmt_{n}();"))
            .collect::<Vec<_>>()
            .join("\n");
        let bugs = [4, 9]
            .into_iter()
            .map(|line| Bug {
                line,
                description: format!("off by one on {line}"),
            })
            .collect();
        let track = Track::new(
            "demo",
            "Python",
            "Inventory script",
            code,
            bugs,
            Difficulty::Intermediate,
        )
        .unwrap();
        let sched = ManualScheduler::new();
        let app = App::new(
            Arc::new(Catalog::from_tracks(vec![track])),
            SessionSettings {
                time_limit_secs,
                ..SessionSettings::default()
            },
            Box::new(sched.clone()),
        );
        (app, sched)
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_visible_window_centres_cursor() {
        assert_eq!(visible_window(1, 100, 10), (1, 10));
        assert_eq!(visible_window(50, 100, 10), (45, 54));
        assert_eq!(visible_window(100, 100, 10), (91, 100));
        assert_eq!(visible_window(3, 5, 10), (1, 5));
        assert_eq!(visible_window(1, 0, 10), (1, 0));
    }

    #[test]
    fn test_clip_to_width_respects_wide_chars_and_tabs() {
        assert_eq!(clip_to_width("hello", 3), "hel");
        assert_eq!(clip_to_width("日本語", 5), "日本");
        assert_eq!(clip_to_width("\tx", 10), "    x");
        assert_eq!(clip_to_width("short", 80), "short");
    }

    #[test]
    fn test_select_screen_lists_tracks() {
        let (app, _) = test_app(180);
        let text = render(&app, 80, 24);

        assert!(text.contains("bughunt"));
        assert!(text.contains("Inventory script"));
        assert!(text.contains("2 bugs"));
    }

    #[test]
    fn test_ready_screen_shows_start_hint() {
        let (mut app, _) = test_app(180);
        app.choose_track("demo").unwrap();
        let text = render(&app, 80, 24);

        assert!(text.contains("Press Enter to start"));
        assert!(text.contains("3:00"));
        assert!(!text.contains("stmt_1();"));
    }

    #[test]
    fn test_play_screen_shows_code_score_and_clock() {
        let (mut app, _) = test_app(45);
        app.choose_track("demo").unwrap();
        app.controller.start();
        app.controller.toggle_line(4);
        app.controller.toggle_line(7);
        let text = render(&app, 100, 30);

        assert!(text.contains("stmt_1();"));
        assert!(text.contains("Score: 0"));
        assert!(text.contains("0:45"));
        assert!(text.contains("4, 7"));
    }

    #[test]
    fn test_submitted_screen_shows_results() {
        let (mut app, _) = test_app(180);
        app.choose_track("demo").unwrap();
        app.controller.start();
        app.controller.toggle_line(4);
        app.controller.submit();
        let text = render(&app, 100, 30);

        assert!(text.contains("Score: 20"));
        assert!(text.contains("off by one on 9"));
    }

    #[test]
    fn test_summary_screen_after_reveal() {
        let (mut app, sched) = test_app(180);
        app.choose_track("demo").unwrap();
        app.controller.start();
        app.controller.toggle_line(9);
        app.controller.submit();
        let reveal = sched
            .pending()
            .into_iter()
            .find(|s| s.event.kind == TimerKind::Reveal)
            .unwrap();
        app.controller.on_timer(reveal.event);
        let text = render(&app, 100, 30);

        assert!(text.contains("20 / 40"));
        assert!(text.contains("1 of 2"));
        assert!(text.contains("50%"));
        assert!(text.contains("Python"));
        assert!(text.contains("(r)"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let (mut app, _) = test_app(180);
        render(&app, 10, 4);
        app.choose_track("demo").unwrap();
        app.controller.start();
        render(&app, 10, 4);
        app.controller.toggle_line(4);
        app.controller.submit();
        render(&app, 3, 2);
    }
}
