use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use std::time::Duration;
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use crate::session::{ChallengeKind, Mode, TestConfig};
use crate::stats;
use crate::util;
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let snap = &app.snapshot;

    // styles
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);

    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);

    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let dim_italic_style = Style::default()
        .add_modifier(Modifier::DIM)
        .add_modifier(Modifier::ITALIC);

    let target: Vec<char> = snap.text.chars().collect();
    let typed: Vec<char> = snap.input.chars().collect();

    // In a listening challenge the word stays hidden until revealed; typed
    // positions still get normal feedback.
    let masked = snap.config.mode == Mode::Challenge
        && snap.config.challenge_kind == ChallengeKind::Listening
        && !snap.revealed;

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);

    let display_width = if masked {
        target.len()
    } else {
        snap.text.width()
    };
    let mut text_lines =
        ((display_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;
    if display_width <= max_chars_per_line as usize {
        text_lines = 1;
    }

    let hud_lines = 2;
    let panel_lines = match &snap.essay_prompt {
        Some(prompt) => {
            (prompt.width() as f64 / max_chars_per_line as f64).ceil() as u16 + 2
        }
        None => 0,
    };
    let hint_lines = if snap.config.mode == Mode::Challenge
        && snap.config.challenge_kind == ChallengeKind::Listening
    {
        2
    } else {
        0
    };

    let occupied = hud_lines + panel_lines + text_lines + hint_lines;
    let top_pad = ((area.height as f64 - occupied as f64) / 2.0) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(top_pad),
                Constraint::Length(hud_lines),
                Constraint::Length(panel_lines),
                Constraint::Length(text_lines),
                Constraint::Length(hint_lines),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    let hud = match snap.config.mode {
        Mode::Time => Line::from(Span::styled(
            util::format_clock(snap.time_left),
            dim_bold_style,
        )),
        Mode::Words => Line::from(Span::styled(
            format!(
                "{}/{} words   {}",
                snap.stats.words_completed,
                snap.config.word_count,
                util::format_clock(snap.elapsed_secs)
            ),
            dim_bold_style,
        )),
        Mode::Ielts => Line::from(Span::styled(
            format!(
                "{}   {}%",
                util::format_clock(snap.elapsed_secs),
                util::percent_of(typed.len(), target.len())
            ),
            dim_bold_style,
        )),
        Mode::Challenge => {
            let mut spans = vec![Span::styled(hearts(snap.lives), red_bold_style)];
            if snap.config.challenge_kind == ChallengeKind::Typing {
                spans.push(Span::styled(
                    format!("   {:.1}s", snap.word_timer.max(0.0)),
                    dim_bold_style,
                ));
            }
            spans.push(Span::styled(
                format!("   {} solved", snap.solved_words),
                dim_bold_style,
            ));
            Line::from(spans)
        }
    };

    Paragraph::new(hud)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    if let Some(prompt) = &snap.essay_prompt {
        Paragraph::new(prompt.as_str())
            .style(dim_italic_style)
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);
    }

    let mut spans = typed
        .iter()
        .zip(target.iter())
        .map(|(&typed_char, &expected)| {
            if typed_char == expected {
                Span::styled(expected.to_string(), green_bold_style)
            } else {
                Span::styled(
                    match typed_char {
                        ' ' => "·".to_owned(),
                        c => c.to_string(),
                    },
                    red_bold_style,
                )
            }
        })
        .collect::<Vec<Span>>();

    let cursor = typed.len();
    if let Some(&next) = target.get(cursor) {
        let shown = if masked { '·' } else { next };
        spans.push(Span::styled(shown.to_string(), underlined_dim_bold_style));
    }
    if cursor + 1 < target.len() {
        let rest: String = if masked {
            "·".repeat(target.len() - cursor - 1)
        } else {
            target[cursor + 1..].iter().collect()
        };
        spans.push(Span::styled(rest, dim_bold_style));
    }

    Paragraph::new(Line::from(spans))
        .alignment(if text_lines == 1 {
            // a single centered word or line reads better than a ragged left edge
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    if hint_lines > 0 {
        let hint = if snap.revealed {
            "[enter] play word".to_string()
        } else {
            "[enter] play word   [tab] reveal (-1 life)".to_string()
        };
        Paragraph::new(vec![Line::default(), Line::from(hint)])
            .style(dim_italic_style)
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let green_italic_style = Style::default()
        .patch(italic_style)
        .fg(Color::Green);

    let content_lines: u16 = 6;
    let top_pad = ((area.height as f64 - content_lines as f64) / 2.0) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Length(top_pad.saturating_sub(VERTICAL_MARGIN)),
                Constraint::Length(1), // stats
                Constraint::Length(1), // mode summary
                Constraint::Length(1), // best record
                Constraint::Length(1), // padding
                Constraint::Length(1), // next-up settings
                Constraint::Min(1),    // legend
            ]
            .as_ref(),
        )
        .split(area);

    // Results render from the finished snapshot, so reconfiguring for the
    // next session does not blank the numbers on screen.
    let Some(results) = &app.results else {
        return;
    };

    let stats_line = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} pts",
            results.stats.wpm,
            results.stats.accuracy,
            stats::score(results)
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats_line.render(chunks[1], buf);

    let summary = match results.config.mode {
        Mode::Time => format!("time {}s", results.config.duration_secs),
        Mode::Words => format!(
            "{} words in {}",
            results.config.word_count,
            util::format_clock(results.elapsed_secs)
        ),
        Mode::Ielts => format!("ielts ({})", results.config.essay_category),
        Mode::Challenge => format!(
            "challenge ({})   {} words solved",
            results.config.challenge_kind, results.solved_words
        ),
    };
    Paragraph::new(Span::styled(summary, dim_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let best_line = if app.new_best {
        Span::styled("new best!", green_italic_style)
    } else if let Some(prev) = &app.previous_best {
        let age_secs = Local::now()
            .signed_duration_since(prev.date)
            .num_seconds()
            .max(0) as u64;
        let age = HumanTime::from(Duration::from_secs(age_secs))
            .to_text_en(Accuracy::Rough, Tense::Past);
        Span::styled(
            format!("best: {} pts / {} wpm, {}", prev.score, prev.wpm, age),
            italic_style,
        )
    } else {
        Span::raw("")
    };
    Paragraph::new(best_line)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let next_config = app.engine.config();
    Paragraph::new(Span::styled(
        format!("next: {}", describe_config(&next_config)),
        dim_style.patch(italic_style),
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    let legend = Paragraph::new(Span::styled(
        String::from(if Browser::is_available() {
            "(r)etry / (m)ode / (c)onfig / (t)weet / (esc)ape"
        } else {
            "(r)etry / (m)ode / (c)onfig / (esc)ape"
        }),
        italic_style,
    ));
    legend.render(chunks[6], buf);
}

fn hearts(lives: i32) -> String {
    let mut s = "♥ ".repeat(lives.max(0) as usize);
    s.pop();
    s
}

fn describe_config(config: &TestConfig) -> String {
    match config.mode {
        Mode::Time => format!("time {}s", config.duration_secs),
        Mode::Words => format!("{} words", config.word_count),
        Mode::Ielts => format!("ielts ({})", config.essay_category),
        Mode::Challenge => format!("challenge ({})", config.challenge_kind),
    }
}
