mod app;
mod config;
mod corpus;
mod engine;
mod event;
mod feedback;
mod session;
mod store;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph};

use app::{App, Screen};
use config::Config;
use corpus::Corpus;
use event::{AppEvent, EventHandler};
use feedback::{EventSink, LogSpeaker, NarrationSink, Narrator, NullSink};
use session::scoring;
use store::json_store::JsonStore;

#[derive(Parser)]
#[command(name = "sentora", version, about = "Terminal sentence-typing game")]
struct Cli {
    #[arg(short, long, help = "Player name for the leaderboard")]
    name: Option<String>,

    #[arg(long, help = "Override the data directory")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Directory with extra lesson JSON files")]
    lessons_dir: Option<PathBuf>,

    #[arg(long, help = "Seconds allowed per sentence")]
    time_limit: Option<u64>,

    #[arg(short, long, help = "Disable narration")]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(name) = cli.name {
        config.player_name = name;
    }
    if let Some(limit) = cli.time_limit {
        config.time_limit_secs = limit;
    }
    if cli.quiet {
        config.narration_enabled = false;
    }
    config.normalize();

    let store = match cli.data_dir {
        Some(dir) => JsonStore::with_base_dir(dir)?,
        None => JsonStore::new()?,
    };

    let lessons_dir = cli
        .lessons_dir
        .or_else(|| config.lessons_dir.as_ref().map(PathBuf::from));
    let corpus = Corpus::load(lessons_dir.as_deref());

    let sink: Box<dyn EventSink> = if config.narration_enabled {
        Box::new(NarrationSink::new(Narrator::spawn(Box::new(LogSpeaker))))
    } else {
        Box::new(NullSink)
    };

    let mut app = App::new(config, store, corpus, sink);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Menu => handle_menu_key(app, key),
        Screen::CourseSelect => handle_course_key(app, key),
        Screen::Playing => handle_playing_key(app, key),
        Screen::LevelComplete => handle_level_complete_key(app, key),
        Screen::GameOver => handle_game_over_key(app, key),
        Screen::Leaderboard => handle_leaderboard_key(app, key),
        Screen::Achievements => handle_achievements_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') | KeyCode::Enter => app.go_to_course_select(),
        KeyCode::Char('d') => app.start_daily_challenge(),
        KeyCode::Char('l') => app.go_to_leaderboard(),
        KeyCode::Char('a') => app.go_to_achievements(),
        _ => {}
    }
}

fn handle_course_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_lesson(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_lesson(),
        KeyCode::Enter => app.start_level(app.selected_lesson),
        _ => {}
    }
}

fn handle_playing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => app.submit(),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn handle_level_complete_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('n') => app.next_level(),
        KeyCode::Char('r') => app.retry_level(),
        KeyCode::Char('m') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_game_over_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry_level(),
        KeyCode::Char('m') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_leaderboard_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Char('t') => app.cycle_leaderboard_view(),
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        _ => {}
    }
}

fn handle_achievements_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    match app.screen {
        Screen::Menu => render_menu(frame, app),
        Screen::CourseSelect => render_course_select(frame, app),
        Screen::Playing => render_playing(frame, app),
        Screen::LevelComplete => render_level_complete(frame, app),
        Screen::GameOver => render_game_over(frame, app),
        Screen::Leaderboard => render_leaderboard(frame, app),
        Screen::Achievements => render_achievements(frame, app),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let streak = app.levels.streak_days();
    let streak_text = if streak > 0 {
        format!(" | {streak} day streak")
    } else {
        String::new()
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " sentora ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " {} | Level {} {} | {} exp{}",
            app.config.player_name,
            app.levels.level(),
            app.levels.rank_name(),
            app.levels.exp(),
            streak_text,
        )),
    ]));
    frame.render_widget(header, layout[0]);

    let to_next = app.levels.exp_to_next();
    let gauge_title = if to_next > 0 {
        format!(" Next level in {to_next} exp ")
    } else {
        " Max level ".to_string()
    };
    let progress = Gauge::default()
        .block(Block::bordered().title(gauge_title))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(app.levels.progress_to_next() / 100.0);
    frame.render_widget(progress, layout[1]);

    let menu_area = centered_rect(60, 70, layout[2]);
    let challenge = app.daily.peek_challenge();
    let challenge_status = if app.daily.completed_today() {
        match app.daily.reward_tier() {
            Some(tier) => format!("done - {}", tier.label()),
            None => "done - no reward".to_string(),
        }
    } else if app.daily.is_active() {
        let (toward_gold, remaining) = app.daily.status();
        format!("{toward_gold:.0}% to gold, {remaining:.0}s left")
    } else if app.daily.progress().started {
        "time expired".to_string()
    } else {
        "not started".to_string()
    };

    let lines = vec![
        Line::from(Span::styled(
            "SENTORA",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  [1] Start practice"),
        Line::from(format!(
            "  [d] Daily challenge: {} {} ({challenge_status})",
            challenge.icon, challenge.name
        )),
        Line::from("  [l] Leaderboard"),
        Line::from(format!(
            "  [a] Achievements ({}/{})",
            app.achievements.unlocked_count(),
            engine::achievements::AchievementEngine::total_count(),
        )),
        Line::from("  [q] Quit"),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), menu_area);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [1] Play  [d] Daily  [l] Leaderboard  [a] Achievements  [q] Quit ",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, layout[3]);
}

fn render_course_select(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let header = Paragraph::new(Line::from(Span::styled(
        " Select a lesson ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(header, layout[0]);

    let mut lines = Vec::new();
    for (i, lesson) in app.corpus.lessons().iter().enumerate() {
        let selected = i == app.selected_lesson;
        let marker = if selected { "> " } else { "  " };
        let score = app.level_scores.get(i).copied().unwrap_or(0);
        let score_text = if score > 0 {
            format!("  (score {score})")
        } else {
            String::new()
        };
        let style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{marker}Level {}: {} - {} sentences{score_text}",
                lesson.level,
                lesson.title,
                lesson.sentence_count()
            ),
            style,
        )));
    }
    let list_area = centered_rect(70, 80, layout[1]);
    frame.render_widget(Paragraph::new(lines), list_area);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Up/Down] Select  [Enter] Start  [Esc] Menu ",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_playing(frame: &mut ratatui::Frame, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let Some(lesson) = app.corpus.get(session.lesson_index) else {
        return;
    };

    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" Level {}: {} ", lesson.level, lesson.title),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " Score {} | Sentence {}/{}",
            session.score,
            session.sentence_index + 1,
            lesson.sentence_count(),
        )),
    ]));
    frame.render_widget(header, layout[0]);

    // Target sentence with per-character feedback, then the input line.
    let target = session.target();
    let input = session.input();
    let mut target_spans = Vec::with_capacity(target.len());
    for (i, &ch) in target.iter().enumerate() {
        let style = match input.get(i) {
            Some(&typed) if typed == ch => Style::default().fg(Color::Green),
            Some(_) => Style::default().fg(Color::Red).add_modifier(Modifier::UNDERLINED),
            None => Style::default().fg(Color::DarkGray),
        };
        target_spans.push(Span::styled(ch.to_string(), style));
    }

    let mut text_lines = vec![Line::from(""), Line::from(target_spans)];
    if let Some(translation) = lesson.translation(session.sentence_index) {
        text_lines.push(Line::from(Span::styled(
            translation.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    text_lines.push(Line::from(""));
    text_lines.push(Line::from(vec![
        Span::raw(session.input_str()),
        Span::styled("▌", Style::default().fg(Color::Cyan)),
    ]));
    let typing = Paragraph::new(text_lines)
        .alignment(Alignment::Center)
        .block(Block::bordered());
    frame.render_widget(typing, layout[1]);

    let remaining = app.time_remaining();
    let time_style = if remaining > 10.0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    let accuracy = session.accuracy();
    let accuracy_style = if accuracy >= scoring::MIN_ACCURACY_FOR_PASS {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    let errors_style = if session.errors < scoring::MAX_ERRORS_PER_LEVEL / 2 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let stats = Paragraph::new(Line::from(vec![
        Span::styled(format!(" Time {remaining:.0}s "), time_style),
        Span::styled(format!(" Acc {accuracy}% "), accuracy_style),
        Span::raw(format!(" Speed {} cpm ", session.speed())),
        Span::styled(
            format!(" Combo {}x (max {}) ", app.combo.combo, app.combo.max_combo),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!(" Errors {}/{} ", session.errors, scoring::MAX_ERRORS_PER_LEVEL),
            errors_style,
        ),
    ]));
    frame.render_widget(stats, layout[2]);

    if let Some((def, _)) = app.toast {
        let toast = Paragraph::new(Line::from(Span::styled(
            format!(" {} Achievement unlocked: {} - {} ", def.icon, def.name, def.description),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(toast, layout[3]);
    } else if let Some(reward) = app.last_reward {
        let banner = Paragraph::new(Line::from(Span::styled(
            format!(
                " Daily challenge {}! +{} exp, x{:.2} score ",
                reward.tier.label(),
                reward.exp,
                reward.score_multiplier,
            ),
            Style::default().fg(Color::Yellow),
        )));
        frame.render_widget(banner, layout[3]);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Enter] Submit  [Backspace] Delete  [Esc] Menu ",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, layout[4]);
}

fn render_level_complete(frame: &mut ratatui::Frame, app: &App) {
    let area = centered_rect(60, 60, frame.area());
    let Some(session) = app.session.as_ref() else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Level Complete!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Score: {}", session.score)),
        Line::from(format!("Max combo: {}x", app.combo.max_combo)),
        Line::from(format!("Errors: {}", session.errors)),
    ];
    if let Some(level) = app.last_level_up {
        lines.push(Line::from(Span::styled(
            format!("Level up! You are now level {level}"),
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(ranks) = app.last_ranks {
        if let Some(rank) = ranks.daily {
            lines.push(Line::from(format!("Daily leaderboard rank: #{rank}")));
        }
        if let Some(rank) = ranks.all_time {
            lines.push(Line::from(format!("All-time leaderboard rank: #{rank}")));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[n] Next level  [r] Retry  [m] Menu",
        Style::default().fg(Color::DarkGray),
    )));

    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::bordered());
    frame.render_widget(panel, area);
}

fn render_game_over(frame: &mut ratatui::Frame, app: &App) {
    let area = centered_rect(50, 50, frame.area());
    let score = app.session.as_ref().map(|s| s.score).unwrap_or(0);

    let lines = vec![
        Line::from(Span::styled(
            "Time's Up!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Final score: {score}")),
        Line::from(""),
        Line::from(Span::styled(
            "[r] Retry  [m] Menu",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::bordered());
    frame.render_widget(panel, area);
}

fn render_leaderboard(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let tabs: Vec<Span> = engine::leaderboard::View::ALL
        .iter()
        .map(|view| {
            let style = if *view == app.leaderboard_view {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!(" {} ", view.label()), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(tabs)), layout[0]);

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:<4} {:<16} {:>7} {:>6} {:>7} {:>6} {:>12}",
            "#", "Name", "Score", "Acc", "Speed", "Combo", "Date"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (i, entry) in app.leaderboard.top(app.leaderboard_view, 20).iter().enumerate() {
        lines.push(Line::from(format!(
            "{:<4} {:<16} {:>7} {:>5}% {:>7} {:>5}x {:>12}",
            i + 1,
            entry.name,
            entry.score,
            entry.accuracy,
            entry.speed,
            entry.combo,
            entry.date,
        )));
    }
    if lines.len() == 1 {
        lines.push(Line::from(Span::styled(
            "No scores yet - finish a level to get on the board.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(Paragraph::new(lines), layout[1]);

    let personal = match app
        .leaderboard
        .player_best(&app.config.player_name, app.leaderboard_view)
    {
        Some(best) => {
            let rank = app
                .leaderboard
                .player_rank(&app.config.player_name, app.leaderboard_view)
                .unwrap_or(0);
            format!(" Your best: {} (#{rank})  [Tab] Switch view  [Esc] Menu ", best.score)
        }
        None => " [Tab] Switch view  [Esc] Menu ".to_string(),
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        personal,
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_achievements(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let header = Paragraph::new(Line::from(Span::styled(
        format!(
            " Achievements {}/{} ",
            app.achievements.unlocked_count(),
            engine::achievements::AchievementEngine::total_count(),
        ),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(header, layout[0]);

    let mut lines = Vec::new();
    for (def, unlocked) in app.achievements.all_with_status() {
        let (marker, style) = if unlocked {
            (def.icon, Style::default().fg(Color::Yellow))
        } else {
            ("🔒", Style::default().fg(Color::DarkGray))
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} {:<20} {}", def.name, def.description),
            style,
        )));
    }
    frame.render_widget(Paragraph::new(lines), layout[1]);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Esc] Menu ",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, layout[2]);
}
