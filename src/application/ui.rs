use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Composer;
use crate::domain::models::Event;
use crate::domain::models::SendingIndicator;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

fn render_header<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &AppState) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app_state.api_status),
            Style::default().fg(app_state.api_status.color()),
        ),
        Span::styled(
            format!("via {}", Config::get(ConfigKey::Transport)),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), rect);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    let mut composer = Composer::default();
    let mut sending = SendingIndicator::new(&Config::get(ConfigKey::Transport));

    tx.send(Action::ProbeApi())?;

    loop {
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Max(4),
                ])
                .split(frame.size());

            if layout[1].width != app_state.last_known_width
                || layout[1].height != app_state.last_known_height
            {
                app_state.set_rect(layout[1]);
            }

            render_header(frame, layout[0], app_state);
            app_state
                .bubble_list
                .render(frame, layout[1], app_state.scroll.position);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                layout[1].inner(&Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut app_state.scroll.scrollbar_state,
            );

            if app_state.session.is_loading() {
                sending.render(frame, layout[2]);
            } else {
                frame.render_widget(composer.widget(), layout[2]);
            }
        })?;

        match events.next().await? {
            Event::ApiStatus(status) => {
                app_state.api_status = status;
            }
            Event::DeliveryChunk(chunk) => {
                app_state.handle_chunk(&chunk);
            }
            Event::DeliveryComplete(message) => {
                app_state.handle_reply(message);
            }
            Event::Compose(input) => {
                if !app_state.session.is_loading() {
                    composer.input(input);
                }
            }
            Event::Paste(text) => {
                if !app_state.session.is_loading() {
                    composer.paste(&text);
                }
            }
            Event::Scroll(movement) => {
                app_state.scroll.apply(movement);
            }
            Event::Submit() => {
                if app_state.session.is_loading() {
                    continue;
                }

                let input_str = composer.text();
                if app_state.handle_slash_commands(&input_str) {
                    break;
                }

                if app_state.submit(&input_str, &tx)? {
                    composer.clear();
                }
            }
            Event::Quit() => {
                app_state.abort(&tx)?;
                break;
            }
            Event::Redraw() => {
                if app_state.session.is_loading() {
                    sending.advance();
                }
            }
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut app_state = AppState::new(
        &Config::get(ConfigKey::Theme),
        &Config::get(ConfigKey::ThemeFile),
    )?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
