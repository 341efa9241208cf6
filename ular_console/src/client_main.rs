use std::fmt;
use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self as term_event, KeyModifiers};
use crossterm::style::{self, Stylize};
use crossterm::{cursor, execute, terminal};
use instant::Instant;
use itertools::Itertools;
use log::{debug, info};
use scopeguard::defer;
use ular_client::client::{ClientState, OutgoingRequest, RequestId, UiEvent};
use ular_client::error::CommandError;
use url::Url;

use crate::console_config::ConsoleConfig;
use crate::network::HttpTransport;
use crate::tui;


const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub enum RoomEntry {
    Create { player: String, color: String, topic: String },
    Join { code: String, player: String, color: String },
    Spectate { code: String, player: String },
}

pub struct ClientConfig {
    pub server: Url,
    pub entry: RoomEntry,
    pub settings: ConsoleConfig,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AnswerChoice {
    // 1-based slot as shown on screen.
    Slot(usize),
    Text(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConsoleCommand {
    Start,
    Roll,
    Answer(AnswerChoice),
    Refresh,
    StopRefresh,
    Setup,
    Quit,
}

pub fn parse_command(input: &str) -> Result<ConsoleCommand, String> {
    let input = input.trim();
    let Some(cmd) = input.strip_prefix('/') else {
        return Err(format!("Commands start with '/', got '{}'", input));
    };
    let (name, arg) = match cmd.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (cmd, ""),
    };
    match (name, arg) {
        ("start", "") => Ok(ConsoleCommand::Start),
        ("roll", "") => Ok(ConsoleCommand::Roll),
        ("refresh", "") => Ok(ConsoleCommand::Refresh),
        ("stop", "") => Ok(ConsoleCommand::StopRefresh),
        ("setup", "") => Ok(ConsoleCommand::Setup),
        ("quit", "") => Ok(ConsoleCommand::Quit),
        ("answer", "") => Err("Usage: /answer <1-4 or text>".to_owned()),
        ("answer", arg) => Ok(ConsoleCommand::Answer(match arg.parse::<usize>() {
            Ok(slot @ 1..=4) => AnswerChoice::Slot(slot),
            _ => AnswerChoice::Text(arg.to_owned()),
        })),
        _ => Err(format!("Unknown command: '{}'", cmd)),
    }
}

enum IncomingEvent {
    Network(RequestId, Result<String, String>),
    Terminal(term_event::Event),
    Tick,
}

// Things shown on screen that `ClientState` only reports as events.
#[derive(Default)]
struct Screen {
    alert: Option<String>,
    last_roll: Option<String>,
    command_error: Option<String>,
}

impl Screen {
    fn apply(&mut self, event: UiEvent) -> io::Result<()> {
        match event {
            UiEvent::Alert(message) => self.alert = Some(message),
            UiEvent::DiceRolled(dice) => self.last_roll = Some(format!("Rolled {}", dice)),
            UiEvent::RollDetails { before, steps, ended } => {
                let before = before.map_or("?".to_owned(), |b| b.to_string());
                let path = steps.iter().join(" → ");
                let roll = self.last_roll.take().unwrap_or_default();
                let mut line = format!("{}: {} → {}", roll, before, path);
                if ended {
                    line.push_str(" (game over)");
                }
                self.last_roll = Some(line);
            }
            UiEvent::BoardRebuilt => {
                execute!(io::stdout(), terminal::Clear(terminal::ClearType::All))?;
            }
            UiEvent::Status(_)
            | UiEvent::Node(..)
            | UiEvent::Panel(..)
            | UiEvent::TabSelected(_)
            | UiEvent::SessionFields { .. }
            | UiEvent::Marker(_)
            | UiEvent::Question(_)
            | UiEvent::PollingStarted
            | UiEvent::PollingStopped => {
                // Redrawn from `ClientState` on every frame.
            }
        }
        Ok(())
    }
}

fn writeln_raw(stdout: &mut io::Stdout, v: impl fmt::Display) -> io::Result<()> {
    let s = v.to_string();
    // Note. Not using `lines()` because it removes trailing new line.
    for line in s.split('\n') {
        execute!(
            stdout,
            style::Print(line),
            terminal::Clear(terminal::ClearType::UntilNewLine),
            cursor::MoveToNextLine(1),
            cursor::Hide
        )?;
    }
    Ok(())
}

fn render(
    stdout: &mut io::Stdout, app_start_time: Instant, client_state: &ClientState, screen: &Screen,
    keyboard_input: &str,
) -> io::Result<()> {
    let now = Instant::now();
    execute!(stdout, cursor::MoveTo(0, 0))?;
    let room = client_state.room_view();
    match client_state.session().room() {
        Some(session) => {
            let role = if client_state.session().is_spectator() { " (spectating)" } else { "" };
            let polling =
                if client_state.is_polling() { "auto-refresh on" } else { "auto-refresh off" };
            writeln_raw(
                stdout,
                format!("Room {} as {}{}  [{}]", session.code, session.player, role, polling),
            )?;
        }
        None => writeln_raw(stdout, "Not in a room")?,
    }
    writeln_raw(stdout, room.status.as_str().with(style::Color::Cyan))?;
    writeln_raw(stdout, "")?;
    writeln_raw(stdout, tui::render_board(client_state.layout(), client_state.markers()))?;
    writeln_raw(stdout, "")?;
    writeln_raw(stdout, tui::render_players(&room.players, room.turn.as_deref()))?;
    let state = room.state.as_deref().unwrap_or("-");
    let dice = room.dice.map_or("-".to_owned(), |d| d.to_string());
    writeln_raw(stdout, format!("state: {}   dice: {}", state, dice))?;
    if let Some(ref roll) = screen.last_roll {
        writeln_raw(stdout, roll)?;
    }
    if let Some(ref question) = room.question {
        writeln_raw(stdout, "")?;
        writeln_raw(stdout, tui::render_question(question))?;
        writeln_raw(stdout, "Answer with /answer 1-4".with(style::Color::DarkGrey))?;
    }
    if let Some(ref alert) = screen.alert {
        writeln_raw(stdout, alert.as_str().with(style::Color::Magenta))?;
    }
    writeln_raw(stdout, "")?;

    // Simulate cursor: real cursor blinking is broken with Show/Hide.
    let show_cursor = now.duration_since(app_start_time).as_millis() % 1000 >= 500;
    let cursor = if show_cursor { '▂' } else { ' ' };
    writeln_raw(stdout, format!("{}{}", keyboard_input, cursor))?;
    if let Some(ref err) = screen.command_error {
        writeln_raw(stdout, err.as_str().with(style::Color::Red))?;
    }
    execute!(stdout, terminal::Clear(terminal::ClearType::FromCursorDown))?;
    Ok(())
}

fn execute_command(
    client_state: &mut ClientState, command: ConsoleCommand,
) -> Result<Option<RequestId>, CommandError> {
    let id = match command {
        ConsoleCommand::Start => client_state.start_game()?,
        ConsoleCommand::Roll => client_state.roll_dice()?,
        ConsoleCommand::Refresh => client_state.refresh()?,
        ConsoleCommand::Setup => client_state.load_setup(),
        ConsoleCommand::StopRefresh => {
            client_state.stop_auto_refresh();
            return Ok(None);
        }
        ConsoleCommand::Answer(AnswerChoice::Text(text)) => client_state.submit_answer(&text)?,
        ConsoleCommand::Answer(AnswerChoice::Slot(slot)) => {
            let answer = client_state
                .room_view()
                .question
                .as_ref()
                .and_then(|q| q.answers.get(slot - 1))
                .cloned();
            match answer {
                Some(answer) => client_state.submit_answer(&answer)?,
                None => return Err(CommandError::NoQuestion),
            }
        }
        ConsoleCommand::Quit => unreachable!("handled by the caller"),
    };
    Ok(Some(id))
}

pub fn run(config: ClientConfig) -> anyhow::Result<()> {
    let transport = HttpTransport::new(
        config.server.clone(),
        config.settings.client.api_prefix.clone(),
        config.settings.request_timeout,
    )?;
    info!("Using server {}", config.server);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
    defer! {
        let _ = execute!(io::stdout(), terminal::LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    };
    let app_start_time = Instant::now();

    let (tx, rx) = mpsc::channel();
    let tx_net = tx.clone();
    let tx_local = tx.clone();
    let tx_tick = tx;
    let (requests_tx, requests_rx) = mpsc::channel::<OutgoingRequest>();
    // Requests are served one at a time, in the order they were issued.
    thread::spawn(move || {
        for request in requests_rx {
            let result = transport.perform(&request.request);
            if tx_net.send(IncomingEvent::Network(request.id, result)).is_err() {
                break;
            }
        }
    });
    thread::spawn(move || {
        while let Ok(ev) = term_event::read() {
            if tx_local.send(IncomingEvent::Terminal(ev)).is_err() {
                break;
            }
        }
    });
    thread::spawn(move || {
        loop {
            thread::sleep(TICK_INTERVAL);
            if tx_tick.send(IncomingEvent::Tick).is_err() {
                break;
            }
        }
    });

    let mut client_state = ClientState::new(config.settings.client, requests_tx);
    let mut screen = Screen::default();
    let mut keyboard_input = String::new();
    match config.entry {
        RoomEntry::Create { player, color, topic } => {
            client_state.create_room(&player, &color, &topic);
        }
        RoomEntry::Join { code, player, color } => {
            client_state.join_room(&code, &player, &color);
        }
        RoomEntry::Spectate { code, player } => {
            client_state.spectate(&code, &player);
        }
    }
    for event in rx {
        match event {
            IncomingEvent::Network(id, Ok(body)) => {
                match client_state.process_response(id, &body) {
                    Ok(outcome) => debug!("Reply {}: {:?}", id, outcome),
                    Err(err) => debug!("Reply {}: {}", id, err),
                }
            }
            IncomingEvent::Network(id, Err(err)) => {
                let err = client_state.process_failure(id, &err);
                debug!("Request {} failed: {}", id, err);
            }
            IncomingEvent::Terminal(term_event::Event::Key(event)) => match event.code {
                term_event::KeyCode::Char('c')
                    if event.modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    client_state.leave();
                    return Ok(());
                }
                term_event::KeyCode::Char(ch) => {
                    keyboard_input.push(ch);
                }
                term_event::KeyCode::Backspace => {
                    keyboard_input.pop();
                }
                term_event::KeyCode::Enter => {
                    screen.command_error = None;
                    screen.alert = None;
                    match parse_command(&keyboard_input) {
                        Ok(ConsoleCommand::Quit) => {
                            client_state.leave();
                            return Ok(());
                        }
                        Ok(command) => {
                            if let Err(err) = execute_command(&mut client_state, command) {
                                screen.command_error = Some(err.to_string());
                            }
                        }
                        Err(err) => screen.command_error = Some(err),
                    }
                    keyboard_input.clear();
                }
                _ => {}
            },
            IncomingEvent::Terminal(_) => {}
            IncomingEvent::Tick => {
                if client_state.take_poll_due(Instant::now()) {
                    client_state.poll_tick();
                }
            }
        }
        while let Some(event) = client_state.next_ui_event() {
            screen.apply(event)?;
        }
        render(&mut stdout, app_start_time, &client_state, &screen, &keyboard_input)?;
    }
    anyhow::bail!("Unexpected end of events stream");
}
