use crate::engine::{checked_depth, GameOutcome, SearchSession};
use crate::error::EngineError;
use crate::evaluation::{evaluate, relative_evaluation};
use crate::move_generator::{generate, GenType};
use crate::piece::Color;
use crate::position::Position;
use crate::r#move::{Move, MoveKey};
use crate::search::{SearchMode, SearchOptions, SearchResult, DEFAULT_DEPTH, MAX_DEPTH};

use regex::Regex;
use rustyline::config::Configurer;
use rustyline::Editor;
use std::collections::HashMap;
use std::fmt::{Display, Error, Formatter};
use std::time::Duration;

pub struct UCI {
    position: Position,
    session: SearchSession,
    editor: Editor<()>,
    options: HashMap<String, UCIOption>,
}
impl Default for UCI {
    fn default() -> Self {
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);
        editor.set_check_cursor_position(true);
        UCI {
            position: Position::startpos(),
            session: SearchSession::new(),
            editor,
            options: HashMap::from([
                (
                    "Depth".to_string(),
                    UCIOption::IntValue {
                        name: "Depth".to_string(),
                        value: DEFAULT_DEPTH as i32,
                        default: DEFAULT_DEPTH as i32,
                        min: 1,
                        max: MAX_DEPTH as i32,
                    },
                ),
                (
                    "Quiescence".to_string(),
                    UCIOption::BoolValue {
                        name: "Quiescence".to_string(),
                        value: true,
                        default: true,
                    },
                ),
                (
                    "Mode".to_string(),
                    UCIOption::StringChoice {
                        name: "Mode".to_string(),
                        value: "alphabeta".to_string(),
                        default: "alphabeta".to_string(),
                        possible_values: vec![
                            "alphabeta".to_string(),
                            "minimax".to_string(),
                            "minimize".to_string(),
                        ],
                    },
                ),
            ]),
        }
    }
}

impl UCI {
    pub fn run(&mut self) {
        while let Ok(line) = self.editor.readline("kestrel> ") {
            match self.handle_command(&line) {
                Ok(UCIOkCode::ShouldQuit) => break,
                Err(UCIErrCode::BadCommand(cmd)) => {
                    eprintln!("Unknown or badly formed command: {}", cmd)
                }
                Err(UCIErrCode::MissingArg(arg)) => {
                    eprintln!("Missing an argument: {} {} <- here", line.trim(), arg)
                }
                Err(UCIErrCode::Engine(e)) => eprintln!("{}", e),
                _ => (),
            }
        }
        self.session.wait();
    }

    fn handle_command(&mut self, line: &str) -> Result<UCIOkCode, UCIErrCode> {
        let args_regex = Self::args_regex();
        let mut args = args_regex.find_iter(line).map(|m| m.as_str());
        let cmd = if let Some(c) = args.next() {
            c
        } else {
            return Err(UCIErrCode::NoCommand);
        };
        match cmd {
            "uci" => {
                Self::send(UCICommand::Id);
                self.options
                    .values()
                    .for_each(|o| Self::send(UCICommand::UciOption(o)));
                Self::send(UCICommand::UciOk);
            }
            "isready" => Self::send(UCICommand::ReadyOk),
            "setoption" => {
                let option_name = if let Some("name") = args.next() {
                    args.next().unwrap_or("")
                } else {
                    ""
                };
                let option_value = match args.nth(1) {
                    Some(v) => v,
                    None => return Err(UCIErrCode::MissingArg(String::from("<value>"))),
                };
                match self.options.get_mut(option_name) {
                    Some(option) => option.set_value(option_value),
                    None => return Err(UCIErrCode::BadCommand(format!("setoption {}", option_name))),
                }
            }
            "ucinewgame" => {
                self.session.wait();
                self.position = Position::startpos()
            }
            "position" => {
                let mut position = match args.next() {
                    Some("startpos") => Position::startpos(),
                    Some("fen") => {
                        let fields: Vec<&str> = args.by_ref().take(6).collect();
                        Self::parse_record(&fields.join(" "))?
                    }
                    Some(record) => Self::parse_record(&record.replace('"', ""))?,
                    None => return Err(UCIErrCode::MissingArg(String::from("<startpos | record>"))),
                };
                if let Some(word) = args.next() {
                    if word != "moves" {
                        return Err(UCIErrCode::BadCommand(String::from(word)));
                    }
                }
                for mv in args {
                    play(&mut position, mv).map_err(|e| {
                        log::warn!("rejected move '{}' in position command", mv);
                        e
                    })?;
                }
                // Only replaced once every move went through
                self.position = position;
            }
            "go" => {
                let options = self.parse_go_args(args)?;
                self.session.start(&self.position, &options, Self::report)?;
            }
            "stop" => {
                self.session.wait();
            }
            // Commands that are not part of the UCI protocol
            "moves" => {
                let moves = generate(&mut self.position, GenType::Legal);
                println!("{}", moves);
                println!("{}", GameOutcome::of(&mut self.position));
            }
            "eval" => println!(
                "{} (white's point of view: {})",
                relative_evaluation(&self.position),
                evaluate(&self.position)
            ),
            "perft" => {
                let depth = args
                    .next()
                    .and_then(|d| d.parse::<u32>().ok())
                    .ok_or_else(|| UCIErrCode::MissingArg(String::from("<depth>")))?;
                crate::perft_table(&mut self.position, depth)
            }
            "show" => println!("{}", self.position),
            "quit" => return Ok(UCIOkCode::ShouldQuit),
            _ => return Err(UCIErrCode::BadCommand(String::from(cmd))),
        }

        Ok(UCIOkCode::OkCommand)
    }

    pub fn send(command: UCICommand) {
        match command {
            UCICommand::Id => println!(
                "id name Kestrel {}\nid author {}",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_AUTHORS")
            ),
            UCICommand::UciOk => println!("uciok"),
            UCICommand::ReadyOk => println!("readyok"),
            UCICommand::BestMove(Some(mv)) => println!("bestmove {}", mv),
            UCICommand::BestMove(None) => println!("bestmove 0000"),
            UCICommand::Info(search_state) => println!("info {}", search_state),
            UCICommand::UciOption(option) => println!("option {}", option),
        }
    }

    fn report(result: &SearchResult) {
        Self::send(UCICommand::Info(result));
        Self::send(UCICommand::BestMove(result.best_move.as_ref()));
    }

    /// Search options come from the engine options first, then from the
    /// arguments of this particular `go` command
    fn parse_go_args<'a, I: Iterator<Item = &'a str>>(&self, args: I) -> Result<SearchOptions, UCIErrCode> {
        let valid_args = ["wtime", "btime", "winc", "binc", "depth", "movetime", "infinite"];

        let mut arg_value_map: HashMap<&str, &str> = HashMap::new();
        let mut current_arg = "";
        for word in args {
            if valid_args.contains(&word) {
                current_arg = word;
                arg_value_map.insert(word, "");
            } else if !current_arg.is_empty() {
                arg_value_map.insert(current_arg, word);
            }
        }
        let millis = |key: &str| {
            arg_value_map
                .get(key)
                .and_then(|d| d.parse::<u64>().ok())
                .map(Duration::from_millis)
        };

        let mut options = SearchOptions::default();
        if let Some(UCIOption::IntValue { value, .. }) = self.options.get("Depth") {
            options.set_depth(*value as u8);
        }
        if let Some(UCIOption::BoolValue { value, .. }) = self.options.get("Quiescence") {
            options.set_quiescence(*value);
        }
        if let Some(UCIOption::StringChoice { value, .. }) = self.options.get("Mode") {
            options.set_mode(match value.as_str() {
                "minimax" => SearchMode::Minimax,
                "minimize" => SearchMode::MinimizeOpponent,
                _ => SearchMode::AlphaBeta,
            });
        }

        if let Some(depth) = arg_value_map.get("depth") {
            let depth = depth.parse::<i32>().unwrap_or(0);
            options.set_depth(checked_depth(depth)?);
        } else if arg_value_map.contains_key("infinite") {
            options.set_depth(MAX_DEPTH);
        }
        if let Some(movetime) = millis("movetime") {
            options.set_depth(MAX_DEPTH).set_time(Some(movetime));
        } else {
            let (clock, increment) = match self.position.side_to_move() {
                Color::White => (millis("wtime"), millis("winc")),
                Color::Black => (millis("btime"), millis("binc")),
            };
            if let Some(c) = clock {
                options.set_depth(MAX_DEPTH).set_time_from_clock(c, increment);
            }
        }
        Ok(options)
    }

    fn parse_record(record: &str) -> Result<Position, EngineError> {
        Position::new(record).map_err(|e| {
            log::warn!("rejected position record '{}': {}", record, e);
            EngineError::from(e)
        })
    }

    fn args_regex() -> Regex {
        match Regex::new(r#"(".*?"|[^"\s]+)"#) {
            Ok(r) => r,
            Err(e) => unreachable!("the argument pattern is valid: {}", e),
        }
    }
}

/// Plays a move given in long algebraic notation, if it is legal
pub fn play(position: &mut Position, mv: &str) -> Result<Move, EngineError> {
    let (origin, target, promotion) = Move::parse(mv).ok_or_else(|| EngineError::UnknownMove(mv.to_string()))?;
    let key = MoveKey {
        origin: origin as u8,
        target: target as u8,
        promotion,
    };
    let found = generate(position, GenType::Legal)
        .find(key)
        .copied()
        .ok_or_else(|| EngineError::UnknownMove(mv.to_string()))?;
    position.make_move(&found);
    Ok(found)
}

enum UCIOkCode {
    OkCommand,
    ShouldQuit,
}

enum UCIErrCode {
    MissingArg(String),
    NoCommand,
    BadCommand(String),
    Engine(EngineError),
}
impl From<EngineError> for UCIErrCode {
    fn from(e: EngineError) -> Self {
        UCIErrCode::Engine(e)
    }
}

pub enum UCICommand<'a> {
    Id,
    UciOk,
    ReadyOk,
    BestMove(Option<&'a Move>),
    Info(&'a SearchResult),
    UciOption(&'a UCIOption),
}

pub enum UCIOption {
    BoolValue {
        name: String,
        value: bool,
        default: bool,
    },
    IntValue {
        name: String,
        value: i32,
        default: i32,
        min: i32,
        max: i32,
    },
    StringChoice {
        name: String,
        value: String,
        default: String,
        possible_values: Vec<String>,
    },
}
impl UCIOption {
    pub fn set_value(&mut self, v: &str) {
        match self {
            Self::BoolValue { value, .. } => *value = v.parse::<bool>().unwrap_or(*value),
            Self::IntValue { value, min, max, .. } => {
                let parsed = v.parse::<i32>().unwrap_or(*value);
                *value = parsed.clamp(*min, *max)
            }
            Self::StringChoice {
                value,
                possible_values,
                ..
            } => {
                if let Some(choice) = possible_values.iter().find(|x| x.as_str() == v) {
                    *value = choice.to_string();
                }
            }
        }
    }
}
impl Display for UCIOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Self::BoolValue { name, default, .. } => {
                write!(f, "name {} type check default {}", name, default)
            }
            Self::IntValue {
                name,
                default,
                min,
                max,
                ..
            } => write!(f, "name {} type spin default {} min {} max {}", name, default, min, max),
            Self::StringChoice {
                name,
                default,
                possible_values,
                ..
            } => write!(
                f,
                "name {} type combo default {}{}",
                name,
                default,
                possible_values
                    .iter()
                    .fold(String::new(), |acc, x| format!("{} var {}", acc, x))
            ),
        }
    }
}
