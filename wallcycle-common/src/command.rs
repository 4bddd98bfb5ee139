use std::fmt;

/// Which pool `next` draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Favorites,
}

impl Mode {
    pub fn favorites_only(self) -> bool {
        self == Mode::Favorites
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Normal => write!(f, "Normal"),
            Mode::Favorites => write!(f, "Fav"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Skip,
    Undo,
    Next,
    List,
    Fav,
    /// `mode` with an optional target; `None` leaves the mode untouched.
    Mode(Option<Mode>),
    Stop,
    Noop,
    Unknown,
}

/// The literal sentinel a command source hands back when it has nothing to say.
pub const NOOP: &str = "noop";

pub const PROMPT: &str = "{Skip|Undo|Next|List|Fav|Mode-[Normal|Fav]}>> ";

const VERBS: &[(&str, Command)] = &[
    ("skip", Command::Skip),
    ("undo", Command::Undo),
    ("next", Command::Next),
    ("list", Command::List),
    ("fav", Command::Fav),
    ("exit", Command::Stop),
    ("quit", Command::Stop),
    ("done", Command::Stop),
];

impl Command {
    /// Parses one line of command text.
    ///
    /// Matching is case-insensitive and any non-empty prefix of a verb is
    /// accepted (`s`, `sk`, `ski`, `skip`). `noop` must be spelled out.
    /// Anything else parses as `Unknown`.
    pub fn parse(input: &str) -> Command {
        let line = input.trim().to_lowercase();
        let mut tokens = line.split_whitespace();

        let Some(verb) = tokens.next() else {
            return Command::Unknown;
        };
        let argument = tokens.next();
        if tokens.next().is_some() {
            return Command::Unknown;
        }

        if verb == NOOP {
            return if argument.is_none() { Command::Noop } else { Command::Unknown };
        }

        if "mode".starts_with(verb) {
            let mode = match argument {
                Some("normal") => Some(Mode::Normal),
                Some("fav") => Some(Mode::Favorites),
                _ => None,
            };
            return Command::Mode(mode);
        }

        if argument.is_some() {
            return Command::Unknown;
        }

        VERBS
            .iter()
            .find(|(name, _)| name.starts_with(verb))
            .map(|(_, command)| *command)
            .unwrap_or(Command::Unknown)
    }
}
