use super::ShellError;

/// One line of shell input. Positions are 1-based, the way they are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { title: String, artist: String, duration: String },
    Delete(usize),
    Move { from: usize, to: usize },
    Reverse,
    Show,
    Sort { key: String, algorithm: String },
    Play(usize),
    Undo,
    History,
    Rate { position: usize, stars: u8 },
    Rated(u8),
    Ratings,
    Compact,
    Find(String),
    Forget(String),
    Pin(usize),
    Unpin(usize),
    Shuffle,
    Dashboard(Option<String>),
    Summary(Option<String>),
    Help,
    Quit,
}

pub const HELP: &str = "\
Playlist
  add <title> | <artist> | <mm:ss>   add a song
  delete <n>                         delete song n
  move <from> <to>                   move a song
  reverse                            reverse the playlist
  show                               list the playlist
  sort <title|duration> <merge|quick>
History
  play <n>  undo  history
Ratings
  rate <n> <1-5>  rated <1-5>  ratings  compact
Lookup
  find <title>  forget <title>
Shuffle
  pin <n>  unpin <n>  shuffle
Reports
  dashboard [file]  summary [file]
  help  quit";

impl Command {
    pub fn parse(line: &str) -> Result<Self, ShellError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "add" => {
                let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
                match parts.as_slice() {
                    [title, artist, duration] if !title.is_empty() => Command::Add {
                        title: title.to_string(),
                        artist: artist.to_string(),
                        duration: duration.to_string(),
                    },
                    _ => return Err(ShellError::Usage("add <title> | <artist> | <mm:ss>")),
                }
            }
            "delete" | "del" => Command::Delete(one_position(rest, "delete <n>")?),
            "move" | "mv" => {
                let [from, to] = words::<2>(rest, "move <from> <to>")?;
                Command::Move {
                    from: position(from)?,
                    to: position(to)?,
                }
            }
            "reverse" => Command::Reverse,
            "show" | "ls" => Command::Show,
            "sort" => {
                let [key, algorithm] = words::<2>(rest, "sort <title|duration> <merge|quick>")?;
                Command::Sort {
                    key: key.to_string(),
                    algorithm: algorithm.to_string(),
                }
            }
            "play" => Command::Play(one_position(rest, "play <n>")?),
            "undo" => Command::Undo,
            "history" => Command::History,
            "rate" => {
                let [n, stars] = words::<2>(rest, "rate <n> <1-5>")?;
                Command::Rate {
                    position: position(n)?,
                    stars: stars_value(stars)?,
                }
            }
            "rated" => {
                let [stars] = words::<1>(rest, "rated <1-5>")?;
                Command::Rated(stars_value(stars)?)
            }
            "ratings" => Command::Ratings,
            "compact" => Command::Compact,
            "find" if !rest.is_empty() => Command::Find(rest.to_string()),
            "find" => return Err(ShellError::Usage("find <title>")),
            "forget" if !rest.is_empty() => Command::Forget(rest.to_string()),
            "forget" => return Err(ShellError::Usage("forget <title>")),
            "pin" => Command::Pin(one_position(rest, "pin <n>")?),
            "unpin" => Command::Unpin(one_position(rest, "unpin <n>")?),
            "shuffle" => Command::Shuffle,
            "dashboard" => Command::Dashboard(optional(rest)),
            "summary" => Command::Summary(optional(rest)),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(ShellError::UnknownCommand(verb.to_string())),
        };
        Ok(command)
    }
}

fn words<'a, const N: usize>(rest: &'a str, usage: &'static str) -> Result<[&'a str; N], ShellError> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    parts.try_into().map_err(|_| ShellError::Usage(usage))
}

fn one_position(rest: &str, usage: &'static str) -> Result<usize, ShellError> {
    let [n] = words::<1>(rest, usage)?;
    position(n)
}

/// 1-based position; zero is rejected here so callers can subtract safely
fn position(text: &str) -> Result<usize, ShellError> {
    match text.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ShellError::BadNumber(text.to_string())),
    }
}

/// Range is checked later by `Rating::new`
fn stars_value(text: &str) -> Result<u8, ShellError> {
    text.parse().map_err(|_| ShellError::BadNumber(text.to_string()))
}

fn optional(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        assert_eq!(
            Command::parse("add Shape of You | Ed Sheeran | 3:53").unwrap(),
            Command::Add {
                title: "Shape of You".to_string(),
                artist: "Ed Sheeran".to_string(),
                duration: "3:53".to_string(),
            }
        );
        assert!(matches!(Command::parse("add Shape of You"), Err(ShellError::Usage(_))));
        assert!(matches!(Command::parse("add  | x | 1:00"), Err(ShellError::Usage(_))));
    }

    #[test]
    fn test_words_borrows_from_input() {
        let line = String::from("  title   quick ");
        let [key, algorithm] = words::<2>(&line, "sort <key> <algorithm>").unwrap();
        assert_eq!((key, algorithm), ("title", "quick"));
        assert!(matches!(words::<1>(&line, "one word"), Err(ShellError::Usage("one word"))));
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(Command::parse("MOVE 3 1").unwrap(), Command::Move { from: 3, to: 1 });
        assert_eq!(Command::parse("  delete   2 ").unwrap(), Command::Delete(2));
        assert!(matches!(Command::parse("delete 0"), Err(ShellError::BadNumber(_))));
        assert!(matches!(Command::parse("play two"), Err(ShellError::BadNumber(_))));
        assert!(matches!(Command::parse("move 1"), Err(ShellError::Usage(_))));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(
            Command::parse("sort duration quick").unwrap(),
            Command::Sort {
                key: "duration".to_string(),
                algorithm: "quick".to_string(),
            }
        );
        assert_eq!(Command::parse("rate 2 5").unwrap(), Command::Rate { position: 2, stars: 5 });
        // out-of-range stars parse; the rating index rejects them
        assert_eq!(Command::parse("rated 9").unwrap(), Command::Rated(9));
        assert_eq!(Command::parse("find  bad guy ").unwrap(), Command::Find("bad guy".to_string()));
        assert_eq!(Command::parse("summary").unwrap(), Command::Summary(None));
        assert_eq!(
            Command::parse("dashboard out/snap.txt").unwrap(),
            Command::Dashboard(Some("out/snap.txt".to_string()))
        );
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
        assert!(matches!(Command::parse("dance"), Err(ShellError::UnknownCommand(_))));
    }
}
