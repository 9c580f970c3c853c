/* 终端命令解析 */
use std::sync::LazyLock;

use anyhow::{anyhow, bail};
use common::MoveCoords;
use regex::Regex;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    /// 四位坐标走法，可以用空白分隔
    Move(MoveCoords),
    New,
    Level(i32),
    Board,
    Help,
    Quit,
}

static MOVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d)\s*(\d)\s*(\d)\s*(\d)$").expect("move pattern is valid"));
static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<word>new|level|board|help|quit|exit)(?:\s+(?P<arg>-?\d+))?$").expect("keyword pattern is valid")
});

pub fn parse_command(line: &str) -> anyhow::Result<Command> {
    let line = line.trim().to_lowercase();
    if let Some(caps) = MOVE.captures(&line) {
        let digit = |i: usize| caps[i].parse::<i32>();
        let coords = MoveCoords::from_digits(digit(1)?, digit(2)?, digit(3)?, digit(4)?)?;
        return Ok(Command::Move(coords));
    }

    let caps = KEYWORD
        .captures(&line)
        .ok_or_else(|| anyhow!("unknown command '{}', type 'help'", line))?;
    let arg = caps.name("arg").map(|m| m.as_str().parse::<i32>()).transpose()?;
    let command = match (&caps["word"], arg) {
        ("new", None) => Command::New,
        ("level", Some(level)) => Command::Level(level),
        ("level", None) => bail!("usage: level N"),
        ("board", None) => Command::Board,
        ("help", None) => Command::Help,
        ("quit" | "exit", None) => Command::Quit,
        (word, Some(_)) => bail!("'{}' takes no argument", word),
        (word, None) => bail!("unknown command '{}'", word),
    };
    Ok(command)
}

pub const HELP: &str = "\
commands:
  r1c1r2c2     move, e.g. 7174 or 7 1 7 4 (row 0 is black's back rank)
  new          start a new game
  level N      difficulty 0, 1 or 2
  board        show the board
  quit         leave";

#[cfg(test)]
mod tests {
    use super::*;
    use common::Position;

    #[test]
    fn test_parse_moves() {
        let expected = Command::Move(MoveCoords::new(Position::new(7, 1), Position::new(7, 4)));
        assert_eq!(parse_command("7174").unwrap(), expected);
        assert_eq!(parse_command(" 7 1 7 4 ").unwrap(), expected);
        // 列号 9 越界
        assert!(parse_command("0919").is_err());
        assert!(parse_command("717").is_err());
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("new").unwrap(), Command::New);
        assert_eq!(parse_command("Level 2").unwrap(), Command::Level(2));
        assert_eq!(parse_command("board").unwrap(), Command::Board);
        assert_eq!(parse_command("exit").unwrap(), Command::Quit);
        assert!(parse_command("level").is_err());
        assert!(parse_command("board 3").is_err());
        assert!(parse_command("undo").is_err());
    }
}
