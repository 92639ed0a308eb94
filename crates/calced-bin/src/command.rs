//! Line commands read from stdin.

use anyhow::{Context, Result, bail};
use core_editor::EditorCommand;
use core_events::Notification;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Insert { text: String, offset: isize },
    Erase,
    Clear,
    Left,
    Right,
    Home,
    End,
    /// Selection lives in the console view, not the editor.
    Select { start: usize, end: usize },
    Cursor(usize),
    Text(String),
    Memory(String),
    Reload,
    State,
    Quit,
}

impl LineCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim_start()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();
        let command = match keyword {
            "" => return Ok(None),
            "insert" => match args.as_slice() {
                [text] => LineCommand::Insert {
                    text: (*text).to_string(),
                    offset: 0,
                },
                [text, offset] => LineCommand::Insert {
                    text: (*text).to_string(),
                    offset: offset
                        .parse()
                        .with_context(|| format!("invalid cursor offset `{offset}`"))?,
                },
                _ => bail!("usage: insert TEXT [OFFSET]"),
            },
            "select" => match args.as_slice() {
                [start, end] => LineCommand::Select {
                    start: position(start)?,
                    end: position(end)?,
                },
                _ => bail!("usage: select START END"),
            },
            "cursor" => match args.as_slice() {
                [pos] => LineCommand::Cursor(position(pos)?),
                _ => bail!("usage: cursor POS"),
            },
            "memory" => match args.as_slice() {
                [value] => LineCommand::Memory((*value).to_string()),
                _ => bail!("usage: memory VALUE"),
            },
            // Keeps inner spaces, so formatted text can be typed back in.
            "text" => LineCommand::Text(rest.to_string()),
            "erase" => LineCommand::Erase,
            "clear" => LineCommand::Clear,
            "left" => LineCommand::Left,
            "right" => LineCommand::Right,
            "home" => LineCommand::Home,
            "end" => LineCommand::End,
            "reload" => LineCommand::Reload,
            "state" => LineCommand::State,
            "quit" | "exit" => LineCommand::Quit,
            other => bail!("unknown command `{other}`"),
        };
        Ok(Some(command))
    }

    /// Mailbox command for commands the editor handles itself.
    pub fn to_editor(&self) -> Option<EditorCommand> {
        let command = match self {
            LineCommand::Insert { text, offset } => EditorCommand::Insert {
                text: text.clone(),
                cursor_offset: *offset,
            },
            LineCommand::Erase => EditorCommand::Erase,
            LineCommand::Clear => EditorCommand::Clear,
            LineCommand::Left => EditorCommand::MoveCursorLeft,
            LineCommand::Right => EditorCommand::MoveCursorRight,
            LineCommand::Home => EditorCommand::CursorOnStart,
            LineCommand::End => EditorCommand::CursorOnEnd,
            LineCommand::Cursor(pos) => EditorCommand::SetSelection(*pos),
            LineCommand::Text(text) => EditorCommand::SetText {
                text: text.clone(),
                selection: None,
            },
            LineCommand::Memory(value) => {
                EditorCommand::Notify(Notification::MemoryValueReady(value.clone()))
            }
            LineCommand::Select { .. }
            | LineCommand::Reload
            | LineCommand::State
            | LineCommand::Quit => return None,
        };
        Some(command)
    }
}

fn position(arg: &str) -> Result<usize> {
    arg.parse()
        .with_context(|| format!("invalid position `{arg}`"))
}
