use indoc::indoc;

use crate::format::{FormatTool, ToolSet};
use crate::state::FileStore;
use crate::storage::Storage;
use crate::utils::{char_count, word_count};

pub const HELP: &str = indoc! {"
    ls                list notes (* marks the open one)
    new               create and open an empty note
    open <name>       open a note, dropping unsaved edits
    edit <text>       replace the editor buffer
    append <text>     add a line to the editor buffer
    show              print the editor buffer
    save              write the buffer into the open note
    rm <name>         delete a note
    find <query>      list notes whose name or text matches
    tool <name>       toggle a toolbar tool (bold, italic, heading, bullet-list, numbered-list)
    tools             list highlighted tools
    stats             word and character counts of the buffer
    reload            reload notes from storage, dropping unsaved edits
    help              this text
    quit              exit"};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    New,
    Open(String),
    Edit(String),
    Append(String),
    Show,
    Save,
    Remove(String),
    Find(String),
    Tool(FormatTool),
    Tools,
    Stats,
    Reload,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (trimmed, ""),
        };
        let arg = rest.trim();

        match word {
            "" => Command::Empty,
            "ls" => Command::List,
            "new" => Command::New,
            "show" => Command::Show,
            "save" => Command::Save,
            "tools" => Command::Tools,
            "stats" => Command::Stats,
            "reload" => Command::Reload,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            // buffer text is taken verbatim, surrounding spaces included
            "edit" => Command::Edit(rest.to_string()),
            "append" => Command::Append(rest.to_string()),
            "open" | "rm" | "find" | "tool" if arg.is_empty() => {
                Command::Unknown(format!("{} needs an argument", word))
            }
            "open" => Command::Open(arg.to_string()),
            "rm" => Command::Remove(arg.to_string()),
            "find" => Command::Find(arg.to_string()),
            "tool" => match arg.parse() {
                Ok(tool) => Command::Tool(tool),
                Err(e) => Command::Unknown(e.to_string()),
            },
            other => Command::Unknown(format!("unknown command {:?}", other)),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub quit: bool,
}

impl Outcome {
    fn say(output: impl Into<String>) -> Self {
        Self { output: output.into(), quit: false }
    }
}

pub fn execute<S: Storage>(store: &mut FileStore<S>, tools: &mut ToolSet, cmd: Command) -> Outcome {
    match cmd {
        Command::Empty => Outcome::default(),
        Command::List => Outcome::say(listing(store)),
        Command::New => {
            let name = store.create_file();
            Outcome::say(format!("created {}", name))
        }
        Command::Open(name) => {
            if store.select_file(&name) {
                Outcome::say(format!("opened {}", name))
            } else {
                Outcome::say(format!("no such file {:?}", name))
            }
        }
        Command::Edit(text) => {
            store.edit_buffer(text);
            Outcome::default()
        }
        Command::Append(text) => {
            store.append_buffer(&text);
            Outcome::default()
        }
        Command::Show => match store.active() {
            Some(name) => Outcome::say(format!("--- {}\n{}", name, store.buffer())),
            None => Outcome::say("no file open"),
        },
        Command::Save => match store.save_active() {
            Some(message) => Outcome::say(message),
            None => Outcome::say("no file open"),
        },
        Command::Remove(name) => {
            if store.delete_file(&name) {
                Outcome::say(format!("deleted {}", name))
            } else {
                Outcome::say(format!("no such file {:?}", name))
            }
        }
        Command::Find(query) => {
            let hits = store.search(&query);
            if hits.is_empty() {
                Outcome::say("no matches")
            } else {
                Outcome::say(hits.join("\n"))
            }
        }
        Command::Tool(tool) => {
            let on = tools.toggle(tool);
            Outcome::say(format!("{} {}", tool, if on { "on" } else { "off" }))
        }
        Command::Tools => {
            if tools.is_empty() {
                Outcome::say("no tools active")
            } else {
                let names: Vec<&str> = tools.iter().map(FormatTool::name).collect();
                Outcome::say(names.join(" "))
            }
        }
        Command::Stats => {
            let text = store.buffer();
            Outcome::say(format!("Words: {}  Characters: {}", word_count(text), char_count(text)))
        }
        Command::Reload => {
            store.hydrate();
            Outcome::say(format!("reloaded {} file(s)", store.len()))
        }
        Command::Help => Outcome::say(HELP),
        Command::Quit => Outcome { output: String::new(), quit: true },
        Command::Unknown(reason) => Outcome::say(format!("{} (try `help`)", reason)),
    }
}

fn listing<S: Storage>(store: &FileStore<S>) -> String {
    if store.is_empty() {
        return "no files".to_string();
    }

    store
        .names()
        .map(|name| {
            let mark = if store.active() == Some(name) { '*' } else { ' ' };
            format!("{} {}", mark, name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
