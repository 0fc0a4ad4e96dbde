use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

mod diff;
mod format;
mod shell;
mod state;
mod storage;
mod utils;
mod watch;

use format::ToolSet;
use shell::{Command, execute};
use state::FileStore;
use storage::{FILES_KEY, FileStorage, MemoryStorage, Storage};
use watch::RecordWatcher;

#[derive(Debug, Parser)]
#[command(name = "notevault", about = "Minimal note store with a line-oriented editor")]
struct Args {
    /// Directory holding the notes record
    #[arg(long, env = "NOTEVAULT_DIR", default_value = ".notevault")]
    dir: PathBuf,

    /// Keep notes in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Don't watch the record for writes from other sessions
    #[arg(long)]
    no_watch: bool,
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

async fn next_change(rx: &mut Option<mpsc::Receiver<PathBuf>>) -> Option<PathBuf> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn run<S: Storage>(mut store: FileStore<S>, mut changes: Option<mpsc::Receiver<PathBuf>>) -> Result<()> {
    let mut tools = ToolSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{} file(s). Type `help` for commands.", store.len());
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let outcome = execute(&mut store, &mut tools, Command::parse(&line));
                if !outcome.output.is_empty() {
                    println!("{}", outcome.output);
                }
                if outcome.quit {
                    break;
                }
                prompt();
            }
            Some(path) = next_change(&mut changes) => {
                if store.record_changed_elsewhere() {
                    warn!(
                        "{:?} was changed by another session; the next write here replaces it (use `reload` to pick it up)",
                        path
                    );
                }
            }
        }
    }

    info!("bye");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logger();

    let args = Args::parse();

    if args.ephemeral {
        info!("Starting notevault (in memory)");
        return run(FileStore::open(MemoryStorage::new()), None).await;
    }

    info!("Starting notevault at {:?}", args.dir);
    let storage = FileStorage::new(&args.dir);

    let (_watcher, changes) = if args.no_watch {
        (None, None)
    } else {
        match RecordWatcher::spawn(storage.dir(), storage.path_for(FILES_KEY)) {
            Ok((watcher, rx)) => (Some(watcher), Some(rx)),
            Err(e) => {
                warn!("not watching {:?}: {:#}", args.dir, e);
                (None, None)
            }
        }
    };

    run(FileStore::open(storage), changes).await
}
