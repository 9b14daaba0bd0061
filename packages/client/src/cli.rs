//! Interactive command line over a chart session.

use std::time::Duration;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{Connection, Dimensions, NodeChange, XYPosition};
use crate::session::{ChartSession, MutationState};

const HELP: &str = "\
commands:
  add <type> <x> <y>        add a node
  move <id> <x> <y>         drag a node
  resize <id> <w> <h>       resize a node
  connect <src> <dst>       connect two nodes
  remove <id>               remove a node
  duplicate <id>            copy a node next to itself
  text <id> <text>          edit a node's label
  select-all | undo | redo | reset
  save | restore            local fallback store
  snapshot [image]          take a snapshot
  snapshots                 list snapshots
  restore-snapshot <id> | delete-snapshot <id>
  show | users | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { kind: String, x: f64, y: f64 },
    Move { id: String, x: f64, y: f64 },
    Resize { id: String, width: f64, height: f64 },
    Connect { source: String, target: String },
    Remove { id: String },
    Duplicate { id: String },
    Text { id: String, text: String },
    SelectAll,
    Undo,
    Redo,
    Reset,
    Save,
    Restore,
    Snapshot { image: Option<String> },
    Snapshots,
    RestoreSnapshot { id: String },
    DeleteSnapshot { id: String },
    Show,
    Users,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty input")]
    Empty,

    #[error("unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("not a number: {0}")]
    InvalidNumber(String),
}

fn number(s: &str) -> Result<f64, CommandError> {
    s.parse()
        .map_err(|_| CommandError::InvalidNumber(s.to_string()))
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match (name, args.as_slice()) {
            ("", _) => return Err(CommandError::Empty),
            ("add", [kind, x, y]) => Self::Add {
                kind: kind.to_string(),
                x: number(x)?,
                y: number(y)?,
            },
            ("add", _) => return Err(CommandError::Usage("add <type> <x> <y>")),
            ("move", [id, x, y]) => Self::Move {
                id: id.to_string(),
                x: number(x)?,
                y: number(y)?,
            },
            ("move", _) => return Err(CommandError::Usage("move <id> <x> <y>")),
            ("resize", [id, w, h]) => Self::Resize {
                id: id.to_string(),
                width: number(w)?,
                height: number(h)?,
            },
            ("resize", _) => return Err(CommandError::Usage("resize <id> <w> <h>")),
            ("connect", [source, target]) => Self::Connect {
                source: source.to_string(),
                target: target.to_string(),
            },
            ("connect", _) => return Err(CommandError::Usage("connect <src> <dst>")),
            ("remove", [id]) => Self::Remove { id: id.to_string() },
            ("remove", _) => return Err(CommandError::Usage("remove <id>")),
            ("duplicate", [id]) => Self::Duplicate { id: id.to_string() },
            ("duplicate", _) => return Err(CommandError::Usage("duplicate <id>")),
            ("text", [id, ..]) => Self::Text {
                id: id.to_string(),
                text: rest[id.len()..].trim().to_string(),
            },
            ("text", _) => return Err(CommandError::Usage("text <id> <text>")),
            ("select-all", []) => Self::SelectAll,
            ("undo", []) => Self::Undo,
            ("redo", []) => Self::Redo,
            ("reset", []) => Self::Reset,
            ("save", []) => Self::Save,
            ("restore", []) => Self::Restore,
            ("snapshot", []) => Self::Snapshot { image: None },
            ("snapshot", [image]) => Self::Snapshot {
                image: Some(image.to_string()),
            },
            ("snapshots", []) => Self::Snapshots,
            ("restore-snapshot", [id]) => Self::RestoreSnapshot { id: id.to_string() },
            ("restore-snapshot", _) => return Err(CommandError::Usage("restore-snapshot <id>")),
            ("delete-snapshot", [id]) => Self::DeleteSnapshot { id: id.to_string() },
            ("delete-snapshot", _) => return Err(CommandError::Usage("delete-snapshot <id>")),
            ("show", []) => Self::Show,
            ("users", []) => Self::Users,
            ("help", _) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            (other, _) => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Execute one command. Returns `false` on quit.
pub async fn execute(session: &mut ChartSession, command: Command) -> bool {
    let result = match command {
        Command::Add { kind, x, y } => {
            let id = session.add_node(&kind, XYPosition::new(x, y));
            println!("added {id}");
            Ok(())
        }
        Command::Move { id, x, y } => {
            for dragging in [true, false] {
                session.apply_node_changes(&[NodeChange::Position {
                    id: id.clone(),
                    position: Some(XYPosition::new(x, y)),
                    dragging: Some(dragging),
                }]);
                session.flush();
            }
            Ok(())
        }
        Command::Resize { id, width, height } => {
            for resizing in [true, false] {
                session.apply_node_changes(&[NodeChange::Dimensions {
                    id: id.clone(),
                    dimensions: Some(Dimensions { width, height }),
                    resizing: Some(resizing),
                }]);
                session.flush();
            }
            Ok(())
        }
        Command::Connect { source, target } => {
            if !session.connect_nodes(Connection::new(source, target)) {
                println!("already connected");
            }
            Ok(())
        }
        Command::Remove { id } => {
            session.apply_node_changes(&[NodeChange::Remove { id }]);
            Ok(())
        }
        Command::Duplicate { id } => session
            .duplicate_node(&id)
            .map(|copy| println!("added {copy}"))
            .map_err(Into::into),
        Command::Text { id, text } => session.update_node_text(&id, &text).map_err(Into::into),
        Command::SelectAll => {
            session.select_all();
            Ok(())
        }
        Command::Undo => {
            if !session.undo() {
                println!("nothing to undo");
            }
            Ok(())
        }
        Command::Redo => {
            if !session.redo() {
                println!("nothing to redo");
            }
            Ok(())
        }
        Command::Reset => {
            session.reset();
            Ok(())
        }
        Command::Save => session.save_local().await,
        Command::Restore => session.restore_local().await,
        Command::Snapshot { image } => session.create_snapshot(image).await.map(|s| {
            println!("snapshot {} taken", s.id);
        }),
        Command::Snapshots => session.list_snapshots().await.map(|snapshots| {
            for s in snapshots {
                println!("{}  {}  {} node(s)", s.id, s.created_at, s.graph().nodes.len());
            }
        }),
        Command::RestoreSnapshot { id } => session.restore_snapshot(&id).await,
        Command::DeleteSnapshot { id } => session.delete_snapshot(&id).await,
        Command::Show => {
            show(session);
            Ok(())
        }
        Command::Users => {
            println!("{} user(s) in room", session.user_count());
            Ok(())
        }
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Quit => return false,
    };

    if let Err(e) = result {
        println!("error: {e}");
    }
    session.flush();
    true
}

fn show(session: &ChartSession) {
    let store = session.store();
    println!("chart '{}' ({})", session.title(), session.chart_id());
    for node in store.nodes() {
        println!(
            "  node {} [{}] ({:.0}, {:.0}) {}",
            node.id,
            node.kind().unwrap_or("default"),
            node.position.x,
            node.position.y,
            node.label().unwrap_or("")
        );
    }
    for edge in store.edges() {
        println!("  edge {} {} -> {}", edge.id, edge.source, edge.target);
    }
    if let MutationState::Failed(reason) = session.mutation_state() {
        println!("  last save failed: {reason}");
    }
}

/// Read lines on a blocking thread and forward them.
fn spawn_line_reader() -> Result<mpsc::UnboundedReceiver<String>, ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                    let _ = tx.send("quit".to_string());
                    break;
                }
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    break;
                }
            }
        }
    });
    Ok(rx)
}

/// Run the REPL until quit, applying relay events between commands.
pub async fn run_repl(mut session: ChartSession) -> Result<(), ReadlineError> {
    let mut lines = spawn_line_reader()?;
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                match Command::parse(&line) {
                    Ok(command) => {
                        if !execute(&mut session, command).await {
                            break;
                        }
                    }
                    Err(CommandError::Empty) => {}
                    Err(e) => println!("{e}"),
                }
            }
            _ = session.next_event(Duration::from_millis(250)), if session.has_relay() => {}
        }
    }

    session.close().await;
    Ok(())
}
