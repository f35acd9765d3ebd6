mod edit_ops;
mod render;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use trax_core::editor::domain::document::{Document, Point};
use trax_core::editor::domain::selection_bridge::{
    caret_to_time_at, time_to_caret, time_to_caret_rect, CaretSpan,
};
use trax_core::editor::infrastructure::monospace_layout::MonospaceLayout;
use trax_core::network::domain::responses::{decode_task, PublishPayload};
use trax_core::network::infrastructure::http_transport::HttpTransport;
use trax_core::playback::domain::audio_clip::AudioClip;
use trax_core::playback::infrastructure::sampling_loop::{PlaybackMessage, SamplingLoop};
use trax_core::playback::infrastructure::system_clock::SystemClock;
use trax_core::session::domain::glossary::{TermFields, TermRequest};
use trax_core::session::domain::session_status::WorkerId;
use trax_core::session::session_controller::SessionController;
use trax_core::transcript::domain::task::Task;

use edit_ops::EditOp;
use settings::Settings;

/// Time-synchronized transcript editing against a task server.
#[derive(Parser)]
#[command(name = "trax")]
struct Cli {
    /// Settings file (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Task server URL, overriding the settings file.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a task file with the playback highlight at a given time.
    Inspect {
        task: PathBuf,

        /// Playback position in seconds.
        #[arg(long, default_value = "0.0")]
        time: f64,

        /// Mark the word being spoken.
        #[arg(long)]
        playing: bool,
    },

    /// Print the seek time for a click at a char offset of a block.
    Seek {
        task: PathBuf,

        #[arg(long)]
        block: usize,

        #[arg(long)]
        offset: usize,
    },

    /// Find the word spoken at a time and where it is drawn.
    Locate {
        task: PathBuf,

        #[arg(long)]
        time: f64,
    },

    /// Play a task file in real time, printing each word as it is reached.
    Play {
        task: PathBuf,

        /// Start position in seconds (defaults to the first editable word).
        #[arg(long)]
        from: Option<f64>,
    },

    /// Apply edits to a task file and print the document and publish payload.
    Edit {
        task: PathBuf,

        /// insert:B:O:TEXT, delete:B:S:E, break:B:O, speaker:B[:NAME] or unclear:B:S:E.
        /// Applied in order.
        #[arg(long = "op", value_name = "EDIT")]
        ops: Vec<EditOp>,

        /// Worker id placed in the publish payload.
        #[arg(long, default_value = "local")]
        worker: String,
    },

    /// Authenticate, fetch a task and optionally publish it unchanged.
    Session {
        #[arg(long)]
        publish: bool,
    },

    /// Search or extend the server glossary.
    Glossary {
        /// Case-insensitive substring to look for.
        #[arg(long)]
        search: Option<String>,

        /// Add a term with this text.
        #[arg(long)]
        add: Option<String>,

        #[arg(long, requires = "add")]
        comment: Option<String>,

        #[arg(long, requires = "add")]
        url: Option<String>,
    },

    /// Show the effective settings.
    Config {
        /// Write them to the settings file.
        #[arg(long)]
        save: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    if let Some(url) = &cli.base_url {
        settings.base_url = url.clone();
    }

    match &cli.command {
        Command::Inspect {
            task,
            time,
            playing,
        } => run_inspect(task, *time, *playing),
        Command::Seek {
            task,
            block,
            offset,
        } => run_seek(task, Point::new(*block, *offset)),
        Command::Locate { task, time } => run_locate(task, *time, &settings),
        Command::Play { task, from } => run_play(task, *from, &settings),
        Command::Edit { task, ops, worker } => run_edit(task, ops, worker),
        Command::Session { publish } => run_session(&settings, *publish),
        Command::Glossary {
            search,
            add,
            comment,
            url,
        } => run_glossary(
            &settings,
            search.as_deref(),
            add.as_deref(),
            comment.as_deref(),
            url.as_deref(),
        ),
        Command::Config { save } => run_config(&settings, cli.config.as_deref(), *save),
    }
}

fn run_inspect(path: &Path, time: f64, playing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (task, document) = load_task(path)?;
    eprintln!(
        "Task {} ({}), {} block(s), speakers: {}",
        task.id,
        task.task_type,
        document.blocks().len(),
        document.available_speakers().join(", ")
    );
    println!("{}", render::render_document(&document, time, playing));
    Ok(())
}

fn run_seek(path: &Path, point: Point) -> Result<(), Box<dyn std::error::Error>> {
    let (_, document) = load_task(path)?;
    match caret_to_time_at(&document, point) {
        Some(time) => println!("{time:.3}"),
        None => eprintln!("No word at block {} offset {}", point.block, point.offset),
    }
    Ok(())
}

fn run_locate(path: &Path, time: f64, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let (_, document) = load_task(path)?;
    let Some(span) = time_to_caret(&document, time) else {
        eprintln!("Nothing is spoken at {time:.3}s");
        return Ok(());
    };
    let layout = MonospaceLayout::new(settings.char_width, settings.line_height, settings.columns);
    let rect = time_to_caret_rect(&document, time, &layout);
    println!(
        "block {} chars {}..{} \"{}\" at x={} y={} w={} h={}",
        span.block,
        span.anchor,
        span.focus,
        word_text(&document, span),
        rect.x,
        rect.y,
        rect.width,
        rect.height
    );
    Ok(())
}

fn run_play(
    path: &Path,
    from: Option<f64>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let (task, document) = load_task(path)?;
    let clip = AudioClip::for_task(path.display().to_string(), &task);
    let start = from.map_or_else(|| clip.start_position(&task), |t| clip.clamp(t));

    let clock = Arc::new(SystemClock::new(start, clip.timing.end));
    clock.play();
    eprintln!("Playing {:.3}s to {:.3}s", start, clip.timing.end);

    let sampler = SamplingLoop::spawn(
        clock.clone(),
        Duration::from_millis(settings.frame_interval_ms),
    );
    let mut current: Option<CaretSpan> = None;
    for message in sampler.receiver().iter() {
        match message {
            PlaybackMessage::Tick(time) => {
                let span = time_to_caret(&document, time);
                if span != current {
                    if let Some(span) = span {
                        println!("{time:8.3}  {}", word_text(&document, span));
                    }
                    current = span;
                }
            }
            PlaybackMessage::Stopped => break,
        }
    }
    eprintln!("Stopped");
    Ok(())
}

fn run_edit(path: &Path, ops: &[EditOp], worker: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (task, mut document) = load_task(path)?;
    for op in ops {
        op.apply(&mut document)
            .map_err(|e| format!("{op:?} failed: {e}"))?;
        log::debug!("Applied {op:?}");
    }
    eprintln!("{}", render::render_document(&document, task.timing.start, false));

    let payload = PublishPayload::new(&task, &document.editable_tokens(), &WorkerId::new(worker));
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_session(settings: &Settings, publish: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_session(settings)?;
    controller.start()?;
    if let Some(status) = controller.status() {
        eprintln!(
            "Worker {} ({}), audio {}",
            status.worker_id,
            if status.active { "active" } else { "inactive" },
            status.audio_url
        );
    }

    let Some(document) = controller.document() else {
        eprintln!("No task available ({})", controller.phase());
        return Ok(());
    };
    println!("{}", render::render_document(document, 0.0, false));
    if let Some(clip) = controller.audio_clip() {
        eprintln!("Audio: {}", clip.fragment_url());
    }

    if publish {
        controller.publish()?;
        eprintln!("Published; session is {}", controller.phase());
    }
    Ok(())
}

fn run_glossary(
    settings: &Settings,
    search: Option<&str>,
    add: Option<&str>,
    comment: Option<&str>,
    url: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_session(settings)?;
    controller.load_glossary()?;

    if let Some(text) = add {
        let request = TermRequest {
            text: text.to_string(),
            fields: TermFields {
                comment: comment.map(str::to_string),
                url: url.map(str::to_string),
            },
        };
        let term = controller.add_glossary_term(&request)?;
        eprintln!("Added term {} \"{}\"", term.id, term.text);
    }

    let glossary = controller.glossary();
    let query = search.unwrap_or_default();
    for term in glossary.search(query) {
        match &term.fields.comment {
            Some(comment) => println!("{}\t{} ({comment})", term.id, term.text),
            None => println!("{}\t{}", term.id, term.text),
        }
    }
    if glossary.should_offer_add(query) {
        eprintln!("No term matches \"{query}\"; add it with --add");
    }
    Ok(())
}

fn run_config(
    settings: &Settings,
    path: Option<&Path>,
    save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    if save {
        let written = match path {
            Some(path) => {
                settings.save_to(path)?;
                path.to_path_buf()
            }
            None => settings.save()?,
        };
        eprintln!("Saved settings to {}", written.display());
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let task = match &cli.command {
        Command::Inspect { task, .. }
        | Command::Seek { task, .. }
        | Command::Locate { task, .. }
        | Command::Play { task, .. }
        | Command::Edit { task, .. } => Some(task),
        _ => None,
    };
    if let Some(task) = task {
        if !task.exists() {
            return Err(format!("Task file not found: {}", task.display()).into());
        }
    }
    if let Command::Play {
        from: Some(from), ..
    } = &cli.command
    {
        if !from.is_finite() || *from < 0.0 {
            return Err(format!("--from must be a non-negative number, got {from}").into());
        }
    }
    if let Command::Glossary {
        add: Some(text), ..
    } = &cli.command
    {
        if text.trim().is_empty() {
            return Err("--add needs non-empty text".into());
        }
    }
    Ok(())
}

fn load_task(path: &Path) -> Result<(Task, Document), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
    let task = decode_task(&json).map_err(|e| format!("Invalid task {}: {e}", path.display()))?;
    let document = Document::from_task(&task);
    Ok((task, document))
}

fn open_session(settings: &Settings) -> Result<SessionController, Box<dyn std::error::Error>> {
    let transport = HttpTransport::new(&settings.base_url)?;
    Ok(SessionController::new(
        Box::new(transport),
        settings.task_types.clone(),
    ))
}

fn word_text(document: &Document, span: CaretSpan) -> String {
    document
        .block(span.block)
        .map(|block| {
            block
                .text()
                .chars()
                .skip(span.anchor)
                .take(span.focus - span.anchor)
                .collect()
        })
        .unwrap_or_default()
}
