// tapestep: single-step tape machine with a terminal visualizer

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use tapestep::compiler::disasm::disassemble;
use tapestep::compiler::{compile, CompiledProgram};
use tapestep::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_FILL, DEFAULT_MAX_STEPS, DEFAULT_PLAY_DELAY_MS,
    DEFAULT_REFILL_THRESHOLD, DEMO_PROGRAM,
};
use tapestep::interpreter::Interpreter;
use tapestep::memory::{shared_tape, Cursor};
use tapestep::parser::buffer::Buffer;
use tapestep::ui::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Step through the run in a terminal UI
    Tui,
    /// Print one JSON snapshot per step
    Json,
    /// Run to completion and print the final tape
    Run,
    /// Print the compiled instructions
    Disasm,
}

/// Compile and step through a tape machine program
#[derive(Debug, Parser)]
#[command(name = "tapestep", version, about)]
struct Cli {
    /// Program source; the built-in demo runs when omitted
    file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Mode::Tui)]
    mode: Mode,

    /// Initial tape contents
    #[arg(long, default_value = "")]
    tape: String,

    /// Starting cell of the cursor; negative grows the tape to the left
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    start: i64,

    /// Character for freshly grown cells
    #[arg(long, default_value_t = DEFAULT_FILL)]
    fill: char,

    /// Pause between steps (play speed in the TUI, pacing in json mode)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Step cap for json and run modes, and for a jump to the end in the TUI
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (source_name, source, buffer) = match &cli.file {
        Some(path) => {
            if !path.exists() {
                eprintln!("Error: File '{}' not found", path.display());
                std::process::exit(1);
            }
            // Read once: the lexer streams from the same text the source pane shows
            let source = fs::read_to_string(path)?;
            let name = path.display().to_string();
            let buffer = Buffer::from_reader(
                io::Cursor::new(source.clone().into_bytes()),
                &name,
                DEFAULT_CHUNK_SIZE,
                DEFAULT_REFILL_THRESHOLD,
            );
            (name, source, buffer)
        }
        None => (
            "demo".to_string(),
            DEMO_PROGRAM.to_string(),
            Buffer::new(DEMO_PROGRAM),
        ),
    };

    eprintln!("Parsing {}...", source_name);
    let program = match tapestep::parse_buffer(buffer) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Parser error: {}", e);
            std::process::exit(1);
        }
    };

    let program = compile(&program);
    eprintln!(
        "Compiled {} instructions in main and {} label(s).",
        program.main.len(),
        program.labels.len()
    );

    if cli.mode == Mode::Disasm {
        print!("{}", disassemble(&program));
        return Ok(());
    }

    let tape = shared_tape(&cli.tape, cli.fill);
    let cursor = Cursor::new(tape, cli.start);

    match cli.mode {
        Mode::Tui => run_tui(&cli, program, cursor, source_name, source),
        Mode::Json => stream_json(&cli, program, cursor),
        Mode::Run => run_headless(&cli, program, cursor),
        Mode::Disasm => Ok(()),
    }
}

/// Step to completion, printing the tape once
fn run_headless(
    cli: &Cli,
    program: CompiledProgram,
    mut cursor: Cursor,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut interpreter = Interpreter::new(program);
    let mut steps = 0;
    while interpreter.has_more_work() && steps < cli.max_steps {
        interpreter.step(&mut cursor);
        steps += 1;
    }

    if interpreter.has_more_work() {
        eprintln!("Stopped after {} steps (--max-steps).", steps);
    } else {
        eprintln!("Finished after {} steps.", steps);
    }

    println!("{}", cursor.tape().borrow());
    Ok(())
}

/// One JSON line per step; the final line carries `"last": true`
fn stream_json(
    cli: &Cli,
    program: CompiledProgram,
    mut cursor: Cursor,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut interpreter = Interpreter::new(program);
    let delay = Duration::from_millis(cli.delay_ms.unwrap_or(0));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !interpreter.has_more_work() {
        writeln!(out, "{}", cursor.snapshot().with_last(true).to_json()?)?;
        return Ok(());
    }

    let mut steps = 0;
    loop {
        interpreter.step(&mut cursor);
        steps += 1;

        let done = !interpreter.has_more_work() || steps >= cli.max_steps;
        writeln!(out, "{}", cursor.snapshot().with_last(done).to_json()?)?;
        if done {
            break;
        }

        if !delay.is_zero() {
            out.flush()?;
            thread::sleep(delay);
        }
    }

    if interpreter.has_more_work() {
        eprintln!("Stopped after {} steps (--max-steps).", steps);
    }
    Ok(())
}

fn run_tui(
    cli: &Cli,
    program: CompiledProgram,
    cursor: Cursor,
    source_name: String,
    source: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let delay = Duration::from_millis(cli.delay_ms.unwrap_or(DEFAULT_PLAY_DELAY_MS));
    let mut app = App::new(
        Interpreter::new(program),
        cursor,
        source_name,
        source,
        delay,
        cli.max_steps,
    );

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
