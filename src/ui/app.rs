//! Main TUI application state and logic

use crate::constants::SNAPSHOT_MEMORY_LIMIT;
use crate::interpreter::engine::Interpreter;
use crate::memory::cursor::Cursor;
use crate::snapshot::SnapshotManager;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Program,
    Stack,
    Tape,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: tape -> source -> program -> stack)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Tape => FocusedPane::Source,
            FocusedPane::Source => FocusedPane::Program,
            FocusedPane::Program => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Tape,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Tape => FocusedPane::Stack,
            FocusedPane::Source => FocusedPane::Tape,
            FocusedPane::Program => FocusedPane::Source,
            FocusedPane::Stack => FocusedPane::Program,
        }
    }
}

/// The main application state
pub struct App {
    /// The machine being watched, always at the newest recorded snapshot
    interpreter: Interpreter,
    cursor: Cursor,

    /// Name and text of the program being executed
    pub source_name: String,
    pub source_code: String,

    /// Recorded states, one per step, starting with the initial state
    history: SnapshotManager,
    history_position: usize,

    /// Upper bound on steps taken by a single jump to the end
    max_steps: usize,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub program_scroll: usize,
    pub stack_scroll: usize,
    pub tape_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
    pub is_error: bool,

    /// Whether auto-play mode is active
    pub is_playing: bool,
    play_delay: Duration,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// Create a new app watching `interpreter` drive `cursor`
    pub fn new(
        interpreter: Interpreter,
        cursor: Cursor,
        source_name: String,
        source_code: String,
        play_delay: Duration,
        max_steps: usize,
    ) -> Self {
        let mut history = SnapshotManager::new(SNAPSHOT_MEMORY_LIMIT);
        let (status_message, is_error) = match history.push(interpreter.capture(&cursor)) {
            Ok(()) => (String::from("Ready!"), false),
            Err(e) => (e, true),
        };

        let now = Instant::now();
        App {
            interpreter,
            cursor,
            source_name,
            source_code,
            history,
            history_position: 0,
            max_steps,
            focused_pane: FocusedPane::Tape,
            source_scroll: 0,
            program_scroll: 0,
            stack_scroll: 0,
            tape_scroll: 0,
            should_quit: false,
            status_message,
            is_error,
            is_playing: false,
            play_delay,
            last_play_time: now,
            last_space_press: now.checked_sub(Duration::from_secs(1)).unwrap_or(now),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= self.play_delay {
                if self.step_forward().is_ok() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps ticking
            let timeout = self.play_delay.min(Duration::from_millis(50));
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Index of the snapshot on screen
    pub fn history_position(&self) -> usize {
        self.history_position
    }

    /// Number of snapshots recorded so far
    pub fn total_snapshots(&self) -> usize {
        self.history.len()
    }

    /// True once the engine has nothing left to do
    pub fn is_finished(&self) -> bool {
        !self.interpreter.has_more_work()
    }

    /// Source line of the next instruction in the shown snapshot
    pub fn current_line(&self) -> Option<usize> {
        let snapshot = self.history.get(self.history_position)?;
        let ip = snapshot.instruction_pointer?;
        self.interpreter
            .program()
            .source_line(&snapshot.routine, ip)
    }

    /// What the next forward step does, for the status bar
    pub fn next_action(&self) -> String {
        if self.history_position + 1 < self.history.len() {
            return "replay".to_string();
        }
        if self.interpreter.pending_move() > 0 {
            return "move one cell".to_string();
        }
        match self.interpreter.current_instruction() {
            Some(instruction) => instruction
                .to_string()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
            None => "nothing".to_string(),
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Tape across the top, three panes, status bar at the bottom
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Percentage(35),
                Constraint::Percentage(20),
            ])
            .split(rows[1]);

        let current_line = self.current_line();
        super::panes::render_source_pane(
            frame,
            columns[0],
            &self.source_name,
            &self.source_code,
            current_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        if let Some(snapshot) = self.history.get(self.history_position) {
            super::panes::render_tape_pane(
                frame,
                rows[0],
                &snapshot.view,
                self.focused_pane == FocusedPane::Tape,
                &mut self.tape_scroll,
            );

            let instructions = self.interpreter.program().sequence(&snapshot.routine);
            super::panes::render_program_pane(
                frame,
                columns[1],
                &snapshot.routine,
                instructions.as_deref().unwrap_or(&[]),
                snapshot.instruction_pointer,
                self.focused_pane == FocusedPane::Program,
                &mut self.program_scroll,
            );

            super::panes::render_stack_pane(
                frame,
                columns[2],
                &snapshot.stack,
                snapshot.pending_move,
                self.focused_pane == FocusedPane::Stack,
                &mut self.stack_scroll,
            );
        }

        super::panes::render_status_bar(
            frame,
            rows[2],
            super::panes::StatusRenderData {
                message: &self.status_message,
                current_step: self.history_position,
                total_recorded: self.history.len(),
                is_finished: !self.interpreter.has_more_work(),
                is_playing: self.is_playing,
                is_error: self.is_error,
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        self.is_error = false;
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if self.step_forward().is_err() {
                        break;
                    }
                    stepped += 1;
                }
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                match self.step_backward() {
                    Ok(()) => self.status_message = "Stepped backward".to_string(),
                    Err(e) => self.status_message = format!("Cannot step backward: {}", e),
                }
            }
            KeyCode::Right => {
                self.is_playing = false;
                let action = self.next_action();
                match self.step_forward() {
                    Ok(()) => self.status_message = format!("Stepped forward: {}", action),
                    Err(e) => self.status_message = format!("Cannot step forward: {}", e),
                }
            }
            KeyCode::Up => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(1);
            }
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (200ms debounce against key repeat)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(self.play_delay)
                            .unwrap_or(Instant::now());
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                let mut taken = 0;
                while taken < self.max_steps && self.step_forward().is_ok() {
                    taken += 1;
                }
                self.status_message = if self.is_finished() {
                    "Jumped to end".to_string()
                } else {
                    format!("Stopped after {} steps", taken)
                };
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.history_position = 0;
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Program => &mut self.program_scroll,
            FocusedPane::Stack => &mut self.stack_scroll,
            FocusedPane::Tape => &mut self.tape_scroll,
        }
    }

    /// Move one step forward, replaying history before running the engine
    pub fn step_forward(&mut self) -> Result<(), String> {
        if self.history_position + 1 < self.history.len() {
            self.history_position += 1;
            return Ok(());
        }
        if !self.interpreter.has_more_work() {
            return Err("execution finished".to_string());
        }

        self.interpreter.step(&mut self.cursor);
        if let Err(e) = self.history.push(self.interpreter.capture(&self.cursor)) {
            self.is_error = true;
            return Err(e);
        }
        self.history_position += 1;
        Ok(())
    }

    /// Move one step back through recorded history
    pub fn step_backward(&mut self) -> Result<(), String> {
        if self.history_position == 0 {
            return Err("already at the start".to_string());
        }
        self.history_position -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::instruction::Routine;
    use crate::memory::shared_tape;

    fn app(source: &str, tape: &str) -> App {
        let program = crate::build(source).expect("program should parse");
        let tape = shared_tape(tape, '_');
        let cursor = Cursor::new(tape, 0);
        App::new(
            Interpreter::new(program),
            cursor,
            "test".to_string(),
            source.to_string(),
            Duration::from_millis(1),
            100,
        )
    }

    #[test]
    fn test_focus_cycle() {
        let mut pane = FocusedPane::Tape;
        for _ in 0..4 {
            pane = pane.next();
        }
        assert_eq!(pane, FocusedPane::Tape);
        assert_eq!(FocusedPane::Source.next().prev(), FocusedPane::Source);
    }

    #[test]
    fn test_step_forward_then_back_replays_history() {
        let mut app = app("right 2; write 'x';", "ab");
        assert_eq!(app.total_snapshots(), 1);

        while app.step_forward().is_ok() {}
        let recorded = app.total_snapshots();
        assert!(app.is_finished());
        assert_eq!(app.history_position(), recorded - 1);

        app.step_backward().unwrap();
        app.step_backward().unwrap();
        app.step_forward().unwrap();
        // replaying does not add snapshots
        assert_eq!(app.total_snapshots(), recorded);
        assert_eq!(app.history_position(), recorded - 2);
    }

    #[test]
    fn test_current_line_tracks_the_shown_step() {
        let mut app = app("right 1;\nwrite 'x';", "ab");
        assert_eq!(app.current_line(), Some(1));
        assert_eq!(app.next_action(), "PUSH 1");

        app.step_forward().unwrap();
        app.step_forward().unwrap();
        assert_eq!(app.current_line(), Some(2));
        assert_eq!(app.next_action(), "PUSH 'x'");

        app.step_backward().unwrap();
        assert_eq!(app.current_line(), Some(1));
        assert_eq!(app.next_action(), "replay");

        while app.step_forward().is_ok() {}
        assert_eq!(app.current_line(), None);
        assert_eq!(app.next_action(), "nothing");
    }

    #[test]
    fn test_label_named_main_is_not_the_main_sequence() {
        let mut app = app("main: { write 'L'; }\nwrite 'M';\ngoto main;", "_");
        app.step_forward().unwrap();
        app.step_forward().unwrap();
        app.step_forward().unwrap();
        let shown = app.history.get(app.history_position()).unwrap();
        assert_eq!(shown.routine, Routine::Label("main".to_string()));
        assert_eq!(
            app.interpreter.program().sequence(&shown.routine).unwrap().len(),
            2
        );
        assert_eq!(app.current_line(), Some(1));
    }

    #[test]
    fn test_step_backward_at_start_fails() {
        let mut app = app("halt;", "");
        assert!(app.step_backward().is_err());
    }

    #[test]
    fn test_finished_tape_is_recorded() {
        let mut app = app("right 2; write 'x';", "ab");
        while app.step_forward().is_ok() {}
        let last = app.history.last().unwrap();
        assert_eq!(last.view.tape.contents(), "abx");
        assert_eq!(last.instruction_pointer, None);
    }
}
