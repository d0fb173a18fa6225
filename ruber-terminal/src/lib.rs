//! Terminal frontend for the Ruber system
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use log::info;
use ruber_core::{Command, Flow, ModelBuffer, Session, SteerAxis};
use std::io::{self, stdout, Write};
use std::time::Instant;

pub mod logging;
pub mod renderer;

pub use logging::{init_logging, LoggingConfig};
pub use renderer::AsciiRenderer;

/// Command bound to a key press, if any. Arrow keys fly the ship.
pub fn key_command(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Up => Some(Command::Steer(SteerAxis::Thrust, 1)),
        KeyCode::Down => Some(Command::Steer(SteerAxis::Thrust, -1)),
        KeyCode::Left => Some(Command::Steer(SteerAxis::Yaw, 1)),
        KeyCode::Right => Some(Command::Steer(SteerAxis::Yaw, -1)),
        KeyCode::Char(c) => Command::from_char(c),
        _ => None,
    }
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    session: Session,
    buffers: Vec<ModelBuffer>,
    renderer: AsciiRenderer,
    running: bool,
    dirty: bool,
}

impl TerminalApp {
    /// `buffers` holds one draw buffer per scene body, in body order.
    pub fn new(mut session: Session, buffers: Vec<ModelBuffer>) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let renderer = AsciiRenderer::new(width as usize, height as usize);
        session.set_aspect(renderer.aspect());

        Ok(Self {
            session,
            buffers,
            renderer,
            running: true,
            dirty: true,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            // Sleep in the event poll until input arrives or the next update is due
            let wait = self.session.clock().time_until_tick(Instant::now());
            if event::poll(wait)? {
                self.handle_event(event::read()?);
                while self.running && event::poll(std::time::Duration::ZERO)? {
                    self.handle_event(event::read()?);
                }
            }

            if self.session.poll_tick(Instant::now()) {
                self.dirty = true;
            }

            if self.dirty && self.running {
                self.render()?;
                self.dirty = false;
                self.session.frame_rendered(Instant::now());
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                if let Some(command) = key_command(&key) {
                    if self.session.apply(command, Instant::now()) == Flow::Quit {
                        self.running = false;
                    }
                    self.dirty = true;
                }
            }
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.session.set_aspect(self.renderer.aspect());
                info!(
                    "resize: width = {width:4} height = {height:4} aspect = {:5.2}",
                    self.renderer.aspect()
                );
                self.dirty = true;
            }
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render every body with its current model matrix
        let camera = self.session.camera();
        let wireframe = self.session.wireframe();
        for (buffer, model) in self.buffers.iter().zip(self.session.model_matrices()) {
            self.renderer.render_model(buffer, model, camera, wireframe);
        }

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw the title as a status line
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(self.session.title()),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
