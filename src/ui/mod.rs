//! The terminal front end: raw-mode setup, the event loop and drawing.

pub mod app;
pub mod render;
pub mod scope;

pub use app::{Action, App, Screen};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::panic;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use crate::api::{AuthService, ProjectService, TaskService};
use crate::session::SessionStore;

const TICK: Duration = Duration::from_millis(250);

/// Takes over the terminal until the user quits, then restores it.
pub async fn run<A, S>(mut app: App<A, S>) -> io::Result<()>
where
    A: AuthService + ProjectService + TaskService + Sync,
    S: SessionStore,
{
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = unbounded_channel();
    scope::spawn_input_thread(tx);
    let result = event_loop(&mut terminal, &mut app, &mut rx).await;

    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal loop failed");
    }
    result
}

/// Leaves raw mode and the alternate screen. Harmless when neither is on.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

/// A panic inside the loop would otherwise print into the alternate screen
/// and leave the shell in raw mode.
fn install_panic_hook() {
    chain_panic_hook(|| {
        let _ = restore_terminal();
    });
}

fn chain_panic_hook(before: impl Fn() + Send + Sync + 'static) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        before();
        previous(info);
    }));
}

async fn event_loop<B, A, S>(
    terminal: &mut Terminal<B>,
    app: &mut App<A, S>,
    rx: &mut UnboundedReceiver<Event>,
) -> io::Result<()>
where
    B: Backend,
    A: AuthService + ProjectService + TaskService + Sync,
    S: SessionStore,
{
    let mut ticker = tokio::time::interval(TICK);
    terminal.draw(|f| render::draw(f, &*app))?;
    app.start(rx).await;

    while !app.should_quit() {
        terminal.draw(|f| render::draw(f, &*app))?;
        tokio::select! {
            ev = rx.recv() => match ev {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = app.key(key) {
                        app.prepare(&action);
                        terminal.draw(|f| render::draw(f, &*app))?;
                        app.perform(action, rx).await;
                    }
                }
                Some(_) => {}
                None => break,
            },
            _ = ticker.tick() => app.tick(Instant::now()),
        }
    }
    Ok(())
}
