//! Ties in-flight requests to the screen that started them. A request runs
//! as a future raced against terminal input; backing out of the screen
//! drops the future, so its result never reaches the screen's state.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::future::Future;
use std::thread;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

#[derive(Debug, PartialEq, Eq)]
pub enum Scoped<T> {
    Done(T),
    Cancelled,
}

pub fn is_cancel(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && (key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)))
}

/// Runs `fut` until it completes or the user cancels. Other input that
/// arrives meanwhile is discarded: the screen is busy.
pub async fn scoped<F: Future>(fut: F, events: &mut UnboundedReceiver<Event>) -> Scoped<F::Output> {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            biased;
            out = &mut fut => return Scoped::Done(out),
            ev = events.recv() => match ev {
                Some(Event::Key(key)) if is_cancel(&key) => {
                    tracing::debug!("in-flight request cancelled by user");
                    return Scoped::Cancelled;
                }
                Some(_) => continue,
                None => return Scoped::Done(fut.await),
            },
        }
    }
}

/// Forwards terminal events from a blocking reader thread. The thread ends
/// once the receiving side is gone.
pub fn spawn_input_thread(tx: UnboundedSender<Event>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "terminal input failed");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn completes_when_left_alone() {
        let (_tx, mut rx) = unbounded_channel();
        assert_eq!(scoped(async { 7 }, &mut rx).await, Scoped::Done(7));
    }

    #[tokio::test]
    async fn escape_drops_the_request_and_its_update() {
        let (tx, mut rx) = unbounded_channel();
        let mut landed = false;
        tx.send(key(KeyCode::Char('j'))).unwrap();
        tx.send(key(KeyCode::Esc)).unwrap();

        let outcome = scoped(
            async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                landed = true;
            },
            &mut rx,
        )
        .await;

        assert_eq!(outcome, Scoped::Cancelled);
        assert!(!landed);
    }

    #[tokio::test]
    async fn closed_input_lets_the_request_finish() {
        let (tx, mut rx) = unbounded_channel::<Event>();
        drop(tx);
        let outcome = scoped(
            async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                "ok"
            },
            &mut rx,
        )
        .await;
        assert_eq!(outcome, Scoped::Done("ok"));
    }
}
