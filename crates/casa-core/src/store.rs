//! Observable state container.
//!
//! Controllers keep their view state in a [`StateStore`]. Any shell (terminal,
//! desktop, web bridge) can take a snapshot at any time or subscribe and get
//! woken on every change, without the controllers knowing how they are
//! rendered.

use tokio::sync::watch;

/// A single value with snapshot and change-notification access.
///
/// Every mutation goes through [`StateStore::update`], which runs the closure
/// under the store's lock, so a check-then-transition inside one closure is
/// atomic with respect to other updates.
#[derive(Debug)]
pub struct StateStore<S> {
    sender: watch::Sender<S>,
}

/// Receiver side handed out to subscribers.
pub type StateWatcher<S> = watch::Receiver<S>;

impl<S: Clone> StateStore<S> {
    pub fn new(initial: S) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> S {
        self.sender.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Subscribes to changes. The receiver starts at the current state.
    pub fn subscribe(&self) -> StateWatcher<S> {
        self.sender.subscribe()
    }

    /// Mutates the state and notifies subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut result = None;
        self.sender.send_modify(|state| result = Some(f(state)));
        match result {
            Some(result) => result,
            None => unreachable!("send_modify always runs its closure"),
        }
    }

    /// Mutates the state, notifying subscribers only when `f` returns `true`.
    pub fn update_if(&self, f: impl FnOnce(&mut S) -> bool) -> bool {
        self.sender.send_if_modified(f)
    }
}

impl<S: Clone + Default> Default for StateStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
