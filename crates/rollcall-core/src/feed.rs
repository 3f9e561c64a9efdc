//! Published presentation state.
//!
//! Every presenter exposes its outcome as a [`Resource`] behind a [`Feed`]:
//! one writer (the [`Publisher`]) and any number of readers, each of which
//! sees the latest value and can wait for the next one. A live query is just
//! a feed whose publisher re-runs the query on every change; it stops once
//! the last reader is dropped.

use serde::Serialize;
use tokio::sync::watch;

// ─── Resource ────────────────────────────────────────────────────────────────

/// Outcome of an operation as seen by a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Resource<T> {
  Loading,
  Success(T),
  /// A human-readable failure message.
  Error(String),
}

impl<T> Resource<T> {
  pub fn is_loading(&self) -> bool { matches!(self, Self::Loading) }

  pub fn success(&self) -> Option<&T> {
    match self {
      Self::Success(v) => Some(v),
      _ => None,
    }
  }

  pub fn into_result(self) -> Option<Result<T, String>> {
    match self {
      Self::Loading => None,
      Self::Success(v) => Some(Ok(v)),
      Self::Error(m) => Some(Err(m)),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
    match self {
      Self::Loading => Resource::Loading,
      Self::Success(v) => Resource::Success(f(v)),
      Self::Error(m) => Resource::Error(m),
    }
  }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Resource<T> {
  fn from(r: Result<T, E>) -> Self {
    match r {
      Ok(v) => Self::Success(v),
      Err(e) => Self::Error(e.to_string()),
    }
  }
}

// ─── Feed ────────────────────────────────────────────────────────────────────

/// Write side of a [`Feed`].
#[derive(Debug)]
pub struct Publisher<T> {
  tx: watch::Sender<T>,
}

impl<T> Publisher<T> {
  /// Replace the current value and wake every reader.
  ///
  /// Publishing with no readers left is not an error; the value is kept for
  /// the next [`Publisher::subscribe`].
  pub fn publish(&self, value: T) { self.tx.send_replace(value); }

  pub fn subscribe(&self) -> Feed<T> { Feed { rx: self.tx.subscribe() } }

  /// The value most recently published.
  pub fn latest(&self) -> T
  where
    T: Clone,
  {
    self.tx.borrow().clone()
  }

  /// True once every reader has been dropped.
  pub fn is_closed(&self) -> bool { self.tx.is_closed() }

  /// Resolves once every reader has been dropped.
  pub async fn closed(&self) { self.tx.closed().await }
}

/// Read side: the latest published value plus change notification.
#[derive(Debug, Clone)]
pub struct Feed<T> {
  rx: watch::Receiver<T>,
}

impl<T> Feed<T> {
  pub fn channel(initial: T) -> (Publisher<T>, Feed<T>) {
    let (tx, rx) = watch::channel(initial);
    (Publisher { tx }, Feed { rx })
  }
}

impl<T: Clone> Feed<T> {
  /// The most recently published value.
  pub fn latest(&self) -> T { self.rx.borrow().clone() }

  /// Like [`Feed::latest`], but marks the value as seen so that
  /// [`Feed::changed`] waits for a newer one.
  pub fn current(&mut self) -> T { self.rx.borrow_and_update().clone() }

  /// Wait for the next published value. Returns `None` once the publisher
  /// is gone and the last value has been seen.
  pub async fn changed(&mut self) -> Option<T> {
    self.rx.changed().await.ok()?;
    Some(self.rx.borrow_and_update().clone())
  }

  /// Wait until the current or a later value satisfies `pred`.
  pub async fn wait_for(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
    self.rx.wait_for(|v| pred(v)).await.ok().map(|v| T::clone(&v))
  }
}

impl<T: Clone + Send + Sync + 'static> Feed<T> {
  /// Derive a feed by applying `f` to every value of this one.
  ///
  /// The forwarding task ends when either the source publisher or every
  /// reader of the derived feed goes away.
  pub fn map<U, F>(mut self, f: F) -> Feed<U>
  where
    U: Send + Sync + 'static,
    F: Fn(&T) -> U + Send + 'static,
  {
    let first = f(&self.rx.borrow_and_update());
    let (publisher, feed) = Feed::channel(first);

    tokio::spawn(async move {
      loop {
        tokio::select! {
          _ = publisher.closed() => break,
          changed = self.rx.changed() => {
            if changed.is_err() {
              break;
            }
            let next = f(&self.rx.borrow_and_update());
            publisher.publish(next);
          }
        }
      }
    });

    feed
  }
}

impl<T: Clone> Feed<Resource<T>> {
  /// Wait for the first value that is not [`Resource::Loading`].
  pub async fn settled(&mut self) -> Option<Result<T, String>> {
    self
      .wait_for(|r| !r.is_loading())
      .await
      .and_then(Resource::into_result)
  }
}
