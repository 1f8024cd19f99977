//! In-memory lookup service for testing.

use crate::error::{ErrorKind, Result};
use crate::service::CityLookupService;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// One canned answer from [`MockLookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    City(String),
    Transient,
    Permanent,
}
impl Reply {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    fn into_result(self) -> Result<String> {
        match self {
            Self::City(name) => Ok(name),
            Self::Transient => exn::bail!(ErrorKind::Transient("mock timeout".to_string())),
            Self::Permanent => exn::bail!(ErrorKind::Permanent("mock rejected request".to_string())),
        }
    }
}

type Responder = Box<dyn Fn(f64, f64) -> Reply + Send + Sync>;

enum Behaviour {
    Script { replies: Mutex<VecDeque<Reply>>, fallback: Reply },
    Function(Responder),
}

/// Scripted [`CityLookupService`] that counts how often it was called.
pub struct MockLookup {
    behaviour: Behaviour,
    calls: AtomicUsize,
}
impl MockLookup {
    /// Answers every call with the same reply.
    pub fn always(reply: Reply) -> Self {
        Self::scripted(std::iter::empty(), reply)
    }

    /// Answers with `replies` in order, then with `fallback` forever.
    pub fn scripted(replies: impl IntoIterator<Item = Reply>, fallback: Reply) -> Self {
        Self::with_behaviour(Behaviour::Script {
            replies: Mutex::new(replies.into_iter().collect()),
            fallback,
        })
    }

    /// Answers based on the queried coordinate.
    pub fn from_fn(responder: impl Fn(f64, f64) -> Reply + Send + Sync + 'static) -> Self {
        Self::with_behaviour(Behaviour::Function(Box::new(responder)))
    }

    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self { behaviour, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CityLookupService for MockLookup {
    fn name(&self) -> &str {
        "mock"
    }

    async fn lookup(&self, latitude: f64, longitude: f64) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = match &self.behaviour {
            Behaviour::Script { replies, fallback } => {
                replies.lock().await.pop_front().unwrap_or_else(|| fallback.clone())
            },
            Behaviour::Function(responder) => responder(latitude, longitude),
        };
        reply.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_then_fallback() {
        let service = MockLookup::scripted([Reply::Transient, Reply::Permanent], Reply::city("Athens"));
        assert!(matches!(&*service.lookup(37.97, 23.73).await.unwrap_err(), ErrorKind::Transient(_)));
        assert!(matches!(&*service.lookup(37.97, 23.73).await.unwrap_err(), ErrorKind::Permanent(_)));
        assert_eq!(service.lookup(37.97, 23.73).await.unwrap(), "Athens");
        assert_eq!(service.lookup(37.97, 23.73).await.unwrap(), "Athens");
        assert_eq!(service.calls(), 4);
    }

    #[tokio::test]
    async fn test_from_fn_sees_coordinates() {
        let service = MockLookup::from_fn(|latitude, _| {
            if latitude > 0.0 { Reply::city("North") } else { Reply::city("South") }
        });
        assert_eq!(service.lookup(10.0, 0.0).await.unwrap(), "North");
        assert_eq!(service.lookup(-10.0, 0.0).await.unwrap(), "South");
    }
}
