//! Nullable directory — scripted main node lookups.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use peerlink_types::{Endpoint, PeerDirectory, ResolutionError};

/// One lookup result, kept cloneable so it can be replayed.
#[derive(Clone, Debug)]
enum Answer {
    Found(Endpoint),
    PodCount(usize),
    NoAddress,
}

impl Answer {
    fn resolve(&self) -> Result<Endpoint, ResolutionError> {
        match self {
            Self::Found(endpoint) => Ok(*endpoint),
            Self::PodCount(count) => Err(ResolutionError::NotExactlyOne(*count)),
            Self::NoAddress => Err(ResolutionError::MissingAddress("null-pod".into())),
        }
    }
}

/// A directory that answers from a script, then falls back to a default.
pub struct NullDirectory {
    scripted: Mutex<VecDeque<Answer>>,
    fallback: Mutex<Answer>,
    lookups: Mutex<usize>,
}

impl NullDirectory {
    fn with_fallback(fallback: Answer) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            lookups: Mutex::new(0),
        }
    }

    /// Always resolves to `ip`.
    pub fn resolving(ip: IpAddr) -> Self {
        Self::with_fallback(Answer::Found(Endpoint::new(ip)))
    }

    /// Always reports `count` matching pods (anything but one fails).
    pub fn with_pod_count(count: usize) -> Self {
        Self::with_fallback(Answer::PodCount(count))
    }

    /// Queue a successful lookup ahead of the fallback.
    pub fn then_resolve(&self, ip: IpAddr) -> &Self {
        self.push(Answer::Found(Endpoint::new(ip)))
    }

    /// Queue a lookup that sees `count` pods.
    pub fn then_pod_count(&self, count: usize) -> &Self {
        self.push(Answer::PodCount(count))
    }

    /// Queue a lookup that finds a pod without an IP.
    pub fn then_no_address(&self) -> &Self {
        self.push(Answer::NoAddress)
    }

    /// Replace the fallback, e.g. after the main node was rescheduled.
    pub fn move_to(&self, ip: IpAddr) {
        *self.fallback.lock().unwrap() = Answer::Found(Endpoint::new(ip));
    }

    /// Number of lookups performed so far.
    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }

    fn push(&self, answer: Answer) -> &Self {
        self.scripted.lock().unwrap().push_back(answer);
        self
    }
}

#[async_trait]
impl PeerDirectory for NullDirectory {
    async fn resolve_main_node(&self) -> Result<Endpoint, ResolutionError> {
        *self.lookups.lock().unwrap() += 1;
        let next = self.scripted.lock().unwrap().pop_front();
        match next {
            Some(answer) => answer.resolve(),
            None => self.fallback.lock().unwrap().resolve(),
        }
    }
}
