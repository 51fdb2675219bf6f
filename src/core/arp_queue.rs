//! Frames waiting on ARP resolution and the retransmission schedule for them.

use std::time::{
    Duration,
    Instant,
};

use crate::core::repr::Ipv4Address;
use crate::core::time::{
    Env,
    SystemEnv,
};

/// Where a queued frame came from, which decides how it is finished once the
/// next hop resolves or fails to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Received on the named interface and being forwarded.
    Forwarded(String),
    /// Originated by the router itself, e.g. an ICMP reply.
    Local,
}

/// A complete Ethernet frame held until its next hop resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedFrame {
    pub frame: Vec<u8>,
    pub origin: Origin,
}

impl QueuedFrame {
    pub fn forwarded<S: Into<String>>(frame: Vec<u8>, interface: S) -> QueuedFrame {
        QueuedFrame {
            frame,
            origin: Origin::Forwarded(interface.into()),
        }
    }

    pub fn local(frame: Vec<u8>) -> QueuedFrame {
        QueuedFrame {
            frame,
            origin: Origin::Local,
        }
    }
}

/// An outstanding ARP request and the frames waiting on its answer.
#[derive(Debug)]
pub struct PendingArpRequest {
    /// Address being resolved.
    pub target: Ipv4Address,
    /// Interface the requests are broadcast out of.
    pub interface: String,
    /// Frames waiting on the resolution, oldest first.
    pub frames: Vec<QueuedFrame>,
    /// Number of requests sent so far.
    pub attempts: u32,
    /// When the last request was sent.
    pub last_sent: Instant,
}

/// An ARP request that should be broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solicitation {
    pub target: Ipv4Address,
    pub interface: String,
}

/// Work produced by polling the pending requests.
#[derive(Debug, Default)]
pub struct Poll {
    /// Requests to broadcast again.
    pub retransmit: Vec<Solicitation>,
    /// Requests which ran out of attempts and were removed.
    pub failed: Vec<PendingArpRequest>,
}

/// Pending ARP requests, at most one per target address.
pub struct PendingArpRequests<T = SystemEnv>
where
    T: Env,
{
    requests: Vec<PendingArpRequest>,
    retransmit_interval: Duration,
    max_attempts: u32,
    time_env: T,
}

impl<T: Env> PendingArpRequests<T> {
    pub fn new(retransmit_interval: Duration, max_attempts: u32, time_env: T) -> Self {
        PendingArpRequests {
            requests: Vec::new(),
            retransmit_interval,
            max_attempts,
            time_env,
        }
    }

    /// Queues a frame behind the resolution of target.
    ///
    /// The first frame queued for a target creates its request and returns the
    /// solicitation to send right away, which counts as the first attempt.
    /// Later frames join the existing queue and return None.
    pub fn enqueue(
        &mut self,
        target: Ipv4Address,
        frame: QueuedFrame,
        interface: &str,
    ) -> Option<Solicitation> {
        if let Some(request) = self.requests.iter_mut().find(|r| r.target == target) {
            request.frames.push(frame);
            return None;
        }

        self.requests.push(PendingArpRequest {
            target,
            interface: interface.to_string(),
            frames: vec![frame],
            attempts: 1,
            last_sent: self.time_env.now_instant(),
        });

        Some(Solicitation {
            target,
            interface: interface.to_string(),
        })
    }

    /// Removes the request for target, returning it with its queued frames.
    pub fn resolve(&mut self, target: Ipv4Address) -> Option<PendingArpRequest> {
        let i = self.requests.iter().position(|r| r.target == target)?;
        Some(self.requests.remove(i))
    }

    /// Advances the retransmission schedule.
    ///
    /// Requests whose last transmission is at least one retransmit interval
    /// old are either solicited again or, once they have used every attempt,
    /// removed and reported as failed.
    pub fn poll(&mut self) -> Poll {
        let now = self.time_env.now_instant();
        let (interval, max_attempts) = (self.retransmit_interval, self.max_attempts);
        let mut poll = Poll::default();

        let due = |request: &PendingArpRequest| now.duration_since(request.last_sent) >= interval;

        let mut i = 0;
        while i < self.requests.len() {
            if !due(&self.requests[i]) {
                i += 1;
            } else if self.requests[i].attempts >= max_attempts {
                poll.failed.push(self.requests.remove(i));
            } else {
                let request = &mut self.requests[i];
                request.attempts += 1;
                request.last_sent = now;
                poll.retransmit.push(Solicitation {
                    target: request.target,
                    interface: request.interface.clone(),
                });
                i += 1;
            }
        }

        poll
    }

    /// Returns the request for target, if one is pending.
    pub fn get(&self, target: Ipv4Address) -> Option<&PendingArpRequest> {
        self.requests.iter().find(|r| r.target == target)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
