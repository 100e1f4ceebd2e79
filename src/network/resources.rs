use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::prelude::{Deref, DerefMut, Resource, Timer, TimerMode};
use crossbeam_channel::{Receiver, Sender};

use crate::resources::Position;

use super::{OutboundRequest, ServerReply, Transport};

/// Sends requests through the injected [`Transport`]; replies come back on
/// the [`EventQueue`] as [`super::NetworkEvent`]s.
#[derive(Resource)]
pub struct MoveClient {
    transport: Arc<dyn Transport>,
    replies: Sender<ServerReply>,
}

impl MoveClient {
    pub fn new(transport: Arc<dyn Transport>, replies: Sender<ServerReply>) -> Self {
        Self { transport, replies }
    }

    pub fn submit(&self, request: OutboundRequest) {
        self.transport.submit(request, self.replies.clone());
    }
}

/// Wrapper for sending and receiving network events
#[derive(Resource, Deref, DerefMut)]
pub struct EventQueue<T: Send + Sync>(pub Mutex<Receiver<T>>);

/// A move the player made that the server hasn't answered yet.
#[derive(Resource, Debug)]
pub struct PendingMove {
    pub position: Position,
    delay: Timer,
    sent: bool,
}

impl PendingMove {
    pub fn new(position: Position, delay: Duration) -> Self {
        Self {
            position,
            delay: Timer::new(delay, TimerMode::Once),
            sent: false,
        }
    }

    /// Advances the send delay; true exactly once, when the move should go out.
    pub fn ready_to_send(&mut self, delta: Duration) -> bool {
        if self.sent {
            return false;
        }
        self.delay.tick(delta);
        self.sent = self.delay.finished();
        self.sent
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }
}

/// Present while a new-game request is in flight.
#[derive(Resource, Debug)]
pub struct PendingNewGame;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_move_fires_once_after_delay() {
        let mut pending = PendingMove::new(Position::new(4).unwrap(), Duration::from_millis(500));
        assert!(!pending.ready_to_send(Duration::from_millis(300)));
        assert!(pending.ready_to_send(Duration::from_millis(300)));
        assert!(pending.is_sent());
        assert!(!pending.ready_to_send(Duration::from_millis(300)));
    }

    #[test]
    fn zero_delay_fires_on_first_tick() {
        let mut pending = PendingMove::new(Position::new(0).unwrap(), Duration::ZERO);
        assert!(pending.ready_to_send(Duration::ZERO));
    }
}
