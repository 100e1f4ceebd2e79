use bevy::prelude::{Deref, DerefMut, Event};

use crate::resources::{GameState, Player, Position};

use super::TransportError;

/// Wrapper to help us filter network events
#[derive(Event, Deref, DerefMut)]
pub struct NetworkEvent<E>(pub E);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RequestKind {
    Move(Position),
    NewGame { server_player: Player },
}

impl RequestKind {
    /// The form-encoded body of the request.
    pub fn form(&self) -> [(&'static str, String); 1] {
        match self {
            RequestKind::Move(position) => [("position", position.to_string())],
            RequestKind::NewGame { server_player } => {
                [("server_player", (*server_player as u8).to_string())]
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OutboundRequest {
    /// Endpoint as the server handed it out, possibly relative.
    pub endpoint: String,
    pub kind: RequestKind,
}

impl OutboundRequest {
    pub fn mark(endpoint: impl Into<String>, position: Position) -> Self {
        Self {
            endpoint: endpoint.into(),
            kind: RequestKind::Move(position),
        }
    }

    pub fn new_game(endpoint: impl Into<String>, server_player: Player) -> Self {
        Self {
            endpoint: endpoint.into(),
            kind: RequestKind::NewGame { server_player },
        }
    }
}

/// What came back for an [`OutboundRequest`].
#[derive(Debug)]
pub struct ServerReply {
    pub request: OutboundRequest,
    pub result: Result<GameState, TransportError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_fields() {
        let position = Position::new(7).unwrap();
        assert_eq!(
            RequestKind::Move(position).form(),
            [("position", "7".to_string())]
        );
        assert_eq!(
            RequestKind::NewGame {
                server_player: Player::O
            }
            .form(),
            [("server_player", "2".to_string())]
        );
    }
}
