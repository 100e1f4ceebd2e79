use bevy::prelude::*;

use crate::BoardState;
use crate::board::BoardPainter;
use crate::resources::{GameSession, Mark};
use crate::ui::{StatusMessage, StatusView, update_status};

use super::{
    MoveClient, NetworkEvent, OutboundRequest, PendingMove, PendingNewGame, RequestKind,
    ServerReply,
};

/// Sends the pending move once the placement animation had time to play.
pub fn dispatch_pending_move(
    time: Res<Time>,
    pending: Option<ResMut<PendingMove>>,
    session: Res<GameSession>,
    client: Res<MoveClient>,
) {
    let Some(mut pending) = pending else {
        return;
    };
    if pending.ready_to_send(time.delta()) {
        debug!("Sending move {} to {}", pending.position, session.move_url);
        client.submit(OutboundRequest::mark(
            session.move_url.clone(),
            pending.position,
        ));
    }
}

/// Folds the server's answer to our move into the board.
pub fn reconcile_move(
    mut cmds: Commands,
    mut ev_replies: EventReader<NetworkEvent<ServerReply>>,
    mut painter: BoardPainter,
    mut session: ResMut<GameSession>,
    mut status: StatusView,
    pending: Option<Res<PendingMove>>,
    mut game_state: ResMut<NextState<BoardState>>,
) {
    let Some(pending) = pending else {
        return;
    };

    for NetworkEvent(ServerReply { request, result }) in ev_replies.read() {
        let RequestKind::Move(position) = request.kind else {
            continue;
        };
        if position != pending.position {
            warn!("Dropping reply for {position}, waiting on {}", pending.position);
            continue;
        }
        cmds.remove_resource::<PendingMove>();

        match result {
            Ok(state) => {
                let previous = session.board;
                for changed in previous.changed_positions(&state.board) {
                    let mark = state.board[changed];
                    if mark == Mark::Empty {
                        warn!("Server cleared cell {changed}");
                    }
                    painter.draw_mark(changed, mark, false);
                }
                let fallback = session.move_url.clone();
                session.replace(state.clone().or_move_url(&fallback));
                debug!("Board state {}:\n{}", session.board.state(), session.board);

                game_state.set(update_status(&session, &mut status, &mut painter));
            }
            Err(err) => {
                // Take back the optimistic mark so the board matches the
                // server's last word.
                warn!("Move at {position} failed: {err}");
                painter.draw_mark(position, Mark::Empty, true);
                session.board[position] = Mark::Empty;
                status.show(StatusMessage::MoveFailed);
                game_state.set(BoardState::AwaitingInput);
            }
        }
        return;
    }
}

/// Swaps in the game the server set up after "play again".
pub fn reconcile_new_game(
    mut cmds: Commands,
    mut ev_replies: EventReader<NetworkEvent<ServerReply>>,
    session: Res<GameSession>,
    mut status: StatusView,
    mut game_state: ResMut<NextState<BoardState>>,
) {
    for NetworkEvent(ServerReply { request, result }) in ev_replies.read() {
        let RequestKind::NewGame { .. } = request.kind else {
            continue;
        };
        cmds.remove_resource::<PendingNewGame>();

        match result {
            Ok(state) => {
                info!("New game, server plays {:?}", state.server_player);
                let state = state.clone().or_move_url(&session.move_url);
                cmds.insert_resource(GameSession::new(state));
                game_state.set(BoardState::Setup);
            }
            Err(err) => {
                warn!("New game request failed: {err}");
                status.show(StatusMessage::NewGameFailed);
            }
        }
    }
}
