#[cfg(target_arch = "wasm32")]
use bevy::tasks::IoTaskPool;
#[cfg(not(target_arch = "wasm32"))]
use bevy::log::error;
use crossbeam_channel::Sender;
use reqwest::Url;
use thiserror::Error;

use crate::resources::{BoardSettings, EndpointError, GameState, GameStateError};

use super::{OutboundRequest, RequestKind, ServerReply};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    BadUrl(#[from] EndpointError),
    #[error("could not start request: {0}")]
    Spawn(std::io::Error),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("unusable game state: {0}")]
    InvalidState(#[from] GameStateError),
}

/// Carries requests to the game server. Every submitted request gets exactly
/// one [`ServerReply`] on `replies`, sent from whatever thread finishes it.
pub trait Transport: Send + Sync + 'static {
    fn submit(&self, request: OutboundRequest, replies: Sender<ServerReply>);
}

pub struct HttpTransport {
    settings: BoardSettings,
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::blocking::Client,
    #[cfg(target_arch = "wasm32")]
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(settings: &BoardSettings) -> Result<Self, TransportError> {
        #[cfg(not(target_arch = "wasm32"))]
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        #[cfg(target_arch = "wasm32")]
        let client = reqwest::Client::new();

        Ok(Self {
            settings: settings.clone(),
            client,
        })
    }
}

impl Transport for HttpTransport {
    fn submit(&self, request: OutboundRequest, replies: Sender<ServerReply>) {
        let url = match self.settings.resolve(&request.endpoint) {
            Ok(url) => url,
            Err(err) => {
                let _ = replies.send(ServerReply {
                    request,
                    result: Err(err.into()),
                });
                return;
            }
        };
        let client = self.client.clone();

        // Native requests block, so they get a thread of their own.
        #[cfg(not(target_arch = "wasm32"))]
        {
            let (fallback, failed_request) = (replies.clone(), request.clone());
            let spawned = std::thread::Builder::new()
                .name("board-view-request".into())
                .spawn(move || {
                    let result = post_form(&client, url, &request.kind);
                    let _ = replies.send(ServerReply { request, result });
                });
            if let Err(err) = spawned {
                reply_spawn_failure(failed_request, err, &fallback);
            }
        }

        // The web version hands the fetch to the browser's event loop.
        #[cfg(target_arch = "wasm32")]
        IoTaskPool::get()
            .spawn(async move {
                let result = post_form(&client, url, &request.kind).await;
                let _ = replies.send(ServerReply { request, result });
            })
            .detach();
    }
}

/// The request thread never started, so answer on its behalf.
#[cfg(not(target_arch = "wasm32"))]
fn reply_spawn_failure(request: OutboundRequest, err: std::io::Error, replies: &Sender<ServerReply>) {
    error!("Failed to spawn request thread: {err}");
    let _ = replies.send(ServerReply {
        request,
        result: Err(TransportError::Spawn(err)),
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn post_form(
    client: &reqwest::blocking::Client,
    url: Url,
    kind: &RequestKind,
) -> Result<GameState, TransportError> {
    let response = client.post(url).form(&kind.form()).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }
    let body = response.text()?;
    Ok(GameState::from_json(&body)?)
}

#[cfg(target_arch = "wasm32")]
async fn post_form(
    client: &reqwest::Client,
    url: Url,
    kind: &RequestKind,
) -> Result<GameState, TransportError> {
    let response = client.post(url).form(&kind.form()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }
    let body = response.text().await?;
    Ok(GameState::from_json(&body)?)
}
