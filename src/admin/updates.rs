use std::sync::Arc;

use axum::{
    extract::{Query, State, WebSocketUpgrade, ws},
    response::{IntoResponse, Response},
};
use futures::{sink::SinkExt, stream::StreamExt};
use hypertext::prelude::*;
use tokio::{
    sync::broadcast::{Receiver, error::RecvError},
    task::spawn_blocking,
};

use crate::{
    admin::dashboard::{EnrollmentTable, TeamQuery, load},
    auth::AdminUser,
    backend::store::DocumentStore,
    enrollments::Team,
    msg::Msg,
    state::AppState,
    util_resp::err_not_found,
};

/// Provides a WebSocket channel which pushes a fresh copy of a team's table
/// whenever one of its enrollments is created or deleted. The htmx `ws`
/// extension swaps it in by id.
pub async fn enrollment_updates(
    _admin: AdminUser,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> Response {
    let Some(team) = query.team() else {
        return err_not_found().into_response();
    };

    let rx = state.tx.subscribe();
    let store = state.store.clone();

    ws.on_upgrade(move |socket| handle_socket(socket, rx, store, team))
}

async fn handle_socket(
    socket: ws::WebSocket,
    mut rx: Receiver<Msg>,
    store: Arc<dyn DocumentStore>,
    team: &'static Team,
) {
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) if msg.team != team.name => continue,
                Ok(msg) => tracing::debug!("refreshing {}: {:?}", team.name, msg.inner),
                // some changes were missed, so refresh regardless
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }

            let store = store.clone();
            let rendered = match spawn_blocking(move || {
                let rows = load(store.as_ref(), team);
                EnrollmentTable {
                    team,
                    rows: rows.as_deref(),
                }
                .render()
                .into_inner()
            })
            .await
            {
                Ok(rendered) => rendered,
                Err(e) => {
                    tracing::error!("could not render enrollment table: {e}");
                    break;
                }
            };

            if sender.send(ws::Message::Text(rendered)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {
            // keep alive
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };
}
