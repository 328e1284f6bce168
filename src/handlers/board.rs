use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderValue, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use std::net::SocketAddr;
use std::sync::Arc;
use crate::error::BoardError;
use crate::models::PostRequest;
use crate::render::render_board;
use crate::state::AppState;
use super::run_post;

pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_board(&state.posting.list(), None))
}

// Form post - redirect back to the board, or re-render it with the reason
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Form(form): Form<PostRequest>,
) -> Response {
    match run_post(&state, form, peer).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => error_page(&state, &err),
    }
}

// The board with `err` as its flash line
pub(super) fn error_page(state: &AppState, err: &BoardError) -> Response {
    let page = render_board(&state.posting.list(), Some(&err.to_string()));
    let mut response = (err.status_code(), Html(page)).into_response();
    if let Some(retry_after) = err.retry_after() {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from_static(retry_after));
    }
    response
}
