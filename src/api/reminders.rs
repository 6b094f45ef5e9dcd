use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};

use crate::api::AppState;
use crate::auth::UserSession;

/// Server-sent reminder events for the signed-in user.
///
/// The poller behind the stream stops when the client disconnects, when the
/// user signs out, or at shutdown.
pub async fn reminder_stream(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (rx, token) = state.reminders.open_stream(session.user_id);
    tracing::info!(user_id = %session.user_id, "Reminder stream opened");

    // Dropped with the response body when the client goes away.
    let guard = token.drop_guard();

    let stream = ReceiverStream::new(rx).map(move |reminder| {
        let _ = &guard;
        let event = Event::default()
            .event("reminder")
            .json_data(&reminder)
            .unwrap_or_else(|_| Event::default().event("reminder").data(reminder.message.clone()));
        Ok(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
