//! Routes for the event bounded context.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use kaartmiddag_event::application::query_handlers::{
    self, EventSummary, ResultsView, RoundBalanceView,
};
use kaartmiddag_event::application::command_handlers;
use kaartmiddag_event::domain::aggregates::Event;
use kaartmiddag_event::domain::commands;
use kaartmiddag_event::domain::model::Game;
use kaartmiddag_event::domain::tables::{TableNumbers, parse_table_number};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST / and POST /{event_id}/rename.
#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    /// The event title.
    pub title: String,
}

/// Request body for POST /{event_id}/participants.
#[derive(Debug, Deserialize)]
pub struct AddParticipantRequest {
    /// Display name.
    pub name: String,
    /// The game the participant plays.
    pub game: Game,
}

/// Request body for POST /{event_id}/participants/{participant_id}/game.
#[derive(Debug, Deserialize)]
pub struct ChangeGameRequest {
    /// The new game.
    pub game: Game,
}

/// A table number as sent by a client: typed text or a JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TableNumberInput {
    /// A JSON number.
    Number(i64),
    /// Raw operator text.
    Text(String),
}

impl TableNumberInput {
    fn parse(&self) -> Option<u32> {
        match self {
            Self::Number(n) => u32::try_from(*n).ok().filter(|n| *n > 0),
            Self::Text(raw) => parse_table_number(raw),
        }
    }
}

/// Request body for POST /{event_id}/rounds/{round_index}/tables.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTablesRequest {
    /// Table number per participant, as typed by the operator.
    /// Blank, zero or non-numeric entries leave the participant unassigned.
    pub table_numbers: HashMap<Uuid, TableNumberInput>,
    /// Accept tables that differ from the nominal size.
    #[serde(default)]
    pub confirm_irregular_sizes: bool,
}

/// Request body for POST /{event_id}/rounds/{round_index}/scores.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    /// The scored participant.
    pub participant_id: Uuid,
    /// Raw score input. `null` or absent clears the score.
    #[serde(default)]
    pub value: Option<String>,
}

/// GET /
#[instrument(skip(state))]
async fn list_events(State(state): State<AppState>) -> Json<Vec<EventSummary>> {
    let summaries = state.catalog.snapshot().iter().map(EventSummary::from).collect();
    Json(summaries)
}

/// POST /
#[instrument(skip(state, request))]
async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<TitleRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let command = commands::CreateEvent {
        correlation_id: Uuid::new_v4(),
        title: request.title,
    };

    info!(correlation_id = %command.correlation_id, "handling create_event command");

    let event = command_handlers::handle_create_event(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &*state.repository,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /{event_id}
#[instrument(skip(state))]
async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let event = query_handlers::get_event_by_id(event_id, &*state.repository).await?;
    Ok(Json(event))
}

/// DELETE /{event_id}
#[instrument(skip(state))]
async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = commands::DeleteEvent {
        correlation_id: Uuid::new_v4(),
        event_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_event command");

    command_handlers::handle_delete_event(&command, &*state.repository).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{event_id}/rename
#[instrument(skip(state, request))]
async fn rename_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<TitleRequest>,
) -> Result<Json<Event>, ApiError> {
    let command = commands::RenameEvent {
        correlation_id: Uuid::new_v4(),
        event_id,
        title: request.title,
    };

    info!(correlation_id = %command.correlation_id, "handling rename_event command");

    let event =
        command_handlers::handle_rename_event(&command, state.clock.as_ref(), &*state.repository)
            .await?;
    Ok(Json(event))
}

/// POST /{event_id}/participants
#[instrument(skip(state, request))]
async fn add_participant(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<AddParticipantRequest>,
) -> Result<Json<Event>, ApiError> {
    let command = commands::AddParticipant {
        correlation_id: Uuid::new_v4(),
        event_id,
        name: request.name,
        game: request.game,
    };

    info!(correlation_id = %command.correlation_id, "handling add_participant command");

    let event = command_handlers::handle_add_participant(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &*state.repository,
    )
    .await?;
    Ok(Json(event))
}

/// DELETE /{event_id}/participants/{participant_id}
#[instrument(skip(state))]
async fn remove_participant(
    State(state): State<AppState>,
    Path((event_id, participant_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Event>, ApiError> {
    let command = commands::RemoveParticipant {
        correlation_id: Uuid::new_v4(),
        event_id,
        participant_id,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_participant command");

    let event = command_handlers::handle_remove_participant(
        &command,
        state.clock.as_ref(),
        &*state.repository,
    )
    .await?;
    Ok(Json(event))
}

/// POST /{event_id}/participants/{participant_id}/game
#[instrument(skip(state, request))]
async fn change_participant_game(
    State(state): State<AppState>,
    Path((event_id, participant_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ChangeGameRequest>,
) -> Result<Json<Event>, ApiError> {
    let command = commands::ChangeParticipantGame {
        correlation_id: Uuid::new_v4(),
        event_id,
        participant_id,
        game: request.game,
    };

    info!(correlation_id = %command.correlation_id, "handling change_participant_game command");

    let event = command_handlers::handle_change_participant_game(
        &command,
        state.clock.as_ref(),
        &*state.repository,
    )
    .await?;
    Ok(Json(event))
}

/// POST /{event_id}/start-round
#[instrument(skip(state))]
async fn start_round(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let command = commands::StartRound {
        correlation_id: Uuid::new_v4(),
        event_id,
    };

    info!(correlation_id = %command.correlation_id, "handling start_round command");

    let event =
        command_handlers::handle_start_round(&command, state.clock.as_ref(), &*state.repository)
            .await?;
    Ok(Json(event))
}

/// POST /{event_id}/finish-round
#[instrument(skip(state))]
async fn finish_round(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let command = commands::FinishRound {
        correlation_id: Uuid::new_v4(),
        event_id,
    };

    info!(correlation_id = %command.correlation_id, "handling finish_round command");

    let event =
        command_handlers::handle_finish_round(&command, state.clock.as_ref(), &*state.repository)
            .await?;
    Ok(Json(event))
}

/// POST /{event_id}/finish-event
#[instrument(skip(state))]
async fn finish_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let command = commands::FinishEvent {
        correlation_id: Uuid::new_v4(),
        event_id,
    };

    info!(correlation_id = %command.correlation_id, "handling finish_event command");

    let event =
        command_handlers::handle_finish_event(&command, state.clock.as_ref(), &*state.repository)
            .await?;
    Ok(Json(event))
}

/// POST /{event_id}/rounds/{round_index}/tables
#[instrument(skip(state, request))]
async fn assign_tables(
    State(state): State<AppState>,
    Path((event_id, round_index)): Path<(Uuid, usize)>,
    Json(request): Json<AssignTablesRequest>,
) -> Result<Json<Event>, ApiError> {
    let table_numbers: TableNumbers = request
        .table_numbers
        .iter()
        .filter_map(|(id, input)| input.parse().map(|n| (*id, n)))
        .collect();
    let command = commands::AssignTables {
        correlation_id: Uuid::new_v4(),
        event_id,
        round_index,
        table_numbers,
        confirm_irregular_sizes: request.confirm_irregular_sizes,
    };

    info!(correlation_id = %command.correlation_id, "handling assign_tables command");

    let event = command_handlers::handle_assign_tables(
        &command,
        &state.settings,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &*state.repository,
    )
    .await?;
    Ok(Json(event))
}

/// POST /{event_id}/rounds/{round_index}/reset
#[instrument(skip(state))]
async fn reset_tables(
    State(state): State<AppState>,
    Path((event_id, round_index)): Path<(Uuid, usize)>,
) -> Result<Json<Event>, ApiError> {
    let command = commands::ResetTables {
        correlation_id: Uuid::new_v4(),
        event_id,
        round_index,
    };

    info!(correlation_id = %command.correlation_id, "handling reset_tables command");

    let event =
        command_handlers::handle_reset_tables(&command, state.clock.as_ref(), &*state.repository)
            .await?;
    Ok(Json(event))
}

/// POST /{event_id}/rounds/{round_index}/scores
#[instrument(skip(state, request))]
async fn record_score(
    State(state): State<AppState>,
    Path((event_id, round_index)): Path<(Uuid, usize)>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<Event>, ApiError> {
    let correlation_id = Uuid::new_v4();
    let event = if let Some(raw_value) = request.value {
        let command = commands::UpdateScore {
            correlation_id,
            event_id,
            round_index,
            participant_id: request.participant_id,
            raw_value,
        };
        info!(%correlation_id, "handling update_score command");
        command_handlers::handle_update_score(&command, state.clock.as_ref(), &*state.repository)
            .await?
    } else {
        let command = commands::ClearScore {
            correlation_id,
            event_id,
            round_index,
            participant_id: request.participant_id,
        };
        info!(%correlation_id, "handling clear_score command");
        command_handlers::handle_clear_score(&command, state.clock.as_ref(), &*state.repository)
            .await?
    };
    Ok(Json(event))
}

/// GET /{event_id}/rounds/{round_index}/balance
#[instrument(skip(state))]
async fn round_balance(
    State(state): State<AppState>,
    Path((event_id, round_index)): Path<(Uuid, usize)>,
) -> Result<Json<RoundBalanceView>, ApiError> {
    let view =
        query_handlers::get_round_balance(event_id, round_index, &*state.repository).await?;
    Ok(Json(view))
}

/// GET /{event_id}/results
#[instrument(skip(state))]
async fn results(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<ResultsView>, ApiError> {
    let view = query_handlers::get_results(event_id, &state.settings, &*state.repository).await?;
    Ok(Json(view))
}

/// Returns the router for the event context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{event_id}", get(get_event).delete(delete_event))
        .route("/{event_id}/rename", post(rename_event))
        .route("/{event_id}/participants", post(add_participant))
        .route(
            "/{event_id}/participants/{participant_id}",
            delete(remove_participant),
        )
        .route(
            "/{event_id}/participants/{participant_id}/game",
            post(change_participant_game),
        )
        .route("/{event_id}/start-round", post(start_round))
        .route("/{event_id}/finish-round", post(finish_round))
        .route("/{event_id}/finish-event", post(finish_event))
        .route("/{event_id}/rounds/{round_index}/tables", post(assign_tables))
        .route("/{event_id}/rounds/{round_index}/reset", post(reset_tables))
        .route("/{event_id}/rounds/{round_index}/scores", post(record_score))
        .route("/{event_id}/rounds/{round_index}/balance", get(round_balance))
        .route("/{event_id}/results", get(results))
}
