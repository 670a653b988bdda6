use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::repositories::games::GameRepository,
    infrastructure::{
        axum_http::error_responses::ErrorResponse,
        postgres::{postgres_connection::PgPoolSquad, repositories::games::GamePostgres},
    },
    usecases::games::{GamesError, GamesUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let game_repository = GamePostgres::new(Arc::clone(&db_pool));
    let games_usecase = GamesUseCase::new(Arc::new(game_repository));

    Router::new()
        .route("/", get(list_games))
        .route("/:game_id", get(get_game).delete(delete_game))
        .with_state(Arc::new(games_usecase))
}

pub async fn list_games<G>(State(usecase): State<Arc<GamesUseCase<G>>>) -> Response
where
    G: GameRepository + Send + Sync + 'static,
{
    match usecase.list_games().await {
        Ok(games) => (StatusCode::OK, Json(games)).into_response(),
        Err(err) => map_error(err),
    }
}

pub async fn get_game<G>(
    State(usecase): State<Arc<GamesUseCase<G>>>,
    Path(game_id): Path<Uuid>,
) -> Response
where
    G: GameRepository + Send + Sync + 'static,
{
    match usecase.get_game(game_id).await {
        Ok(game) => (StatusCode::OK, Json(game)).into_response(),
        Err(err) => map_error(err),
    }
}

pub async fn delete_game<G>(
    State(usecase): State<Arc<GamesUseCase<G>>>,
    Path(game_id): Path<Uuid>,
) -> Response
where
    G: GameRepository + Send + Sync + 'static,
{
    info!(%game_id, "games: delete request received");
    match usecase.delete_game(game_id).await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(err) => map_error(err),
    }
}

fn map_error(err: GamesError) -> Response {
    let status = err.status_code();
    let message = match &err {
        // Don't leak internal error detail to client
        GamesError::Internal(_) => "Internal server error".to_string(),
        other => other.to_string(),
    };

    (
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            message,
        }),
    )
        .into_response()
}
