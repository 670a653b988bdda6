use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::repositories::games::GameRepository;
use crate::domain::value_objects::games::GameDto;

#[derive(Debug, Error)]
pub enum GamesError {
    #[error("game not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GamesError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            GamesError::NotFound => StatusCode::NOT_FOUND,
            GamesError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, GamesError>;

pub struct GamesUseCase<G>
where
    G: GameRepository + Send + Sync + 'static,
{
    game_repo: Arc<G>,
}

impl<G> GamesUseCase<G>
where
    G: GameRepository + Send + Sync + 'static,
{
    pub fn new(game_repo: Arc<G>) -> Self {
        Self { game_repo }
    }

    pub async fn list_games(&self) -> UseCaseResult<Vec<GameDto>> {
        let games = self.game_repo.list_games().await.map_err(|err| {
            error!(db_error = ?err, "games: failed to list games");
            GamesError::Internal(err)
        })?;

        Ok(games.into_iter().map(GameDto::from).collect())
    }

    pub async fn get_game(&self, game_id: Uuid) -> UseCaseResult<GameDto> {
        let game = self
            .game_repo
            .find_game_by_id(game_id)
            .await
            .map_err(|err| {
                error!(%game_id, db_error = ?err, "games: failed to load game");
                GamesError::Internal(err)
            })?
            .ok_or(GamesError::NotFound)?;

        Ok(GameDto::from(game))
    }

    pub async fn delete_game(&self, game_id: Uuid) -> UseCaseResult<()> {
        let removed = self.game_repo.delete_game(game_id).await.map_err(|err| {
            error!(%game_id, db_error = ?err, "games: failed to delete game");
            GamesError::Internal(err)
        })?;

        if removed == 0 {
            return Err(GamesError::NotFound);
        }

        info!(%game_id, "games: game deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use serde_json::json;

    use crate::domain::entities::games::GameEntity;
    use crate::domain::repositories::games::MockGameRepository;

    fn sample_game(name: &str) -> GameEntity {
        let now = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        GameEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            state: json!({ "score": 42 }),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn lists_games_as_dtos() {
        let mut game_repo = MockGameRepository::new();
        let games = vec![sample_game("chess"), sample_game("go")];
        game_repo.expect_list_games().times(1).returning(move || {
            let games = games.clone();
            Box::pin(async move { Ok(games) })
        });

        let usecase = GamesUseCase::new(Arc::new(game_repo));

        let dtos = usecase.list_games().await.unwrap();

        assert_eq!(dtos.len(), 2);
        assert_eq!(dtos[0].name, "chess");
    }

    #[tokio::test]
    async fn a_missing_game_is_not_found() {
        let game_id = Uuid::new_v4();

        let mut game_repo = MockGameRepository::new();
        game_repo
            .expect_find_game_by_id()
            .with(eq(game_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = GamesUseCase::new(Arc::new(game_repo));

        let result = usecase.get_game(game_id).await;

        assert!(matches!(result, Err(GamesError::NotFound)));
    }

    #[tokio::test]
    async fn deleting_a_missing_game_is_not_found() {
        let game_id = Uuid::new_v4();

        let mut game_repo = MockGameRepository::new();
        game_repo
            .expect_delete_game()
            .with(eq(game_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(0) }));

        let usecase = GamesUseCase::new(Arc::new(game_repo));

        let result = usecase.delete_game(game_id).await;

        assert!(matches!(result, Err(GamesError::NotFound)));
    }

    #[tokio::test]
    async fn deletes_an_existing_game() {
        let game_id = Uuid::new_v4();

        let mut game_repo = MockGameRepository::new();
        game_repo
            .expect_delete_game()
            .with(eq(game_id))
            .times(1)
            .returning(|_| Box::pin(async { Ok(1) }));

        let usecase = GamesUseCase::new(Arc::new(game_repo));

        usecase.delete_game(game_id).await.unwrap();
    }
}
