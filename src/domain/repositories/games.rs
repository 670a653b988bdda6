use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::games::GameEntity;

#[async_trait]
#[automock]
pub trait GameRepository {
    async fn list_games(&self) -> Result<Vec<GameEntity>>;

    async fn find_game_by_id(&self, game_id: Uuid) -> Result<Option<GameEntity>>;

    /// Returns the number of rows removed so callers can distinguish a missing id.
    async fn delete_game(&self, game_id: Uuid) -> Result<usize>;
}
