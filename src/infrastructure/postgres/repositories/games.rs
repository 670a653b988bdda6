use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use uuid::Uuid;

use crate::domain::entities::games::GameEntity;
use crate::domain::repositories::games::GameRepository;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::games};

pub struct GamePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GamePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GameRepository for GamePostgres {
    async fn list_games(&self) -> Result<Vec<GameEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = games::table
            .order(games::updated_at.desc())
            .select(GameEntity::as_select())
            .load::<GameEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_game_by_id(&self, game_id: Uuid) -> Result<Option<GameEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = games::table
            .filter(games::id.eq(game_id))
            .select(GameEntity::as_select())
            .first::<GameEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete_game(&self, game_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let removed = diesel::delete(games::table.filter(games::id.eq(game_id)))
            .execute(&mut conn)?;

        Ok(removed)
    }
}
