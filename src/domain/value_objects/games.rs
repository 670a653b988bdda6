use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::games::GameEntity;

#[derive(Debug, Clone, Serialize)]
pub struct GameDto {
    pub id: Uuid,
    pub name: String,
    pub state: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GameEntity> for GameDto {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            state: value.state,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
