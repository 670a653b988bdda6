use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::games;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = games)]
pub struct GameEntity {
    pub id: Uuid,
    pub name: String,
    pub state: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
