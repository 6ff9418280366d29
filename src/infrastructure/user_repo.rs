use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::policy::{Actor, Role};
use crate::domain::ports::UserRepository;
use crate::schema::{brands_users, users};

use super::models::UserRow;

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn find_actor(&self, user_id: i64) -> Result<Option<Actor>, DomainError> {
        let mut conn = self.pool.get()?;

        let user = users::table
            .find(user_id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        let Some(user) = user else {
            return Ok(None);
        };

        let role: Role = user.role.parse()?;
        let brand_ids = brands_users::table
            .filter(brands_users::user_id.eq(user.id))
            .select(brands_users::brand_id)
            .order(brands_users::brand_id.asc())
            .load::<i64>(&mut conn)?;

        Ok(Some(Actor {
            user_id: user.id,
            email: user.email,
            role,
            brand_ids,
        }))
    }
}
