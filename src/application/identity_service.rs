use crate::domain::errors::DomainError;
use crate::domain::policy::Actor;
use crate::domain::ports::UserRepository;

#[derive(Clone)]
pub struct IdentityService<R> {
    repo: R,
}

impl<R: UserRepository> IdentityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn find_actor(&self, user_id: i64) -> Result<Option<Actor>, DomainError> {
        self.repo.find_actor(user_id)
    }
}
