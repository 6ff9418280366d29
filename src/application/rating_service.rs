use crate::domain::errors::DomainError;
use crate::domain::policy::Actor;
use crate::domain::ports::RatingRepository;
use crate::domain::rating::{CategoryAverage, Rating, RatingDetails, RatingPage, RatingParams};
use crate::domain::rating_query::{RatingQuery, RatingQueryParams};

#[derive(Clone)]
pub struct RatingService<R> {
    repo: R,
}

impl<R: RatingRepository> RatingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create(&self, actor: &Actor, params: &RatingParams) -> Result<Rating, DomainError> {
        let new_rating = params.validate().map_err(|e| {
            log::info!("Rating by user {} rejected: {}", actor.user_id, e);
            e
        })?;
        self.repo.create(actor.user_id, new_rating)
    }

    pub fn get(&self, id: i64) -> Result<RatingDetails, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Rating"))
    }

    pub fn list(&self, params: &RatingQueryParams) -> Result<RatingPage, DomainError> {
        let query = RatingQuery::from_params(params);
        log::debug!("Rating query {:?}", query);
        self.repo.list(&query)
    }

    pub fn category_averages(&self) -> Result<Vec<CategoryAverage>, DomainError> {
        self.repo.category_averages()
    }
}
