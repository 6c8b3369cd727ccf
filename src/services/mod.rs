//! Business logic services

pub mod catalog;
pub mod loans;
pub mod redis;
pub mod session;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

use session::SessionStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub sessions: session::SessionService,
    pub users: users::UsersService,
    /// Kept for readiness checks
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(repository: Repository, config: &AppConfig, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(
                Arc::new(repository.book_instances.clone()),
                config.catalog.renewal_weeks,
            ),
            sessions: session::SessionService::new(sessions),
            users: users::UsersService::new(repository.clone(), config.auth.clone()),
            repository,
        }
    }
}
