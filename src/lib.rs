pub mod auth;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod routes;
pub mod stats;
pub mod verification;

use db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
}
