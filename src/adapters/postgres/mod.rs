//! `PostgreSQL` persistence adapter built on Diesel and an r2d2 pool.

pub mod models;
pub mod schema;

mod conversion;
mod repository;

pub use repository::{
    PgPool, PostgresCommentStore, PostgresGateway, PostgresHistoryStore, PostgresProjectStore,
    PostgresTaskStore, PostgresUnitOfWork,
};
