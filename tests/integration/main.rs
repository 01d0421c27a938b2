//! Integration tests: HTTP over the in-memory ledger, and admission over
//! PostgreSQL when `DATABASE_URL` is set.

mod helpers;

mod enrollment_test;
mod postgres_test;
