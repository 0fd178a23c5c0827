use std::future::Future;

use crate::core::error::GatewayError;
use crate::models::status::{BulkLoadResult, DataStatus};
use crate::models::user::User;

/// Remote operations the session depends on.
///
/// Implementations convert every transport failure into a `GatewayError`
/// at this boundary and never retry.
pub trait UserGateway: Send + Sync {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<User>, GatewayError>> + Send;

    fn fetch_by_id(&self, id: u64) -> impl Future<Output = Result<User, GatewayError>> + Send;

    fn fetch_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<User, GatewayError>> + Send;

    /// An empty term means no constraint.
    fn search(&self, term: &str) -> impl Future<Output = Result<Vec<User>, GatewayError>> + Send;

    /// Safe to call repeatedly.
    fn trigger_bulk_load(
        &self,
    ) -> impl Future<Output = Result<BulkLoadResult, GatewayError>> + Send;

    fn get_status(&self) -> impl Future<Output = Result<DataStatus, GatewayError>> + Send;
}
