//! RecommendationClient trait definition.

use bookchat_types::error::RecommendError;
use bookchat_types::identity::UserId;

/// Sends one query to the recommendation backend and returns its reply.
///
/// Single request/response: no streaming, no retry. Implementations live in
/// bookchat-infra (e.g., `HttpRecommendationClient`).
pub trait RecommendationClient: Send + Sync {
    fn ask(
        &self,
        query: &str,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<String, RecommendError>> + Send;
}
