use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use forge_orchestrator::UserInfo;

/// Identity propagated by the platform's auth proxy.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
    pub git_user_name: String,
    pub email: Option<String>,
}

impl AuthenticatedUser {
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            git_user_name: self.git_user_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Auth middleware - extracts the user from auth-proxy headers.
///
/// In production the auth proxy sits in front of forge-api and sets
/// x-forge-user after SSO verification. For local development without
/// a proxy, the plain x-user header is accepted as a fallback.
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    // The closure borrows `req`; keep it in a block so it is not live
    // across the `next.run(req).await`, which would make the future !Send.
    let (id, git_user_name, email) = {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string())
        };

        let id = header("x-forge-user")
            .or_else(|| header("x-forwarded-user"))
            .or_else(|| header("x-user"))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        // The git identity can differ from the platform short id; default
        // to the short id when the proxy does not forward it.
        let git_user_name = header("x-forge-git-user").unwrap_or_else(|| id.clone());
        let email = header("x-forge-email").or_else(|| header("x-forwarded-email"));
        (id, git_user_name, email)
    };

    req.extensions_mut().insert(AuthenticatedUser {
        id,
        git_user_name,
        email,
    });

    Ok(next.run(req).await)
}
