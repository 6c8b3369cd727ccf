//! Catalog home page

use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppResult, services::catalog::IndexStats, AppState};

use super::view::View;

#[derive(Serialize)]
pub struct IndexContext {
    #[serde(flatten)]
    pub stats: IndexStats,
    /// Visits to this page earlier in the same session
    pub num_visits: i64,
}

/// Session id from the cookie, or a new one added to the jar
fn session_id(jar: CookieJar, cookie_name: &str) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(cookie_name) {
        let id = cookie.value().to_string();
        return (jar, id);
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((cookie_name.to_string(), id.clone()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), id)
}

/// Home page with catalog counts and the session visit counter
#[utoipa::path(
    get,
    path = "/catalog/",
    tag = "catalog",
    responses(
        (status = 200, description = "Template index.html with catalog counts and num_visits", body = IndexStats)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, View<IndexContext>)> {
    let (jar, session) = session_id(jar, &state.config.session.cookie_name);

    let stats = state.services.catalog.index_stats().await?;
    let num_visits = state.services.sessions.record_visit(&session).await?;

    Ok((jar, View::new("index.html", IndexContext { stats, num_visits })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_session_is_kept() {
        let jar = CookieJar::new().add(Cookie::new("sessionid", "abc"));
        let (jar, id) = session_id(jar, "sessionid");
        assert_eq!(id, "abc");
        assert_eq!(jar.iter().count(), 1);
    }

    #[test]
    fn test_new_session_sets_cookie() {
        let (jar, id) = session_id(CookieJar::new(), "sessionid");
        assert!(Uuid::parse_str(&id).is_ok());
        let cookie = jar.get("sessionid").unwrap();
        assert_eq!(cookie.value(), id);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
