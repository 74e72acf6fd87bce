use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::auth::SessionContext;
use crate::errors::AppError;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const LOGIN_HTML: &str = include_str!("../../templates/login.html");

/// Serves the main upload page; anonymous visitors are sent to the login form.
pub async fn index_handler(ctx: SessionContext) -> Result<Response, AppError> {
    if !ctx.logged_in {
        return Ok(Redirect::to("/login").into_response());
    }
    Ok(Html(INDEX_HTML).into_response())
}

pub async fn login_page_handler() -> Html<&'static str> {
    Html(LOGIN_HTML)
}
