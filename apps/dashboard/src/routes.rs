//! Dashboard routes.

use crate::{
    cookie::CookieStore,
    menu::{self, Group},
    middleware::{Session, guard},
    state::AppState,
    utils::escape_html,
};
use axum::{
    Extension, Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use gate::{CredentialStore, REDIRECT_PARAM};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Build the dashboard router.
///
/// The login and home routes follow the gate policy. Everything except
/// `/healthz` and `/logout` passes the session gate, which answers `/`
/// itself with a redirect.
pub fn router(state: AppState) -> Router {
    let policy = state.policy();
    let login_route = route_path(&policy.login_path);
    let home = route_path(&policy.home_path);

    let gated = Router::new()
        .route("/", get(root))
        .route(&login_route, get(login_page).post(login))
        .route(&home, get(dashboard))
        .route(&format!("{home}/{{section}}"), get(section))
        .route(&format!("{home}/password"), post(change_password))
        .layer(middleware::from_fn_with_state(state.clone(), guard));

    Router::new()
        .merge(gated)
        .route("/logout", post(logout))
        .route("/healthz", get(healthz))
        .with_state(state)
}

fn route_path(path: &str) -> String {
    path.trim_end_matches('/').to_owned()
}

/// Post-login target: `requested` when it names a local path, else `home`.
///
/// A local path starts with a single `/` and has no backslash or control
/// character, so a browser cannot resolve it to another origin.
pub fn sanitize_redirect(requested: Option<&str>, home: &str) -> String {
    match requested {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_owned()
        }
        _ => home.to_owned(),
    }
}

#[derive(Deserialize)]
struct LoginQuery {
    #[serde(rename = "redirectPath")]
    redirect_path: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
    #[serde(default, rename = "redirectPath")]
    redirect_path: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordForm {
    old_password: String,
    new_password: String,
}

#[derive(Serialize)]
struct DashboardView {
    email: String,
    menu: Vec<Group>,
}

/// Fallback for `/` should the guard ever let it through.
async fn root(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.policy().login_path)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Html<String> {
    Html(login_form(&state, query.redirect_path.as_deref(), None))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let redirect_path = form.redirect_path.as_deref();
    let response = match state.api().login(&form.email, &form.password).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("login request failed: {e}");
            let page = login_form(&state, redirect_path, Some("Login service is unavailable"));
            return (StatusCode::BAD_GATEWAY, Html(page)).into_response();
        }
    };

    let Some(tokens) = response.tokens() else {
        tracing::info!("login rejected for {}: {}", form.email, response.message);
        let message = match response.message.as_str() {
            "" => "Login failed",
            message => message,
        };
        let page = login_form(&state, redirect_path, Some(message));
        return (StatusCode::UNAUTHORIZED, Html(page)).into_response();
    };

    let mut store = CookieStore::new(jar, &state.cookies);
    store.sign_in(tokens);
    let target = sanitize_redirect(redirect_path, &state.policy().home_path);
    tracing::info!("signed in {}", form.email);
    (store.into_jar(), Redirect::to(&target)).into_response()
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let mut store = CookieStore::new(jar, &state.cookies);
    store.sign_out();
    (store.into_jar(), Redirect::to(&state.policy().login_path)).into_response()
}

async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<DashboardView> {
    let home = &state.policy().home_path;
    Json(DashboardView {
        email: session.identity.email.to_string(),
        menu: menu::groups(home, home),
    })
}

async fn section(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(slug): Path<String>,
) -> Response {
    let Some(label) = menu::section(&slug) else {
        let body = json!({ "success": false, "message": format!("unknown section `{slug}`") });
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    };

    let home = &state.policy().home_path;
    let current = format!("{}/{slug}", home.trim_end_matches('/'));
    Json(json!({
        "email": session.identity.email,
        "section": { "slug": slug, "label": label },
        "menu": menu::groups(home, &current),
    }))
    .into_response()
}

async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<PasswordForm>,
) -> Response {
    let result = state
        .api()
        .change_password(&session.access_token, &form.old_password, &form.new_password)
        .await;

    match result {
        Ok(response) => {
            let status = if response.success {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            };
            (status, Json(response)).into_response()
        }
        Err(e) => {
            tracing::warn!("password change failed: {e}");
            let body = json!({ "success": false, "message": "Password service is unavailable" });
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
    }
}

fn login_form(state: &AppState, redirect_path: Option<&str>, error: Option<&str>) -> String {
    let action = escape_html(&state.policy().login_path);
    let redirect = escape_html(redirect_path.unwrap_or_default());
    let error = error
        .map(|message| format!("<p class=\"error\">{}</p>\n", escape_html(message)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Login</title></head>
<body>
<h1>Login</h1>
{error}<form method="post" action="{action}">
<input type="email" name="email" placeholder="Email" required>
<input type="password" name="password" placeholder="Password" required>
<input type="hidden" name="{REDIRECT_PARAM}" value="{redirect}">
<button type="submit">Login</button>
</form>
</body>
</html>
"#
    )
}
