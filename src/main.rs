use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use ldap_reauth::{
    Authenticator, DefaultHooks, Flow, LoginConfig, LogoutConfig, RenderContext, UserInfo,
    config::Config,
    cookie::HttpCookieJar,
    directory::FileDirectory,
    session::{MemorySessionRegistry, RedisSessionStore, SessionStore},
    ui::{MemoryUi, Payload, RenderedForm},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_COOKIE: &str = "sid";
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// 会话后端：配置了 `REDIS_URL` 时使用 Redis，否则使用进程内存
enum Sessions {
    Memory(MemorySessionRegistry),
    Redis { client: Arc<redis::Client>, ttl: u64 },
}

#[derive(Clone)]
struct AppState {
    auth: Arc<Authenticator<FileDirectory>>,
    sessions: Arc<Sessions>,
}

impl AppState {
    /// 按 sid cookie 取会话，没有则新建
    fn session(&self, jar: &CookieJar) -> (String, Arc<dyn SessionStore>) {
        let sid = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
        match self.sessions.as_ref() {
            Sessions::Memory(registry) => {
                let (sid, store) = registry.session(sid.as_deref());
                let store: Arc<dyn SessionStore> = store;
                (sid, store)
            }
            Sessions::Redis { client, ttl } => {
                let sid = sid.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                let store: Arc<dyn SessionStore> =
                    Arc::new(RedisSessionStore::new(Arc::clone(client), sid.clone(), *ttl));
                (sid, store)
            }
        }
    }
}

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");
    let directory_file =
        std::env::var("DIRECTORY_FILE").unwrap_or_else(|_| "directory.json".into());
    let directory = FileDirectory::from_path(config.ldap.domain.clone(), &directory_file)
        .expect("Failed to load directory file");
    if let Some(encryptor) = &config.encryptor {
        tracing::warn!(
            folder = %encryptor.folder_path,
            key = %encryptor.key_name,
            "Form payload encryption is not supported by the demo host, reading plain JSON"
        );
    }

    let ttl = std::env::var("SESSION_TTL_SECS")
        .ok()
        .and_then(|ttl| ttl.parse().ok())
        .unwrap_or(DEFAULT_SESSION_TTL_SECS);
    let sessions = match std::env::var("REDIS_URL") {
        Ok(url) => {
            let client = redis::Client::open(url).expect("Failed to create Redis client");
            tracing::info!(ttl, "Using Redis session store");
            Sessions::Redis {
                client: Arc::new(client),
                ttl,
            }
        }
        Err(_) => {
            tracing::info!(ttl, "Using in-memory session store");
            Sessions::Memory(MemorySessionRegistry::new(Duration::from_secs(ttl)))
        }
    };

    let state = AppState {
        auth: Arc::new(Authenticator::new(config, directory)),
        sessions: Arc::new(sessions),
    };

    let app = Router::new()
        .route("/", get(page).post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::new(
        host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid SERVER_HOST, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}

#[axum::debug_handler]
async fn page(State(state): State<AppState>, jar: CookieJar) -> Response {
    render(state, jar, None).await
}

#[axum::debug_handler]
async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    render(state, jar, Some(form_payload(&form))).await
}

fn form_payload(form: &HashMap<String, String>) -> Payload {
    Payload::Json(json!({
        "event": form.get("event").map(String::as_str).unwrap_or_default(),
        "username": form.get("username"),
        "password": form.get("password"),
        "remember": form.contains_key("remember"),
    }))
}

/// 一次完整的渲染周期，`Flow::Rerun` 映射为 303 重定向回首页
async fn render(state: AppState, jar: CookieJar, submission: Option<Payload>) -> Response {
    let (sid, session) = state.session(&jar);
    let cookies = HttpCookieJar::new(jar);
    let ui = MemoryUi::new();
    if let Some(payload) = submission {
        ui.submit(payload);
    }
    let cx = RenderContext::new(session.as_ref(), &cookies, &ui);

    let body = match state
        .auth
        .login(&cx, &DefaultHooks, &LoginConfig::default())
        .await
    {
        Flow::Rerun => None,
        Flow::Continue(Some(user)) => {
            match state.auth.logout(&cx, &LogoutConfig::default()).await {
                Flow::Rerun => None,
                Flow::Continue(()) => Some(welcome_page(&user)),
            }
        }
        Flow::Continue(None) => Some(login_page(&ui)),
    };

    let sid_cookie = Cookie::build((SESSION_COOKIE, sid))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    let jar = cookies.into_jar().add(sid_cookie);

    match body {
        Some(html) => (jar, Html(html)).into_response(),
        None => (jar, Redirect::to("/")).into_response(),
    }
}

fn login_page(ui: &MemoryUi) -> String {
    let remember = ui.rendered().iter().find_map(|form| match form {
        RenderedForm::Signin { defaults, .. } => *defaults,
        _ => None,
    });
    let remember_field = match remember {
        Some(defaults) => format!(
            r#"<label><input type="checkbox" name="remember"{}> Remember me</label>"#,
            if defaults.remember { " checked" } else { "" }
        ),
        None => String::new(),
    };
    let errors: String = ui
        .errors()
        .iter()
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .collect();

    format!(
        r#"<!doctype html><html><body>
<h1>Sign in</h1>{errors}
<form method="post" action="/">
<input type="hidden" name="event" value="signin">
<input name="username" placeholder="DOMAIN\user or user@domain">
<input name="password" type="password" placeholder="Password">
{remember_field}
<button type="submit">Sign in</button>
</form></body></html>"#
    )
}

fn welcome_page(user: &UserInfo) -> String {
    let name = user
        .get_str("displayName")
        .or_else(|| user.get_str("sAMAccountName"))
        .unwrap_or("user");
    let attributes: String = user
        .as_map()
        .iter()
        .map(|(key, value)| {
            format!(
                "<li><b>{}</b>: {}</li>",
                escape_html(key),
                escape_html(&value.to_string())
            )
        })
        .collect();

    format!(
        r#"<!doctype html><html><body>
<h1>Welcome, {}</h1><ul>{attributes}</ul>
<form method="post" action="/">
<input type="hidden" name="event" value="signout">
<button type="submit">Sign out</button>
</form></body></html>"#,
        escape_html(name)
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
