use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use percent_encoding::percent_decode_str;
use site_kit_content::normalize_route;
use site_kit_generator::{GenerateOptions, generate_site, template::html_escape};
use std::{net::SocketAddr, path::PathBuf};
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use super::load_site;

#[derive(Clone)]
struct AppState {
    site_path: PathBuf,
    reload_tx: broadcast::Sender<()>,
}

/// Start preview server with hot reload for local development.
///
/// Content is reloaded and the site regenerated on every request, so edits
/// show up without restarting. A file watcher pushes a reload event to open
/// pages over SSE.
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("🌐 Starting preview server...");
    println!("   Site: {}", path.display());

    let (config, store) = load_site(&path)?;

    println!("   ✓ Loaded: {}", config.name);
    println!("   ✓ Pages: {}", store.pages().count());
    if !store.failures().is_empty() {
        println!(
            "   ⚠ {} content file(s) failed to load, run 'site-kit validate' for details",
            store.failures().len()
        );
    }

    // Create broadcast channel for reload events
    let (reload_tx, _) = broadcast::channel::<()>(100);

    let state = AppState {
        site_path: path.clone(),
        reload_tx: reload_tx.clone(),
    };

    let app = router(state, &path);

    // Start file watcher
    let watcher_path = path.clone();
    let watcher_tx = reload_tx.clone();
    let output_dir = config.build.output.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_path, output_dir, watcher_tx).await {
            error!(error = %e, "file watcher stopped");
        }
    });

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(state: AppState, path: &std::path::Path) -> Router {
    Router::new()
        .route("/_reload", get(sse_handler))
        .nest_service("/public", ServeDir::new(path.join("public")))
        .fallback(page_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch for file changes and trigger reload
async fn watch_files(
    path: PathBuf,
    output_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
) -> Result<()> {
    // notify reports absolute paths
    let path = path.canonicalize().unwrap_or(path);
    let output_dir = path.join(output_dir);
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    // Watch site directory recursively
    watcher.watch(&path, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                // Ignore build output, temporary files and hidden files
                if event.paths.iter().any(|p| {
                    let filename = p.file_name().unwrap_or_default().to_string_lossy();
                    !p.starts_with(&output_dir)
                        && !filename.starts_with('.')
                        && !filename.ends_with('~')
                }) {
                    info!("file changed, reloading");
                    println!("   📝 File changed, reloading...");
                    let _ = reload_tx.send(());
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// SSE endpoint for hot reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            if rx.recv().await.is_ok() {
                yield Ok(Event::default().data("reload"));
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn error_page(status: StatusCode, title: &str, detail: &str) -> Response {
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body style="font-family: monospace; padding: 2rem;">
    <h1>{title}</h1>
    <pre>{detail}</pre>
    <script>
        const eventSource = new EventSource('/_reload');
        eventSource.onmessage = () => location.reload();
    </script>
</body>
</html>"#,
        title = html_escape(title),
        detail = html_escape(detail),
    );
    (status, Html(html)).into_response()
}

/// Regenerate the site and serve the page or asset for `uri`
async fn page_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let (config, store) = match load_site(&state.site_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error loading site",
                &format!("{:#}", e),
            );
        }
    };

    let site = match generate_site(&config, &store, GenerateOptions { preview: true }).await {
        Ok(site) => site,
        Err(e) => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error generating site",
                &e.to_string(),
            );
        }
    };

    // routes are matched in their decoded form, e.g. `/caf%C3%A9` is `/café`
    let path = percent_decode_str(uri.path()).decode_utf8_lossy();
    let asset_name = path.trim_start_matches('/');
    if let Some((_, data)) = site.assets.iter().find(|(name, _)| name == asset_name) {
        let mime = if asset_name.ends_with(".css") {
            "text/css; charset=utf-8"
        } else {
            "application/octet-stream"
        };
        return ([(header::CONTENT_TYPE, mime)], data.clone()).into_response();
    }

    let route = normalize_route(&path);
    debug!(%route, "serving page");
    match site.page(&route) {
        Some(html) => Html(html.to_string()).into_response(),
        None => error_page(
            StatusCode::NOT_FOUND,
            "Page not found",
            &format!("No page at {}", route),
        ),
    }
}
