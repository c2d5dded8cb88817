//! Browser-hosted editor: edit, run remotely, download and upload code.
//!
//! Run with: cargo run -p runpad-web-server [-- path/to/runpad.toml]
//!
//! Then open http://localhost:3000 in your browser.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{Router, response::Html, routing::get};
use runpad_core::RunpadConfig;
use runpad_executor::HttpExecutor;
use runpad_session::storage::FileStorage;
use runpad_transport::websocket::{WsState, ws_handler};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RunpadConfig::load(&PathBuf::from(path))?,
        None => RunpadConfig::default(),
    }
    .with_env_overrides();

    let storage_dir = config.resolved_storage_dir();
    let slot = FileStorage::new(&storage_dir, config.slot.clone());
    tracing::info!("Persisting document at {}", slot.path().display());

    let executor = HttpExecutor::from_config(&config).context("Failed to build HTTP client")?;
    tracing::info!("Submitting runs to {}", executor.endpoint());

    let state = WsState::new(Arc::new(slot), Arc::new(executor), config.run_ordering);

    // Build router
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.bind))?;
    tracing::info!("Server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Runpad - Online Python IDE</title>
    <style>
        body {
            max-width: 900px;
            margin: auto;
            padding: 20px;
            font-family: system-ui, sans-serif;
        }
        body.dark { background: #1e1e1e; color: #d4d4d4; }
        .header { display: flex; justify-content: space-between; align-items: center; }
        #editor {
            width: 100%;
            height: 300px;
            font-family: Menlo, Monaco, "Courier New", monospace;
            font-size: 14px;
            tab-size: 4;
        }
        body.dark #editor { background: #282c34; color: #abb2bf; }
        #input { width: 100%; resize: vertical; }
        .buttons { margin-top: 10px; display: flex; gap: 10px; flex-wrap: wrap; }
        button { padding: 8px 16px; color: white; border: none; border-radius: 4px; cursor: pointer; }
        #run { background: #4CAF50; }
        #download { background: #2196F3; }
        #upload { background: #FF9800; }
        #reset { background: #f44336; }
        #theme { background: #333; padding: 6px 12px; }
        pre { background: #f0f0f0; color: #000; padding: 10px; white-space: pre-wrap; }
        #error-box { display: none; }
        #error-box h3 { color: red; }
        #error { color: red; background: #ffe6e6; }
    </style>
</head>
<body class="dark">
    <div class="header">
        <h2>Online Python IDE</h2>
        <button id="theme">Light Mode</button>
    </div>

    <textarea id="editor" spellcheck="false"></textarea>

    <div>
        <label for="input">Input:</label>
        <textarea id="input" rows="3"></textarea>
    </div>

    <div class="buttons">
        <button id="run">Run</button>
        <button id="download">Download Code</button>
        <button id="upload">Upload File</button>
        <input id="file" type="file" accept=".py" style="display: none" />
        <button id="reset">Reset Code</button>
    </div>

    <div>
        <h3>Output:</h3>
        <pre id="output"></pre>
        <div id="error-box">
            <h3>Error:</h3>
            <pre id="error"></pre>
        </div>
    </div>

    <script>
        const editor = document.getElementById('editor');
        const input = document.getElementById('input');
        const fileInput = document.getElementById('file');
        let ws;

        function send(msg) {
            if (ws && ws.readyState === WebSocket.OPEN) {
                ws.send(JSON.stringify(msg));
            }
        }

        // Fields being typed into are the source of truth; snapshots of
        // earlier keystrokes must not overwrite them.
        function sync(field, value) {
            if (document.activeElement !== field && field.value !== value) {
                field.value = value;
            }
        }

        function render(s) {
            sync(editor, s.document);
            sync(input, s.input);
            document.getElementById('output').textContent = s.output;
            const box = document.getElementById('error-box');
            if (s.error_display) {
                document.getElementById('error').textContent = s.error_display;
                box.style.display = 'block';
            } else {
                box.style.display = 'none';
            }
            document.body.className = s.theme;
            document.getElementById('theme').textContent = s.toggle_label;
        }

        function download(msg) {
            const bytes = Uint8Array.from(atob(msg.data), c => c.charCodeAt(0));
            const blob = new Blob([bytes], { type: msg.mime });
            const url = URL.createObjectURL(blob);
            const link = document.createElement('a');
            link.href = url;
            link.download = msg.file_name;
            link.click();
            URL.revokeObjectURL(url);
        }

        function connect() {
            const protocol = window.location.protocol === 'https:' ? 'wss:' : 'ws:';
            ws = new WebSocket(`${protocol}//${window.location.host}/ws`);

            ws.onclose = () => setTimeout(connect, 2000);

            ws.onmessage = (event) => {
                try {
                    const msg = JSON.parse(event.data);
                    if (msg.type === 'snapshot') {
                        render(msg);
                    } else if (msg.type === 'download') {
                        download(msg);
                    } else if (msg.type === 'error') {
                        console.error(msg.message);
                    }
                } catch (e) {
                    console.error('Failed to parse message:', e);
                }
            };
        }

        editor.addEventListener('input', () => send({ type: 'edit', text: editor.value }));
        input.addEventListener('input', () => send({ type: 'input_edit', text: input.value }));
        document.getElementById('run').onclick = () => send({ type: 'run' });
        document.getElementById('download').onclick = () => send({ type: 'export' });
        document.getElementById('reset').onclick = () => send({ type: 'reset' });
        document.getElementById('theme').onclick = () => send({ type: 'toggle_theme' });
        document.getElementById('upload').onclick = () => fileInput.click();

        fileInput.onchange = async () => {
            const file = fileInput.files[0];
            if (!file) {
                send({ type: 'import', file: null });
                return;
            }
            const bytes = new Uint8Array(await file.arrayBuffer());
            let binary = '';
            for (const b of bytes) binary += String.fromCharCode(b);
            send({ type: 'import', file: { name: file.name, data: btoa(binary) } });
            fileInput.value = '';
        };

        connect();
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_keeps_focused_fields_and_uses_snapshot_label() {
        assert!(INDEX_HTML.contains("document.activeElement !== field"));
        assert!(INDEX_HTML.contains("sync(editor, s.document)"));
        assert!(INDEX_HTML.contains("sync(input, s.input)"));
        assert!(INDEX_HTML.contains("textContent = s.toggle_label"));
        assert!(!INDEX_HTML.contains("editor.value = s.document"));
    }
}
