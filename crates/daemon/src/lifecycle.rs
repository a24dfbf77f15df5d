// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bootstrap and the single owning event loop (spec §5's single-threaded
//! cooperative dispatcher), grounded on the teacher's
//! `lifecycle::{Config::load, DaemonState, StartupResult}` acquire-then-run
//! split and `listener::mod::{Listener, run_dual}` accept-loop idiom.
//!
//! The owning loop never shares the [`Dispatcher`] across tasks: every
//! accepted connection, relay peer and control request instead funnels a
//! message through one of three channels this module reads in a single
//! `tokio::select!` (spec §5's "a single-owner loop rather than an
//! `Arc<Mutex<_>>`-shared dispatcher").

use crate::config_load::{self, LoadedConfig, ServerConfig};
use crate::control;
use crate::dispatcher::Dispatcher;
use crate::env;
use crate::relay::RelayServer;
use crate::session::{self, SessionCommand};
use crate::subscription::SessionId;
use crate::ws;
use evd_adapters::{
    DesktopBackendAdapter, ExecPlugin, FileAppendPlugin, LogPlugin, NotifyBridgePlugin, SoundStubPlugin,
};
use evd_config::loader::IdResolver;
use evd_config::Document;
use evd_core::event::Event;
use evd_core::flags::FlagInterner;
use evd_core::plugin::Plugin;
use evd_notify::Compositor;
use evd_wire::control::{read_request, write_response, ControlResponse};
use evd_wire::evp::SubscribeScope;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream, UnixListener};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("loading config: {0}")]
    Config(#[from] evd_config::loader::LoadError),
    #[error("binding {0}: {1}")]
    Bind(String, #[source] std::io::Error),
    #[error("loading TLS material: {0}")]
    Tls(String),
    #[error("no runtime directory for the control socket: {0}")]
    Env(#[from] env::EnvError),
}

/// Resolves a `[File] Extends=<id>` parent to a sibling `<id>.conf` in the
/// same directory as the config file that named it.
struct SiblingResolver {
    dir: PathBuf,
}

impl IdResolver for SiblingResolver {
    fn resolve(&self, id: &str) -> Option<PathBuf> {
        let candidate = self.dir.join(format!("{id}.conf"));
        candidate.exists().then_some(candidate)
    }
}

/// Build the compositor from the `NotificationStyle`/`Queue "<id>"` groups
/// `config_load` already knows how to read, the same way `build_plugins`'s
/// caller reads `server`/`relays` out of the rest of the document.
fn build_compositor(doc: &Document, backend: DesktopBackendAdapter) -> Compositor<DesktopBackendAdapter> {
    let geometry = config_load::load_geometry(doc);
    let mut compositor = Compositor::new(backend, geometry);
    for queue in config_load::load_queues(doc) {
        compositor.add_queue(queue);
    }
    for (name, style) in config_load::load_styles(doc) {
        compositor.set_style(name, style);
    }
    compositor
}

fn build_plugins(doc: &Document, notification_events: UnboundedSender<Event>) -> Vec<Box<dyn Plugin>> {
    let compositor = build_compositor(doc, DesktopBackendAdapter::new());
    vec![
        Box::new(LogPlugin::new()),
        Box::new(FileAppendPlugin::new()),
        Box::new(ExecPlugin::new()),
        Box::new(SoundStubPlugin::new()),
        Box::new(NotifyBridgePlugin::new(compositor, notification_events)),
    ]
}

/// Shared so a background watcher can swap in a freshly-built acceptor
/// without the accept loops needing to restart; readers snapshot with
/// `.read().clone()` per connection, which is how a reload becomes visible
/// to every subsequently-accepted socket.
type SharedTlsAcceptor = Arc<parking_lot::RwLock<Option<TlsAcceptor>>>;

fn build_tls_acceptor(server: &ServerConfig) -> Result<Option<TlsAcceptor>, LifecycleError> {
    let (Some(cert_path), Some(key_path)) = (&server.tls_cert, &server.tls_key) else {
        return Ok(None);
    };
    let certs = load_certs(cert_path)?;
    let key = load_key(key_path)?;
    let config = tokio_rustls::rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|err| LifecycleError::Tls(err.to_string()))?;
    Ok(Some(TlsAcceptor::from(Arc::new(config))))
}

/// Rebuild the acceptor from disk whenever the cert or key file changes, so
/// rotating a certificate doesn't require restarting the daemon. Returns
/// the watcher guard, which the caller must hold onto for the daemon's
/// lifetime — dropping it stops the watch.
///
/// Grounded on `notify::RecommendedWatcher`'s callback-into-channel idiom.
fn spawn_tls_cert_watch(server: &ServerConfig, acceptor: SharedTlsAcceptor) -> Option<notify::RecommendedWatcher> {
    let (Some(cert_path), Some(key_path)) = (&server.tls_cert, &server.tls_key) else {
        return None;
    };
    let server = server.clone();
    let (tx, mut rx) = mpsc::unbounded_channel::<()>();

    let mut watcher = match notify::RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            let changed = matches!(
                res,
                Ok(notify::Event { kind: notify::EventKind::Modify(_) | notify::EventKind::Create(_), .. })
            );
            if changed {
                let _ = tx.send(());
            }
        },
        notify::Config::default(),
    ) {
        Ok(watcher) => watcher,
        Err(err) => {
            tracing::warn!(error = %err, "failed to start TLS cert watcher, hot-reload disabled");
            return None;
        }
    };

    for path in [cert_path.as_path(), key_path.as_path()] {
        if let Err(err) = watcher.watch(path, notify::RecursiveMode::NonRecursive) {
            tracing::warn!(path = %path.display(), error = %err, "failed to watch TLS material for changes");
        }
    }

    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            match build_tls_acceptor(&server) {
                Ok(Some(new_acceptor)) => {
                    *acceptor.write() = Some(new_acceptor);
                    tracing::info!("TLS material changed on disk, reloaded acceptor");
                }
                Ok(None) => {
                    tracing::warn!("TLS cert/key no longer both present on disk, keeping previous acceptor");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to reload TLS material, keeping previous acceptor");
                }
            }
        }
    });

    Some(watcher)
}

fn load_certs(path: &Path) -> Result<Vec<tokio_rustls::rustls::pki_types::CertificateDer<'static>>, LifecycleError> {
    let file = std::fs::File::open(path).map_err(|err| LifecycleError::Bind(path.display().to_string(), err))?;
    let mut reader = std::io::BufReader::new(file);
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| LifecycleError::Tls(err.to_string()))
}

fn load_key(path: &Path) -> Result<tokio_rustls::rustls::pki_types::PrivateKeyDer<'static>, LifecycleError> {
    let file = std::fs::File::open(path).map_err(|err| LifecycleError::Bind(path.display().to_string(), err))?;
    let mut reader = std::io::BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|err| LifecycleError::Tls(err.to_string()))?
        .ok_or_else(|| LifecycleError::Tls(format!("no private key found in {}", path.display())))
}

struct PendingControlRequest {
    argv: Vec<String>,
    respond: oneshot::Sender<ControlResponse>,
}

/// The bootstrapped daemon, not yet running: every resource (listeners,
/// the dispatcher, configured relays) has been acquired but no accept loop
/// or relay connection has started yet, mirroring the teacher's
/// `StartupResult` split between "acquire" and "run".
pub struct Daemon {
    dispatcher: Dispatcher,
    commands_tx: UnboundedSender<(SessionId, SessionCommand)>,
    commands_rx: UnboundedReceiver<(SessionId, SessionCommand)>,
    registrations_tx: UnboundedSender<(SessionId, UnboundedSender<Event>)>,
    registrations_rx: UnboundedReceiver<(SessionId, UnboundedSender<Event>)>,
    control_tx: UnboundedSender<PendingControlRequest>,
    control_rx: UnboundedReceiver<PendingControlRequest>,
    plugin_events_rx: UnboundedReceiver<Event>,
    shutdown: CancellationToken,
    listeners: Vec<TcpListener>,
    tls_acceptor: SharedTlsAcceptor,
    tls_cert_watcher: Option<notify::RecommendedWatcher>,
    control_listener: UnixListener,
    ping_interval: std::time::Duration,
    relays: Vec<RelayServer>,
    config_path: PathBuf,
    ws_shared_secret: Option<Arc<str>>,
}

/// Load `config_path`, build every plugin and the router/action state it
/// configures, and bind every listening socket. Nothing accepts a
/// connection until [`Daemon::run`] is called.
pub async fn bootstrap(config_path: &Path) -> Result<Daemon, LifecycleError> {
    let resolver = SiblingResolver { dir: config_path.parent().map(Path::to_path_buf).unwrap_or_default() };
    let id = config_path.file_stem().and_then(|s| s.to_str()).unwrap_or("evd").to_string();
    let doc = evd_config::loader::load_with_extends(&id, config_path, &resolver)?;

    let interner = Arc::new(FlagInterner::new());
    let (notification_events_tx, plugin_events_rx) = mpsc::unbounded_channel();
    let plugins = build_plugins(&doc, notification_events_tx);

    let LoadedConfig { server, relays, router, registry, .. } = config_load::load(&doc, interner.clone(), &plugins);

    let dispatcher = Dispatcher::new(router, registry, interner, plugins);

    let listen_addrs = if server.listen.is_empty() {
        vec![format!("0.0.0.0:{}", env::bind_port())]
    } else {
        server.listen.clone()
    };
    let mut listeners = Vec::with_capacity(listen_addrs.len());
    for addr in &listen_addrs {
        let listener =
            TcpListener::bind(addr).await.map_err(|err| LifecycleError::Bind(addr.clone(), err))?;
        listeners.push(listener);
    }
    let tls_acceptor: SharedTlsAcceptor = Arc::new(parking_lot::RwLock::new(build_tls_acceptor(&server)?));
    let tls_cert_watcher = spawn_tls_cert_watch(&server, tls_acceptor.clone());
    let ws_shared_secret: Option<Arc<str>> = server.ws_shared_secret.clone().map(Arc::from);

    let control_path = env::control_socket_path()?;
    if let Some(parent) = control_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| LifecycleError::Bind(control_path.display().to_string(), err))?;
    }
    let _ = std::fs::remove_file(&control_path);
    let control_listener = UnixListener::bind(&control_path)
        .map_err(|err| LifecycleError::Bind(control_path.display().to_string(), err))?;

    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (registrations_tx, registrations_rx) = mpsc::unbounded_channel();
    let (control_tx, control_rx) = mpsc::unbounded_channel();

    let relays = relays.into_iter().map(|cfg| RelayServer::new(cfg, env::DEFAULT_PING_INTERVAL)).collect();

    Ok(Daemon {
        dispatcher,
        commands_tx,
        commands_rx,
        registrations_tx,
        registrations_rx,
        control_tx,
        control_rx,
        plugin_events_rx,
        shutdown: CancellationToken::new(),
        listeners,
        tls_acceptor,
        tls_cert_watcher,
        control_listener,
        ping_interval: env::DEFAULT_PING_INTERVAL,
        relays,
        config_path: config_path.to_path_buf(),
        ws_shared_secret,
    })
}

/// Re-read `config_path` from disk and rebuild the router/action table
/// against it, reusing the dispatcher's existing flag interner and plugin
/// roster so already-interned flags and already-running plugins keep their
/// identity across a `reload` (spec §8 Scenario 5). Errors are logged and
/// swallowed: a malformed config on reload leaves the previous routing
/// table in place rather than taking the daemon down.
async fn reload_routing(dispatcher: &mut Dispatcher, config_path: &Path) {
    let resolver = SiblingResolver { dir: config_path.parent().map(Path::to_path_buf).unwrap_or_default() };
    let id = config_path.file_stem().and_then(|s| s.to_str()).unwrap_or("evd").to_string();
    let doc = match evd_config::loader::load_with_extends(&id, config_path, &resolver) {
        Ok(doc) => doc,
        Err(err) => {
            tracing::warn!(config = %config_path.display(), error = %err, "reload: failed to load config, keeping previous routing table");
            return;
        }
    };
    let LoadedConfig { router, registry, .. } = config_load::load(&doc, dispatcher.interner(), dispatcher.plugins());
    dispatcher.replace_routing(router, registry);
    tracing::info!(config = %config_path.display(), "reload: routing table rebuilt from disk");
}

impl Daemon {
    /// Spawn every accept loop and relay connection, then drive the
    /// owning loop until a control-channel `stop` (or a process signal)
    /// cancels `shutdown`. Existing accepted connections keep running
    /// after the loop exits — a best-effort drain rather than a hard
    /// abort (spec §9's open question on `stop` semantics, resolved here
    /// in favor of letting in-flight sessions finish on their own).
    pub async fn run(self) {
        let Daemon {
            mut dispatcher,
            commands_tx,
            mut commands_rx,
            registrations_tx,
            mut registrations_rx,
            control_tx,
            mut control_rx,
            mut plugin_events_rx,
            shutdown,
            listeners,
            tls_acceptor,
            tls_cert_watcher,
            control_listener,
            ping_interval,
            relays,
            config_path,
            ws_shared_secret,
        } = self;

        // Kept alive for the loop's whole lifetime: dropping it would stop
        // the TLS cert/key filesystem watch.
        let _tls_cert_watcher = tls_cert_watcher;

        for listener in listeners {
            tokio::spawn(accept_tcp_loop(
                listener,
                tls_acceptor.clone(),
                ping_interval,
                registrations_tx.clone(),
                commands_tx.clone(),
                ws_shared_secret.clone(),
            ));
        }

        tokio::spawn(accept_control_loop(control_listener, control_tx));

        for mut relay in relays {
            let (outbox_tx, fan_out_rx) = session::channel();
            let session_id = relay.session_id();
            let _ = registrations_tx.send((session_id, outbox_tx));
            let _ = commands_tx.send((session_id, SessionCommand::Subscribe(SubscribeScope::All)));
            let relay_commands = commands_tx.clone();
            tokio::spawn(async move {
                relay.run(true, relay_commands, fan_out_rx).await;
            });
        }

        let signal_shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            signal_shutdown.cancel();
        });

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                registration = registrations_rx.recv() => match registration {
                    Some((id, outbox)) => dispatcher.register_session(id, outbox),
                    None => break,
                },
                command = commands_rx.recv() => match command {
                    Some((id, SessionCommand::Event(event))) => dispatcher.push_event(event, Some(id)).await,
                    Some((id, SessionCommand::Subscribe(scope))) => dispatcher.subscribe(id, scope),
                    Some((id, SessionCommand::Disconnected)) => dispatcher.remove_session(id),
                    None => break,
                },
                request = control_rx.recv() => match request {
                    Some(request) => {
                        if request.argv.first().map(String::as_str) == Some("reload") {
                            reload_routing(&mut dispatcher, &config_path).await;
                        }
                        let response = control::handle(&mut dispatcher, &request.argv, &shutdown).await;
                        let _ = request.respond.send(response);
                    }
                    None => break,
                },
                event = plugin_events_rx.recv() => match event {
                    Some(event) => dispatcher.push_event(event, None).await,
                    None => break,
                },
            }
        }

        tracing::info!("evd event loop exiting");
    }
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::warn!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

async fn accept_tcp_loop(
    listener: TcpListener,
    tls_acceptor: SharedTlsAcceptor,
    ping_interval: std::time::Duration,
    registrations: UnboundedSender<(SessionId, UnboundedSender<Event>)>,
    commands: UnboundedSender<(SessionId, SessionCommand)>,
    ws_shared_secret: Option<Arc<str>>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::debug!(%peer, "accepted connection");
                tokio::spawn(handle_tcp_connection(
                    stream,
                    tls_acceptor.clone(),
                    ping_interval,
                    registrations.clone(),
                    commands.clone(),
                    ws_shared_secret.clone(),
                ));
            }
            Err(err) => tracing::warn!(error = %err, "tcp accept error"),
        }
    }
}

/// Every raw-EVP/WebSocket transport this accept loop can hand
/// `session::run` (spec §4.4's WebSocket supplement, §4.5's TLS scope).
/// TLS is only offered to the raw-EVP leg: wrapping the HTTP upgrade
/// handshake itself in TLS (`wss://`) is out of scope here, so a
/// connection is sniffed for `GET ` (WebSocket) before TLS is considered.
async fn handle_tcp_connection(
    stream: TcpStream,
    tls_acceptor: SharedTlsAcceptor,
    ping_interval: std::time::Duration,
    registrations: UnboundedSender<(SessionId, UnboundedSender<Event>)>,
    commands: UnboundedSender<(SessionId, SessionCommand)>,
    ws_shared_secret: Option<Arc<str>>,
) {
    let session_id = session::new_session_id();
    let (outbox_tx, fan_out_rx) = session::channel();
    if registrations.send((session_id, outbox_tx)).is_err() {
        return;
    }

    let mut peek_buf = [0u8; 4];
    let is_websocket = matches!(stream.peek(&mut peek_buf).await, Ok(n) if n >= 3 && &peek_buf[..3] == b"GET");

    let result = if is_websocket {
        let callback = move |request: &ws::Request, response: ws::Response| {
            ws::check_auth(request, response, ws_shared_secret.as_deref())
        };
        match tokio_tungstenite::accept_hdr_async(stream, callback).await {
            Ok(ws_stream) => {
                let (reader, writer) = ws::bridge(ws_stream);
                session::run(session_id, reader, writer, commands, fan_out_rx, ping_interval).await
            }
            Err(err) => {
                tracing::warn!(%session_id, error = %err, "websocket handshake failed");
                return;
            }
        }
    } else if let Some(acceptor) = tls_acceptor.read().clone() {
        match acceptor.accept(stream).await {
            Ok(tls_stream) => {
                let (read_half, write_half) = tokio::io::split(tls_stream);
                session::run(
                    session_id,
                    tokio::io::BufReader::new(read_half),
                    write_half,
                    commands,
                    fan_out_rx,
                    ping_interval,
                )
                .await
            }
            Err(err) => {
                tracing::warn!(%session_id, error = %err, "tls handshake failed");
                return;
            }
        }
    } else {
        let (read_half, write_half) = stream.into_split();
        session::run(
            session_id,
            tokio::io::BufReader::new(read_half),
            write_half,
            commands,
            fan_out_rx,
            ping_interval,
        )
        .await
    };

    if let Err(err) = result {
        tracing::debug!(%session_id, error = %err, "session ended with an error");
    }
}

async fn accept_control_loop(listener: UnixListener, control_tx: UnboundedSender<PendingControlRequest>) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let control_tx = control_tx.clone();
                tokio::spawn(async move {
                    let (mut read_half, mut write_half) = stream.into_split();
                    match read_request(&mut read_half).await {
                        Ok(request) => {
                            let (respond_tx, respond_rx) = oneshot::channel();
                            if control_tx.send(PendingControlRequest { argv: request.argv, respond: respond_tx }).is_err() {
                                return;
                            }
                            if let Ok(response) = respond_rx.await {
                                if let Err(err) = write_response(&mut write_half, &response).await {
                                    tracing::debug!(error = %err, "failed to write control response");
                                }
                            }
                        }
                        Err(err) => tracing::debug!(error = %err, "control connection sent a malformed request"),
                    }
                });
            }
            Err(err) => tracing::warn!(error = %err, "control accept error"),
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
