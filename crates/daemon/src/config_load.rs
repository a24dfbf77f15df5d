// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates a parsed [`Document`] into router/action/server state
//! (SPEC_FULL.md §6's group table), grounded on
//! `libeventd-helpers/src/config.c`'s group-header dispatch.
//!
//! Header convention (an Open Question left to this implementation, see
//! DESIGN.md): `GlobalServer`, `Relay` and `File` are exact reserved
//! headers; `Relay "<id>"`, `Action "<id>"`, `Queue "<id>"` and
//! `NotificationStyle "<id>"` are prefixed reserved headers; every other
//! header is handed to [`evd_core::router::Router::parse_event_match`]
//! verbatim, since that function already accepts the bare/`* `/exact forms
//! spec.md names.
//!
//! `NotificationStyle` (bare, or `"<id>"` naming the queue it styles)
//! carries every field [`evd_notify::Style`] models; `NotificationBubble`,
//! `NotificationText`, `NotificationImage`, `NotificationIcon`,
//! `NotificationProgress` and `NotificationBindings` are recognized and
//! reserved out of event matching but carry no fields of their own here —
//! `Style` has no per-content text/image/icon/progress-binding data to
//! receive them, since rendering those is the pixel-drawing side spec.md's
//! Non-goals exclude. `Queue "<id>"` groups build real [`evd_notify::Queue`]
//! objects instead of being silently dropped.

use evd_core::action::{Action, ActionRegistry, PluginActionHandle};
use evd_core::flags::FlagInterner;
use evd_core::plugin::Plugin;
use evd_core::router::{EventMatchSpec, MatchOp, Router};
use evd_core::value::Value;
use evd_config::{Document, Group};
use evd_notify::{Anchor, Geometry, Queue, Style};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct ServerConfig {
    pub listen: Vec<String>,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
    pub ws_shared_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RelayPeerConfig {
    pub name: String,
    pub address: String,
    pub identity: Option<String>,
    pub accept_unknown_ca: bool,
    pub forward_all: bool,
    pub forward_categories: Vec<String>,
    pub subscribe: bool,
    pub subscribe_categories: Vec<String>,
}

pub struct LoadedConfig {
    pub server: ServerConfig,
    pub relays: Vec<RelayPeerConfig>,
    pub router: Router,
    pub registry: ActionRegistry,
    pub styles: HashMap<String, Style>,
    pub queues: Vec<Queue>,
    pub geometry: Geometry,
}

const RESERVED_EXACT: &[&str] = &["GlobalServer", "Relay", "File"];
const RESERVED_PREFIXES: &[&str] = &[
    "Relay ",
    "Action ",
    "Queue ",
    "NotificationStyle",
    "NotificationBubble",
    "NotificationText",
    "NotificationImage",
    "NotificationIcon",
    "NotificationProgress",
    "NotificationBindings",
];

fn is_reserved(header: &str) -> bool {
    RESERVED_EXACT.contains(&header) || RESERVED_PREFIXES.iter().any(|p| header.starts_with(p))
}

/// Strip the `Kind "id"` / `Kind id` convention down to the bare id.
fn group_id(header: &str, kind: &str) -> String {
    header.strip_prefix(kind).unwrap_or(header).trim().trim_matches('"').to_string()
}

pub fn load(doc: &Document, interner: Arc<FlagInterner>, plugins: &[Box<dyn Plugin>]) -> LoadedConfig {
    let server = load_server(doc);
    let relays = load_relays(doc);
    let registry = load_actions(doc, plugins, &interner);
    let styles = load_styles(doc);
    let queues = load_queues(doc);
    let geometry = load_geometry(doc);
    let mut router = Router::new(interner);
    for (header, group) in doc.iter() {
        if is_reserved(header) {
            continue;
        }
        let spec = event_match_spec(group);
        if let Err(err) = router.parse_event_match(header, spec) {
            tracing::warn!(%header, error = %err, "dropping unparseable event-match group");
        }
    }
    router.link(&registry);
    LoadedConfig { server, relays, router, registry, styles, queues, geometry }
}

fn load_server(doc: &Document) -> ServerConfig {
    let Some(group) = doc.get("GlobalServer") else {
        return ServerConfig::default();
    };
    ServerConfig {
        listen: group.get_list("Listen").into_iter().map(str::to_string).collect(),
        tls_cert: group.get("TlsCert").map(PathBuf::from),
        tls_key: group.get("TlsKey").map(PathBuf::from),
        ws_shared_secret: group.get("WsSharedSecret").map(str::to_string),
    }
}

fn load_relays(doc: &Document) -> Vec<RelayPeerConfig> {
    let Some(relay_group) = doc.get("Relay") else {
        return Vec::new();
    };
    relay_group
        .get_list("Peers")
        .into_iter()
        .filter_map(|name| {
            let header = format!("Relay \"{name}\"");
            let Some(peer) = doc.get(&header) else {
                tracing::warn!(peer = name, "Relay peer listed but has no configuration group");
                return None;
            };
            let Some(address) = peer.get("Address") else {
                tracing::warn!(peer = name, "Relay peer missing required Address");
                return None;
            };
            Some(RelayPeerConfig {
                name: name.to_string(),
                address: address.to_string(),
                identity: peer.get("Identity").map(str::to_string),
                accept_unknown_ca: peer.get("AcceptUnknownCa") == Some("true"),
                forward_all: peer.get("ForwardAll") == Some("true"),
                forward_categories: peer.get_list("ForwardCategories").into_iter().map(str::to_string).collect(),
                subscribe: peer.get("Subscribe") == Some("true"),
                subscribe_categories: peer.get_list("SubscribeCategories").into_iter().map(str::to_string).collect(),
            })
        })
        .collect()
}

fn parse_anchor(raw: &str) -> Option<Anchor> {
    match raw {
        "top-left" => Some(Anchor::TopLeft),
        "top" => Some(Anchor::Top),
        "top-right" => Some(Anchor::TopRight),
        "bottom-left" => Some(Anchor::BottomLeft),
        "bottom" => Some(Anchor::Bottom),
        "bottom-right" => Some(Anchor::BottomRight),
        other => {
            tracing::warn!(anchor = other, "unknown anchor, keeping the style's default");
            None
        }
    }
}

fn parse_style(group: &Group) -> Style {
    let mut style = Style::default();
    if let Some(v) = group.get("MinWidth").and_then(|s| s.parse::<i32>().ok()) {
        style.min_width = v;
    }
    if let Some(v) = group.get("MaxWidth").and_then(|s| s.parse::<i32>().ok()) {
        style.max_width = v;
    }
    if let Some(v) = group.get("Padding").and_then(|s| s.parse::<i32>().ok()) {
        style.padding = v;
    }
    if let Some(v) = group.get("Border").and_then(|s| s.parse::<i32>().ok()) {
        style.border = v;
    }
    if let Some(v) = group.get("Spacing").and_then(|s| s.parse::<i32>().ok()) {
        style.spacing = v;
    }
    if let Some(v) = group.get("MarginX").and_then(|s| s.parse::<i32>().ok()) {
        style.margin_x = v;
    }
    if let Some(v) = group.get("MarginY").and_then(|s| s.parse::<i32>().ok()) {
        style.margin_y = v;
    }
    if let Some(anchor) = group.get("Anchor").and_then(parse_anchor) {
        style.anchor = anchor;
    }
    style
}

/// `NotificationStyle` (bare) styles the `"default"` queue; `NotificationStyle
/// "<id>"` styles the queue named `<id>`.
pub(crate) fn load_styles(doc: &Document) -> HashMap<String, Style> {
    let mut styles = HashMap::new();
    for (header, group) in doc.iter() {
        if header != "NotificationStyle" && !header.starts_with("NotificationStyle ") {
            continue;
        }
        let name = if header == "NotificationStyle" { "default".to_string() } else { group_id(header, "NotificationStyle") };
        styles.insert(name, parse_style(group));
    }
    styles
}

/// The display rectangle notification queues stack against. Read from the
/// bare `NotificationStyle` group since it is the one daemon-wide entry
/// point for compositor placement; defaults match the teacher's original
/// hardcoded 1920x1080.
pub(crate) fn load_geometry(doc: &Document) -> Geometry {
    let Some(group) = doc.get("NotificationStyle") else {
        return Geometry { width: 1920, height: 1080 };
    };
    Geometry {
        width: group.get("ScreenWidth").and_then(|s| s.parse::<i32>().ok()).unwrap_or(1920),
        height: group.get("ScreenHeight").and_then(|s| s.parse::<i32>().ok()).unwrap_or(1080),
    }
}

pub(crate) fn load_queues(doc: &Document) -> Vec<Queue> {
    doc.iter()
        .filter(|(header, _)| header.starts_with("Queue "))
        .map(|(header, group)| {
            let id = group_id(header, "Queue");
            let mut queue = Queue::new(id);
            if let Some(limit) = group.get("Limit").and_then(|s| s.parse::<usize>().ok()) {
                queue.limit = limit;
            }
            queue.reverse = group.get("Reverse") == Some("true");
            if let Some(v) = group.get("MoreIndicator") {
                queue.more_indicator = v == "true";
            }
            queue
        })
        .collect()
}

fn literal(raw: &str) -> Value {
    Value::parse_typed_literal(raw).unwrap_or_else(|_| Value::Str(raw.to_string()))
}

fn action_config(group: &Group) -> Value {
    let mut map = IndexMap::new();
    for key in group.keys() {
        if matches!(key, "Plugin" | "FlagsAdd" | "FlagsRemove" | "Subactions") {
            continue;
        }
        if let Some(value) = group.get(key) {
            map.insert(key.to_string(), literal(value));
        }
    }
    Value::Map(map)
}

fn load_actions(doc: &Document, plugins: &[Box<dyn Plugin>], interner: &FlagInterner) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    for (header, group) in doc.iter() {
        if !header.starts_with("Action ") {
            continue;
        }
        let id = group_id(header, "Action");
        let mut action = Action::new(id.clone());

        if let Some(plugin_id) = group.get("Plugin") {
            match plugins.iter().find(|p| p.id() == plugin_id) {
                Some(plugin) if plugin.supports_actions() => {
                    match plugin.action_parse(&action_config(group)) {
                        Some(handle) => action = action.with_plugin_action(handle),
                        None => tracing::warn!(action = %id, plugin = plugin_id, "plugin rejected its action config"),
                    }
                }
                Some(_) => tracing::warn!(action = %id, plugin = plugin_id, "plugin does not support actions"),
                None => tracing::warn!(action = %id, plugin = plugin_id, "action references an unknown plugin"),
            }
        }

        action = action.with_subactions(group.get_list("Subactions").into_iter().map(str::to_string).collect());
        action = action.with_flags_add(
            group.get_list("FlagsAdd").into_iter().map(|f| interner.intern(f)).collect(),
        );
        action = action.with_flags_remove(
            group.get_list("FlagsRemove").into_iter().map(|f| interner.intern(f)).collect(),
        );
        registry.insert(action);
    }
    registry
}

fn parse_op_literal(token: &str) -> Option<(String, Option<String>, MatchOp, Value)> {
    for op_str in ["!=", "<=", ">=", "<", "=", ">"] {
        if let Some((name_and_key, rest)) = token.split_once(op_str) {
            let name_and_key = name_and_key.trim();
            let (name, key) = match name_and_key.split_once('.') {
                Some((n, k)) => (n.to_string(), Some(k.to_string())),
                None => (name_and_key.to_string(), None),
            };
            let op = MatchOp::parse(op_str)?;
            return Some((name, key, op, literal(rest.trim())));
        }
    }
    None
}

fn event_match_spec(group: &Group) -> EventMatchSpec {
    let action_ids = group.get_list("Actions").into_iter().map(str::to_string).collect();
    let mut spec = EventMatchSpec::new(action_ids);
    spec.importance = group.get("Importance").and_then(|s| s.parse::<i64>().ok());
    spec.if_data_keys = group.get_list("IfData").into_iter().map(str::to_string).collect();
    spec.if_data_matches = group.get_list("IfDataMatches").into_iter().filter_map(parse_op_literal).collect();
    spec.if_data_regexes = group
        .get_list("IfDataRegexes")
        .into_iter()
        .filter_map(|token| token.split_once('~').map(|(name, pattern)| (name.to_string(), pattern.to_string())))
        .collect();
    spec.flag_allow_list = group.get_list("FlagAllowList").into_iter().map(str::to_string).collect();
    spec.flag_deny_list = group.get_list("FlagDenyList").into_iter().map(str::to_string).collect();
    spec
}

#[cfg(test)]
#[path = "config_load_tests.rs"]
mod tests;
