//! Markup for the floating toggle and the side panel.
//!
//! The core addresses the injected chrome only through the fixed element ids
//! below, so a host re-render that drops and the page that re-creates it agree
//! on nothing else.

use crate::config::Config;
use crate::index::IndexEntry;
use crate::panel::Visibility;
use core_types::{EventKind, ListenerId, NodeKey};
use dom::{DomError, Document};
use html::text::snippet;

pub const TOGGLE_ID: &str = "pi-toggle";
pub const SIDEBAR_ID: &str = "pi-sidebar";
pub const CLOSE_ID: &str = "pi-close";
pub const SEARCH_ID: &str = "pi-search";
pub const LIST_ID: &str = "pi-list";
pub const SESSION_ID: &str = "pi-session";

pub const HIDDEN_ATTR: &str = "data-hidden";
/// Set on the search input once its listener is attached.
pub const BOUND_ATTR: &str = "data-bound";
pub const ENTRY_ATTR: &str = "data-pi-entry";

pub const HIGHLIGHT: &str = "0 0 0 3px rgba(79,70,229,0.25)";

/// What a listener registered by the page does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    Toggle,
    Close,
    Search,
    /// Delegated click on the results list.
    Row,
}

impl UiAction {
    const ALL: [UiAction; 4] = [UiAction::Toggle, UiAction::Close, UiAction::Search, UiAction::Row];

    pub fn listener(self) -> ListenerId {
        match self {
            UiAction::Toggle => ListenerId(1),
            UiAction::Close => ListenerId(2),
            UiAction::Search => ListenerId(3),
            UiAction::Row => ListenerId(4),
        }
    }

    pub fn from_listener(id: ListenerId) -> Option<UiAction> {
        Self::ALL.into_iter().find(|a| a.listener() == id)
    }
}

fn styled(doc: &mut Document, key: NodeKey, styles: &[(&str, &str)]) -> Result<(), DomError> {
    for (property, value) in styles {
        doc.set_style(key, property, value)?;
    }
    Ok(())
}

fn element(
    doc: &mut Document,
    parent: NodeKey,
    name: &str,
    styles: &[(&str, &str)],
) -> Result<NodeKey, DomError> {
    let key = doc.create_element(name);
    styled(doc, key, styles)?;
    doc.append_child(parent, key)?;
    Ok(key)
}

fn text(doc: &mut Document, parent: NodeKey, content: &str) -> Result<(), DomError> {
    let key = doc.create_text(content);
    doc.append_child(parent, key)
}

/// Where injected chrome is mounted: `<body>`, or `<html>` if the host
/// removed it.
pub fn mount_point(doc: &Document) -> NodeKey {
    doc.body().unwrap_or_else(|| doc.document_element())
}

pub fn remove_if_exists(doc: &mut Document, id: &str) -> Result<(), DomError> {
    match doc.get_element_by_id(id) {
        Some(key) => doc.remove(key),
        None => Ok(()),
    }
}

pub fn inject_toggle(doc: &mut Document, config: &Config, panel_shown: bool) -> Result<NodeKey, DomError> {
    remove_if_exists(doc, TOGGLE_ID)?;
    let btn = doc.create_element("button");
    doc.set_attribute(btn, "id", TOGGLE_ID)?;
    doc.set_attribute(btn, "title", "Toggle Prompt Index")?;
    let offset = config.toggle_offset(panel_shown);
    styled(
        doc,
        btn,
        &[
            ("position", "fixed"),
            ("bottom", "20px"),
            ("right", offset.as_str()),
            ("width", "48px"),
            ("height", "48px"),
            ("border-radius", "999px"),
            ("display", "flex"),
            ("align-items", "center"),
            ("justify-content", "center"),
            ("z-index", "2147483647"),
            ("background", "#4f46e5"),
            ("color", "white"),
            ("border", "none"),
            ("cursor", "pointer"),
            ("box-shadow", "0 6px 20px rgba(15,23,42,0.4)"),
        ],
    )?;
    let glyph = element(doc, btn, "span", &[("font-weight", "700")])?;
    text(doc, glyph, "#")?;
    doc.add_event_listener(btn, EventKind::Click, UiAction::Toggle.listener())?;
    doc.append_child(mount_point(doc), btn)?;
    Ok(btn)
}

/// Build the panel. Its search input is left unbound.
pub fn inject_sidebar(
    doc: &mut Document,
    config: &Config,
    initial: Visibility,
) -> Result<NodeKey, DomError> {
    remove_if_exists(doc, SIDEBAR_ID)?;
    let aside = doc.create_element("aside");
    doc.set_attribute(aside, "id", SIDEBAR_ID)?;
    let width = config.panel_width();
    let transition = format!("opacity {}ms ease", config.fade_ms);
    styled(
        doc,
        aside,
        &[
            ("position", "fixed"),
            ("top", "0"),
            ("right", "0"),
            ("height", "100vh"),
            ("width", width.as_str()),
            ("flex-direction", "column"),
            ("background", "#0f172a"),
            ("color", "#e6eef8"),
            ("z-index", "2147483646"),
            ("box-shadow", "-8px 0 24px rgba(2,6,23,0.6)"),
            ("transition", transition.as_str()),
            ("overflow", "hidden"),
        ],
    )?;
    match initial {
        Visibility::Shown => {
            doc.set_attribute(aside, HIDDEN_ATTR, "false")?;
            styled(doc, aside, &[("display", "flex"), ("opacity", "1")])?;
        }
        Visibility::Hidden => {
            doc.set_attribute(aside, HIDDEN_ATTR, "true")?;
            styled(doc, aside, &[("display", "none"), ("opacity", "0")])?;
        }
    }

    let header = element(
        doc,
        aside,
        "div",
        &[
            ("display", "flex"),
            ("align-items", "center"),
            ("justify-content", "space-between"),
            ("padding", "12px 14px"),
        ],
    )?;
    let title = element(doc, header, "div", &[("font-weight", "600")])?;
    text(doc, title, "Prompt Index")?;
    let close = element(
        doc,
        header,
        "button",
        &[("background", "transparent"), ("border", "none"), ("cursor", "pointer")],
    )?;
    doc.set_attribute(close, "id", CLOSE_ID)?;
    doc.set_attribute(close, "title", "Hide")?;
    text(doc, close, "✕")?;
    doc.add_event_listener(close, EventKind::Click, UiAction::Close.listener())?;

    let search_row = element(doc, aside, "div", &[("padding", "12px")])?;
    let input = element(
        doc,
        search_row,
        "input",
        &[("width", "100%"), ("padding", "8px"), ("border-radius", "8px")],
    )?;
    doc.set_attribute(input, "id", SEARCH_ID)?;
    doc.set_attribute(input, "placeholder", "Search prompts…")?;

    let list = element(
        doc,
        aside,
        "div",
        &[
            ("flex", "1"),
            ("overflow", "auto"),
            ("padding", "10px"),
            ("display", "flex"),
            ("flex-direction", "column"),
        ],
    )?;
    doc.set_attribute(list, "id", LIST_ID)?;
    doc.add_event_listener(list, EventKind::Click, UiAction::Row.listener())?;

    let footer = element(doc, aside, "div", &[("padding", "10px"), ("font-size", "12px")])?;
    text(doc, footer, "Session: ")?;
    let session = element(doc, footer, "span", &[])?;
    doc.set_attribute(session, "id", SESSION_ID)?;

    doc.append_child(mount_point(doc), aside)?;
    Ok(aside)
}

/// Replace the list's rows with one row per entry.
pub fn render_rows(
    doc: &mut Document,
    list: NodeKey,
    entries: &[&IndexEntry],
    snippet_chars: usize,
) -> Result<(), DomError> {
    doc.remove_children(list)?;
    for entry in entries {
        let row = doc.create_element("button");
        doc.set_attribute(row, "type", "button")?;
        doc.set_attribute(row, ENTRY_ATTR, &entry.id)?;
        styled(doc, row, &[("text-align", "left"), ("padding", "8px"), ("cursor", "pointer")])?;
        let line = element(doc, row, "div", &[("display", "flex"), ("gap", "10px")])?;
        let badge = element(doc, line, "div", &[("min-width", "28px"), ("background", "#4f46e5")])?;
        text(doc, badge, &entry.sequence.to_string())?;
        let label = element(
            doc,
            line,
            "div",
            &[("flex", "1"), ("overflow", "hidden"), ("white-space", "nowrap")],
        )?;
        text(doc, label, &snippet(&entry.text, snippet_chars))?;
        doc.append_child(list, row)?;
    }
    Ok(())
}
