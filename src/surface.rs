//! Rendering-surface abstraction: a tree of display elements addressed by
//! id, exposing attribute get/set, focus control, row-descriptor replacement,
//! and a blocking yes/no confirmation prompt. Controllers only ever talk to
//! this trait; front-ends decide how the node state becomes pixels.

use std::collections::HashMap;

/// Accessibility-relevant element attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    /// Tab selection marker.
    Selected,
    /// Toggle-button pressed indicator.
    Pressed,
    /// Checkbox checked state.
    Checked,
    /// Panel visibility (true = hidden).
    Hidden,
    /// Whether the element participates in the tab order.
    Focusable,
    /// Display mode marker on the root element.
    ThemeMode,
    /// Plain text content (form fields, status messages).
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Flag(bool),
    Text(String),
}

impl AttrValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttrValue::Flag(value) => Some(*value),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(value) => Some(value.as_str()),
            AttrValue::Flag(_) => None,
        }
    }
}

/// Status-derived visual class for activity rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Ok,
    Warn,
    Bad,
}

impl Badge {
    pub const fn class(self) -> &'static str {
        match self {
            Badge::Ok => "ok",
            Badge::Warn => "warn",
            Badge::Bad => "bad",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub index: usize,
    pub name: String,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub time: String,
    pub user: String,
    pub action: String,
    pub status: String,
    pub badge: Badge,
}

/// Typed row descriptor. Containers render from these instead of
/// interpolating user-provided text into markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Task(TaskRow),
    Activity(ActivityRow),
    /// Non-interactive message row shown instead of an empty list.
    Placeholder(String),
}

pub trait Surface {
    fn attr(&self, id: &str, attr: Attr) -> Option<&AttrValue>;
    fn set_attr(&mut self, id: &str, attr: Attr, value: AttrValue);
    fn remove_attr(&mut self, id: &str, attr: Attr);
    fn focus(&mut self, id: &str);
    fn focused(&self) -> Option<&str>;
    fn replace_rows(&mut self, container: &str, rows: Vec<Row>);
    fn rows(&self, container: &str) -> &[Row];
    /// Blocking yes/no prompt gating destructive actions. Returns false on
    /// decline, which fully aborts the pending action.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Shared element-tree state used by every surface implementation.
#[derive(Debug, Default)]
pub struct NodeState {
    attrs: HashMap<String, HashMap<Attr, AttrValue>>,
    rows: HashMap<String, Vec<Row>>,
    focused: Option<String>,
}

impl NodeState {
    pub fn attr(&self, id: &str, attr: Attr) -> Option<&AttrValue> {
        self.attrs.get(id).and_then(|attrs| attrs.get(&attr))
    }

    pub fn set_attr(&mut self, id: &str, attr: Attr, value: AttrValue) {
        self.attrs.entry(id.to_string()).or_default().insert(attr, value);
    }

    pub fn remove_attr(&mut self, id: &str, attr: Attr) {
        if let Some(attrs) = self.attrs.get_mut(id) {
            attrs.remove(&attr);
        }
    }

    pub fn focus(&mut self, id: &str) {
        self.focused = Some(id.to_string());
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn replace_rows(&mut self, container: &str, rows: Vec<Row>) {
        self.rows.insert(container.to_string(), rows);
    }

    pub fn rows(&self, container: &str) -> &[Row] {
        self.rows.get(container).map_or(&[], Vec::as_slice)
    }
}

/// In-memory surface for tests and headless runs. Confirmation prompts are
/// answered with a scripted response and recorded for inspection.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: NodeState,
    confirm_answer: bool,
    confirm_log: Vec<String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confirm_answer(answer: bool) -> Self {
        Self {
            confirm_answer: answer,
            ..Self::default()
        }
    }

    pub fn set_confirm_answer(&mut self, answer: bool) {
        self.confirm_answer = answer;
    }

    pub fn confirm_log(&self) -> &[String] {
        &self.confirm_log
    }
}

impl Surface for MemorySurface {
    fn attr(&self, id: &str, attr: Attr) -> Option<&AttrValue> {
        self.state.attr(id, attr)
    }

    fn set_attr(&mut self, id: &str, attr: Attr, value: AttrValue) {
        self.state.set_attr(id, attr, value);
    }

    fn remove_attr(&mut self, id: &str, attr: Attr) {
        self.state.remove_attr(id, attr);
    }

    fn focus(&mut self, id: &str) {
        self.state.focus(id);
    }

    fn focused(&self) -> Option<&str> {
        self.state.focused()
    }

    fn replace_rows(&mut self, container: &str, rows: Vec<Row>) {
        self.state.replace_rows(container, rows);
    }

    fn rows(&self, container: &str) -> &[Row] {
        self.state.rows(container)
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirm_log.push(message.to_string());
        self.confirm_answer
    }
}
