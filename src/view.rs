//! Render surface exposed to whatever displays a staging session.
//!
//! The staging core never draws anything itself. After every successful
//! mutation it hands a full [`RenderedList`] to a [`RenderSink`], and it
//! reports user-facing notices through a [`Notifier`].

use serde::Serialize;

use crate::staging::{Entry, Payload};

/// Which surface is visible. Derived from the staged length, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Nothing staged: show the file picker / drop area.
    Picker,
    /// At least one entry: show the staged panel.
    Panel,
}

impl ViewMode {
    /// View mode for a sequence of `len` entries.
    pub fn for_len(len: usize) -> Self {
        if len == 0 { Self::Picker } else { Self::Panel }
    }
}

/// One row of the rendered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedItem {
    /// Current position; the only identity an entry has.
    pub index: usize,
    /// Label (original filename).
    pub label: String,
    /// Inline preview (`data:` URL), image flavor only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Delete affordance.
    pub deletable: bool,
    /// Positional drag handle.
    pub draggable: bool,
}

/// Full rendering of the staged sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedList {
    /// Visible surface.
    pub mode: ViewMode,
    /// Rows in staged order.
    pub items: Vec<RenderedItem>,
}

impl RenderedList {
    /// Render entries in their current order.
    ///
    /// Previews are only built when `with_previews` is set; encoding them
    /// costs a full pass over every image.
    pub fn from_entries<P: Payload>(entries: &[Entry<P>], with_previews: bool) -> Self {
        let items = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| RenderedItem {
                index,
                label: entry.display_name().to_string(),
                preview: with_previews.then(|| entry.payload().preview()).flatten(),
                deletable: true,
                draggable: true,
            })
            .collect();

        Self {
            mode: ViewMode::for_len(entries.len()),
            items,
        }
    }

    /// Labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.label.as_str()).collect()
    }
}

/// Receives a full re-render after every successful mutation.
///
/// Called while the staged sequence is locked, so implementations must not
/// call back into the staging handle.
pub trait RenderSink: Send + Sync {
    /// Redraw the whole list.
    fn render(&self, list: &RenderedList);

    /// The sequence went from empty to non-empty or back.
    fn view_mode_changed(&self, _mode: ViewMode) {}

    /// Whether rendered items should carry inline previews.
    fn wants_previews(&self) -> bool {
        true
    }
}

/// Receives user-facing notices (the "alert" path).
pub trait Notifier: Send + Sync {
    /// Show a notice to the user.
    fn notify(&self, notice: &str);
}

/// Sink that discards renders and notices.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl RenderSink for Detached {
    fn render(&self, _list: &RenderedList) {}

    fn wants_previews(&self) -> bool {
        false
    }
}

impl Notifier for Detached {
    fn notify(&self, _notice: &str) {}
}
