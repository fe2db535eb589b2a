//! Bridge between the window `Selection` and the core's `ActiveSelection`.
//!
//! The core works on an explicit selection value. These helpers snapshot the
//! native selection before a toggle and write the result back afterwards.

use web_sys::{Range, Selection};
use weaver_inline_tool::{ActiveSelection, HostError};

use crate::dom::host_error;

fn window_selection() -> Result<Option<Selection>, HostError> {
    let Some(window) = web_sys::window() else {
        return Ok(None);
    };
    window.get_selection().map_err(host_error)
}

/// Snapshot the window selection's first range and its direction.
pub fn read_selection() -> Result<ActiveSelection<Range>, HostError> {
    let Some(selection) = window_selection()? else {
        return Ok(ActiveSelection::empty());
    };
    if selection.range_count() == 0 {
        return Ok(ActiveSelection::empty());
    }
    let range = selection.get_range_at(0).map_err(host_error)?;

    // A selection made right-to-left has its anchor at the range end.
    let anchor_at_start = selection.anchor_node() == Some(range.start_container().map_err(host_error)?)
        && selection.anchor_offset() == range.start_offset().map_err(host_error)?;
    if range.collapsed() || anchor_at_start {
        Ok(ActiveSelection::from_range(range))
    } else {
        Ok(ActiveSelection::backwards(range))
    }
}

/// Replace the window selection with `active`, preserving its direction.
pub fn apply_selection(active: &ActiveSelection<Range>) -> Result<(), HostError> {
    let Some(selection) = window_selection()? else {
        return Ok(());
    };
    selection.remove_all_ranges().map_err(host_error)?;
    let Some(range) = active.range() else {
        return Ok(());
    };

    if active.is_backwards() {
        let start = range.start_container().map_err(host_error)?;
        let end = range.end_container().map_err(host_error)?;
        selection
            .set_base_and_extent(
                &end,
                range.end_offset().map_err(host_error)?,
                &start,
                range.start_offset().map_err(host_error)?,
            )
            .map_err(host_error)?;
    } else {
        selection.add_range(range).map_err(host_error)?;
    }
    tracing::trace!(
        target: "weaver::inline_tool::browser",
        backwards = active.is_backwards(),
        "applied selection"
    );
    Ok(())
}
