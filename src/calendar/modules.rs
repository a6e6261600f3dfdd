//! Merging provider calendars with stored per-user overrides into the
//! canonical ordered module list.

use std::collections::HashMap;

use crate::calendar::models::{CalendarOverride, Module, fallback_color};
use crate::google::gcal::CalendarListEntry;

/// Produce the display-ready module list:
///
/// 1. drop calendars the user's override hides;
/// 2. name: override display name, else provider summary, else "untitled";
///    color: override color, else provider color, else a deterministic
///    palette pick keyed by the calendar id;
/// 3. order: pinned first, then override sort order, then display name.
///
/// The ordering is authoritative for the calendar switcher and for the
/// mirrored to-do lists, and the sort is stable for equal keys.
pub fn merge_modules(
    calendars: &[CalendarListEntry],
    overrides: &[CalendarOverride],
) -> Vec<Module> {
    let override_map: HashMap<&str, &CalendarOverride> = overrides
        .iter()
        .map(|o| (o.calendar_id.as_str(), o))
        .collect();

    let mut modules: Vec<Module> = calendars
        .iter()
        .filter_map(|calendar| {
            let id = calendar.id.as_deref()?;
            let override_ = override_map.get(id).copied();
            if override_.is_some_and(|o| o.hidden) {
                return None;
            }

            let name = override_
                .and_then(|o| o.display_name.as_deref())
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .or_else(|| {
                    calendar
                        .summary
                        .as_deref()
                        .map(str::trim)
                        .filter(|summary| !summary.is_empty())
                })
                .unwrap_or("untitled")
                .to_string();

            let color = override_
                .and_then(|o| o.color.as_deref())
                .filter(|color| !color.trim().is_empty())
                .or(calendar.background_color.as_deref())
                .unwrap_or_else(|| fallback_color(id))
                .to_string();

            Some(Module {
                id: id.to_string(),
                name,
                color,
            })
        })
        .collect();

    modules.sort_by(|a, b| {
        let override_a = override_map.get(a.id.as_str());
        let override_b = override_map.get(b.id.as_str());
        let pinned_a = override_a.is_some_and(|o| o.pinned);
        let pinned_b = override_b.is_some_and(|o| o.pinned);
        let sort_a = override_a.map_or(0, |o| o.sort_order);
        let sort_b = override_b.map_or(0, |o| o.sort_order);

        pinned_b
            .cmp(&pinned_a)
            .then(sort_a.cmp(&sort_b))
            .then_with(|| a.name.cmp(&b.name))
    });

    modules
}
