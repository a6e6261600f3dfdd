//! Column layout for overlapping events within one calendar day.
//!
//! Events are partitioned into maximal overlap groups, then packed into
//! columns greedily (first column whose last event has ended). Every
//! event in a group renders at `1 / total_overlaps` of the day width.
//! Column count is stable and deterministic, minimized per group rather
//! than globally.

use crate::calendar::models::CalendarEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedEvent {
    pub event: CalendarEvent,
    /// 0-based column within the overlap group.
    pub overlap_index: usize,
    /// Number of columns the overlap group occupies.
    pub total_overlaps: usize,
}

pub fn assign_overlap_columns(events: &[CalendarEvent]) -> Vec<PositionedEvent> {
    let mut sorted: Vec<&CalendarEvent> = events.iter().collect();
    sorted.sort_by(|a, b| {
        // Earliest start first; ties broken by longer duration so the
        // event that spans more of the day claims the leftmost column.
        a.start_minutes()
            .cmp(&b.start_minutes())
            .then(b.end_minutes().cmp(&a.end_minutes()))
    });

    // Partition into maximal overlap groups: extend the group while the
    // next event starts before the running maximum end time.
    let mut groups: Vec<Vec<&CalendarEvent>> = Vec::new();
    let mut current: Vec<&CalendarEvent> = Vec::new();
    let mut current_end = 0;
    for event in sorted {
        if current.is_empty() || event.start_minutes() < current_end {
            current_end = current_end.max(event.end_minutes());
            current.push(event);
        } else {
            groups.push(std::mem::take(&mut current));
            current_end = event.end_minutes();
            current.push(event);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    let mut positioned = Vec::with_capacity(events.len());
    for group in groups {
        let mut columns: Vec<Vec<&CalendarEvent>> = Vec::new();
        for event in group {
            let open_column = columns.iter_mut().find(|column| {
                column
                    .last()
                    .is_some_and(|last| last.end_minutes() <= event.start_minutes())
            });
            match open_column {
                Some(column) => column.push(event),
                None => columns.push(vec![event]),
            }
        }

        let total_overlaps = columns.len();
        for (overlap_index, column) in columns.into_iter().enumerate() {
            for event in column {
                positioned.push(PositionedEvent {
                    event: event.clone(),
                    overlap_index,
                    total_overlaps,
                });
            }
        }
    }

    positioned
}
