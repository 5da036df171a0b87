//! Event records and the system event queue.
//!
//! Grounded on `original_source/event.c`/`startup.h` for the event kinds and
//! the mouseDown/mouseUp normalization rules, and on `log.rs`'s threshold
//! atomic for the single-producer/single-consumer primitive style (the queue
//! itself needs no atomics: interrupts only ever append, `next_event` only
//! ever runs on the main loop, and nothing else touches the queue
//! concurrently.

extern crate alloc;
use alloc::collections::VecDeque;

use crate::config::EVENT_QUEUE_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    MouseDown,
    MouseUp,
    KeyDown,
    KeyUp,
    AutoKey,
    UpdateEvt,
    ActivateEvt,
    InactivateEvt,
    DiskEvt,
    ControlClicked,
}

/// One bit per modifier/button-state flag, matching the hardware's packed
/// event-modifier word. `active` mirrors `activateEvt`/`mouseDown`'s own
/// activation flag rather than a key; `foenix` is this hardware's equivalent
/// of a Command/Super key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub active: bool,
    pub btn_state: bool,
    pub foenix: bool,
    pub shift: bool,
    pub alpha_lock: bool,
    pub option: bool,
    pub control: bool,
    pub right_shift: bool,
    pub right_option: bool,
    pub right_control: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct EventRecord {
    pub what: EventKind,
    pub code: u32,
    pub when: u32,
    pub window_id: Option<u16>,
    pub control_id: Option<u16>,
    pub global_x: i32,
    pub global_y: i32,
    pub modifiers: Modifiers,
}

impl EventRecord {
    pub fn new(what: EventKind, code: u32, when: u32) -> EventRecord {
        EventRecord {
            what,
            code,
            when,
            window_id: None,
            control_id: None,
            global_x: 0,
            global_y: 0,
            modifiers: Modifiers::default(),
        }
    }
}

/// Fixed-capacity circular queue of pending events: holds at most
/// `EVENT_QUEUE_SIZE` records, overwriting the oldest once full.
pub struct EventManager {
    queue: VecDeque<EventRecord>,
    active_window_id: Option<u16>,
}

impl EventManager {
    pub fn new() -> EventManager {
        EventManager {
            queue: VecDeque::with_capacity(EVENT_QUEUE_SIZE),
            active_window_id: None,
        }
    }

    pub fn set_active_window(&mut self, window_id: Option<u16>) {
        self.active_window_id = window_id;
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= EVENT_QUEUE_SIZE
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Enqueue a raw event, applying the normalization rules below.
    /// Overwrites the oldest queued event once the queue is full, matching
    /// the original's ring-buffer overwrite policy rather than dropping the
    /// newly arriving one.
    pub fn add_event(&mut self, mut event: EventRecord) {
        match event.what {
            EventKind::MouseDown => {
                // Activation swap: if the click targets a window other than
                // the currently active one, synthesize inactivate/activate
                // pairs ahead of the (re-enqueued) mouseDown so the new
                // window is already active by the time the click is routed.
                if event.window_id.is_some() && event.window_id != self.active_window_id {
                    if let Some(prev) = self.active_window_id {
                        self.push(EventRecord {
                            what: EventKind::InactivateEvt,
                            window_id: Some(prev),
                            ..event
                        });
                    }
                    self.push(EventRecord {
                        what: EventKind::ActivateEvt,
                        ..event
                    });
                    self.active_window_id = event.window_id;
                }
                self.push(event);
            }
            EventKind::MouseUp => {
                // A mouseUp over a control becomes controlClicked; the
                // selected-control state is always cleared regardless of
                // whether a control was actually hit.
                if let Some(control_id) = event.control_id {
                    event.what = EventKind::ControlClicked;
                    event.code = control_id as u32;
                }
                self.push(event);
            }
            EventKind::KeyDown | EventKind::KeyUp | EventKind::AutoKey => {
                event.window_id = self.active_window_id;
                self.push(event);
            }
            EventKind::UpdateEvt | EventKind::ActivateEvt | EventKind::InactivateEvt => {
                self.push(event);
            }
            EventKind::DiskEvt | EventKind::ControlClicked => {
                self.push(event);
            }
        }
    }

    fn push(&mut self, event: EventRecord) {
        if self.queue.len() >= EVENT_QUEUE_SIZE {
            self.queue.pop_front();
        }
        self.queue.push_back(event);
    }

    /// Pop the oldest queued event, or `None` if the queue is empty.
    pub fn next_event(&mut self) -> Option<EventRecord> {
        self.queue.pop_front()
    }

    /// Block (in the sense of looping) until an event whose kind is in
    /// `mask` is available, returning it. Consumes strictly in enqueue
    /// order: every event ahead of the match is popped and dropped along the
    /// way, since each already received its normalization in `add_event` and
    /// has nothing left to do once skipped. The embedded target has no
    /// thread to park, so this simply drains; callers that truly need to
    /// block should poll hardware in between calls.
    pub fn wait_for_event(&mut self, mask: &[EventKind]) -> Option<EventRecord> {
        while let Some(event) = self.next_event() {
            if mask.contains(&event.what) {
                return Some(event);
            }
        }
        None
    }

    /// Nullify (remove) every queued event that references `window_id`,
    /// called when a window is destroyed.
    pub fn remove_events_for_window(&mut self, window_id: u16) {
        self.queue.retain(|e| e.window_id != Some(window_id));
        if self.active_window_id == Some(window_id) {
            self.active_window_id = None;
        }
    }
}

impl Default for EventManager {
    fn default() -> EventManager {
        EventManager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse_down_at(window_id: u16, control_id: Option<u16>) -> EventRecord {
        let mut e = EventRecord::new(EventKind::MouseDown, 0, 0);
        e.window_id = Some(window_id);
        e.control_id = control_id;
        e
    }

    #[test]
    fn empty_queue_returns_none() {
        let mut mgr = EventManager::new();
        assert!(mgr.is_empty());
        assert_eq!(mgr.next_event().is_none(), true);
    }

    #[test]
    fn mouse_down_on_new_window_synthesizes_activation_swap() {
        let mut mgr = EventManager::new();
        mgr.set_active_window(Some(1));
        mgr.add_event(mouse_down_at(2, None));

        let e1 = mgr.next_event().unwrap();
        assert_eq!(e1.what, EventKind::InactivateEvt);
        assert_eq!(e1.window_id, Some(1));

        let e2 = mgr.next_event().unwrap();
        assert_eq!(e2.what, EventKind::ActivateEvt);
        assert_eq!(e2.window_id, Some(2));

        let e3 = mgr.next_event().unwrap();
        assert_eq!(e3.what, EventKind::MouseDown);
        assert_eq!(e3.window_id, Some(2));
    }

    #[test]
    fn mouse_down_on_active_window_has_no_synthesis() {
        let mut mgr = EventManager::new();
        mgr.set_active_window(Some(1));
        mgr.add_event(mouse_down_at(1, None));
        let e = mgr.next_event().unwrap();
        assert_eq!(e.what, EventKind::MouseDown);
        assert!(mgr.is_empty());
    }

    #[test]
    fn mouse_up_over_control_becomes_control_clicked() {
        let mut mgr = EventManager::new();
        let mut e = EventRecord::new(EventKind::MouseUp, 0, 0);
        e.control_id = Some(7);
        mgr.add_event(e);
        let out = mgr.next_event().unwrap();
        assert_eq!(out.what, EventKind::ControlClicked);
        assert_eq!(out.code, 7);
    }

    #[test]
    fn key_events_are_routed_to_active_window() {
        let mut mgr = EventManager::new();
        mgr.set_active_window(Some(9));
        mgr.add_event(EventRecord::new(EventKind::KeyDown, b'a' as u32, 0));
        let e = mgr.next_event().unwrap();
        assert_eq!(e.window_id, Some(9));
    }

    #[test]
    fn full_queue_overwrites_oldest() {
        let mut mgr = EventManager::new();
        for i in 0..EVENT_QUEUE_SIZE {
            mgr.add_event(EventRecord::new(EventKind::DiskEvt, i as u32, i as u32));
        }
        assert!(mgr.is_full());
        mgr.add_event(EventRecord::new(EventKind::DiskEvt, 9999, 9999));
        let first = mgr.next_event().unwrap();
        assert_eq!(first.code, 1);
    }

    #[test]
    fn wait_for_event_drains_non_matching_events_ahead_of_the_match() {
        let mut mgr = EventManager::new();
        mgr.add_event(EventRecord::new(EventKind::DiskEvt, 1, 0));
        mgr.add_event(EventRecord::new(EventKind::DiskEvt, 2, 0));
        mgr.add_event(EventRecord::new(EventKind::ControlClicked, 3, 0));
        mgr.add_event(EventRecord::new(EventKind::DiskEvt, 4, 0));

        let found = mgr.wait_for_event(&[EventKind::ControlClicked]).unwrap();
        assert_eq!(found.code, 3);
        // The trailing DiskEvt past the match is untouched; the two ahead of
        // it were drained along the way.
        assert_eq!(mgr.len(), 1);
        assert_eq!(mgr.next_event().unwrap().code, 4);
    }

    #[test]
    fn wait_for_event_returns_none_when_nothing_matches() {
        let mut mgr = EventManager::new();
        mgr.add_event(EventRecord::new(EventKind::DiskEvt, 1, 0));
        assert!(mgr.wait_for_event(&[EventKind::ControlClicked]).is_none());
        assert!(mgr.is_empty());
    }

    #[test]
    fn remove_events_for_window_drops_matching_and_clears_active() {
        let mut mgr = EventManager::new();
        mgr.set_active_window(Some(3));
        let mut e1 = EventRecord::new(EventKind::UpdateEvt, 0, 0);
        e1.window_id = Some(3);
        let mut e2 = EventRecord::new(EventKind::UpdateEvt, 0, 0);
        e2.window_id = Some(4);
        mgr.add_event(e1);
        mgr.add_event(e2);
        mgr.remove_events_for_window(3);
        assert_eq!(mgr.len(), 1);
        assert_eq!(mgr.next_event().unwrap().window_id, Some(4));
    }
}
