//! Tool activity indicators.
//!
//! Each `(agent, tool)` key holds at most one indicator, moving through
//! `Active -> FadeScheduled -> Fading -> removed`. Every pending step is a
//! timer in the manager's own [`Scheduler`], and the slot stores that timer's
//! id. Superseding or removing a slot cancels its timer, and a fired step is
//! applied only when the slot still holds the same handle and timer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::core::html::{escape_attr, escape_text};
use crate::core::scheduler::{Scheduler, TimerId};
use crate::render::avatar_class;

use super::tool_table::describe;

/// Display delays for indicator fades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorTimings {
    /// `tool_complete` to fade start.
    pub complete_delay: Duration,
    /// Agent message arrival to fade start.
    pub message_delay: Duration,
    /// Fade start to removal.
    pub fade_duration: Duration,
}

impl Default for IndicatorTimings {
    fn default() -> Self {
        Self {
            complete_delay: Duration::from_millis(2000),
            message_delay: Duration::from_millis(1500),
            fade_duration: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndicatorKey {
    pub agent: String,
    pub tool: String,
}

impl IndicatorKey {
    pub fn new(agent: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            tool: tool.into(),
        }
    }
}

/// Identity of one displayed indicator. A superseding `start` gets a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorHandle(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorView {
    pub handle: IndicatorHandle,
    pub key: IndicatorKey,
    pub icon: &'static str,
    pub label: String,
}

impl IndicatorView {
    pub fn to_html(&self) -> String {
        let class = escape_attr(&avatar_class(&self.key.agent));
        format!(
            "<div class=\"tool-indicator\" data-tool-key=\"{}-{}\"><div class=\"agent-avatar {class}\"></div><div class=\"tool-indicator-content\"><span class=\"tool-emoji\">{}</span><span class=\"tool-text\">{}</span><span class=\"tool-agent\">{}</span></div></div>",
            escape_attr(&self.key.agent),
            escape_attr(&self.key.tool),
            self.icon,
            escape_text(&self.label),
            escape_text(&self.key.agent),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorPhase {
    Active,
    FadeScheduled,
    Fading,
}

/// Display change produced by the manager, drained by the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorChange {
    Shown(IndicatorView),
    Fading(IndicatorHandle),
    Removed(IndicatorHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Active,
    FadeScheduled(TimerId),
    Fading(TimerId),
}

#[derive(Debug)]
struct Slot {
    view: IndicatorView,
    state: SlotState,
}

impl Slot {
    fn timer(&self) -> Option<TimerId> {
        match self.state {
            SlotState::Active => None,
            SlotState::FadeScheduled(timer) | SlotState::Fading(timer) => Some(timer),
        }
    }
}

#[derive(Debug, Clone)]
enum Step {
    BeginFade(IndicatorKey, IndicatorHandle),
    Remove(IndicatorKey, IndicatorHandle),
}

#[derive(Debug, Default)]
pub struct IndicatorManager {
    timings: IndicatorTimings,
    slots: HashMap<IndicatorKey, Slot>,
    timers: Scheduler<Step>,
    next_handle: u64,
    changes: Vec<IndicatorChange>,
}

impl IndicatorManager {
    pub fn new(timings: IndicatorTimings) -> Self {
        Self {
            timings,
            ..Self::default()
        }
    }

    pub fn timings(&self) -> IndicatorTimings {
        self.timings
    }

    /// Shows a new indicator for `(agent, tool)`, removing any existing one
    /// for the same key first.
    pub fn start(&mut self, agent: &str, tool: &str) -> IndicatorHandle {
        let key = IndicatorKey::new(agent, tool);
        if let Some(previous) = self.slots.remove(&key) {
            self.discard(previous);
        }

        let handle = IndicatorHandle(self.next_handle);
        self.next_handle += 1;
        let described = describe(tool);
        let view = IndicatorView {
            handle,
            key: key.clone(),
            icon: described.icon,
            label: described.label,
        };
        debug!(agent, tool, "tool indicator shown");
        self.changes.push(IndicatorChange::Shown(view.clone()));
        self.slots.insert(
            key,
            Slot {
                view,
                state: SlotState::Active,
            },
        );
        handle
    }

    /// Schedules the fade for `(agent, tool)`. Returns false when no indicator
    /// exists for the key.
    pub fn complete(&mut self, agent: &str, tool: &str, now: Instant) -> bool {
        let key = IndicatorKey::new(agent, tool);
        if !self.slots.contains_key(&key) {
            return false;
        }
        self.schedule_fade(&key, now + self.timings.complete_delay);
        true
    }

    /// Schedules the fade for every indicator of `agent`, each on its own
    /// timer. Returns the number of indicators affected.
    pub fn clear_for_agent(&mut self, agent: &str, now: Instant) -> usize {
        let keys: Vec<IndicatorKey> = self
            .slots
            .keys()
            .filter(|key| key.agent == agent)
            .cloned()
            .collect();
        let at = now + self.timings.message_delay;
        for key in &keys {
            self.schedule_fade(key, at);
        }
        keys.len()
    }

    /// Removes every indicator immediately and cancels all pending steps.
    pub fn clear_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            self.changes.push(IndicatorChange::Removed(slot.view.handle));
        }
        self.timers.clear();
    }

    /// Applies every step due at or before `now`.
    pub fn tick(&mut self, now: Instant) {
        for (timer, step) in self.timers.pop_due(now) {
            match step {
                Step::BeginFade(key, handle) => {
                    let Some(slot) = self.slots.get_mut(&key) else {
                        continue;
                    };
                    if slot.view.handle != handle || slot.state != SlotState::FadeScheduled(timer) {
                        continue;
                    }
                    let removal = self
                        .timers
                        .schedule(now + self.timings.fade_duration, Step::Remove(key, handle));
                    slot.state = SlotState::Fading(removal);
                    self.changes.push(IndicatorChange::Fading(handle));
                }
                Step::Remove(key, handle) => {
                    let current = self.slots.get(&key).is_some_and(|slot| {
                        slot.view.handle == handle && slot.state == SlotState::Fading(timer)
                    });
                    if current {
                        self.slots.remove(&key);
                        debug!(agent = %key.agent, tool = %key.tool, "tool indicator removed");
                        self.changes.push(IndicatorChange::Removed(handle));
                    }
                }
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn drain_changes(&mut self) -> Vec<IndicatorChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn phase(&self, agent: &str, tool: &str) -> Option<IndicatorPhase> {
        self.slots
            .get(&IndicatorKey::new(agent, tool))
            .map(|slot| match slot.state {
                SlotState::Active => IndicatorPhase::Active,
                SlotState::FadeScheduled(_) => IndicatorPhase::FadeScheduled,
                SlotState::Fading(_) => IndicatorPhase::Fading,
            })
    }

    pub fn view(&self, agent: &str, tool: &str) -> Option<&IndicatorView> {
        self.slots
            .get(&IndicatorKey::new(agent, tool))
            .map(|slot| &slot.view)
    }

    /// Moves the slot to `FadeScheduled` at `at`. A slot already fading is
    /// left alone, and an already scheduled fade is only moved earlier.
    fn schedule_fade(&mut self, key: &IndicatorKey, at: Instant) {
        let Some(slot) = self.slots.get_mut(key) else {
            return;
        };
        match slot.state {
            SlotState::Fading(_) => return,
            SlotState::FadeScheduled(timer) => {
                if self.timers.deadline(timer).is_some_and(|pending| pending <= at) {
                    return;
                }
                self.timers.cancel(timer);
            }
            SlotState::Active => {}
        }
        let timer = self
            .timers
            .schedule(at, Step::BeginFade(key.clone(), slot.view.handle));
        slot.state = SlotState::FadeScheduled(timer);
    }

    fn discard(&mut self, slot: Slot) {
        if let Some(timer) = slot.timer() {
            self.timers.cancel(timer);
        }
        self.changes.push(IndicatorChange::Removed(slot.view.handle));
    }
}
