//! Per-obstacle overlap volume and the bodies currently inside it

use crate::events::TriggerEvent;
use crate::filter::TriggerFilter;
use crate::volume::TriggerVolume;
use gauntlet_core::EntityId;
use std::collections::{BTreeSet, HashSet};

/// Overlap volume attached to an obstacle
#[derive(Debug)]
pub struct TriggerComponent {
    /// Shape in the owner's local frame
    pub volume: TriggerVolume,
    /// Which bodies count
    pub filter: TriggerFilter,
    enabled: bool,
    overlapping: BTreeSet<EntityId>,
    event_queue: Vec<TriggerEvent>,
}

impl TriggerComponent {
    /// Volume with no filter
    pub fn new(volume: TriggerVolume) -> Self {
        Self {
            volume,
            filter: TriggerFilter::new(),
            enabled: true,
            overlapping: BTreeSet::new(),
            event_queue: Vec::new(),
        }
    }

    /// Restrict which bodies count
    pub fn with_filter(mut self, filter: TriggerFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Whether `entity` is inside
    pub fn is_inside(&self, entity: EntityId) -> bool {
        self.overlapping.contains(&entity)
    }

    /// All entities currently inside, in handle order
    pub fn overlapping(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.overlapping.iter().copied()
    }

    /// Whether the trigger is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the trigger.
    ///
    /// Disabling forgets every overlap without exit events, matching a
    /// collision shape being switched off; re-enabling reports enters for
    /// whoever is still inside.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            self.overlapping.clear();
        }
        self.enabled = enabled;
    }

    /// Drop an entity that no longer exists, emitting its exit
    pub fn forget(&mut self, trigger_entity: EntityId, other_entity: EntityId) {
        if self.overlapping.remove(&other_entity) {
            self.event_queue.push(TriggerEvent::exit(trigger_entity, other_entity));
        }
    }

    /// Process an entity's overlap state for this frame
    pub fn process_overlap(
        &mut self,
        trigger_entity: EntityId,
        other_entity: EntityId,
        is_overlapping: bool,
        entity_tags: &HashSet<String>,
    ) {
        if !self.enabled || !self.filter.passes(other_entity, entity_tags, trigger_entity) {
            return;
        }

        if is_overlapping {
            if self.overlapping.insert(other_entity) {
                self.event_queue.push(TriggerEvent::enter(trigger_entity, other_entity));
            }
        } else {
            self.forget(trigger_entity, other_entity);
        }
    }

    /// Take the queued enters and exits
    pub fn drain_events(&mut self) -> Vec<TriggerEvent> {
        std::mem::take(&mut self.event_queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TriggerEventType;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_trigger_overlap() {
        let mut trigger = TriggerComponent::new(TriggerVolume::sphere(1.0));
        let tags = HashSet::new();

        // Runner steps in
        trigger.process_overlap(id(1), id(2), true, &tags);
        assert!(trigger.is_inside(id(2)));

        // stays: no second enter
        trigger.process_overlap(id(1), id(2), true, &tags);

        // and back out
        trigger.process_overlap(id(1), id(2), false, &tags);
        assert!(!trigger.is_inside(id(2)));

        let events = trigger.drain_events();
        assert_eq!(events.len(), 2);
        assert!(events[0].is_enter());
        assert_eq!(events[1].event_type, TriggerEventType::Exit);
        assert!(trigger.drain_events().is_empty());
    }

    #[test]
    fn test_filtered_body_is_ignored() {
        let mut trigger =
            TriggerComponent::new(TriggerVolume::sphere(1.0)).with_filter(TriggerFilter::pawns_only());

        trigger.process_overlap(id(1), id(2), true, &HashSet::new());
        assert!(!trigger.is_inside(id(2)));
        assert!(trigger.drain_events().is_empty());
    }

    #[test]
    fn test_disable_forgets_overlaps_silently() {
        let mut trigger = TriggerComponent::new(TriggerVolume::sphere(1.0));
        let tags = HashSet::new();

        trigger.process_overlap(id(1), id(2), true, &tags);
        trigger.drain_events();

        trigger.set_enabled(false);
        assert!(!trigger.is_enabled());
        assert!(!trigger.is_inside(id(2)));
        assert!(trigger.drain_events().is_empty());

        // Ignored while disabled
        trigger.process_overlap(id(1), id(2), true, &tags);
        assert!(trigger.drain_events().is_empty());

        // Fresh enter once re-enabled
        trigger.set_enabled(true);
        trigger.process_overlap(id(1), id(2), true, &tags);
        let events = trigger.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_enter());
    }

    #[test]
    fn test_forget_emits_exit() {
        let mut trigger = TriggerComponent::new(TriggerVolume::sphere(1.0));
        let tags = HashSet::new();

        trigger.process_overlap(id(1), id(2), true, &tags);
        trigger.drain_events();

        trigger.forget(id(1), id(2));
        let events = trigger.drain_events();
        assert_eq!(events, vec![TriggerEvent::exit(id(1), id(2))]);

        trigger.forget(id(1), id(2));
        assert!(trigger.drain_events().is_empty());
    }
}
