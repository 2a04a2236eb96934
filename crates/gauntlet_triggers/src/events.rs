//! Trigger events

use gauntlet_core::EntityId;
use serde::{Deserialize, Serialize};

/// Type of trigger event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEventType {
    /// Entity entered the trigger volume
    Enter,
    /// Entity exited the trigger volume (or vanished while inside)
    Exit,
}

/// A trigger event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    /// Type of event
    pub event_type: TriggerEventType,
    /// The trigger entity
    pub trigger_entity: EntityId,
    /// The entity that triggered the event
    pub other_entity: EntityId,
}

impl TriggerEvent {
    /// Create an enter event
    pub fn enter(trigger: EntityId, other: EntityId) -> Self {
        Self {
            event_type: TriggerEventType::Enter,
            trigger_entity: trigger,
            other_entity: other,
        }
    }

    /// Create an exit event
    pub fn exit(trigger: EntityId, other: EntityId) -> Self {
        Self {
            event_type: TriggerEventType::Exit,
            trigger_entity: trigger,
            other_entity: other,
        }
    }

    /// Check if this is an enter event
    pub fn is_enter(&self) -> bool {
        self.event_type == TriggerEventType::Enter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let trigger = EntityId::new(1, 0);
        let other = EntityId::new(2, 0);

        let event = TriggerEvent::enter(trigger, other);
        assert!(event.is_enter());
        assert_eq!(event.trigger_entity, trigger);
        assert_eq!(event.other_entity, other);

        let exit = TriggerEvent::exit(trigger, other);
        assert!(!exit.is_enter());
        assert_eq!(exit.event_type, TriggerEventType::Exit);
    }
}
