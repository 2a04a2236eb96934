//! Trigger filtering

use gauntlet_core::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tag carried by every character body
pub const PAWN_TAG: &str = "pawn";

/// Tag carried by player-controlled characters
pub const PLAYER_TAG: &str = "player";

/// Filter for what entities can activate a trigger.
///
/// The trigger's owner never activates its own volume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerFilter {
    /// Required tags (entity must have all of these)
    pub required_tags: HashSet<String>,
    /// Specific entities that cannot trigger
    pub blocked_entities: HashSet<EntityId>,
}

impl TriggerFilter {
    /// Create a new filter that accepts everything but the owner
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.required_tags.insert(tag.into());
        self
    }

    /// Block specific entities
    pub fn block_entities<I: IntoIterator<Item = EntityId>>(mut self, entities: I) -> Self {
        self.blocked_entities.extend(entities);
        self
    }

    /// Check if an entity passes this filter
    pub fn passes(
        &self,
        entity_id: EntityId,
        entity_tags: &HashSet<String>,
        trigger_owner: EntityId,
    ) -> bool {
        if entity_id == trigger_owner || self.blocked_entities.contains(&entity_id) {
            return false;
        }

        self.required_tags.iter().all(|tag| entity_tags.contains(tag))
    }
}

/// Common filter presets
impl TriggerFilter {
    /// Characters only, player or not
    pub fn pawns_only() -> Self {
        Self::new().with_tag(PAWN_TAG)
    }

    /// Player-controlled characters only
    pub fn player_only() -> Self {
        Self::new().with_tag(PAWN_TAG).with_tag(PLAYER_TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    fn tags(list: &[&str]) -> HashSet<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_filter_presets() {
        let player = tags(&[PAWN_TAG, PLAYER_TAG]);
        let npc = tags(&[PAWN_TAG]);
        let untagged = HashSet::new();

        assert!(TriggerFilter::pawns_only().passes(id(1), &npc, id(0)));
        assert!(TriggerFilter::pawns_only().passes(id(1), &player, id(0)));
        assert!(!TriggerFilter::pawns_only().passes(id(1), &untagged, id(0)));
        assert!(TriggerFilter::player_only().passes(id(1), &player, id(0)));
        assert!(!TriggerFilter::player_only().passes(id(1), &npc, id(0)));
    }

    #[test]
    fn test_filter_self_and_blocked() {
        let empty = HashSet::new();

        assert!(!TriggerFilter::new().passes(id(5), &empty, id(5)));
        assert!(TriggerFilter::new().passes(id(6), &empty, id(5)));

        let filter = TriggerFilter::new().block_entities([id(100), id(200)]);
        assert!(filter.passes(id(50), &empty, id(0)));
        assert!(!filter.passes(id(100), &empty, id(0)));
        assert!(!filter.passes(id(200), &empty, id(0)));
    }
}
