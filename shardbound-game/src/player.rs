//! Player travel state as held by the external player-state store.
//!
//! The encounter core mutates this only through the methods below, so the
//! `0 <= stamina <= max_stamina` and `0 <= hp <= max_hp` invariants hold after
//! every call.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{
    AMBUSH_HISTORY_WINDOW, DEFAULT_MAX_HP, DEFAULT_MAX_STAMINA, DEFAULT_PLAYER_ID,
    DEFAULT_REST_ITEMS, FIELD_RATION_HP_RATIO,
};
use crate::loot::{ItemId, is_non_rare};
use crate::numbers::round_f64_to_i32;
use crate::rng::RngStream;
use crate::world::TilePos;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTravelState {
    pub player_id: String,
    pub position: TilePos,
    pub hp: i32,
    pub max_hp: i32,
    pub stamina: i32,
    pub max_stamina: i32,
    pub rest_items: u32,
    /// Item id to stack count; stacks never hold zero.
    pub inventory: BTreeMap<ItemId, u32>,
    /// Recent ambush outcomes, most recent last.
    pub ambush_history: Vec<bool>,
}

impl Default for PlayerTravelState {
    fn default() -> Self {
        Self {
            player_id: DEFAULT_PLAYER_ID.to_string(),
            position: TilePos::default(),
            hp: DEFAULT_MAX_HP,
            max_hp: DEFAULT_MAX_HP,
            stamina: DEFAULT_MAX_STAMINA,
            max_stamina: DEFAULT_MAX_STAMINA,
            rest_items: DEFAULT_REST_ITEMS,
            inventory: BTreeMap::new(),
            ambush_history: vec![false; AMBUSH_HISTORY_WINDOW],
        }
    }
}

impl PlayerTravelState {
    #[must_use]
    pub fn new(player_id: impl Into<String>, position: TilePos) -> Self {
        Self {
            player_id: player_id.into(),
            position,
            ..Self::default()
        }
    }

    /// Apply `delta` clamped to `[0, max_stamina]`, returning the new value.
    pub fn change_stamina(&mut self, delta: i32) -> i32 {
        self.stamina = clamp_stat(self.stamina.saturating_add(delta), self.max_stamina);
        self.stamina
    }

    pub fn heal_full(&mut self) -> i32 {
        self.hp = self.max_hp.max(0);
        self.hp
    }

    pub fn full_rest(&mut self) {
        self.heal_full();
        self.stamina = self.max_stamina.max(0);
    }

    /// Set the stamina budget and fill it.
    #[must_use]
    pub fn with_max_stamina(mut self, max_stamina: i32) -> Self {
        self.max_stamina = max_stamina;
        self.stamina = max_stamina.max(0);
        self
    }

    /// Consume one rest item for `amount` stamina and a fifth of max hp.
    /// Returns `false` without changes when no rest items remain.
    pub fn use_field_ration(&mut self, amount: i32) -> bool {
        if self.rest_items == 0 {
            return false;
        }
        self.rest_items -= 1;
        self.change_stamina(amount);
        let heal = round_f64_to_i32(f64::from(self.max_hp) * FIELD_RATION_HP_RATIO);
        self.hp = clamp_stat(self.hp.saturating_add(heal), self.max_hp);
        true
    }

    #[must_use]
    pub fn item_count(&self, item_id: &str) -> u32 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.inventory.values().sum()
    }

    pub fn add_item(&mut self, item_id: &str, count: u32) {
        if count == 0 {
            return;
        }
        let stack = self.inventory.entry(item_id.to_string()).or_insert(0);
        *stack = stack.saturating_add(count);
    }

    /// Remove up to `count` units, dropping the stack when it empties.
    /// Returns how many units were actually removed.
    pub fn remove_item(&mut self, item_id: &str, count: u32) -> u32 {
        let Some(stack) = self.inventory.get_mut(item_id) else {
            return 0;
        };
        let removed = count.min(*stack);
        *stack -= removed;
        if *stack == 0 {
            self.inventory.remove(item_id);
        }
        removed
    }

    /// Drop one unit from a randomly chosen non-rare stack.
    pub fn lose_random_non_rare(&mut self, stream: &mut RngStream) -> Option<ItemId> {
        let candidates: Vec<ItemId> = self
            .inventory
            .keys()
            .filter(|item_id| is_non_rare(item_id))
            .cloned()
            .collect();
        let chosen = stream.pick(&candidates)?.clone();
        self.remove_item(&chosen, 1);
        Some(chosen)
    }

    /// Append an outcome, keeping only the newest `window` entries.
    pub fn push_ambush_result(&mut self, happened: bool, window: usize) {
        self.ambush_history.push(happened);
        if self.ambush_history.len() > window {
            let excess = self.ambush_history.len() - window;
            self.ambush_history.drain(..excess);
        }
    }

    /// Defeat recovery: move to `destination` with full stamina and hp.
    pub(crate) fn respawn_at(&mut self, destination: TilePos) {
        self.position = destination;
        self.full_rest();
    }
}

/// Clamp into `[0, max]`; a negative `max` from a corrupt store reads as 0.
fn clamp_stat(value: i32, max: i32) -> i32 {
    value.clamp(0, max.max(0))
}
