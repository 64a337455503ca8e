//! Element id allocation for one chat turn

use log::debug;
use mapchat_core_types::ElementType;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

const ROUTE_SUFFIX_LEN: usize = 6;

#[derive(Default)]
struct IdState {
    taken: HashSet<String>,
    next_index: HashMap<ElementType, u64>,
    /// Proposed id -> id actually handed out, for proposals that collided.
    renamed: HashMap<String, String>,
}

/// Hands out map element ids that collide neither with the map-state snapshot nor with
/// ids already handed out during the same turn.
#[derive(Default)]
pub struct ElementIdAllocator {
    state: Mutex<IdState>,
}

impl ElementIdAllocator {
    /// Seed from the serialized map state (a JSON array of elements). An unreadable
    /// snapshot seeds nothing.
    pub fn from_snapshot(map_state: &str) -> Self {
        let taken = match serde_json::from_str::<Value>(map_state) {
            Ok(Value::Array(elements)) => elements
                .iter()
                .filter_map(|el| el.get("id").and_then(|id| id.as_str()))
                .map(str::to_string)
                .collect(),
            Ok(_) => HashSet::new(),
            Err(e) => {
                debug!("Map state is not valid JSON, no ids seeded: error={}", e);
                HashSet::new()
            }
        };

        Self {
            state: Mutex::new(IdState {
                taken,
                ..IdState::default()
            }),
        }
    }

    /// Keep `proposed` if it is free, otherwise allocate `<type>_<n>`.
    pub fn claim(&self, proposed: Option<&str>, element_type: ElementType) -> String {
        let mut state = self.lock();
        if let Some(id) = proposed.map(str::trim).filter(|id| !id.is_empty()) {
            if state.taken.insert(id.to_string()) {
                return id.to_string();
            }
            let allocated = next_sequential(&mut state, element_type);
            debug!("Element id collides, reallocated: proposed={}, id={}", id, allocated);
            state.renamed.insert(id.to_string(), allocated.clone());
            return allocated;
        }
        next_sequential(&mut state, element_type)
    }

    /// The id handed out in place of `proposed`, if an earlier add in this turn collided.
    pub fn renamed(&self, proposed: &str) -> Option<String> {
        self.lock().renamed.get(proposed.trim()).cloned()
    }

    /// `route_<6 alphanumerics>`, unique in the session.
    pub fn route_id(&self) -> String {
        let mut state = self.lock();
        let mut rng = rand::thread_rng();
        loop {
            let suffix: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(ROUTE_SUFFIX_LEN)
                .map(char::from)
                .collect();
            let id = format!("route_{}", suffix);
            if state.taken.insert(id.clone()) {
                return id;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IdState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn next_sequential(state: &mut IdState, element_type: ElementType) -> String {
    let counter = state.next_index.entry(element_type).or_insert(1);
    loop {
        let id = format!("{}_{}", element_type.as_str(), counter);
        *counter += 1;
        if state.taken.insert(id.clone()) {
            return id;
        }
    }
}

#[cfg(test)]
impl ElementIdAllocator {
    fn is_taken(&self, id: &str) -> bool {
        self.lock().taken.contains(id)
    }

    fn len(&self) -> usize {
        self.lock().taken.len()
    }
}
