//! Matchmaking service
//!
//! Owns the single waiting slot and the room registry. Every operation returns
//! the messages it wants delivered instead of writing to sockets, so the
//! pairing rules can be exercised without a network stack.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use crate::protocol::{ServerMessage, StatePayload};

/// A message addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery<C> {
    pub to: C,
    pub message: ServerMessage,
}

impl<C> Delivery<C> {
    pub fn new(to: C, message: ServerMessage) -> Self {
        Self { to, message }
    }
}

#[derive(Debug)]
pub struct Matchmaker<C> {
    waiting: Option<C>,
    /// room id -> members still connected
    rooms: HashMap<String, Vec<C>>,
    membership: HashMap<C, String>,
}

impl<C> Default for Matchmaker<C> {
    fn default() -> Self {
        Self {
            waiting: None,
            rooms: HashMap::new(),
            membership: HashMap::new(),
        }
    }
}

impl<C> Matchmaker<C>
where
    C: Copy + Eq + Hash + Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupy the waiting slot, or pair with whoever holds it.
    pub fn connect(&mut self, id: C) -> Vec<Delivery<C>> {
        match self.waiting.take() {
            Some(waiting) if waiting != id => {
                let room = format!("room_{}_{}", waiting, id);
                self.rooms.insert(room.clone(), vec![waiting, id]);
                self.membership.insert(waiting, room.clone());
                self.membership.insert(id, room.clone());

                [waiting, id]
                    .into_iter()
                    .map(|to| Delivery::new(to, ServerMessage::Start { room: room.clone() }))
                    .collect()
            }
            _ => {
                self.waiting = Some(id);
                vec![Delivery::new(id, ServerMessage::Waiting)]
            }
        }
    }

    /// Forward a state update to the rest of the sender's room.
    pub fn relay_state(&self, from: C, payload: StatePayload) -> Vec<Delivery<C>> {
        self.peers_of(from)
            .map(|to| Delivery::new(to, ServerMessage::OpponentState(payload.clone())))
            .collect()
    }

    /// Winner gets `game_over_win`, everyone else in the room `game_over_lose`.
    ///
    /// Ignored outside a room.
    pub fn declare_win(&self, from: C) -> Vec<Delivery<C>> {
        if self.room_of(from).is_none() {
            return Vec::new();
        }
        let mut out: Vec<Delivery<C>> = self
            .peers_of(from)
            .map(|to| Delivery::new(to, ServerMessage::GameOverLose))
            .collect();
        out.push(Delivery::new(from, ServerMessage::GameOverWin));
        out
    }

    /// Forget `id`. The remaining room member is not notified.
    pub fn disconnect(&mut self, id: C) {
        if self.waiting == Some(id) {
            self.waiting = None;
        }

        if let Some(room) = self.membership.remove(&id) {
            if let Some(members) = self.rooms.get_mut(&room) {
                members.retain(|m| *m != id);
                if members.is_empty() {
                    self.rooms.remove(&room);
                }
            }
        }
    }

    pub fn room_of(&self, id: C) -> Option<&str> {
        self.membership.get(&id).map(String::as_str)
    }

    pub fn waiting(&self) -> Option<C> {
        self.waiting
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn peers_of(&self, id: C) -> impl Iterator<Item = C> + '_ {
        self.membership
            .get(&id)
            .and_then(|room| self.rooms.get(room))
            .into_iter()
            .flatten()
            .copied()
            .filter(move |m| *m != id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired() -> Matchmaker<u32> {
        let mut mm = Matchmaker::new();
        mm.connect(1);
        mm.connect(2);
        mm
    }

    #[test]
    fn test_first_connection_waits() {
        let mut mm = Matchmaker::new();
        let out = mm.connect(1u32);
        assert_eq!(out, vec![Delivery::new(1, ServerMessage::Waiting)]);
        assert_eq!(mm.waiting(), Some(1));
        assert_eq!(mm.room_of(1), None);
    }

    #[test]
    fn test_second_connection_pairs_both() {
        let mut mm = Matchmaker::new();
        mm.connect(1u32);
        let out = mm.connect(2);

        let start = ServerMessage::Start {
            room: "room_1_2".to_string(),
        };
        assert_eq!(
            out,
            vec![Delivery::new(1, start.clone()), Delivery::new(2, start)]
        );
        assert_eq!(mm.waiting(), None);
        assert_eq!(mm.room_of(1), Some("room_1_2"));
        assert_eq!(mm.room_of(2), Some("room_1_2"));
    }

    #[test]
    fn test_third_connection_waits_again() {
        let mut mm = paired();
        let out = mm.connect(3);
        assert_eq!(out, vec![Delivery::new(3, ServerMessage::Waiting)]);
        assert_eq!(mm.room_count(), 1);
    }

    #[test]
    fn test_relay_goes_to_opponent_only() {
        let mut mm = paired();
        mm.connect(3);
        let payload = StatePayload {
            score: 40,
            rows: 1,
            ..StatePayload::default()
        };
        let out = mm.relay_state(1, payload.clone());
        assert_eq!(
            out,
            vec![Delivery::new(2, ServerMessage::OpponentState(payload.clone()))]
        );
        assert!(mm.relay_state(3, payload).is_empty());
    }

    #[test]
    fn test_declare_win_notifies_both_sides() {
        let mm = paired();
        let out = mm.declare_win(2);
        assert_eq!(
            out,
            vec![
                Delivery::new(1, ServerMessage::GameOverLose),
                Delivery::new(2, ServerMessage::GameOverWin),
            ]
        );
    }

    #[test]
    fn test_declare_win_without_room_is_ignored() {
        let mut mm = Matchmaker::new();
        mm.connect(1u32);
        assert!(mm.declare_win(1).is_empty());
    }

    #[test]
    fn test_disconnect_clears_waiting_slot() {
        let mut mm = Matchmaker::new();
        mm.connect(1u32);
        mm.disconnect(1);
        assert_eq!(mm.waiting(), None);

        let out = mm.connect(2);
        assert_eq!(out, vec![Delivery::new(2, ServerMessage::Waiting)]);
    }

    #[test]
    fn test_disconnect_in_room_leaves_peer_alone() {
        let mut mm = paired();
        mm.disconnect(1);
        assert_eq!(mm.room_of(1), None);
        assert_eq!(mm.room_of(2), Some("room_1_2"));
        assert!(mm.relay_state(2, StatePayload::default()).is_empty());
        assert_eq!(mm.declare_win(2).len(), 1);

        mm.disconnect(2);
        assert_eq!(mm.room_count(), 0);
    }
}
