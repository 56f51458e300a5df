use std::collections::{HashMap, HashSet};
use trellis_core::model::{ChatRoomInfo, RoomName, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    Entered,
    AlreadyIn,
    UnknownRoom,
}

/// Membership of the fixed chat room set. Rooms come from configuration
/// and outlive their members; entering anything else is rejected.
#[derive(Debug, Default)]
pub struct ChatRooms {
    rooms: HashMap<RoomName, HashSet<SessionId>>,
}

impl ChatRooms {
    pub fn new(default_rooms: Vec<RoomName>) -> Self {
        Self {
            rooms: default_rooms
                .into_iter()
                .map(|room| (room, HashSet::new()))
                .collect(),
        }
    }

    /// Name and occupancy of every room, ordered by name.
    pub fn listing(&self) -> Vec<ChatRoomInfo> {
        let mut rooms: Vec<ChatRoomInfo> = self
            .rooms
            .iter()
            .map(|(name, members)| ChatRoomInfo {
                name: name.clone(),
                occupancy: members.len(),
            })
            .collect();
        rooms.sort_by(|a, b| a.name.0.cmp(&b.name.0));
        rooms
    }

    pub fn enter(&mut self, room: &RoomName, session_id: SessionId) -> EnterOutcome {
        let Some(members) = self.rooms.get_mut(room) else {
            return EnterOutcome::UnknownRoom;
        };
        if members.insert(session_id) {
            EnterOutcome::Entered
        } else {
            EnterOutcome::AlreadyIn
        }
    }

    pub fn is_member(&self, room: &RoomName, session_id: &SessionId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(session_id))
    }

    pub fn members_of(&self, room: &RoomName) -> Vec<SessionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn leave(&mut self, room: &RoomName, session_id: &SessionId) -> bool {
        self.rooms
            .get_mut(room)
            .is_some_and(|members| members.remove(session_id))
    }

    /// Drops the session from every room it was in, returning those
    /// rooms. Used when its socket disconnects.
    pub fn leave_all(&mut self, session_id: &SessionId) -> Vec<RoomName> {
        let mut left = Vec::new();
        for (room, members) in &mut self.rooms {
            if members.remove(session_id) {
                left.push(room.clone());
            }
        }
        left
    }
}
