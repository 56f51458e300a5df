use std::collections::HashMap;
use trellis_core::BiMap;
use trellis_core::model::{MediaState, PeerId, RoomMember, RoomName, SessionId};

#[derive(Debug, Default)]
struct RoomState {
    members: HashMap<SessionId, MediaState>,
    identities: BiMap<SessionId, PeerId>,
}

/// What a departing session took with it.
#[derive(Debug, Clone, PartialEq)]
pub struct LeftMember {
    pub room: RoomName,
    pub peer_id: PeerId,
}

/// Membership bookkeeping for every live room: which sessions are
/// joined, the peer identity each one claimed, and the media state it
/// last broadcast. Rooms come into being on first join and vanish when
/// the last member leaves.
///
/// Purely synchronous; the relay task is its only owner, so every
/// mutation happens inside one command handler invocation.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomName, RoomState>,
    session_rooms: HashMap<SessionId, RoomName>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the session to the room. The caller is expected to have
    /// removed the session from any previous room first.
    pub fn join(
        &mut self,
        room: RoomName,
        session_id: SessionId,
        peer_id: PeerId,
        media: MediaState,
    ) {
        let state = self.rooms.entry(room.clone()).or_default();
        state.members.insert(session_id.clone(), media);
        state.identities.set(session_id.clone(), peer_id);
        self.session_rooms.insert(session_id, room);
    }

    /// Removes whichever session currently holds `peer_id` in `room`,
    /// returning it. Lets a reconnecting participant displace its own
    /// stale session before rejoining.
    pub fn evict_identity(&mut self, room: &RoomName, peer_id: &PeerId) -> Option<SessionId> {
        let state = self.rooms.get_mut(room)?;
        let stale = state.identities.remove_by_value(peer_id)?;
        state.members.remove(&stale);
        self.session_rooms.remove(&stale);
        if state.members.is_empty() {
            self.rooms.remove(room);
        }
        Some(stale)
    }

    /// Removes the session from its room, if it is in one. A miss is a
    /// silent no-op, so duplicate leaves and leave/disconnect races
    /// cost nothing.
    pub fn leave(&mut self, session_id: &SessionId) -> Option<LeftMember> {
        let room = self.session_rooms.remove(session_id)?;
        let state = self.rooms.get_mut(&room)?;
        state.members.remove(session_id);
        let peer_id = state.identities.remove_by_key(session_id)?;
        let drained = state.members.is_empty();
        if drained {
            self.rooms.remove(&room);
        }
        Some(LeftMember { room, peer_id })
    }

    pub fn room_of(&self, session_id: &SessionId) -> Option<&RoomName> {
        self.session_rooms.get(session_id)
    }

    pub fn is_member(&self, room: &RoomName, session_id: &SessionId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|state| state.members.contains_key(session_id))
    }

    pub fn members_of(&self, room: &RoomName) -> Vec<SessionId> {
        self.rooms
            .get(room)
            .map(|state| state.members.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Roster snapshot for a membership broadcast, ordered by peer id
    /// so every recipient sees the same list.
    pub fn roster(&self, room: &RoomName) -> Vec<RoomMember> {
        let Some(state) = self.rooms.get(room) else {
            return Vec::new();
        };
        let mut members: Vec<RoomMember> = state
            .identities
            .entries()
            .into_iter()
            .map(|(session_id, peer_id)| RoomMember { session_id, peer_id })
            .collect();
        members.sort_by_key(|member| member.peer_id.0);
        members
    }

    pub fn peer_of(&self, session_id: &SessionId) -> Option<PeerId> {
        let room = self.session_rooms.get(session_id)?;
        self.rooms
            .get(room)?
            .identities
            .get_by_key(session_id)
            .cloned()
    }

    /// Records the media state a member last broadcast. Returns false
    /// when the session is not joined anywhere.
    pub fn set_media(&mut self, session_id: &SessionId, media: MediaState) -> bool {
        let Some(room) = self.session_rooms.get(session_id) else {
            return false;
        };
        let Some(state) = self.rooms.get_mut(room) else {
            return false;
        };
        match state.members.get_mut(session_id) {
            Some(entry) => {
                *entry = media;
                true
            }
            None => false,
        }
    }

    pub fn media_of(&self, session_id: &SessionId) -> Option<MediaState> {
        let room = self.session_rooms.get(session_id)?;
        self.rooms.get(room)?.members.get(session_id).copied()
    }
}
