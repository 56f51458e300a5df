use crate::media::{DeviceId, DeviceSelection};
use trellis_core::model::MediaKind;

/// What the embedding UI asks the mesh loop to do.
#[derive(Debug)]
pub enum MeshCommand {
    /// Announce ourselves to the relay's video room.
    Join,
    /// Leave the room, closing every connection.
    Leave,
    /// Flip the mute flag of one kind and announce the new state.
    Toggle(MediaKind),
    /// Acquire capture tracks for the selected devices.
    OpenMedia(DeviceSelection),
    /// Re-acquire one kind from another device and swap it in place.
    SwitchDevice { kind: MediaKind, device: DeviceId },
}
