use trellis_core::model::{ClientMessage, SessionId};

/// Commands fed to the relay task by the socket layer.
#[derive(Debug)]
pub enum RelayCommand {
    /// A parsed client message, tagged with the session it came in on.
    Message {
        session_id: SessionId,
        message: ClientMessage,
    },

    /// The session's socket went away (close frame, error, or missed
    /// heartbeats). Equivalent to an explicit leave.
    Disconnect { session_id: SessionId },
}
