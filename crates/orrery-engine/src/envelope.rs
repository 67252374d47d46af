//! The envelope command protocol.
//!
//! Commands cross the integrator boundary as a named envelope with a
//! payload. Decoding happens on the sending side, before anything is
//! handed to an execution context, so a malformed envelope fails
//! synchronously with a [`ProtocolError`] and a context never sees an
//! unknown command.

use orrery_core::{BodySpec, ProtocolError};

/// A named command with its payload, as submitted by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Command name, matched against the known command set.
    pub name: String,
    /// Payload accompanying the command.
    pub payload: Payload,
}

/// Payload carried by an [`Envelope`].
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// No payload.
    Empty,
    /// A batch of body specifications.
    Bodies(Vec<BodySpec>),
}

/// A decoded, well-formed command.
#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    /// Begin (or resume) ticking.
    Start,
    /// Pause ticking; state is retained.
    Stop,
    /// Tear the execution context down.
    Terminate,
    /// Replace the entire body set, starting a new run generation.
    SetBodies(Vec<BodySpec>),
}

impl Envelope {
    /// Envelope for [`Control::Start`].
    pub fn start() -> Self {
        Self {
            name: "start".into(),
            payload: Payload::Empty,
        }
    }

    /// Envelope for [`Control::Stop`].
    pub fn stop() -> Self {
        Self {
            name: "stop".into(),
            payload: Payload::Empty,
        }
    }

    /// Envelope for [`Control::Terminate`].
    pub fn terminate() -> Self {
        Self {
            name: "terminate".into(),
            payload: Payload::Empty,
        }
    }

    /// Envelope for [`Control::SetBodies`].
    pub fn set_bodies(specs: Vec<BodySpec>) -> Self {
        Self {
            name: "set-bodies".into(),
            payload: Payload::Bodies(specs),
        }
    }

    /// Decode into a [`Control`] command.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::EmptyName`] for a blank name,
    /// [`ProtocolError::UnknownCommand`] for a name outside the command
    /// set, and [`ProtocolError::PayloadMismatch`] when the payload
    /// shape does not match the named command.
    pub fn decode(self) -> Result<Control, ProtocolError> {
        if self.name.is_empty() {
            return Err(ProtocolError::EmptyName);
        }
        match (self.name.as_str(), self.payload) {
            ("start", Payload::Empty) => Ok(Control::Start),
            ("stop", Payload::Empty) => Ok(Control::Stop),
            ("terminate", Payload::Empty) => Ok(Control::Terminate),
            ("set-bodies", Payload::Bodies(specs)) => Ok(Control::SetBodies(specs)),
            ("start", _) => Err(ProtocolError::PayloadMismatch {
                name: "start",
                expected: "no payload",
            }),
            ("stop", _) => Err(ProtocolError::PayloadMismatch {
                name: "stop",
                expected: "no payload",
            }),
            ("terminate", _) => Err(ProtocolError::PayloadMismatch {
                name: "terminate",
                expected: "no payload",
            }),
            ("set-bodies", _) => Err(ProtocolError::PayloadMismatch {
                name: "set-bodies",
                expected: "a body batch",
            }),
            (name, _) => Err(ProtocolError::UnknownCommand { name: name.into() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::Vec2;

    #[test]
    fn known_commands_decode() {
        assert_eq!(Envelope::start().decode().unwrap(), Control::Start);
        assert_eq!(Envelope::stop().decode().unwrap(), Control::Stop);
        assert_eq!(Envelope::terminate().decode().unwrap(), Control::Terminate);

        let specs = vec![BodySpec::new(100.0, Vec2::ZERO, Vec2::ZERO)];
        assert_eq!(
            Envelope::set_bodies(specs.clone()).decode().unwrap(),
            Control::SetBodies(specs)
        );
    }

    #[test]
    fn empty_name_rejected() {
        let envelope = Envelope {
            name: String::new(),
            payload: Payload::Empty,
        };
        assert!(matches!(envelope.decode(), Err(ProtocolError::EmptyName)));
    }

    #[test]
    fn unknown_name_rejected() {
        let envelope = Envelope {
            name: "warp".into(),
            payload: Payload::Empty,
        };
        assert!(matches!(
            envelope.decode(),
            Err(ProtocolError::UnknownCommand { name }) if name == "warp"
        ));
    }

    #[test]
    fn payload_shape_enforced() {
        let envelope = Envelope {
            name: "start".into(),
            payload: Payload::Bodies(Vec::new()),
        };
        assert!(matches!(
            envelope.decode(),
            Err(ProtocolError::PayloadMismatch { name: "start", .. })
        ));

        let envelope = Envelope {
            name: "set-bodies".into(),
            payload: Payload::Empty,
        };
        assert!(matches!(
            envelope.decode(),
            Err(ProtocolError::PayloadMismatch {
                name: "set-bodies",
                ..
            })
        ));
    }
}
