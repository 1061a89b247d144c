//! Phone control protocol (text, one command per transport message).
//!
//! The first whitespace-separated token is a single-character tag, the rest
//! are arguments. Inbound tags come from the phone relay, outbound tags are
//! queued by the master for the relay to fan out to phones.

use std::fmt;
use std::str::{FromStr, SplitWhitespace};

use glam::Vec3;

use crate::ControlError;

/// Commands received from phone controllers.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// `N <id> <name>`
    NewPlayer { id: u32, name: String },
    /// `C <id> <angle>`
    Turn { id: u32, rate: f32 },
    /// `D <id>`
    Disable { id: u32 },
    /// `E <id>`
    Enable { id: u32 },
    /// `I <id>`
    ColourRequest { id: u32 },
}

impl ControlMessage {
    /// Parse one control message.
    ///
    /// Returns `Ok(None)` for anything whose first token is not a known
    /// single-character tag, so relay chatter and future commands pass
    /// through harmlessly.
    pub fn parse(text: &str) -> Result<Option<Self>, ControlError> {
        let mut tokens = text.split_whitespace();
        let tag = match tokens.next() {
            Some(token) => token,
            None => return Err(ControlError::Empty),
        };

        let mut chars = tag.chars();
        let tag = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Ok(None),
        };

        let mut args = Args { tag, tokens };
        let msg = match tag {
            'N' => ControlMessage::NewPlayer {
                id: args.number("id")?,
                name: args.text("name")?.to_string(),
            },
            'C' => ControlMessage::Turn {
                id: args.number("id")?,
                rate: args.float("angle")?,
            },
            'D' => ControlMessage::Disable {
                id: args.number("id")?,
            },
            'E' => ControlMessage::Enable {
                id: args.number("id")?,
            },
            'I' => ControlMessage::ColourRequest {
                id: args.number("id")?,
            },
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }

    /// Player id the command refers to.
    pub fn player_id(&self) -> u32 {
        match self {
            ControlMessage::NewPlayer { id, .. }
            | ControlMessage::Turn { id, .. }
            | ControlMessage::Disable { id }
            | ControlMessage::Enable { id }
            | ControlMessage::ColourRequest { id } => *id,
        }
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMessage::NewPlayer { id, name } => write!(f, "N {id} {name}"),
            ControlMessage::Turn { id, rate } => write!(f, "C {id} {rate}"),
            ControlMessage::Disable { id } => write!(f, "D {id}"),
            ControlMessage::Enable { id } => write!(f, "E {id}"),
            ControlMessage::ColourRequest { id } => write!(f, "I {id}"),
        }
    }
}

struct Args<'a> {
    tag: char,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn text(&mut self, name: &'static str) -> Result<&'a str, ControlError> {
        self.tokens.next().ok_or(ControlError::MissingArgument {
            tag: self.tag,
            name,
        })
    }

    fn number<T: FromStr>(&mut self, name: &'static str) -> Result<T, ControlError> {
        let raw = self.text(name)?;
        raw.parse().map_err(|_| ControlError::InvalidNumber {
            tag: self.tag,
            name,
            value: raw.to_string(),
        })
    }

    fn float(&mut self, name: &'static str) -> Result<f32, ControlError> {
        let value: f32 = self.number(name)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ControlError::InvalidNumber {
                tag: self.tag,
                name,
                value: value.to_string(),
            })
        }
    }
}

/// Which of a player's two display colours a reply carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourSlot {
    /// Tag `A`.
    Primary,
    /// Tag `B`.
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    End,
}

/// Messages queued by the master for the phone relay.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// `A vec3(r, g, b) <id>` / `B vec3(r, g, b) <id>`
    Colour {
        slot: ColourSlot,
        colour: Vec3,
        id: u32,
    },
    /// `P <id>   <points>`
    Score { id: u32, points: i32 },
    /// `T <secondsPassed>`
    Time { seconds: u32 },
    /// `U start` / `U end`
    Session(SessionEvent),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Colour { slot, colour, id } => {
                let tag = match slot {
                    ColourSlot::Primary => 'A',
                    ColourSlot::Secondary => 'B',
                };
                write!(
                    f,
                    "{tag} vec3({:.6}, {:.6}, {:.6}) {id}",
                    colour.x, colour.y, colour.z
                )
            }
            // The relay slices this message by column, keep the three spaces.
            Notification::Score { id, points } => write!(f, "P {id}   {points}"),
            Notification::Time { seconds } => write!(f, "T {seconds}"),
            Notification::Session(SessionEvent::Start) => f.write_str("U start"),
            Notification::Session(SessionEvent::End) => f.write_str("U end"),
        }
    }
}
