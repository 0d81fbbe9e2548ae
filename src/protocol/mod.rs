//! # Cluster server protocol (client view)
//!
//! The servers speak a message-oriented request/response protocol: the client
//! submits a statement, the server answers with a sequence of frames --
//! zero or more notices (warnings, session state deltas), optional result-set
//! traffic, and exactly one terminal frame (success or error). The byte-level
//! codec lives in the transport layer; this module only defines the decoded
//! message taxonomy and the machinery that turns a message sequence into one
//! statement result:
//!
//! * [`packet`] -- the message sum types delivered by the codec;
//! * [`statement`] -- the client-side statement value;
//! * [`aggregate`] -- per-statement handlers folding messages into a result;
//! * [`reader`] -- the per-connection dispatch loop feeding the handlers.

pub mod aggregate;
pub mod packet;
pub mod reader;
pub mod statement;
