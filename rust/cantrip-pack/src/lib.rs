//! Capability-safe JSON packing and unpacking.
//!
//! This crate converts object graphs containing unforgeable capability
//! handles ([`Power`]s) into JSON text, such that every capability appears
//! as a `{"_special": <label>}` marker and nothing in untrusted input can
//! ever forge one.
//!
//! # How the guarantee works
//!
//! Packing never writes the public `_special` key during the structural
//! walk. Instead it:
//!
//! 1. draws a fresh, cryptographically random placeholder token for the
//!    call and derives a transient key, `_special_<token>`;
//! 2. walks the graph, replacing each [`Power`] with a single-key object
//!    keyed by the *transient* name and rejecting any input map that
//!    authors the reserved `_special` key itself;
//! 3. encodes the transformed tree to JSON;
//! 4. rewrites every occurrence of the transient key to `_special`.
//!
//! An attacker cannot guess the transient key (it is fresh 256-bit random
//! data per call), and the one deterministic forgery path — authoring
//! `_special` directly and waiting for step 4 to make it look genuine —
//! is closed by the explicit key guard in step 2.
//!
//! Nodes may declare a custom pre-serialization transform via [`ToWire`];
//! interception runs on the *transformed* value stream, so capabilities
//! and forged keys hiding inside a transform's output are still caught.
//!
//! # Example
//!
//! ```rust
//! use cantrip_pack::{Power, PowerTable, Value, pack, unpack};
//!
//! let table = PowerTable::new();
//! let door = Power::new();
//!
//! let graph = Value::from_iter([
//!     ("door", Value::from(door.clone())),
//!     ("greeting", Value::from("hello")),
//! ]);
//!
//! let text = pack(&table, &graph).unwrap();
//! assert_eq!(text, r#"{"door":{"_special":1},"greeting":"hello"}"#);
//!
//! // Labels are stable for the table's lifetime, so the round trip
//! // resolves back to the identical capability.
//! let revived = unpack(&table, &text).unwrap();
//! assert_eq!(revived.as_map().unwrap()["door"].as_power(), Some(&door));
//! ```

mod error;
pub use error::*;

mod value;
pub use value::*;

mod token;

mod pack;
pub use pack::*;

mod unpack;
pub use unpack::*;

pub use cantrip_power::{Power, PowerTable};
