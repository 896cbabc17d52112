use thiserror::Error;

/// Errors that can occur while packing a graph into wire text.
///
/// All failures are detected synchronously during the single packing walk
/// and abort the call; no partial output is ever returned.
#[derive(Error, Debug)]
pub enum CantripPackError {
    /// Input data authored the reserved `_special` key itself.
    ///
    /// Untrusted data is never allowed to produce the marker shape
    /// directly: after the final rewrite it would be indistinguishable
    /// from a genuine capability marker on the receiving side. This is a
    /// property of the input, not a transient condition, so it is never
    /// retried.
    #[error("forbidden `_special` key in serialized data")]
    ForgedMarker,

    /// Graph transformation exceeded the recursion ceiling.
    ///
    /// Plain `Value` trees are finite, so this only fires when a to-wire
    /// transform keeps expanding into further to-wire nodes.
    #[error("graph transformation exceeded {0} nested levels")]
    RecursionLimit(usize),

    /// The structural encoder could not represent the transformed tree.
    #[error("failed to encode packed tree: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The operating system randomness source failed.
    ///
    /// The placeholder token must be unpredictable, so there is no
    /// fallback to a weaker source.
    #[error("entropy source failed: {0}")]
    Entropy(#[source] rand::Error),
}

/// Errors that can occur while unpacking wire text back into a graph.
#[derive(Error, Debug)]
pub enum CantripUnpackError {
    /// The packed document is not valid JSON.
    #[error("failed to parse packed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An object carries the `_special` key but is not a well-formed
    /// marker (extra keys, or a label that is not a positive integer).
    #[error("malformed capability marker")]
    MalformedMarker,

    /// A marker references a label the table never assigned.
    #[error("unknown capability label {0}")]
    UnknownLabel(u64),

    /// A marker references a label whose Power has been dropped by every
    /// holder.
    #[error("capability label {0} is no longer live")]
    DefunctLabel(u64),
}
