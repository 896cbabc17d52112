use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The payload behind a [`Power`] handle. It carries no data: the backing
/// allocation exists only to give each Power a distinct identity.
pub(crate) struct PowerCell;

/// An opaque, unforgeable capability handle.
///
/// Identity is the only meaningful attribute of a `Power`: equality,
/// hashing and labeling all go by the backing allocation, never by
/// content. Cloning produces another handle to the *same* capability.
///
/// Powers are minted by application code and merely observed by the
/// serialization layer.
///
/// # Example
///
/// ```rust
/// use cantrip_power::Power;
///
/// let door = Power::new();
/// let same = door.clone();
/// let other = Power::new();
///
/// assert_eq!(door, same);
/// assert_ne!(door, other);
/// ```
#[derive(Clone)]
pub struct Power(pub(crate) Arc<PowerCell>);

impl Power {
    /// Mint a fresh capability with a distinct identity.
    pub fn new() -> Self {
        Self(Arc::new(PowerCell))
    }

    /// The address of the backing allocation, used as the identity key.
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl Default for Power {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Power {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Power({:p})", Arc::as_ptr(&self.0))
    }
}

impl PartialEq for Power {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Power {}

impl Hash for Power {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}
