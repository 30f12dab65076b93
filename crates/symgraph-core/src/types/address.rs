//! Virtual address type.

use std::fmt;

/// Strongly typed virtual address inside the analysed binary
///
/// Addresses show up in two places in the reflection model: the call address
/// of every reflected function, and the `type_of_address` of every type (the
/// location of the static that a runtime loader patches to point at the type
/// object).
///
/// An address of zero means "unresolved": the function was inlined or
/// optimized away, or no type accessor exists for the type.
///
/// ## Example
///
/// ```rust
/// use symgraph_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// assert!(addr.is_resolved());
/// assert!(!Address::ZERO.is_resolved());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The unresolved address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether the symbol source actually resolved this address
    pub const fn is_resolved(self) -> bool
    {
        self.0 != 0
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}
