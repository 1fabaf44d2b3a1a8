//! Transaction and log identifiers.

use std::fmt;

/// Identifies the transaction that modified a buffer.
///
/// The buffer manager only compares these for equality; numbering is owned
/// by the transaction layer.
///
/// # Example
/// ```
/// use blockbuf::TxnId;
///
/// let txn = TxnId::new(5);
/// assert_eq!(txn.0, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxnId(pub u64);

impl TxnId {
    /// Create a new TxnId.
    #[inline]
    pub fn new(id: u64) -> Self {
        TxnId(id)
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txn({})", self.0)
    }
}

/// Log sequence number of the log record describing a modification.
///
/// Stamped into the page header when the buffer is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lsn(pub u64);

impl Lsn {
    /// Create a new Lsn.
    #[inline]
    pub fn new(lsn: u64) -> Self {
        Lsn(lsn)
    }
}

impl fmt::Display for Lsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lsn({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txn_id_equality() {
        assert_eq!(TxnId::new(5), TxnId::new(5));
        assert_ne!(TxnId::new(5), TxnId::new(6));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", TxnId::new(42)), "Txn(42)");
        assert_eq!(format!("{}", Lsn::new(7)), "Lsn(7)");
    }

    #[test]
    fn test_lsn_new_orders_by_value() {
        assert_eq!(Lsn::new(3), Lsn(3));
        assert!(Lsn::new(3) < Lsn::new(10));
    }
}
