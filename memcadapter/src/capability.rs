use std::fmt;

/// Operations that make up the generic cache engine contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Write,
    Read,
    Increment,
    Decrement,
    Delete,
    WriteMany,
    ReadMany,
    DeleteMany,
    Clear,
    Groups,
    ClearGroup,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::Write,
        Operation::Read,
        Operation::Increment,
        Operation::Decrement,
        Operation::Delete,
        Operation::WriteMany,
        Operation::ReadMany,
        Operation::DeleteMany,
        Operation::Clear,
        Operation::Groups,
        Operation::ClearGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Write => "write",
            Operation::Read => "read",
            Operation::Increment => "increment",
            Operation::Decrement => "decrement",
            Operation::Delete => "delete",
            Operation::WriteMany => "write_many",
            Operation::ReadMany => "read_many",
            Operation::DeleteMany => "delete_many",
            Operation::Clear => "clear",
            Operation::Groups => "groups",
            Operation::ClearGroup => "clear_group",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of operations an engine actually implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    bits: u16,
}

impl CapabilitySet {
    pub const fn empty() -> Self {
        CapabilitySet { bits: 0 }
    }

    /// Single-key operations: the only ones backed by the memcached adapter.
    pub const fn single_key() -> Self {
        CapabilitySet::empty()
            .with(Operation::Write)
            .with(Operation::Read)
            .with(Operation::Increment)
            .with(Operation::Decrement)
            .with(Operation::Delete)
    }

    pub const fn with(self, operation: Operation) -> Self {
        CapabilitySet {
            bits: self.bits | operation.bit(),
        }
    }

    pub const fn contains(&self, operation: Operation) -> bool {
        self.bits & operation.bit() != 0
    }

    pub fn supported(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL
            .into_iter()
            .filter(move |operation| self.contains(*operation))
    }

    pub fn unsupported(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL
            .into_iter()
            .filter(move |operation| !self.contains(*operation))
    }
}

/// Cache capabilities
pub trait CacheCapability {
    fn capabilities(&self) -> CapabilitySet;

    fn is_supported(&self, operation: Operation) -> bool {
        self.capabilities().contains(operation)
    }
}
