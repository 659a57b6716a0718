//! Function identities and name interning.

pub mod intern;
pub mod key;

pub use intern::{InternTable, Symbol};
pub use key::{FunctionDescriptor, FunctionKey, FunctionKind};
