//! Function identity keys.
//!
//! A raw [`FunctionDescriptor`] arrives with every entry event. It is
//! reduced to a [`FunctionKey`]: a category, the built-in flag and an
//! interned display name. Named categories (functions, methods, fibers)
//! match on their name without regard to ASCII case; every other
//! category matches on the category alone.

use super::intern::{InternTable, Symbol};
use serde::{Deserialize, Serialize};

/// Placeholder for a method whose class cannot be determined
pub const UNKNOWN_CLASS: &str = "?";

/// Category of a callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Function,
    Method,
    StaticMethod,
    Fiber,
    Eval,
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
    Main,
    InternalPass,
    Unknown,
}

impl FunctionKind {
    /// Whether keys of this kind are told apart by name
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            FunctionKind::Function
                | FunctionKind::Method
                | FunctionKind::StaticMethod
                | FunctionKind::Fiber
        )
    }

    /// Fixed display text for kinds that carry no name of their own
    pub fn placeholder(&self) -> &'static str {
        match self {
            FunctionKind::Function | FunctionKind::Unknown => "{unknown}",
            FunctionKind::Method | FunctionKind::StaticMethod => UNKNOWN_CLASS,
            FunctionKind::Fiber => "{fiber}",
            FunctionKind::Eval => "eval",
            FunctionKind::Include => "include",
            FunctionKind::IncludeOnce => "include_once",
            FunctionKind::Require => "require",
            FunctionKind::RequireOnce => "require_once",
            FunctionKind::Main => "{main}",
            FunctionKind::InternalPass => "{internal}",
        }
    }
}

/// Raw function identity as reported by the instrumentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub kind: FunctionKind,

    /// Function or method name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Class that defines the method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// Runtime class of the object the method was called on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_class: Option<String>,

    /// Built-in rather than user-defined
    #[serde(default)]
    pub internal: bool,
}

impl FunctionDescriptor {
    pub fn new(kind: FunctionKind) -> Self {
        Self {
            kind,
            function: None,
            class: None,
            object_class: None,
            internal: false,
        }
    }

    /// Plain user function
    pub fn function(name: impl Into<String>) -> Self {
        Self::new(FunctionKind::Function).with_name(name)
    }

    /// Instance method, rendered as `Class->name`
    pub fn method(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(FunctionKind::Method).with_name(name).with_class(class)
    }

    /// Static method, rendered as `Class::name`
    pub fn static_method(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(FunctionKind::StaticMethod)
            .with_name(name)
            .with_class(class)
    }

    /// Top-level program entry, rendered as `{main}`
    pub fn main() -> Self {
        Self::new(FunctionKind::Main)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_object_class(mut self, class: impl Into<String>) -> Self {
        self.object_class = Some(class.into());
        self
    }

    pub fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// Canonical display text used for matching and output
    pub fn display_name(&self) -> String {
        match self.kind {
            FunctionKind::Function | FunctionKind::Fiber => match &self.function {
                Some(name) => name.clone(),
                None => self.kind.placeholder().to_string(),
            },
            FunctionKind::Method => self.scoped_name("->"),
            FunctionKind::StaticMethod => self.scoped_name("::"),
            other => other.placeholder().to_string(),
        }
    }

    fn scoped_name(&self, separator: &str) -> String {
        let class = self
            .class
            .as_deref()
            .or(self.object_class.as_deref())
            .unwrap_or(UNKNOWN_CLASS);
        let name = self.function.as_deref().unwrap_or(UNKNOWN_CLASS);

        format!("{}{}{}", class, separator, name)
    }
}

/// Comparable identity of a call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionKey {
    pub kind: FunctionKind,
    pub internal: bool,
    pub name: Symbol,
}

impl FunctionKey {
    /// Derive a key from a raw descriptor, interning its display name
    pub fn derive(descriptor: &FunctionDescriptor, names: &mut InternTable) -> Self {
        Self {
            kind: descriptor.kind,
            internal: descriptor.internal,
            name: names.intern(&descriptor.display_name()),
        }
    }

    /// Call-site equality
    pub fn matches(&self, other: &FunctionKey, names: &InternTable) -> bool {
        if self.kind != other.kind || self.internal != other.internal {
            return false;
        }

        if !self.kind.is_named() || self.name == other.name {
            return true;
        }

        names
            .resolve(self.name)
            .eq_ignore_ascii_case(names.resolve(other.name))
    }
}
