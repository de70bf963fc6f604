//! A complete, valid-by-construction assignment of values to parameters.

use std::fmt::{self, Display, Formatter};

use crate::value::Value;

/// An ordered mapping from parameter name to a concrete value drawn from its range.
///
/// Every `Configuration` produced by this crate (via [`SearchSpace::index_to_config`] or
/// [`SearchSpace::coord_to_config`](crate::space::SearchSpace::coord_to_config)) is valid: every
/// constraint, evaluated left-to-right, returned `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    bindings: Vec<(String, Value)>,
}

impl Configuration {
    pub(crate) fn new(bindings: Vec<(String, Value)>) -> Self {
        Self { bindings }
    }

    /// The value bound to parameter `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The bindings in declared parameter order.
    pub fn bindings(&self) -> &[(String, Value)] {
        &self.bindings
    }
}

impl Display for Configuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.bindings {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}
