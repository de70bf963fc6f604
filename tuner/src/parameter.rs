//! Declaration of tuning parameters: their names, ranges and inter-parameter constraints.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::value::Value;

/// Lookup of the values bound to parameters which occur strictly before the parameter whose
/// constraint is being evaluated. Handed to every [`Constraint`] predicate.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    /// `(name, value)` pairs, in declaration order, for every parameter bound so far including
    /// the candidate value of the parameter being constrained itself.
    bound: &'a [(String, Value)],
}

impl<'a> Bindings<'a> {
    pub(crate) fn new(bound: &'a [(String, Value)]) -> Self {
        Self { bound }
    }

    /// The value currently bound to `name`, or `None` if `name` hasn't been bound yet (which can
    /// only happen if the constraint was declared with an incomplete dependency list).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bound.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// A predicate which prunes a parameter's candidate values based on the values bound to earlier
/// parameters (and the candidate value of the parameter itself).
///
/// Rust has no runtime reflection over a closure's parameter names, so unlike the dynamically
/// reflected predicates this crate's design is otherwise modelled on, a [`Constraint`] must
/// explicitly declare which earlier parameters it depends on.
#[derive(Clone)]
pub struct Constraint {
    depends_on: Vec<String>,
    predicate: Arc<dyn Fn(Bindings) -> bool + Send + Sync>,
}

impl Constraint {
    /// Creates a new constraint which depends on the (earlier) parameters named in `depends_on`.
    pub fn new(
        depends_on: impl IntoIterator<Item = impl Into<String>>,
        predicate: impl Fn(Bindings) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            depends_on: depends_on.into_iter().map(Into::into).collect(),
            predicate: Arc::new(predicate),
        }
    }

    /// The names of the parameters (strictly before this constraint's own parameter) that this
    /// constraint's predicate reads.
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub(crate) fn is_satisfied(&self, bindings: Bindings) -> bool {
        (self.predicate)(bindings)
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// The enumerable, finite set of candidate values a [`Parameter`] can take.
#[derive(Clone)]
pub enum Range {
    /// An arithmetic sequence `min, min + step, ..., max` (inclusive), optionally passed through
    /// a `generator` to produce the final [`Value`].
    Interval {
        min: i64,
        max: i64,
        step: i64,
        generator: Option<Arc<dyn Fn(i64) -> Value + Send + Sync>>,
    },
    /// An explicit, order-preserved set of values.
    Set(Vec<Value>),
}

impl Range {
    /// Convenience constructor for an integer interval `[min, max]` stepping by `step`.
    pub fn interval(min: i64, max: i64, step: i64) -> Self {
        Range::Interval {
            min,
            max,
            step,
            generator: None,
        }
    }

    /// An interval whose raw integer index is mapped through `generator` to produce the emitted
    /// [`Value`] (e.g. to generate a range of floats or strings from an integer index).
    pub fn interval_with_generator(
        min: i64,
        max: i64,
        step: i64,
        generator: impl Fn(i64) -> Value + Send + Sync + 'static,
    ) -> Self {
        Range::Interval {
            min,
            max,
            step,
            generator: Some(Arc::new(generator)),
        }
    }

    /// An explicit, order-preserved set of candidate values.
    pub fn set(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Range::Set(values.into_iter().map(Into::into).collect())
    }

    /// The number of values in this range.
    pub fn size(&self) -> u64 {
        match self {
            Range::Interval { min, max, step, .. } => {
                if max < min || *step <= 0 {
                    0
                } else {
                    ((max - min) / step) as u64 + 1
                }
            }
            Range::Set(values) => values.len() as u64,
        }
    }

    /// The `i`-th value of this range (zero-based), in declared order.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.size()`.
    pub fn at(&self, i: u64) -> Value {
        match self {
            Range::Interval {
                min, step, generator, ..
            } => {
                assert!(i < self.size(), "range index {i} out of bounds");
                let raw = min + i as i64 * step;
                match generator {
                    Some(gen) => gen(raw),
                    None => Value::Int(raw),
                }
            }
            Range::Set(values) => values[i as usize].clone(),
        }
    }
}

impl Debug for Range {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Range::Interval { min, max, step, generator } => f
                .debug_struct("Interval")
                .field("min", min)
                .field("max", max)
                .field("step", step)
                .field("generator", &generator.is_some())
                .finish(),
            Range::Set(values) => f.debug_tuple("Set").field(values).finish(),
        }
    }
}

/// An immutable tuning parameter: a unique name, an enumerable range of candidate values, and an
/// optional constraint over values bound to earlier parameters.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    range: Range,
    constraint: Option<Constraint>,
}

impl Parameter {
    /// A parameter with no constraint on its values.
    pub fn new(name: impl Into<String>, range: Range) -> Self {
        Self {
            name: name.into(),
            range,
            constraint: None,
        }
    }

    /// A parameter whose candidate values are pruned by `constraint`.
    pub fn with_constraint(name: impl Into<String>, range: Range, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            range,
            constraint: Some(constraint),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }
}
