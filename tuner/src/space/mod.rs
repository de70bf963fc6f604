//! Construction and traversal of the "chain-of-trees" search space: the dense representation of
//! every valid configuration implied by a set of (possibly interdependent) tuning parameters.

mod tree;

use std::collections::HashMap;

use log::debug;

use crate::configuration::Configuration;
use crate::error::{ConfigurationError, Error, Result};
use crate::parameter::Parameter;
use crate::value::Value;

use self::tree::GroupTree;

/// The constraint-aware search space generated from an ordered list of [`Parameter`]s: an ordered
/// sequence of per-group trees (the "chain of trees"), along with the precomputed sizes needed to
/// treat the space as a flat index range `[0, |SP|)`.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    parameters: Vec<Parameter>,
    /// One tree per maximal contiguous dependency group, in declared parameter order. Parallel to
    /// `group_bounds`.
    groups: Vec<GroupTree>,
    /// `(start, end)` parameter-index bounds (end exclusive) of each group, parallel to `groups`.
    group_bounds: Vec<(usize, usize)>,
    size: u64,
    unconstrained_size: u64,
}

impl SearchSpace {
    /// Builds the chain-of-trees representation of every valid configuration of `parameters`.
    ///
    /// Fails with [`Error::Configuration`] if the parameters themselves are ill-formed (duplicate
    /// names, empty ranges, a constraint depending on an unknown or non-preceding parameter), or
    /// with [`Error::EmptySearchSpace`] if every configuration is pruned by some constraint.
    pub fn generate(parameters: Vec<Parameter>) -> Result<Self> {
        validate(&parameters)?;

        let group_bounds = detect_groups(&parameters);
        debug!(
            "generating search space for {} parameter(s) in {} group(s)",
            parameters.len(),
            group_bounds.len()
        );

        let mut groups = Vec::with_capacity(group_bounds.len());
        let mut size: u64 = 1;
        for &(start, end) in &group_bounds {
            let tree = GroupTree::build(&parameters[start..end]);
            if tree.leaf_count() == 0 {
                return Err(Error::EmptySearchSpace);
            }
            size = size.saturating_mul(tree.leaf_count());
            groups.push(tree);
        }

        let unconstrained_size = parameters
            .iter()
            .map(|p| p.range().size())
            .fold(1u64, |acc, s| acc.saturating_mul(s));

        debug!("search space has {size} valid configuration(s) out of {unconstrained_size} unconstrained");

        Ok(Self {
            parameters,
            groups,
            group_bounds,
            size,
            unconstrained_size,
        })
    }

    /// The declared parameters, in order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// `|SP|`: the number of valid configurations.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// `∏|range_i|`: the size of the unconstrained Cartesian product, ignoring constraints.
    pub fn unconstrained_size(&self) -> u64 {
        self.unconstrained_size
    }

    /// Maps a flat index in `[0, self.size())` to its configuration.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.size()`.
    pub fn index_to_config(&self, idx: u64) -> Configuration {
        assert!(idx < self.size, "index {idx} out of bounds for search space of size {}", self.size);
        let group_local_indices = decompose_mixed_radix(idx, &self.groups);

        let mut bindings = Vec::with_capacity(self.parameters.len());
        for (group, &local_idx) in self.groups.iter().zip(&group_local_indices) {
            for value in group.index_to_values(local_idx) {
                bindings.push(value);
            }
        }
        self.zip_names(bindings)
    }

    /// Maps a coordinate `(0, 1]^D` (one coordinate per parameter, in declared order) to its
    /// configuration. Always yields a valid configuration by construction.
    ///
    /// # Panics
    ///
    /// Panics if `coords.len() != self.parameters.len()`.
    pub fn coord_to_config(&self, coords: &[f64]) -> Configuration {
        assert_eq!(
            coords.len(),
            self.parameters.len(),
            "expected one coordinate per parameter"
        );
        let mut bindings = Vec::with_capacity(self.parameters.len());
        for (group, &(start, end)) in self.groups.iter().zip(&self.group_bounds) {
            for value in group.coord_to_values(&coords[start..end]) {
                bindings.push(value);
            }
        }
        self.zip_names(bindings)
    }

    /// A coordinate which, when passed to [`Self::coord_to_config`], reproduces
    /// `self.index_to_config(idx)`. Used to answer "what coordinate found the best
    /// configuration?" for techniques that think in index space.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.size()`.
    pub fn index_to_coord(&self, idx: u64) -> Vec<f64> {
        assert!(idx < self.size, "index {idx} out of bounds for search space of size {}", self.size);
        let group_local_indices = decompose_mixed_radix(idx, &self.groups);
        let mut coords = Vec::with_capacity(self.parameters.len());
        for (group, &local_idx) in self.groups.iter().zip(&group_local_indices) {
            for (_, coord) in group.index_to_path(local_idx) {
                coords.push(coord);
            }
        }
        coords
    }

    /// The flat index of `configuration`, i.e. the inverse of [`Self::index_to_config`].
    ///
    /// Returns `None` if `configuration` doesn't correspond to any valid path through the search
    /// space (e.g. it was built for a different set of parameters).
    pub fn config_to_index(&self, configuration: &Configuration) -> Option<u64> {
        let mut local_indices = Vec::with_capacity(self.groups.len());
        for (group, &(start, end)) in self.groups.iter().zip(&self.group_bounds) {
            let values: Vec<Value> = self.parameters[start..end]
                .iter()
                .map(|p| configuration.get(p.name()).cloned())
                .collect::<Option<_>>()?;
            local_indices.push(group.values_to_index(&values)?);
        }
        Some(compose_mixed_radix(&local_indices, &self.groups))
    }

    fn zip_names(&self, values: Vec<Value>) -> Configuration {
        debug_assert_eq!(values.len(), self.parameters.len());
        let bindings = self
            .parameters
            .iter()
            .zip(values)
            .map(|(p, v)| (p.name().to_owned(), v))
            .collect();
        Configuration::new(bindings)
    }
}

/// Decomposes `idx` into one local index per group, most-significant (declared) group first.
fn decompose_mixed_radix(mut idx: u64, groups: &[GroupTree]) -> Vec<u64> {
    let mut divisors = vec![1u64; groups.len()];
    let mut running = 1u64;
    for i in (0..groups.len()).rev() {
        divisors[i] = running;
        running = running.saturating_mul(groups[i].leaf_count());
    }
    divisors
        .iter()
        .map(|&divisor| {
            let local = idx / divisor;
            idx %= divisor;
            local
        })
        .collect()
}

/// Inverse of [`decompose_mixed_radix`]: combines one local index per group into a flat index.
fn compose_mixed_radix(local_indices: &[u64], groups: &[GroupTree]) -> u64 {
    let mut idx = 0u64;
    for (group, &local) in groups.iter().zip(local_indices) {
        idx = idx * group.leaf_count() + local;
    }
    idx
}

fn validate(parameters: &[Parameter]) -> std::result::Result<(), ConfigurationError> {
    let mut seen = HashMap::with_capacity(parameters.len());
    for (idx, param) in parameters.iter().enumerate() {
        if param.range().size() == 0 {
            return Err(ConfigurationError::EmptyRange(param.name().to_owned()));
        }
        if seen.insert(param.name(), idx).is_some() {
            return Err(ConfigurationError::DuplicateParameterName(param.name().to_owned()));
        }
    }
    for (idx, param) in parameters.iter().enumerate() {
        if let Some(constraint) = param.constraint() {
            for dep in constraint.depends_on() {
                match seen.get(dep.as_str()) {
                    Some(&dep_idx) if dep_idx < idx => {}
                    _ => {
                        return Err(ConfigurationError::UnknownOrLaterDependency {
                            parameter: param.name().to_owned(),
                            dependency: dep.clone(),
                        })
                    }
                }
            }
        }
    }
    Ok(())
}

/// Partitions `parameters` into maximal contiguous groups of mutually-dependent parameters.
///
/// A new group starts at parameter `p_k` iff no parameter at position `>= k` depends (directly or
/// transitively, through the group being built) on a name at a position `< k`. Implemented as the
/// classic "merge touching intervals" sweep: `far_reach[i]` is the furthest parameter that
/// (transitively, once expanded) needs `i` to still be in scope; the group closes as soon as the
/// scan catches up with the furthest reach seen so far.
fn detect_groups(parameters: &[Parameter]) -> Vec<(usize, usize)> {
    let index_of: HashMap<&str, usize> =
        parameters.iter().enumerate().map(|(i, p)| (p.name(), i)).collect();

    let mut far_reach: Vec<usize> = (0..parameters.len()).collect();
    for (i, param) in parameters.iter().enumerate() {
        if let Some(constraint) = param.constraint() {
            for dep in constraint.depends_on() {
                // Validated already; unwrap is safe here.
                let j = index_of[dep.as_str()];
                far_reach[j] = far_reach[j].max(i);
            }
        }
    }

    let mut groups = Vec::new();
    let mut start = 0;
    let mut end = 0;
    for i in 0..parameters.len() {
        end = end.max(far_reach[i]);
        if i == end {
            groups.push((start, end + 1));
            start = i + 1;
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{Constraint, Range};

    fn p(name: &str, values: &[i64]) -> Parameter {
        Parameter::new(name, Range::set(values.iter().map(|&v| Value::Int(v))))
    }

    #[test]
    fn unconstrained_groups_are_singletons() {
        let params = vec![p("a", &[1, 2]), p("b", &[3, 4])];
        let bounds = detect_groups(&params);
        assert_eq!(bounds, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn dependent_parameters_share_a_group() {
        let params = vec![
            p("a", &[1, 2]),
            Parameter::with_constraint(
                "b",
                Range::set([10, 20].iter().map(|&v| Value::Int(v))),
                Constraint::new(["a"], |b| b.get("a").unwrap().as_int().unwrap() > 0),
            ),
            p("c", &[5]),
        ];
        let bounds = detect_groups(&params);
        assert_eq!(bounds, vec![(0, 2), (2, 3)]);
    }

    #[test]
    fn unconstrained_search_space_size() {
        let params = vec![p("a", &[1, 2]), p("b", &[10, 20])];
        let space = SearchSpace::generate(params).unwrap();
        assert_eq!(space.size(), 4);
        assert_eq!(space.unconstrained_size(), 4);

        let first = space.index_to_config(0);
        assert_eq!(first.get("a").unwrap().as_int(), Some(1));
        assert_eq!(first.get("b").unwrap().as_int(), Some(10));

        let last = space.index_to_config(3);
        assert_eq!(last.get("a").unwrap().as_int(), Some(2));
        assert_eq!(last.get("b").unwrap().as_int(), Some(20));
    }

    #[test]
    fn empty_search_space_is_rejected() {
        let params = vec![Parameter::with_constraint(
            "p",
            Range::set([1, 2, 3].iter().map(|&v| Value::Int(v))),
            Constraint::new(Vec::<String>::new(), |_| false),
        )];
        assert!(matches!(SearchSpace::generate(params), Err(Error::EmptySearchSpace)));
    }

    #[test]
    fn index_and_config_round_trip() {
        let params = vec![p("a", &[1, 2, 3]), p("b", &[10, 20])];
        let space = SearchSpace::generate(params).unwrap();
        for idx in 0..space.size() {
            let config = space.index_to_config(idx);
            assert_eq!(space.config_to_index(&config), Some(idx));
        }
    }
}
