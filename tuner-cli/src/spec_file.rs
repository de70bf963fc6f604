//! TOML parameter spec format read by the CLI, e.g.:
//!
//! ```toml
//! [[parameter]]
//! name = "threads"
//! interval = { min = 1, max = 8, step = 1 }
//!
//! [[parameter]]
//! name = "algorithm"
//! values = ["quick", "merge", "heap"]
//! ```

use anyhow::bail;
use serde::Deserialize;

use tuner::{Parameter, Range};

#[derive(Debug, Deserialize)]
pub struct SpecFile {
    parameter: Vec<ParameterSpec>,
}

#[derive(Debug, Deserialize)]
struct ParameterSpec {
    name: String,
    interval: Option<IntervalSpec>,
    values: Option<Vec<toml::Value>>,
}

#[derive(Debug, Deserialize)]
struct IntervalSpec {
    min: i64,
    max: i64,
    #[serde(default = "default_step")]
    step: i64,
}

fn default_step() -> i64 {
    1
}

impl SpecFile {
    /// Converts the parsed TOML into declared parameters, in file order.
    ///
    /// Constraints between parameters aren't expressible in this simple file format; embedders
    /// who need them should declare [`Parameter`]s programmatically instead.
    pub fn into_parameters(self) -> anyhow::Result<Vec<Parameter>> {
        self.parameter
            .into_iter()
            .map(ParameterSpec::into_parameter)
            .collect()
    }
}

impl ParameterSpec {
    fn into_parameter(self) -> anyhow::Result<Parameter> {
        let range = match (self.interval, self.values) {
            (Some(interval), None) => Range::interval(interval.min, interval.max, interval.step),
            (None, Some(values)) => Range::set(
                values
                    .into_iter()
                    .map(|v| toml_value_to_tuner_value(&self.name, v))
                    .collect::<anyhow::Result<Vec<_>>>()?,
            ),
            (Some(_), Some(_)) => {
                bail!("parameter `{}` declares both `interval` and `values`", self.name)
            }
            (None, None) => {
                bail!("parameter `{}` declares neither `interval` nor `values`", self.name)
            }
        };
        Ok(Parameter::new(self.name, range))
    }
}

fn toml_value_to_tuner_value(name: &str, value: toml::Value) -> anyhow::Result<tuner::Value> {
    Ok(match value {
        toml::Value::Integer(i) => tuner::Value::Int(i),
        toml::Value::Float(f) => tuner::Value::Float(f),
        toml::Value::Boolean(b) => tuner::Value::Bool(b),
        toml::Value::String(s) => tuner::Value::Str(s),
        other => bail!("parameter `{name}` has an unsupported value type: {other:?}"),
    })
}
