//! Applying resolved values to targets

use crate::{Error, Resolution, Result};
use conf_model::Value;
use indexmap::IndexMap;

/// An object whose fields can be set from resolved parameters.
pub trait Configurable {
    /// Assign `value` to the field `name`.
    ///
    /// Returns `Ok(false)` when the target has no such field.
    fn set_field(&mut self, name: &str, value: &Value) -> Result<bool>;

    /// Current value of the field `name`.
    fn get_field(&self, name: &str) -> Option<Value>;

    /// Names exposed to expressions as `configurable.<name>`.
    fn field_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Current field values of `target`, keyed by field name.
pub fn snapshot(target: &dyn Configurable) -> IndexMap<String, Value> {
    target
        .field_names()
        .into_iter()
        .filter_map(|name| {
            let value = target.get_field(&name)?;
            Some((name, value))
        })
        .collect()
}

/// A map accepts any field.
impl Configurable for IndexMap<String, Value> {
    fn set_field(&mut self, name: &str, value: &Value) -> Result<bool> {
        self.insert(name.to_string(), value.clone());
        Ok(true)
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn field_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// What to do with a parameter that failed in the latest pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Apply the value from the last successful pass, if any
    #[default]
    KeepLastKnownGood,
    /// Leave the field untouched
    Discard,
}

/// Fields touched by [`Binder::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Fields set from freshly resolved values
    pub applied: Vec<String>,
    /// Fields set from last known good values
    pub stale: Vec<String>,
    /// Failed parameters whose field was left untouched
    pub discarded: Vec<String>,
    /// Parameters the target has no field for
    pub skipped: Vec<String>,
    /// Fields the target rejected, with the reason
    pub rejected: Vec<(String, String)>,
}

impl ApplyReport {
    /// True when every parameter was applied from a fresh value.
    pub fn is_clean(&self) -> bool {
        self.stale.is_empty() && self.discarded.is_empty() && self.rejected.is_empty()
    }
}

/// Maps parameters of a resolution onto the fields of one target.
#[derive(Debug, Clone, Default)]
pub struct Binder {
    categories: Option<Vec<String>>,
    stale: StalePolicy,
}

impl Binder {
    /// Bind every category, in resolution order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind only `categories`; later ones override earlier ones for the same
    /// parameter name.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale = policy;
        self
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.stale
    }

    /// Apply `resolution` to `target`.
    pub fn apply(&self, resolution: &Resolution, target: &mut dyn Configurable) -> ApplyReport {
        let mut report = ApplyReport::default();
        let mut fields: IndexMap<String, (Value, bool)> = IndexMap::new();

        let categories: Vec<&str> = match &self.categories {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => resolution.categories(),
        };
        for category in categories {
            for (name, value) in resolution.category(category) {
                fields.insert(name, (value, false));
            }
            for failure in resolution.errors.iter().filter(|e| e.category == category) {
                match (self.stale, &failure.last_known_good) {
                    (StalePolicy::KeepLastKnownGood, Some(value)) => {
                        fields.insert(failure.parameter.clone(), (value.clone(), true));
                    }
                    _ => report.discarded.push(failure.parameter.clone()),
                }
            }
        }

        for (name, (value, stale)) in fields {
            match target.set_field(&name, &value) {
                Ok(true) if stale => report.stale.push(name),
                Ok(true) => report.applied.push(name),
                Ok(false) => report.skipped.push(name),
                Err(err) => {
                    tracing::warn!(field = %name, error = %err, "Target rejected value");
                    report.rejected.push((name, err.to_string()));
                }
            }
        }

        tracing::debug!(
            applied = report.applied.len(),
            stale = report.stale.len(),
            skipped = report.skipped.len(),
            "Applied resolution"
        );
        report
    }
}

/// Convert a field value, reporting a mismatch as [`Error::InvalidField`].
pub fn field_value<T>(name: &str, value: &Value, convert: impl FnOnce(&Value) -> Option<T>) -> Result<T> {
    convert(value).ok_or_else(|| {
        Error::invalid_field(name, format!("unexpected {} value {}", value.type_name(), value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolutionError;
    use conf_model::ParameterError;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct Server {
        host: String,
        port: i64,
    }

    impl Configurable for Server {
        fn set_field(&mut self, name: &str, value: &Value) -> Result<bool> {
            match name {
                "host" => self.host = field_value(name, value, |v| v.as_str().map(String::from))?,
                "port" => self.port = field_value(name, value, Value::as_i64)?,
                _ => return Ok(false),
            }
            Ok(true)
        }

        fn get_field(&self, name: &str) -> Option<Value> {
            match name {
                "host" => Some(Value::from(self.host.as_str())),
                "port" => Some(Value::Int(self.port)),
                _ => None,
            }
        }

        fn field_names(&self) -> Vec<String> {
            vec!["host".into(), "port".into()]
        }
    }

    fn resolution() -> Resolution {
        let mut resolution = Resolution::default();
        for (category, name, value) in [
            ("defaults", "host", Value::from("localhost")),
            ("defaults", "port", Value::Int(80)),
            ("prod", "host", Value::from("example.org")),
            ("prod", "debug", Value::Bool(false)),
        ] {
            resolution
                .values
                .insert((category.to_string(), name.to_string()), value);
        }
        resolution
    }

    fn failed_port(last_known_good: Option<Value>) -> ResolutionError {
        ResolutionError {
            category: "prod".into(),
            parameter: "port".into(),
            error: ParameterError::evaluation("division by zero"),
            last_known_good,
        }
    }

    #[test]
    fn later_categories_override_earlier() {
        let mut server = Server::default();
        let report = Binder::new()
            .with_categories(["defaults", "prod"])
            .apply(&resolution(), &mut server);

        assert_eq!(server.host, "example.org");
        assert_eq!(server.port, 80);
        assert_eq!(report.applied, vec!["host", "port"]);
        assert_eq!(report.skipped, vec!["debug"]);
        assert!(report.is_clean());
    }

    #[test]
    fn category_filter_excludes_others() {
        let mut server = Server::default();
        Binder::new()
            .with_categories(["defaults"])
            .apply(&resolution(), &mut server);
        assert_eq!(server.host, "localhost");
    }

    #[test]
    fn stale_policy_decides_failed_parameters() {
        let mut resolution = resolution();
        resolution.errors.push(failed_port(Some(Value::Int(8080))));

        let mut kept = Server::default();
        let report = Binder::new().apply(&resolution, &mut kept);
        assert_eq!(kept.port, 8080);
        assert_eq!(report.stale, vec!["port"]);

        let mut discarded = Server::default();
        let report = Binder::new()
            .with_stale_policy(StalePolicy::Discard)
            .apply(&resolution, &mut discarded);
        assert_eq!(discarded.port, 80);
        assert_eq!(report.discarded, vec!["port"]);
    }

    #[test]
    fn rejected_values_are_reported() {
        let mut resolution = Resolution::default();
        resolution
            .values
            .insert(("a".into(), "port".into()), Value::from("eighty"));

        let mut server = Server::default();
        let report = Binder::new().apply(&resolution, &mut server);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "port");
        assert_eq!(server.port, 0);
    }

    #[test]
    fn snapshot_reads_named_fields() {
        let server = Server {
            host: "h".into(),
            port: 1,
        };
        let fields = snapshot(&server);
        assert_eq!(fields.get("port"), Some(&Value::Int(1)));
        assert_eq!(fields.len(), 2);
    }
}
