use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{FuzzyError, Result};
use crate::value::Value;

/// Crisp inputs keyed by universe name. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinguisticVariable(IndexMap<String, Value>);

impl LinguisticVariable {
    pub fn new<K: Into<String>, V: Into<Value>>(values: impl IntoIterator<Item = (K, V)>) -> Self {
        Self(values.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.0.get(name).ok_or_else(|| FuzzyError::MissingInput(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_map(&self) -> IndexMap<String, Value> {
        self.0.clone()
    }

    /// Builds from a flat JSON object whose values are numbers or arrays of numbers.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let object: IndexMap<String, serde_json::Value> = serde_json::from_value(value)?;
        let mut values = IndexMap::with_capacity(object.len());

        for (key, value) in object {
            match serde_json::from_value::<Value>(value) {
                Ok(value) => values.insert(key, value),
                Err(_) => return Err(FuzzyError::Validation(key)),
            };
        }

        Ok(Self(values))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_json_value(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);

        Self::from_json_value(serde_json::from_reader(reader)?)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for LinguisticVariable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for LinguisticVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("]")
    }
}

#[test]
fn test_lookup() {
    let x = LinguisticVariable::new([("quality", 6.5), ("service", 9.8)]);

    assert_eq!(x.get("quality").unwrap(), &Value::Scalar(6.5));
    assert!(x.contains("service"));
    assert!(matches!(x.get("tip"), Err(FuzzyError::MissingInput(ref name)) if name == "tip"));
    assert_eq!(x.to_string(), "[quality=6.5, service=9.8]");
}

#[test]
fn test_from_json() {
    let x = LinguisticVariable::from_json_str(r#"{"angle": 3.5, "force": [0, 1, 2]}"#).unwrap();

    assert_eq!(x.get("angle").unwrap(), &Value::Scalar(3.5));
    assert_eq!(x.get("force").unwrap(), &Value::Array(vec![0., 1., 2.]));
    assert_eq!(x.len(), 2);

    let x = LinguisticVariable::from_json_str(r#"{"service": 7, "tip": []}"#).unwrap();

    assert_eq!(x.get("service").unwrap(), &Value::Scalar(7.));
    assert_eq!(x.get("tip").unwrap(), &Value::Array(Vec::new()));
}

#[test]
fn test_from_json_rejects_non_numeric() {
    assert!(matches!(
        LinguisticVariable::from_json_str(r#"{"quality": "good"}"#),
        Err(FuzzyError::Validation(ref key)) if key == "quality"
    ));
    assert!(matches!(
        LinguisticVariable::from_json_str(r#"{"quality": [1, null]}"#),
        Err(FuzzyError::Validation(_))
    ));
    assert!(matches!(
        LinguisticVariable::from_json_str(r#"{"quality": {"value": 6.5}}"#),
        Err(FuzzyError::Validation(_))
    ));
    assert!(matches!(LinguisticVariable::from_json_str("[1, 2]"), Err(FuzzyError::Json(_))));
    assert!(matches!(LinguisticVariable::from_json_str("{"), Err(FuzzyError::Json(_))));
}
