use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, Result};

/// A crisp input or an evaluation result: one number, or one number per domain sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    Array(Vec<f64>),
}

impl Value {
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Array(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Array(values) if values.is_empty())
    }

    pub fn as_scalar(&self) -> Result<f64> {
        match self {
            Self::Scalar(x) => Ok(*x),
            Self::Array(values) => Err(FuzzyError::NotScalar(values.len())),
        }
    }

    /// Apply `f` to every element, keeping the shape.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Self::Scalar(x) => Self::Scalar(f(*x)),
            Self::Array(values) => Self::Array(values.iter().copied().map(f).collect()),
        }
    }

    /// Elementwise binary operation. Scalars broadcast against arrays.
    pub fn zip_with(&self, rhs: &Value, f: impl Fn(f64, f64) -> f64) -> Result<Value> {
        let value = match (self, rhs) {
            (Self::Scalar(u), Self::Scalar(v)) => Self::Scalar(f(*u, *v)),
            (Self::Scalar(u), Self::Array(v)) => Self::Array(v.iter().map(|v| f(*u, *v)).collect()),
            (Self::Array(u), Self::Scalar(v)) => Self::Array(u.iter().map(|u| f(*u, *v)).collect()),
            (Self::Array(u), Self::Array(v)) => {
                if u.len() != v.len() {
                    return Err(FuzzyError::ShapeMismatch {
                        left: u.len(),
                        right: v.len(),
                    });
                }

                Self::Array(u.iter().zip(v).map(|(u, v)| f(*u, *v)).collect())
            },
        };

        Ok(value)
    }

    /// Materialize as an array of `len` elements, broadcasting a scalar.
    pub fn into_array(self, len: usize) -> Result<Vec<f64>> {
        match self {
            Self::Scalar(x) => Ok(vec![x; len]),
            Self::Array(values) if values.len() == len => Ok(values),
            Self::Array(values) => Err(FuzzyError::ShapeMismatch {
                left: values.len(),
                right: len,
            }),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Scalar(x)
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Self::Scalar(f64::from(x))
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Self::Array(values)
    }
}

impl From<&[f64]> for Value {
    fn from(values: &[f64]) -> Self {
        Self::Array(values.to_vec())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(x) => write!(f, "{x}"),
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, x) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{x}")?;
                }
                f.write_str("]")
            },
        }
    }
}

#[test]
fn test_zip_with_broadcasts() {
    let u = Value::Array(vec![0.1, 0.5, 0.9]);

    assert_eq!(
        u.zip_with(&Value::Scalar(0.4), f64::min).unwrap(),
        Value::Array(vec![0.1, 0.4, 0.4])
    );
    assert_eq!(
        Value::Scalar(1.).zip_with(&u, |a, b| a - b).unwrap(),
        Value::Array(vec![0.9, 0.5, 0.09999999999999998])
    );
    assert!(matches!(
        u.zip_with(&Value::Array(vec![1.]), f64::max),
        Err(FuzzyError::ShapeMismatch { left: 3, right: 1 })
    ));
}

#[test]
fn test_into_array() {
    assert_eq!(Value::Scalar(0.3).into_array(2).unwrap(), vec![0.3, 0.3]);
    assert!(Value::Array(vec![0.3]).into_array(2).is_err());
    assert!(matches!(Value::Array(vec![0., 1.]).as_scalar(), Err(FuzzyError::NotScalar(2))));
}
