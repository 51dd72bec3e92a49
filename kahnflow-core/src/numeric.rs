//! Numeric Values
//!
//! The values that flow along graph edges, and the arithmetic the built-in
//! operators need. Array math is delegated to `ndarray`; this module only
//! checks shapes up front so a mismatch becomes an error instead of a panic
//! inside ndarray's broadcasting.

use std::fmt;

use ndarray::{Array1, Array2};
use thiserror::Error;

/// A value carried by a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single number.
    Scalar(f64),

    /// A one-dimensional array, e.g. a feature vector or a bias.
    Vector(Array1<f64>),

    /// A two-dimensional array, e.g. a weight matrix or a batch of rows.
    Matrix(Array2<f64>),
}

impl Value {
    /// The scalar inside this value, if it is one.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Array2<f64>> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(x) => write!(f, "scalar({})", x),
            Value::Vector(v) => write!(f, "vector[{}]", v.len()),
            Value::Matrix(m) => write!(f, "matrix[{}x{}]", m.nrows(), m.ncols()),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(x)
    }
}

impl From<Array1<f64>> for Value {
    fn from(v: Array1<f64>) -> Self {
        Value::Vector(v)
    }
}

impl From<Array2<f64>> for Value {
    fn from(m: Array2<f64>) -> Self {
        Value::Matrix(m)
    }
}

/// Errors raised by value arithmetic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    /// Two operands cannot be combined because their shapes disagree.
    #[error("{op}: cannot combine {left} with {right}")]
    ShapeMismatch {
        op: &'static str,
        left: String,
        right: String,
    },

    /// An operand has a kind the operation does not accept at that position.
    #[error("{op}: unsupported {position} operand {operand}")]
    UnsupportedOperand {
        op: &'static str,
        position: &'static str,
        operand: String,
    },

    /// The operation was given nothing to work on.
    #[error("{op}: no operands")]
    Empty { op: &'static str },

    /// The operation takes a fixed number of operands and got another count.
    #[error("{op}: expected {expected} operands, got {got}")]
    OperandCount {
        op: &'static str,
        expected: usize,
        got: usize,
    },
}

fn mismatch(op: &'static str, left: &Value, right: &Value) -> NumericError {
    NumericError::ShapeMismatch {
        op,
        left: left.to_string(),
        right: right.to_string(),
    }
}

/// Add two values, broadcasting scalars everywhere and a row vector over a matrix.
pub fn add(left: &Value, right: &Value) -> Result<Value, NumericError> {
    use Value::*;

    let sum = match (left, right) {
        (Scalar(a), Scalar(b)) => Scalar(a + b),
        (Scalar(s), Vector(v)) | (Vector(v), Scalar(s)) => Vector(v + *s),
        (Scalar(s), Matrix(m)) | (Matrix(m), Scalar(s)) => Matrix(m + *s),
        (Vector(a), Vector(b)) if a.len() == b.len() => Vector(a + b),
        (Matrix(a), Matrix(b)) if a.dim() == b.dim() => Matrix(a + b),
        // Addition commutes exactly in IEEE arithmetic, so the matrix can
        // always sit on the left where ndarray broadcasts the right operand.
        (Matrix(m), Vector(v)) | (Vector(v), Matrix(m)) if v.len() == m.ncols() => {
            Matrix(m + v)
        }
        _ => return Err(mismatch("add", left, right)),
    };
    Ok(sum)
}

/// Sum values left to right in the given order.
pub fn sum(values: &[&Value]) -> Result<Value, NumericError> {
    let (first, rest) = values.split_first().ok_or(NumericError::Empty { op: "add" })?;
    rest.iter()
        .try_fold((*first).clone(), |acc, value| add(&acc, value))
}

/// Affine combination `x · w + b`.
///
/// `w` must be an `(n, k)` matrix. `x` is either a length-`n` vector or an
/// `(m, n)` batch of rows; `b` is a scalar or a length-`k` vector.
pub fn affine(x: &Value, w: &Value, b: &Value) -> Result<Value, NumericError> {
    let weights = w.as_matrix().ok_or_else(|| NumericError::UnsupportedOperand {
        op: "linear",
        position: "weights",
        operand: w.to_string(),
    })?;

    let product = match x {
        Value::Vector(v) if v.len() == weights.nrows() => Value::Vector(v.dot(weights)),
        Value::Matrix(m) if m.ncols() == weights.nrows() => Value::Matrix(m.dot(weights)),
        Value::Vector(_) | Value::Matrix(_) => return Err(mismatch("linear", x, w)),
        Value::Scalar(_) => {
            return Err(NumericError::UnsupportedOperand {
                op: "linear",
                position: "features",
                operand: x.to_string(),
            })
        }
    };

    match b {
        Value::Scalar(_) => add(&product, b),
        Value::Vector(bias) if bias.len() == weights.ncols() => add(&product, b),
        Value::Vector(_) => Err(mismatch("linear", &product, b)),
        Value::Matrix(_) => Err(NumericError::UnsupportedOperand {
            op: "linear",
            position: "bias",
            operand: b.to_string(),
        }),
    }
}

/// Element-wise logistic function.
pub fn sigmoid(value: &Value) -> Value {
    fn logistic(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    match value {
        Value::Scalar(z) => Value::Scalar(logistic(*z)),
        Value::Vector(v) => Value::Vector(v.mapv(logistic)),
        Value::Matrix(m) => Value::Matrix(m.mapv(logistic)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn scalars_sum_in_order() {
        let values = [Value::from(10.0), Value::from(5.0), Value::from(-2.5)];
        let refs: Vec<&Value> = values.iter().collect();
        assert_eq!(sum(&refs).unwrap(), Value::Scalar(12.5));
    }

    #[test]
    fn sum_of_nothing_is_an_error() {
        assert_eq!(sum(&[]), Err(NumericError::Empty { op: "add" }));
    }

    #[test]
    fn scalar_broadcasts_over_vector() {
        let v = Value::from(array![1.0, 2.0, 3.0]);
        let s = Value::from(1.0);
        assert_eq!(add(&s, &v).unwrap(), Value::from(array![2.0, 3.0, 4.0]));
        assert_eq!(add(&v, &s).unwrap(), Value::from(array![2.0, 3.0, 4.0]));
    }

    #[test]
    fn row_vector_broadcasts_over_matrix() {
        let m = Value::from(array![[1.0, 2.0], [3.0, 4.0]]);
        let v = Value::from(array![10.0, 20.0]);
        let expected = Value::from(array![[11.0, 22.0], [13.0, 24.0]]);
        assert_eq!(add(&m, &v).unwrap(), expected);
        assert_eq!(add(&v, &m).unwrap(), expected);
    }

    #[test]
    fn mismatched_vectors_are_rejected() {
        let a = Value::from(array![1.0, 2.0]);
        let b = Value::from(array![1.0, 2.0, 3.0]);
        assert!(matches!(
            add(&a, &b),
            Err(NumericError::ShapeMismatch { op: "add", .. })
        ));
    }

    #[test]
    fn affine_on_a_single_row() {
        let x = Value::from(array![1.0, 2.0]);
        let w = Value::from(array![[1.0, 0.5, 0.0], [2.0, 0.0, 1.0]]);
        let b = Value::from(array![0.5, 0.5, 0.5]);
        let out = affine(&x, &w, &b).unwrap();
        assert_eq!(out, Value::from(array![5.5, 1.0, 2.5]));
    }

    #[test]
    fn affine_on_a_batch() {
        let x = Value::from(array![[1.0, 2.0], [0.0, 1.0]]);
        let w = Value::from(array![[1.0], [1.0]]);
        let out = affine(&x, &w, &Value::from(1.0)).unwrap();
        assert_eq!(out, Value::from(array![[4.0], [2.0]]));
    }

    #[test]
    fn affine_checks_every_operand() {
        let w = Value::from(array![[1.0, 0.0], [0.0, 1.0]]);
        let x = Value::from(array![1.0, 2.0]);

        let short = Value::from(array![1.0]);
        assert!(matches!(
            affine(&short, &w, &Value::from(0.0)),
            Err(NumericError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            affine(&x, &x, &Value::from(0.0)),
            Err(NumericError::UnsupportedOperand { position: "weights", .. })
        ));
        assert!(matches!(
            affine(&Value::from(1.0), &w, &Value::from(0.0)),
            Err(NumericError::UnsupportedOperand { position: "features", .. })
        ));
        assert!(matches!(
            affine(&x, &w, &Value::from(array![1.0, 2.0, 3.0])),
            Err(NumericError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn sigmoid_of_zero_is_one_half() {
        assert_eq!(sigmoid(&Value::from(0.0)), Value::Scalar(0.5));
        let v = sigmoid(&Value::from(array![0.0, 0.0]));
        assert_eq!(v, Value::from(array![0.5, 0.5]));
    }
}
