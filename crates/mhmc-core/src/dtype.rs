use serde::{Deserialize, Serialize};

/// Numeric type in which configuration entries are represented.
///
/// Batches always store `f64`; the dtype restricts which values are
/// admissible and rounds freshly drawn entries to its precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    /// 8-bit signed integers.
    Int8,
    /// 32-bit signed integers.
    Int32,
    /// Single precision floats.
    Float32,
    /// Double precision floats.
    #[default]
    Float64,
}

impl Dtype {
    /// Whether `value` survives a round trip through this dtype unchanged.
    pub fn represents(&self, value: f64) -> bool {
        match self {
            Dtype::Int8 => value.fract() == 0.0 && (i8::MIN as f64..=i8::MAX as f64).contains(&value),
            Dtype::Int32 => {
                value.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(&value)
            }
            Dtype::Float32 => value.is_nan() || (value as f32) as f64 == value,
            Dtype::Float64 => true,
        }
    }

    /// Rounds `value` to the nearest representable value of this dtype.
    pub fn cast(&self, value: f64) -> f64 {
        match self {
            Dtype::Int8 => value.round().clamp(i8::MIN as f64, i8::MAX as f64),
            Dtype::Int32 => value.round().clamp(i32::MIN as f64, i32::MAX as f64),
            Dtype::Float32 => (value as f32) as f64,
            Dtype::Float64 => value,
        }
    }

    /// Lowercase name used in configs and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dtype::Int8 => "int8",
            Dtype::Int32 => "int32",
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
        }
    }
}
