use core::fmt;

use crate::base::{Field, Topology};
use crate::errors::{AbissError, Result};

/// Sentinel for "not applicable" slots in padded parameter rows.
///
/// NaN rather than zero, so an absent migration rate can never be mistaken
/// for a rate of zero.
pub const ABSENT: f64 = f64::NAN;

/// Whether a padded parameter value is the absent sentinel.
#[inline]
pub fn is_absent(value: f64) -> bool {
    value.is_nan()
}

/// Canonical parameter vector of one simulated model.
///
/// Length and order are fixed by the topology's catalog entry; values are
/// on the sampled scale (sizes in individuals, times in units of Ne
/// generations, migration as migrants per generation).
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    topology: Topology,
    values: Vec<f64>,
}

impl ParameterSet {
    /// Create a parameter set, checking the length against the topology layout.
    pub fn new(topology: Topology, values: Vec<f64>) -> Result<Self> {
        let expected = topology.fields().len();
        if values.len() != expected {
            return Err(AbissError::invalid_argument(format!(
                "topology {topology} has {expected} parameter fields, got {} values",
                values.len()
            )));
        }
        Ok(Self { topology, values })
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn fields(&self) -> &'static [Field] {
        self.topology.fields()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of `field`, or `None` if the topology has no such field.
    pub fn get(&self, field: Field) -> Option<f64> {
        self.fields()
            .iter()
            .position(|&f| f == field)
            .map(|i| self.values[i])
    }

    /// Values followed by [`ABSENT`] up to `width`.
    pub fn padded(&self, width: usize) -> Vec<f64> {
        let mut row = self.values.clone();
        if row.len() < width {
            row.resize(width, ABSENT);
        }
        row
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, value)) in self.fields().iter().zip(&self.values).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_checked_against_layout() {
        assert!(ParameterSet::new(Topology::Im, vec![1.0; 6]).is_ok());
        let err = ParameterSet::new(Topology::Im, vec![1.0; 5]).unwrap_err();
        assert!(matches!(err, AbissError::InvalidArgument(_)));
    }

    #[test]
    fn test_get_absent_field() {
        let params = ParameterSet::new(Topology::Iso2Epoch, vec![1.0, 2.0, 3.0, 0.5]).unwrap();
        assert_eq!(params.get(Field::AncestralSize), Some(3.0));
        assert_eq!(params.get(Field::SplitTime), Some(0.5));
        assert_eq!(params.get(Field::Mig12), None);
        assert_eq!(params.get(Field::EpochChangeTime), None);
    }

    #[test]
    fn test_padded_uses_sentinel() {
        let params = ParameterSet::new(Topology::Iso2Epoch, vec![1.0, 2.0, 3.0, 0.5]).unwrap();
        let row = params.padded(6);

        assert_eq!(&row[..4], &[1.0, 2.0, 3.0, 0.5]);
        assert!(row[4..].iter().all(|&v| is_absent(v)));
        assert_eq!(params.padded(2).len(), 4);
    }

    #[test]
    fn test_display_names_fields() {
        let params = ParameterSet::new(Topology::Iso2Epoch, vec![1.0, 2.0, 3.0, 0.5]).unwrap();
        assert_eq!(
            params.to_string(),
            "pop1_size=1, pop2_size=2, ancestral_size=3, split_time=0.5"
        );
    }
}
