use {
    crate::{Protocol, ValidationFrequency},
    osc_core::{Datatype, Operator},
    osc_verifier::Accelerator,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OptionsError {
    #[error("malformed options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("iterations must be at least 1")]
    ZeroIterations,
    #[error("no datatypes selected")]
    NoDatatypes,
    #[error("no operators selected")]
    NoOperators,
    #[error("a {bytes}-byte buffer cannot hold one {datatype} ({needed} bytes)")]
    BufferTooSmall {
        bytes: usize,
        datatype: Datatype,
        needed: usize,
    },
}

/// Resolved benchmark configuration. Every field has a default, so a JSON document only needs
/// the fields it changes.
///
/// ```
/// use osc_bench::{BenchOptions, Protocol};
///
/// let options = BenchOptions::from_json(r#"{ "protocol": "fence", "iterations": 50 }"#).unwrap();
/// assert_eq!(options.protocol, Protocol::Fence);
/// assert_eq!(options.warmup, BenchOptions::default().warmup);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BenchOptions {
    pub datatypes: Vec<Datatype>,
    pub operators: Vec<Operator>,
    pub iterations: usize,
    pub warmup: usize,
    /// Bytes in the window and in each local buffer.
    pub max_message_size: usize,
    pub validate: bool,
    /// Overrides the per-protocol default for every protocol.
    pub validation_frequency: Option<ValidationFrequency>,
    pub protocol: Protocol,
    pub accelerator: Accelerator,
    /// Color the validation summary for a terminal.
    pub colored: bool,
}

impl Default for BenchOptions {
    fn default() -> Self {
        use Datatype::*;
        BenchOptions {
            datatypes: vec![
                SignedChar,
                UnsignedChar,
                Short,
                UnsignedShort,
                Int,
                Unsigned,
                LongLong,
                UnsignedLongLong,
                Float,
                Double,
                LongDouble,
                FloatComplex,
                DoubleComplex,
                LongDoubleComplex,
            ],
            operators: vec![Operator::Max, Operator::Min, Operator::Sum, Operator::Prod],
            iterations: 10_000,
            warmup: 100,
            max_message_size: 64,
            validate: true,
            validation_frequency: None,
            protocol: Protocol::default(),
            accelerator: Accelerator::default(),
            colored: false,
        }
    }
}

impl BenchOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let options: BenchOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.iterations == 0 {
            return Err(OptionsError::ZeroIterations);
        }
        if self.operators.is_empty() {
            return Err(OptionsError::NoOperators);
        }
        let largest = self
            .datatypes
            .iter()
            .copied()
            .max_by_key(|datatype| datatype.size())
            .ok_or(OptionsError::NoDatatypes)?;
        if self.max_message_size < largest.size() {
            return Err(OptionsError::BufferTooSmall {
                bytes: self.max_message_size,
                datatype: largest,
                needed: largest.size(),
            });
        }
        Ok(())
    }

    pub fn frequency(&self) -> ValidationFrequency {
        self.validation_frequency
            .unwrap_or_else(|| self.protocol.default_frequency())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = BenchOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.datatypes.len(), 14);
        assert_eq!(options.frequency(), ValidationFrequency::FirstTrial);
    }

    #[test]
    fn frequency_override_applies_to_every_protocol() {
        let options = BenchOptions {
            protocol: Protocol::Pscw,
            ..BenchOptions::default()
        };
        assert_eq!(options.frequency(), ValidationFrequency::EveryTrial);
        let options = BenchOptions {
            validation_frequency: Some(ValidationFrequency::FirstTrial),
            ..options
        };
        assert_eq!(options.frequency(), ValidationFrequency::FirstTrial);
    }

    #[test]
    fn rejects_unusable_configurations() {
        assert!(matches!(
            BenchOptions::from_json(r#"{ "iterations": 0 }"#),
            Err(OptionsError::ZeroIterations)
        ));
        assert!(matches!(
            BenchOptions::from_json(r#"{ "datatypes": [] }"#),
            Err(OptionsError::NoDatatypes)
        ));
        assert!(matches!(
            BenchOptions::from_json(r#"{ "operators": [] }"#),
            Err(OptionsError::NoOperators)
        ));
        assert!(matches!(
            BenchOptions::from_json(r#"{ "max_message_size": 8 }"#),
            Err(OptionsError::BufferTooSmall {
                bytes: 8,
                needed: 16,
                ..
            })
        ));
        assert!(matches!(
            BenchOptions::from_json(r#"{ "protocol": "lock_some" }"#),
            Err(OptionsError::Json(_))
        ));
    }

    #[test]
    fn json_round_trip_keeps_selection() {
        let options = BenchOptions::from_json(
            r#"{ "datatypes": ["Int"], "operators": ["Sum"], "accelerator": "cuda", "max_message_size": 4 }"#,
        )
        .unwrap();
        assert_eq!(options.datatypes, vec![Datatype::Int]);
        assert_eq!(options.operators, vec![Operator::Sum]);
        assert_eq!(options.accelerator, Accelerator::Cuda);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(BenchOptions::from_json(&json).unwrap(), options);
    }
}
