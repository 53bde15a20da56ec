//! Tagging of device fault tokens.
//!
//! The microcontroller reports per-sensor faults inline as `ERR<n>` tokens in
//! place of a reading. Classification makes those visible to consumers without
//! moving any field, so positional forwarding keeps working.

use super::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static FAULT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ERR(\d+)$").expect("valid regex"));

/// Fault codes the firmware emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCode {
    /// `ERR1`: sensor chip stuck in command mode.
    ChipCommandMode,
    /// `ERR2`: stale data, the value was already delivered.
    StaleData,
    /// `ERR3`: sensor diagnostic fault.
    DiagnosticFault,
    /// `ERR4`: sensor missing from the board.
    SensorMissing,
    /// Any other `ERR<n>`.
    Unknown(u32),
}

impl FaultCode {
    pub fn from_number(number: u32) -> Self {
        match number {
            1 => Self::ChipCommandMode,
            2 => Self::StaleData,
            3 => Self::DiagnosticFault,
            4 => Self::SensorMissing,
            n => Self::Unknown(n),
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            Self::ChipCommandMode => 1,
            Self::StaleData => 2,
            Self::DiagnosticFault => 3,
            Self::SensorMissing => 4,
            Self::Unknown(n) => *n,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ChipCommandMode => "chip stuck in command mode",
            Self::StaleData => "stale data (already received)",
            Self::DiagnosticFault => "sensor diagnostic fault",
            Self::SensorMissing => "sensor missing",
            Self::Unknown(_) => "unrecognised fault code",
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERR{}", self.number())
    }
}

/// A data token after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Reading(String),
    Fault(FaultCode),
}

impl Token {
    pub fn parse(raw: &str) -> Self {
        FAULT_TOKEN
            .captures(raw)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .map(|n| Token::Fault(FaultCode::from_number(n)))
            .unwrap_or_else(|| Token::Reading(raw.to_string()))
    }
}

/// A record plus the typed view of its data tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRecord {
    record: Record,
    tokens: Vec<Token>,
}

impl ClassifiedRecord {
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Typed data tokens, in the same order as `record().data()`.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Faults with their record position (timestamp is position 0).
    pub fn faults(&self) -> impl Iterator<Item = (usize, FaultCode)> + '_ {
        self.tokens.iter().enumerate().filter_map(|(i, token)| match token {
            Token::Fault(code) => Some((i + 1, *code)),
            Token::Reading(_) => None,
        })
    }

    pub fn has_faults(&self) -> bool {
        self.faults().next().is_some()
    }
}

/// Tag every data token of `record`.
pub fn classify(record: Record) -> ClassifiedRecord {
    let tokens = record.data().iter().map(|t| Token::parse(t)).collect();
    ClassifiedRecord { record, tokens }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_fault_codes() {
        assert_eq!(Token::parse("ERR1"), Token::Fault(FaultCode::ChipCommandMode));
        assert_eq!(Token::parse("ERR2"), Token::Fault(FaultCode::StaleData));
        assert_eq!(Token::parse("ERR3"), Token::Fault(FaultCode::DiagnosticFault));
        assert_eq!(Token::parse("ERR4"), Token::Fault(FaultCode::SensorMissing));
    }

    #[test]
    fn test_unknown_fault_code_is_still_a_fault() {
        assert_eq!(Token::parse("ERR17"), Token::Fault(FaultCode::Unknown(17)));
        assert_eq!(FaultCode::Unknown(17).to_string(), "ERR17");
    }

    #[test]
    fn test_lookalikes_are_readings() {
        for raw in ["ERR", "err2", "ERR2x", "xERR2", "12.5"] {
            assert_eq!(Token::parse(raw), Token::Reading(raw.to_string()));
        }
    }

    #[test]
    fn test_fault_positions_follow_record_indices() {
        let classified = classify(Record::new("1.00", ["12.3", "ERR4", "7", "ERR1"]));
        let faults: Vec<_> = classified.faults().collect();
        assert_eq!(
            faults,
            vec![(2, FaultCode::SensorMissing), (4, FaultCode::ChipCommandMode)]
        );
        assert_eq!(classified.record().field(2), Some("ERR4"));
    }

    #[test]
    fn test_clean_record_has_no_faults() {
        let classified = classify(Record::new("1.00", ["1", "2"]));
        assert!(!classified.has_faults());
        assert_eq!(classified.tokens().len(), 2);
    }
}
