//! Telemetry record and the row layout written to the sheet.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::constants::TIMESTAMP_FORMAT;
use crate::features::PatientInput;
use crate::model::PredictionResult;

/// Columns written per record.
///
/// `Compact`: timestamp, lactate, urea, creatinine, platelets, resuscitation,
/// prediction. `Extended` appends probability and risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSchema {
    #[default]
    Compact,
    Extended,
}

impl RowSchema {
    pub fn width(&self) -> usize {
        match self {
            Self::Compact => 7,
            Self::Extended => 9,
        }
    }

    pub fn header(&self) -> Vec<&'static str> {
        let mut cols = vec![
            "Timestamp",
            "Lactate",
            "Urea",
            "Creatinine",
            "Platelets",
            "Resuscitation",
            "Prediction",
        ];
        if *self == Self::Extended {
            cols.extend(["Probability", "Risk Level"]);
        }
        cols
    }
}

impl FromStr for RowSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "7" => Ok(Self::Compact),
            "extended" | "9" => Ok(Self::Extended),
            other => Err(format!("Unknown telemetry row schema '{}'", other)),
        }
    }
}

impl fmt::Display for RowSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compact => f.write_str("compact"),
            Self::Extended => f.write_str("extended"),
        }
    }
}

/// One prediction as persisted: the inputs plus the decision
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    timestamp: DateTime<Local>,
    input: PatientInput,
    result: PredictionResult,
}

impl TelemetryRecord {
    pub fn new(input: PatientInput, result: PredictionResult) -> Self {
        Self::at(Local::now(), input, result)
    }

    pub fn at(timestamp: DateTime<Local>, input: PatientInput, result: PredictionResult) -> Self {
        Self {
            timestamp,
            input,
            result,
        }
    }

    pub fn input(&self) -> &PatientInput {
        &self.input
    }

    pub fn result(&self) -> &PredictionResult {
        &self.result
    }

    /// Timestamp as written to the first column
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn to_row(&self, schema: RowSchema) -> Vec<String> {
        let mut row = vec![
            self.timestamp_text(),
            number(self.input.lactate),
            number(self.input.urea),
            number(self.input.creatinine),
            number(self.input.platelets),
            self.input.resuscitation_value(),
            self.result.label().as_flag().to_string(),
        ];
        if schema == RowSchema::Extended {
            row.push(format!("{:.4}", self.result.probability()));
            row.push(self.result.label().risk_level().to_string());
        }
        row
    }
}

// Debug formatting keeps a trailing ".0" on whole numbers
fn number(v: f64) -> String {
    format!("{:?}", v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Resuscitation;
    use crate::model::DecisionThreshold;
    use chrono::TimeZone;

    fn record(probability: f64) -> TelemetryRecord {
        let input = PatientInput::new(
            8.0,
            120.0,
            3.5,
            45.0,
            vec![Resuscitation::Fluid, Resuscitation::Vasopressors],
        );
        let threshold = DecisionThreshold::new(0.612).unwrap();
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        TelemetryRecord::at(at, input, PredictionResult::decide(probability, threshold))
    }

    #[test]
    fn test_compact_row() {
        let row = record(0.75).to_row(RowSchema::Compact);
        assert_eq!(
            row,
            vec![
                "2024-03-09 14:05:07",
                "8.0",
                "120.0",
                "3.5",
                "45.0",
                "Fluid, Use of Vasopressors",
                "1",
            ]
        );
    }

    #[test]
    fn test_extended_row() {
        let row = record(0.40).to_row(RowSchema::Extended);
        assert_eq!(row.len(), RowSchema::Extended.width());
        assert_eq!(row[6], "0");
        assert_eq!(row[7], "0.4000");
        assert_eq!(row[8], "LOW RISK");
    }

    #[test]
    fn test_header_matches_width() {
        for schema in [RowSchema::Compact, RowSchema::Extended] {
            assert_eq!(schema.header().len(), schema.width());
        }
    }

    #[test]
    fn test_schema_parse() {
        assert_eq!("compact".parse::<RowSchema>(), Ok(RowSchema::Compact));
        assert_eq!(" Extended ".parse::<RowSchema>(), Ok(RowSchema::Extended));
        assert_eq!("9".parse::<RowSchema>(), Ok(RowSchema::Extended));
        assert!("wide".parse::<RowSchema>().is_err());
    }
}
