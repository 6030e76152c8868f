use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ChartError;

/// The chart types that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Histogram,
    Scatter,
    Bar,
    Correlation,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::Bar,
        ChartKind::Correlation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::Bar => "bar",
            ChartKind::Correlation => "correlation",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ChartKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ChartError::UnknownChartKind(s.to_string()))
    }
}

/// A single plot request: a kind plus up to two column references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

impl ChartRequest {
    pub fn new(kind: ChartKind) -> Self {
        ChartRequest {
            kind,
            primary: None,
            secondary: None,
        }
    }

    pub fn with_primary(mut self, column: impl Into<String>) -> Self {
        self.primary = Some(column.into());
        self
    }

    pub fn with_secondary(mut self, column: impl Into<String>) -> Self {
        self.secondary = Some(column.into());
        self
    }

    /// Build a request from loosely-typed inputs such as query parameters.
    /// Blank column references count as absent.
    pub fn parse(
        kind: &str,
        primary: Option<&str>,
        secondary: Option<&str>,
    ) -> Result<Self, ChartError> {
        let non_blank = |c: Option<&str>| c.filter(|s| !s.trim().is_empty()).map(str::to_string);
        Ok(ChartRequest {
            kind: kind.parse()?,
            primary: non_blank(primary),
            secondary: non_blank(secondary),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!("Histogram".parse::<ChartKind>().unwrap(), ChartKind::Histogram);
        assert_eq!(" bar ".parse::<ChartKind>().unwrap(), ChartKind::Bar);
        for kind in ChartKind::ALL {
            assert_eq!(kind.to_string().parse::<ChartKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_an_error() {
        assert_eq!(
            "pie".parse::<ChartKind>(),
            Err(ChartError::UnknownChartKind("pie".to_string()))
        );
    }

    #[test]
    fn blank_columns_are_absent() {
        let req = ChartRequest::parse("scatter", Some("a"), Some("  ")).unwrap();
        assert_eq!(req.primary.as_deref(), Some("a"));
        assert_eq!(req.secondary, None);
    }
}
