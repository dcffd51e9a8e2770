use roadalign_parser::{Fields, Value};

use crate::error::AlignmentError;

/// One break in displayed stationing.
///
/// Displayed stations strictly between `back` and `ahead` do not exist;
/// `internal` is the continuous station at which the break happens.
#[derive(Debug, Clone, PartialEq)]
pub struct StationEquation {
    pub back: f64,
    pub ahead: f64,
    pub internal: f64,
    pub adjustment: f64,
    pub description: Option<String>,
}

impl StationEquation {
    /// Equation with `adjustment = ahead - back`.
    #[must_use]
    pub fn new(back: f64, ahead: f64, internal: f64) -> Self {
        Self {
            back,
            ahead,
            internal,
            adjustment: ahead - back,
            description: None,
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut v = Value::map();
        v.insert("staBack", Value::number(self.back));
        v.insert("staAhead", Value::number(self.ahead));
        v.insert("staInternal", Value::number(self.internal));
        v.insert("adjustment", Value::number(self.adjustment));
        if let Some(d) = &self.description {
            v.insert("desc", Value::from(d.as_str()));
        }
        v
    }
}

/// Displayed ↔ internal station mapping, ordered by internal station.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationEquations {
    equations: Vec<StationEquation>,
}

impl StationEquations {
    /// Validate and wrap equations supplied in strictly ascending internal order.
    pub fn new(equations: Vec<StationEquation>) -> Result<Self, AlignmentError> {
        for (index, eq) in equations.iter().enumerate() {
            if !(eq.back.is_finite() && eq.ahead.is_finite() && eq.internal.is_finite()) {
                return Err(AlignmentError::InvalidStationEquations {
                    index,
                    message: "stations must be finite".into(),
                });
            }
        }
        for (index, pair) in equations.windows(2).enumerate() {
            if pair[1].internal <= pair[0].internal {
                return Err(AlignmentError::InvalidStationEquations {
                    index: index + 1,
                    message: format!(
                        "internal station {} does not follow {}",
                        pair[1].internal, pair[0].internal
                    ),
                });
            }
        }
        Ok(Self { equations })
    }

    /// Parse `StaEquation` entries.
    ///
    /// A missing `staInternal` is found by mapping `staBack` through the
    /// equations before it.
    pub fn from_values(items: &[Value]) -> Result<Self, AlignmentError> {
        let mut table = StationEquations::default();
        for (index, item) in items.iter().enumerate() {
            let f = Fields::new(item, "StaEquation")?;
            let missing = |key: &str| AlignmentError::InvalidStationEquations {
                index,
                message: format!("missing \"{key}\""),
            };
            let back = f.number("staBack")?.ok_or_else(|| missing("staBack"))?;
            let ahead = f
                .number("staAhead")?
                .ok_or_else(|| missing("staAhead"))?;
            let internal = match f.number("staInternal")? {
                Some(i) => i,
                None => table.to_internal(back),
            };
            let adjustment = f.number("adjustment")?.unwrap_or(ahead - back);
            let description = f.string("desc")?.map(str::to_string);

            let mut equations = table.equations;
            equations.push(StationEquation {
                back,
                ahead,
                internal,
                adjustment,
                description,
            });
            table = StationEquations::new(equations)?;
        }
        Ok(table)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.equations.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[StationEquation] {
        &self.equations
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationEquation> {
        self.equations.iter()
    }

    /// Displayed station to internal station.
    ///
    /// Stations inside an equation gap stay on the back chain.
    #[must_use]
    pub fn to_internal(&self, station: f64) -> f64 {
        let mut internal = station;
        for eq in &self.equations {
            if station < eq.ahead {
                break;
            }
            internal = eq.internal + (station - eq.ahead);
        }
        internal
    }

    /// Internal station to displayed station.
    #[must_use]
    pub fn to_station(&self, internal: f64) -> f64 {
        let mut station = internal;
        for eq in &self.equations {
            if internal < eq.internal {
                break;
            }
            station = eq.ahead + (internal - eq.internal);
        }
        station
    }

    /// Whether `station` falls strictly inside a gap left by a forward equation.
    #[must_use]
    pub fn is_void(&self, station: f64) -> bool {
        self.equations
            .iter()
            .any(|eq| eq.ahead > eq.back && station > eq.back && station < eq.ahead)
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Seq(self.equations.iter().map(StationEquation::to_value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn gap_at_500() -> StationEquations {
        StationEquations::new(vec![StationEquation::new(500.0, 600.0, 500.0)]).unwrap()
    }

    fn parse(j: serde_json::Value) -> Result<StationEquations, AlignmentError> {
        let v = Value::from_json_value(&j);
        StationEquations::from_values(v.as_seq().unwrap())
    }

    #[test]
    fn empty_table_is_identity() {
        let t = StationEquations::default();
        assert_eq!(t.to_internal(123.4), 123.4);
        assert_eq!(t.to_station(123.4), 123.4);
        assert!(!t.is_void(123.4));
    }

    #[test]
    fn gap_collapses_onto_back_station() {
        let t = gap_at_500();
        assert_abs_diff_eq!(t.to_internal(600.0), t.to_internal(500.0));
        assert_abs_diff_eq!(t.to_internal(650.0), 550.0);
        assert_abs_diff_eq!(t.to_station(550.0), 650.0);
        assert_abs_diff_eq!(t.to_station(400.0), 400.0);
    }

    #[test]
    fn gap_stations_resolve_on_back_chain() {
        let t = gap_at_500();
        assert_abs_diff_eq!(t.to_internal(599.999), 599.999);
        assert!(t.is_void(599.999));
        assert!(!t.is_void(500.0));
        assert!(!t.is_void(600.0));
    }

    #[test]
    fn missing_internal_maps_back_through_earlier_equations() {
        let t = parse(serde_json::json!([
            {"staBack": 500, "staAhead": 600},
            {"staBack": 900, "staAhead": 1000, "desc": "second"}
        ]))
        .unwrap();
        let eqs = t.as_slice();
        assert_abs_diff_eq!(eqs[0].internal, 500.0);
        assert_abs_diff_eq!(eqs[1].internal, 800.0);
        assert_abs_diff_eq!(eqs[1].adjustment, 100.0);
        assert_eq!(eqs[1].description.as_deref(), Some("second"));
        assert_abs_diff_eq!(t.to_internal(1050.0), 850.0);
        assert_abs_diff_eq!(t.to_station(850.0), 1050.0);
    }

    #[test]
    fn explicit_adjustment_is_kept() {
        let t = parse(serde_json::json!([
            {"staBack": 500, "staAhead": 600, "staInternal": 480, "adjustment": 7}
        ]))
        .unwrap();
        assert_abs_diff_eq!(t.as_slice()[0].internal, 480.0);
        assert_abs_diff_eq!(t.as_slice()[0].adjustment, 7.0);
    }

    #[test]
    fn non_ascending_internal_is_rejected() {
        let err = StationEquations::new(vec![
            StationEquation::new(500.0, 600.0, 500.0),
            StationEquation::new(400.0, 450.0, 400.0),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::InvalidStationEquations { index: 1, .. }
        ));

        let err = StationEquations::new(vec![
            StationEquation::new(500.0, 600.0, 500.0),
            StationEquation::new(700.0, 800.0, 500.0),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::InvalidStationEquations { .. }
        ));
    }

    #[test]
    fn missing_back_station_is_rejected() {
        let err = parse(serde_json::json!([{"staAhead": 600}])).unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::InvalidStationEquations { index: 0, .. }
        ));
    }

    #[test]
    fn equation_document_form() {
        let v = gap_at_500().to_value();
        let first = &v.as_seq().unwrap()[0];
        assert_eq!(first.get("staBack").and_then(Value::as_f64), Some(500.0));
        assert_eq!(first.get("staAhead").and_then(Value::as_f64), Some(600.0));
        assert_eq!(first.get("adjustment").and_then(Value::as_f64), Some(100.0));
        assert!(first.get("desc").is_none());
    }

    fn chained() -> StationEquations {
        StationEquations::new(vec![
            StationEquation::new(500.0, 600.0, 500.0),
            StationEquation::new(900.0, 1000.0, 800.0),
        ])
        .unwrap()
    }

    proptest! {
        #[test]
        fn inverse_law_off_the_gaps(station in 0.0f64..2000.0) {
            let t = chained();
            prop_assume!(!t.is_void(station));
            let back = t.to_station(t.to_internal(station));
            prop_assert!((back - station).abs() < 1e-9);
        }

        #[test]
        fn monotonic_without_equation_between(a in 0.0f64..2000.0, b in 0.0f64..2000.0) {
            let t = chained();
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assume!(hi - lo > 1e-9);
            let crosses = t.iter().any(|eq| lo < eq.ahead && hi >= eq.back);
            prop_assume!(!crosses);
            prop_assert!(t.to_internal(lo) < t.to_internal(hi));
        }
    }
}
