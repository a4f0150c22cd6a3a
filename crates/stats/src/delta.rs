use serde::Serialize;

/// Change of one metric between two adjacent periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Delta {
    pub value: f64,
    pub percentage: f64,
}

impl Delta {
    pub fn trend(&self) -> Trend {
        Trend::of(self.percentage)
    }
}

/// `previous == 0` reports a `0` percentage whatever the absolute change.
pub fn delta(current: f64, previous: f64) -> Delta {
    Delta {
        value: current - previous,
        percentage: if previous > 0.0 {
            (current - previous) / previous * 100.0
        } else {
            0.0
        },
    }
}

/// Deltas along an ordered period sequence. The first period has nothing
/// to compare with and gets a zero delta.
pub fn period_deltas<R>(rows: &[R], metric: impl Fn(&R) -> f64) -> Vec<Delta> {
    let mut deltas = Vec::with_capacity(rows.len());
    let mut previous: Option<f64> = None;
    for row in rows {
        let current = metric(row);
        deltas.push(match previous {
            Some(previous) => delta(current, previous),
            None => Delta::default(),
        });
        previous = Some(current);
    }
    deltas
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn of(percentage: f64) -> Trend {
        if percentage > 0.0 {
            Trend::Up
        } else if percentage < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Trend::Up => "green",
            Trend::Down => "red",
            Trend::Flat => "gray",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta() {
        let d = delta(120.0, 100.0);
        assert_eq!(d.value, 20.0);
        assert_eq!(d.percentage, 20.0);
        assert_eq!(d.trend(), Trend::Up);

        let d = delta(75.0, 100.0);
        assert_eq!(d.percentage, -25.0);
        assert_eq!(d.trend(), Trend::Down);
        assert_eq!(d.trend().color(), "red");
    }

    #[test]
    fn test_zero_previous_reports_zero_percentage() {
        let d = delta(50.0, 0.0);
        assert_eq!(d.value, 50.0);
        assert_eq!(d.percentage, 0.0);
        assert_eq!(d.trend(), Trend::Flat);
        assert_eq!(d.trend().arrow(), "→");
    }

    #[test]
    fn test_period_deltas() {
        let deltas = period_deltas(&[10.0, 20.0, 0.0, 5.0], |v| *v);
        assert_eq!(deltas[0], Delta::default());
        assert_eq!(deltas[1], Delta { value: 10.0, percentage: 100.0 });
        assert_eq!(deltas[2], Delta { value: -20.0, percentage: -100.0 });
        assert_eq!(deltas[3], Delta { value: 5.0, percentage: 0.0 });
        assert!(period_deltas::<f64>(&[], |v| *v).is_empty());
    }
}
