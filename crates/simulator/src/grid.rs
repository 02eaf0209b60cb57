//! Parameter grids.

/// `steps` evenly spaced values from `start` to `end`, both included.
///
/// A single step yields `[start]`; zero steps yield nothing.
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let dx = (end - start) / (steps - 1) as f64;
            (0..steps).map(|i| start + dx * i as f64).collect()
        }
    }
}

/// `start, start + step, ...` for `floor((end - start) / step) + 1` values.
///
/// `end` is included when the range divides evenly. Returns an empty grid
/// when `step` is not positive or `end < start`.
pub fn arange(start: f64, end: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0 && step.is_finite()) || end < start {
        return Vec::new();
    }
    let len = ((end - start) / step).floor() as usize + 1;
    (0..len).map(|i| start + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(0.3, 0.9, 1), vec![0.3]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_arange_lambda_grid() {
        let grid = arange(0.0, 1.5, 0.01);
        assert_eq!(grid.len(), 151);
        assert_eq!(grid[0], 0.0);
        assert!((grid[150] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_arange_degenerate_inputs() {
        assert_eq!(arange(2.0, 2.0, 0.5), vec![2.0]);
        assert!(arange(0.0, 1.0, 0.0).is_empty());
        assert!(arange(1.0, 0.0, 0.1).is_empty());
    }
}
