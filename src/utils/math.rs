//! # Game Mathematics
//!
//! Grid geometry helpers shared by targeting and line-of-fire checks.

use crate::game::Position;

/// Cells on the Bresenham line from `from` to `to`, both ends included.
///
/// # Examples
///
/// ```
/// use breakdown::{bresenham_line, Position};
///
/// let line = bresenham_line(Position::new(0, 0), Position::new(3, 1));
/// assert_eq!(line.first(), Some(&Position::new(0, 0)));
/// assert_eq!(line.last(), Some(&Position::new(3, 1)));
/// assert_eq!(line.len(), 4);
/// ```
pub fn bresenham_line(from: Position, to: Position) -> Vec<Position> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let step_x = if from.x < to.x { 1 } else { -1 };
    let step_y = if from.y < to.y { 1 } else { -1 };

    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    let mut error = dx + dy;
    let mut current = from;

    loop {
        points.push(current);
        if current == to {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            current.x += step_x;
        }
        if doubled <= dx {
            error += dx;
            current.y += step_y;
        }
    }

    points
}

/// Normalised direction from `from` towards `to`, rounded to one of the
/// eight neighbouring offsets. Returns `(0, 0)` when both are equal.
pub fn direction_towards(from: Position, to: Position) -> Position {
    if from == to {
        return Position::origin();
    }
    let dx = (to.x - from.x) as f64;
    let dy = (to.y - from.y) as f64;
    let distance = (dx * dx + dy * dy).sqrt();
    Position::new((dx / distance).round() as i32, (dy / distance).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_to_self() {
        let p = Position::new(4, 4);
        assert_eq!(bresenham_line(p, p), vec![p]);
    }

    #[test]
    fn test_line_is_contiguous() {
        let from = Position::new(2, 9);
        let to = Position::new(11, 3);
        let line = bresenham_line(from, to);
        assert_eq!(line[0], from);
        assert_eq!(*line.last().unwrap(), to);
        for pair in line.windows(2) {
            assert_eq!(pair[0].chebyshev_distance(pair[1]), 1);
        }
        assert_eq!(line.len(), 10);
    }

    #[test]
    fn test_straight_lines() {
        let line = bresenham_line(Position::new(5, 5), Position::new(5, 1));
        assert_eq!(
            line,
            vec![
                Position::new(5, 5),
                Position::new(5, 4),
                Position::new(5, 3),
                Position::new(5, 2),
                Position::new(5, 1),
            ]
        );
    }

    #[test]
    fn test_direction_towards() {
        let origin = Position::new(10, 10);
        assert_eq!(direction_towards(origin, Position::new(20, 10)), Position::new(1, 0));
        assert_eq!(direction_towards(origin, Position::new(0, 0)), Position::new(-1, -1));
        assert_eq!(direction_towards(origin, Position::new(11, 30)), Position::new(0, 1));
        assert_eq!(direction_towards(origin, origin), Position::new(0, 0));
    }
}
