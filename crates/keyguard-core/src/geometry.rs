//! Pattern lock geometry.
//!
//! The lock pattern view is a 3×3 grid of equally sized square cells. Digits
//! index the grid row-major, 1 top-left and 9 bottom-right. Everything here is
//! pure: positions are derived from the origin and cell size, never aliased.

use crate::error::{UnlockError, UnlockResult};
use crate::types::{Position, TouchAction};

const GRID_COLUMNS: i32 = 3;

/// Center of the cell for `digit` in a grid whose top-left corner is `origin`.
pub fn key_position(digit: u8, origin: Position, cell_size: f64) -> Position {
    debug_assert!((1..=9).contains(&digit), "pattern digit out of range: {digit}");
    let d = i32::from(digit);
    let column = (d - 1).rem_euclid(GRID_COLUMNS) + 1;
    let row = (d + GRID_COLUMNS - 1) / GRID_COLUMNS;
    Position {
        x: round_half_up(f64::from(origin.x) + f64::from(column) * cell_size - cell_size / 2.0),
        y: round_half_up(f64::from(origin.y) + f64::from(row) * cell_size - cell_size / 2.0),
    }
}

/// Touch actions drawing `digits` as one continuous stroke.
///
/// Each `moveTo` targets the previous key position shifted by one cell per
/// axis, or two cells when the next key is not adjacent, so the drag crosses
/// every intermediate cell.
pub fn gesture_actions(digits: &[u8], origin: Position, cell_size: f64) -> Vec<TouchAction> {
    let mut actions = Vec::with_capacity(digits.len() + 1);
    let mut last: Option<Position> = None;

    for &digit in digits {
        let pos = key_position(digit, origin, cell_size);
        match last {
            None => actions.push(TouchAction::press(pos)),
            Some(prev) => {
                let dx = axis_offset(pos.x - prev.x, cell_size);
                let dy = axis_offset(pos.y - prev.y, cell_size);
                actions.push(TouchAction::move_to(Position {
                    x: round_half_up(f64::from(prev.x) + dx),
                    y: round_half_up(f64::from(prev.y) + dy),
                }));
            }
        }
        last = Some(pos);
    }

    actions.push(TouchAction::Release);
    actions
}

/// Split a pattern key into digits, ignoring whitespace.
pub fn parse_pattern_digits(key: &str) -> UnlockResult<Vec<u8>> {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c.to_digit(10) {
            Some(d) if d >= 1 => Ok(d as u8),
            _ => Err(UnlockError::validation(format!(
                "'{c}' is not a pattern digit in range 1..9"
            ))),
        })
        .collect()
}

fn axis_offset(delta: i32, cell_size: f64) -> f64 {
    if delta == 0 {
        return 0.0;
    }
    let sign = f64::from(delta.signum());
    let mut offset = sign * cell_size;
    if f64::from(delta.abs()) > cell_size {
        offset += sign * cell_size;
    }
    offset
}

/// Ties round toward positive infinity.
fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Position = Position { x: 100, y: 100 };

    fn expected(digit: u8, origin: Position, cell: f64) -> Position {
        let col = f64::from((digit - 1) % 3 + 1);
        let row = (f64::from(digit) / 3.0).ceil();
        Position {
            x: (f64::from(origin.x) + col * cell - cell / 2.0 + 0.5).floor() as i32,
            y: (f64::from(origin.y) + row * cell - cell / 2.0 + 0.5).floor() as i32,
        }
    }

    #[test]
    fn key_position_matches_formula_for_every_digit() {
        for digit in 1..=9 {
            assert_eq!(key_position(digit, ORIGIN, 30.0), expected(digit, ORIGIN, 30.0));
            assert_eq!(
                key_position(digit, Position::new(7, 413), 33.4),
                expected(digit, Position::new(7, 413), 33.4)
            );
        }
    }

    #[test]
    fn key_position_corners_and_center() {
        assert_eq!(key_position(1, ORIGIN, 30.0), Position::new(115, 115));
        assert_eq!(key_position(5, ORIGIN, 30.0), Position::new(145, 145));
        assert_eq!(key_position(9, ORIGIN, 30.0), Position::new(175, 175));
        assert_eq!(key_position(3, Position::default(), 30.0), Position::new(75, 15));
        assert_eq!(key_position(7, Position::default(), 30.0), Position::new(15, 75));
    }

    #[test]
    fn rounding_ties_go_up() {
        // 0 + 1 * 5 - 2.5 = 2.5
        assert_eq!(key_position(1, Position::default(), 5.0), Position::new(3, 3));
        // -10 + 2.5 = -7.5
        assert_eq!(key_position(1, Position::new(-10, -10), 5.0), Position::new(-7, -7));
    }

    #[test]
    fn sequence_shape() {
        for n in 2..=9usize {
            let digits: Vec<u8> = (1..=n as u8).collect();
            let actions = gesture_actions(&digits, ORIGIN, 30.0);
            assert_eq!(actions.len(), n + 1);
            assert!(matches!(actions[0], TouchAction::Press { .. }));
            assert_eq!(actions[n], TouchAction::Release);
            assert!(actions[1..n]
                .iter()
                .all(|a| matches!(a, TouchAction::MoveTo { .. })));
        }
    }

    #[test]
    fn press_lands_on_first_key() {
        let actions = gesture_actions(&[5, 1], ORIGIN, 30.0);
        assert_eq!(actions[0], TouchAction::press(Position::new(145, 145)));
    }

    #[test]
    fn adjacent_move_is_one_cell() {
        let actions = gesture_actions(&[1, 2], ORIGIN, 30.0);
        let start = actions[0].position().unwrap();
        let target = actions[1].position().unwrap();
        assert_eq!(target.x - start.x, 30);
        assert_eq!(target.y - start.y, 0);
    }

    #[test]
    fn skip_over_move_is_two_cells() {
        let actions = gesture_actions(&[1, 3], ORIGIN, 30.0);
        let start = actions[0].position().unwrap();
        let target = actions[1].position().unwrap();
        assert_eq!(target.x - start.x, 60);
        assert_eq!(target.y, start.y);
    }

    #[test]
    fn diagonal_and_negative_moves() {
        // 9 -> 1 crosses the grid diagonally upward
        let actions = gesture_actions(&[9, 1], ORIGIN, 30.0);
        assert_eq!(actions[1], TouchAction::move_to(Position::new(115, 115)));

        // 6 -> 4 moves two cells left, same row
        let actions = gesture_actions(&[6, 4], ORIGIN, 30.0);
        assert_eq!(actions[0], TouchAction::press(Position::new(175, 145)));
        assert_eq!(actions[1], TouchAction::move_to(Position::new(115, 145)));

        // 2 -> 7 is a knight move: one column left, two rows down
        let actions = gesture_actions(&[2, 7], ORIGIN, 30.0);
        assert_eq!(actions[1], TouchAction::move_to(Position::new(115, 175)));
    }

    #[test]
    fn moves_are_relative_to_previous_key_not_previous_waypoint() {
        // 1 -> 2 -> 3: the second move starts from key 2's center
        let actions = gesture_actions(&[1, 2, 3], ORIGIN, 30.0);
        assert_eq!(actions[1], TouchAction::move_to(Position::new(145, 115)));
        assert_eq!(actions[2], TouchAction::move_to(Position::new(175, 115)));
    }

    #[test]
    fn fractional_cell_size() {
        // width 100 -> cell 33.33..
        let cell = 100.0 / 3.0;
        let actions = gesture_actions(&[1, 2], Position::default(), cell);
        assert_eq!(actions[0], TouchAction::press(Position::new(17, 17)));
        assert_eq!(actions[1], TouchAction::move_to(Position::new(50, 17)));
    }

    #[test]
    fn origin_is_not_mutated() {
        let origin = Position::new(12, 34);
        let copy = origin;
        let _ = gesture_actions(&[1, 5, 9], origin, 20.0);
        assert_eq!(origin, copy);
    }

    #[test]
    fn parse_digits() {
        assert_eq!(parse_pattern_digits("1 5 9").unwrap(), vec![1, 5, 9]);
        assert!(parse_pattern_digits("105").is_err());
        assert!(parse_pattern_digits("1a").is_err());
    }
}
