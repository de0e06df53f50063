//! Per-player, per-round order queues.
//!
//! An [`Action`] accepts at most one order per unit and keeps submission
//! order. The same type doubles as the log of executed orders returned by
//! [`crate::game::Board::next`].
//!
//! Text form, one order per line, terminated by `-1`:
//!
//! ```text
//! 3 n
//! 7 e
//! -1
//! ```

use std::collections::HashSet;
use std::io::{self, Write};

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::game::{Direction, UnitId};

/// Terminator of an order list in text form.
pub const END_OF_ORDERS: &str = "-1";

/// One instruction: move or attack with `unit` towards `dir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Unit to act with.
    pub unit: UnitId,
    /// Direction to move or attack in.
    pub dir: Direction,
}

/// Error reading orders from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    /// A unit id token is not a number.
    #[error("invalid unit id '{0}' in order list")]
    BadUnitId(String),
    /// The `-1` terminator is missing.
    #[error("order list is not terminated by {END_OF_ORDERS}")]
    Unterminated,
}

/// Ordered queue of orders with one order per unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Action {
    orders: Vec<Order>,
    #[serde(skip)]
    seen: HashSet<UnitId>,
}

impl Action {
    /// Create an empty action.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an order.
    ///
    /// Returns `false`, and leaves the queue unchanged, if the unit already
    /// has an order.
    pub fn submit(&mut self, unit: UnitId, dir: Direction) -> bool {
        if !self.seen.insert(unit) {
            warn!(unit, "order already submitted for unit, ignoring");
            return false;
        }
        self.orders.push(Order { unit, dir });
        true
    }

    /// Whether a unit already has an order.
    #[must_use]
    pub fn has_order(&self, unit: UnitId) -> bool {
        self.seen.contains(&unit)
    }

    /// Orders in submission order.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Iterate orders in submission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }

    /// Number of queued orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Drop every order.
    pub fn clear(&mut self) {
        self.orders.clear();
        self.seen.clear();
    }

    /// Write the orders in text form, including the terminator.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for order in &self.orders {
            writeln!(out, "{} {}", order.unit, order.dir.glyph())?;
        }
        writeln!(out, "{END_OF_ORDERS}")
    }

    /// Render the orders in text form.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for order in &self.orders {
            out.push_str(&format!("{} {}\n", order.unit, order.dir.glyph()));
        }
        out.push_str(END_OF_ORDERS);
        out.push('\n');
        out
    }

    /// Read orders from text.
    ///
    /// Duplicate orders and unknown direction glyphs are skipped with a
    /// warning. A trailing unit id without a direction ends the list.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-numeric unit id or a missing terminator.
    pub fn read(text: &str) -> Result<Self, ActionParseError> {
        let mut action = Self::new();
        let mut tokens = text.split_whitespace();

        loop {
            let Some(token) = tokens.next() else {
                return Err(ActionParseError::Unterminated);
            };
            if token == END_OF_ORDERS {
                return Ok(action);
            }
            let unit: UnitId = token
                .parse()
                .map_err(|_| ActionParseError::BadUnitId(token.to_string()))?;

            let Some(dir_token) = tokens.next() else {
                warn!(unit, "only half an order given, stopping");
                return Ok(action);
            };
            let mut chars = dir_token.chars();
            let dir = match (chars.next(), chars.next()) {
                (Some(c), None) => Direction::from_glyph(c),
                _ => None,
            };
            match dir {
                Some(dir) => {
                    action.submit(unit, dir);
                }
                None => warn!(unit, direction = dir_token, "unknown direction, skipping order"),
            }
        }
    }
}

impl<'a> IntoIterator for &'a Action {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}
