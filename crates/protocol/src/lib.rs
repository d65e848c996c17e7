//! The drawing events that come out of the interpreter.
//!
//! These are deliberately device-agnostic: a move is a target point and a flag
//! saying whether it should leave a mark. Whatever drives the motors and the pen
//! actuator consumes them in order.

#![cfg_attr(not(feature = "std"), no_std)]

use serde::{Deserialize, Serialize};

/// The device's working units. The interpreter never scales coordinates, so
/// whatever the program means by "1" is what the device gets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Units;

pub type Point = euclid::Point2D<f32, Units>;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Move the head to `to`. If `drawing` is false, the pen must not touch
    /// the paper during the move.
    Move { to: Point, drawing: bool },
    Pen { down: bool },
}

impl Event {
    pub fn move_to(x: f32, y: f32, drawing: bool) -> Self {
        Event::Move {
            to: Point::new(x, y),
            drawing,
        }
    }

    pub fn pen(down: bool) -> Self {
        Event::Pen { down }
    }

    /// The target of a move event, if this is one.
    pub fn target(&self) -> Option<Point> {
        match self {
            Event::Move { to, .. } => Some(*to),
            Event::Pen { .. } => None,
        }
    }
}
