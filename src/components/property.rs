//! Script-visible entity properties.
//!
//! [`PropertyKey`] names every field the bridge can read or write and
//! [`PropertyValue`] is the small dynamic value type crossing the boundary.
//! Writes to `group` and `layer` are not plain stores: the bridge routes
//! them through the pool so the entity is relinked in its collision list or
//! re-keyed in the render order.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    X,
    Y,
    Vx,
    Vy,
    Ax,
    Ay,
    Dx,
    Dy,
    Group,
    Layer,
    Uid,
    Status,
    Timer,
    FramesAlive,
    Shape,
    A,
    B,
    Rot,
    World,
    IgnoreSuperPause,
    Colli,
    Bound,
    Hide,
}

impl PropertyKey {
    /// Every key, in the order the stub generator documents them.
    pub const ALL: [PropertyKey; 23] = [
        PropertyKey::X,
        PropertyKey::Y,
        PropertyKey::Vx,
        PropertyKey::Vy,
        PropertyKey::Ax,
        PropertyKey::Ay,
        PropertyKey::Dx,
        PropertyKey::Dy,
        PropertyKey::Group,
        PropertyKey::Layer,
        PropertyKey::Uid,
        PropertyKey::Status,
        PropertyKey::Timer,
        PropertyKey::FramesAlive,
        PropertyKey::Shape,
        PropertyKey::A,
        PropertyKey::B,
        PropertyKey::Rot,
        PropertyKey::World,
        PropertyKey::IgnoreSuperPause,
        PropertyKey::Colli,
        PropertyKey::Bound,
        PropertyKey::Hide,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PropertyKey::X => "x",
            PropertyKey::Y => "y",
            PropertyKey::Vx => "vx",
            PropertyKey::Vy => "vy",
            PropertyKey::Ax => "ax",
            PropertyKey::Ay => "ay",
            PropertyKey::Dx => "dx",
            PropertyKey::Dy => "dy",
            PropertyKey::Group => "group",
            PropertyKey::Layer => "layer",
            PropertyKey::Uid => "uid",
            PropertyKey::Status => "status",
            PropertyKey::Timer => "timer",
            PropertyKey::FramesAlive => "frames_alive",
            PropertyKey::Shape => "shape",
            PropertyKey::A => "a",
            PropertyKey::B => "b",
            PropertyKey::Rot => "rot",
            PropertyKey::World => "world",
            PropertyKey::IgnoreSuperPause => "ignore_super_pause",
            PropertyKey::Colli => "colli",
            PropertyKey::Bound => "bound",
            PropertyKey::Hide => "hide",
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            PropertyKey::Dx
                | PropertyKey::Dy
                | PropertyKey::Uid
                | PropertyKey::Status
                | PropertyKey::FramesAlive
        )
    }

    /// Lua type name used in generated stubs.
    pub fn lua_type(self) -> &'static str {
        match self {
            PropertyKey::Group
            | PropertyKey::Uid
            | PropertyKey::Status
            | PropertyKey::Timer
            | PropertyKey::FramesAlive
            | PropertyKey::Shape
            | PropertyKey::World => "integer",
            PropertyKey::IgnoreSuperPause
            | PropertyKey::Colli
            | PropertyKey::Bound
            | PropertyKey::Hide => "boolean",
            _ => "number",
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PropertyKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyKey::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Integer(i64),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_f64(self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(v),
            PropertyValue::Integer(v) => Some(v as f64),
            PropertyValue::Bool(_) => None,
        }
    }

    /// Integral view. Floats are accepted only when they hold a whole number.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            PropertyValue::Integer(v) => Some(v),
            PropertyValue::Number(v) if v.fract() == 0.0 && v.is_finite() => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Number(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}
