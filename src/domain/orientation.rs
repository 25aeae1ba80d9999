// Maps device tilt to world gravity, per screen orientation.

use super::world::Gravity;

/// One device-orientation sample: screen rotation in degrees plus the
/// front-back (`beta`) and left-right (`gamma`) tilt in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationReading {
    pub screen_degrees: i32,
    pub beta: f32,
    pub gamma: f32,
}

fn unit(degrees: f32) -> f32 {
    degrees.clamp(-90.0, 90.0) / 90.0
}

/// Gravity for the reading, or `None` for an unsupported screen rotation.
///
/// With `flipped` set the vertical component is negated so a gravity flip
/// survives later tilt updates.
pub fn gravity_from_orientation(reading: OrientationReading, flipped: bool) -> Option<Gravity> {
    let OrientationReading {
        screen_degrees,
        beta,
        gamma,
    } = reading;
    let (x, y) = match screen_degrees {
        0 => (unit(gamma), unit(beta)),
        180 => (unit(gamma), unit(-beta)),
        90 => (unit(beta), unit(-gamma)),
        -90 => (unit(-beta), unit(gamma)),
        _ => return None,
    };
    Some(Gravity {
        x,
        y: if flipped { -y } else { y },
    })
}
