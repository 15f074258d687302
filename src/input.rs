//! Input normalization.
//!
//! Mouse and touch events arrive in viewport coordinates. Both are turned
//! into [`PressEvent`]s in surface-local space here, then fed to
//! [`SignaturePad::handle`](crate::SignaturePad::handle). Only the first
//! touch of a gesture is followed.

use log::trace;

use crate::{signature_core::PressEvent, surface::Point};

/// On-screen top-left of the surface in viewport space.
///
/// Layout moves on scroll/resize, so read a fresh one for every event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceOrigin {
    pub left: f64,
    pub top:  f64
}

impl SurfaceOrigin {
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    pub fn to_local(self, client: Point) -> Point {
        Point::new(client.x - self.left, client.y - self.top)
    }
}

/// Mouse/pointer input in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Point),
    Move(Point),
    Up,
    /// Pointer left the surface; ends the stroke.
    Leave
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchContact {
    pub id:     i32,
    pub client: Point
}

impl TouchContact {
    pub const fn new(id: i32, x: f64, y: f64) -> Self {
        Self {
            id,
            client: Point::new(x, y)
        }
    }
}

/// Touch input. `Start`/`Move` carry the currently active touches,
/// `End` carries the touches that were lifted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchInput<'a> {
    Start(&'a [TouchContact]),
    Move(&'a [TouchContact]),
    End(&'a [TouchContact]),
    Cancel
}

/// Maps raw device input to press events, following one primary touch.
#[derive(Debug, Default)]
pub struct InputRouter {
    primary_touch: Option<i32>
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Touch events on the surface must not scroll or zoom the page.
    pub const fn consumes_touch(&self) -> bool {
        true
    }

    pub fn primary_touch(&self) -> Option<i32> {
        self.primary_touch
    }

    pub fn pointer(&self, input: PointerInput, origin: SurfaceOrigin) -> Option<PressEvent> {
        match input {
            PointerInput::Down(p) => Some(PressEvent::Start(origin.to_local(p))),
            PointerInput::Move(p) => Some(PressEvent::Move(origin.to_local(p))),
            PointerInput::Up | PointerInput::Leave => Some(PressEvent::End)
        }
    }

    pub fn touch(&mut self, input: TouchInput<'_>, origin: SurfaceOrigin) -> Option<PressEvent> {
        match input {
            TouchInput::Start(active) => {
                if self.primary_touch.is_some() {
                    trace!("ignoring extra touch");
                    return None;
                }
                let first = active.first()?;
                self.primary_touch = Some(first.id);
                Some(PressEvent::Start(origin.to_local(first.client)))
            }
            TouchInput::Move(active) => {
                let id = self.primary_touch?;
                let contact = active.iter().find(|t| t.id == id)?;
                Some(PressEvent::Move(origin.to_local(contact.client)))
            }
            TouchInput::End(lifted) => {
                let id = self.primary_touch?;
                if lifted.iter().any(|t| t.id == id) {
                    self.primary_touch = None;
                    Some(PressEvent::End)
                } else {
                    None
                }
            }
            TouchInput::Cancel => {
                self.primary_touch = None;
                Some(PressEvent::End)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const ORIGIN: SurfaceOrigin = SurfaceOrigin::new(100.0, 50.0);

    #[test]
    fn touch_start_maps_to_local_point() {
        let mut r = InputRouter::new();
        let ev = r.touch(TouchInput::Start(&[TouchContact::new(7, 110.0, 60.0)]), ORIGIN);
        assert_eq!(ev, Some(PressEvent::Start(Point::new(10.0, 10.0))));
        assert_eq!(r.primary_touch(), Some(7));
        assert!(r.consumes_touch());
    }

    #[test]
    fn pointer_uses_origin_of_each_event() {
        let r = InputRouter::new();
        let down = r.pointer(PointerInput::Down(Point::new(120.0, 70.0)), ORIGIN);
        assert_eq!(down, Some(PressEvent::Start(Point::new(20.0, 20.0))));
        // page scrolled by 30px between events
        let moved = r.pointer(
            PointerInput::Move(Point::new(120.0, 70.0)),
            SurfaceOrigin::new(100.0, 20.0)
        );
        assert_eq!(moved, Some(PressEvent::Move(Point::new(20.0, 50.0))));
        assert_eq!(r.pointer(PointerInput::Leave, ORIGIN), Some(PressEvent::End));
    }

    #[test]
    fn second_finger_is_ignored() {
        let mut r = InputRouter::new();
        let a = TouchContact::new(1, 110.0, 60.0);
        let b = TouchContact::new(2, 300.0, 300.0);
        r.touch(TouchInput::Start(&[a]), ORIGIN);
        assert_eq!(r.touch(TouchInput::Start(&[a, b]), ORIGIN), None);

        let a_moved = TouchContact::new(1, 130.0, 80.0);
        assert_eq!(
            r.touch(TouchInput::Move(&[b, a_moved]), ORIGIN),
            Some(PressEvent::Move(Point::new(30.0, 30.0)))
        );
        // lifting the second finger does not end the stroke
        assert_eq!(r.touch(TouchInput::End(&[b]), ORIGIN), None);
        assert_eq!(r.touch(TouchInput::End(&[a_moved]), ORIGIN), Some(PressEvent::End));
        assert_eq!(r.primary_touch(), None);
    }

    #[test]
    fn move_without_primary_is_dropped() {
        let mut r = InputRouter::new();
        let t = TouchContact::new(3, 110.0, 60.0);
        assert_eq!(r.touch(TouchInput::Move(&[t]), ORIGIN), None);
        assert_eq!(r.touch(TouchInput::End(&[t]), ORIGIN), None);
        assert_eq!(r.touch(TouchInput::Start(&[]), ORIGIN), None);
    }

    #[test]
    fn cancel_releases_tracking() {
        let mut r = InputRouter::new();
        r.touch(TouchInput::Start(&[TouchContact::new(4, 0.0, 0.0)]), ORIGIN);
        assert_eq!(r.touch(TouchInput::Cancel, ORIGIN), Some(PressEvent::End));
        assert_eq!(r.primary_touch(), None);
    }
}
