//! Drawing helpers: pure functions that turn geometry into encoded point bytes on a point-pipe
//! writer. These are ambient conveniences shipped alongside the streaming engine, not part of its
//! pacing/control logic — the engine only ever knows how to drain bytes a writer like this one
//! filled, whatever filled it.

use crate::config::BlankCount;
use crate::point::Point;
use std::io::{self, Write};

/// Default draw speed (points per unit distance) used by [`draw_path`] when `draw_speed == 0`.
pub const DEFAULT_DRAW_SPEED: u32 = 50;

/// One endpoint-to-endpoint line segment to be drawn or blanked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x0: i16,
    pub y0: i16,
    pub x1: i16,
    pub y1: i16,
}

impl Segment {
    pub fn new(x0: i16, y0: i16, x1: i16, y1: i16) -> Self {
        Segment { x0, y0, x1, y1 }
    }

    fn distance(&self) -> f64 {
        let dx = (self.x1 - self.x0) as f64;
        let dy = (self.y1 - self.y0) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An RGB color for [`draw_path`]. Intensity resolves via the same default rule as [`Point`]:
/// zero means "brightest channel".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Color {
    pub fn new(r: u16, g: u16, b: u16) -> Self {
        Color { r, g, b }
    }
}

/// Linearly interpolate `segment` and write the encoded intermediate points to `writer`, ending
/// exactly on the endpoint. Emits `ceil(distance(p0, p1) / draw_speed)` points; `draw_speed == 0`
/// uses [`DEFAULT_DRAW_SPEED`].
pub fn draw_path<W: Write>(
    writer: &mut W,
    segment: Segment,
    color: Color,
    draw_speed: u32,
) -> io::Result<()> {
    let draw_speed = if draw_speed == 0 { DEFAULT_DRAW_SPEED } else { draw_speed };
    let steps = ((segment.distance() / draw_speed as f64).ceil() as u32).max(1);
    for step in 1..=steps {
        let t = step as f64 / steps as f64;
        let x = segment.x0 as f64 + (segment.x1 - segment.x0) as f64 * t;
        let y = segment.y0 as f64 + (segment.y1 - segment.y0) as f64 * t;
        let point = Point::new(x.round() as i16, y.round() as i16, color.r, color.g, color.b);
        writer.write_all(&point.encode())?;
    }
    Ok(())
}

/// Blank `segment`: write `blank_count.pre` blanked points at `p0`, then `blank_count.post`
/// blanked points at `p1`, moving the beam invisibly between the two.
pub fn blank_path<W: Write>(
    writer: &mut W,
    segment: Segment,
    blank_count: BlankCount,
) -> io::Result<()> {
    let p0 = Point::blank(segment.x0, segment.y0).encode();
    let p1 = Point::blank(segment.x1, segment.y1).encode();
    for _ in 0..blank_count.pre {
        writer.write_all(&p0)?;
    }
    for _ in 0..blank_count.post {
        writer.write_all(&p1)?;
    }
    Ok(())
}

/// Pad the current frame to exactly `frame_points` samples by writing
/// `frame_points - points_played` blanked copies of `last_point`'s position, preserving the
/// galvo's last position while the generator has nothing left to draw this cycle.
pub fn next_frame<W: Write>(
    writer: &mut W,
    frame_points: u32,
    points_played: u32,
    last_point: Point,
) -> io::Result<()> {
    let pad = frame_points.saturating_sub(points_played);
    let blanked = Point::blank(last_point.x, last_point.y).encode();
    for _ in 0..pad {
        writer.write_all(&blanked)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ConstSizeBytes;

    fn decode_all(bytes: &[u8]) -> Vec<Point> {
        bytes
            .chunks_exact(Point::SIZE_BYTES)
            .map(|c| Point::decode(c.try_into().unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn draw_path_ends_exactly_on_the_endpoint() {
        let mut buf = Vec::new();
        let segment = Segment::new(0, 0, 100, 0);
        draw_path(&mut buf, segment, Color::new(1, 2, 3), 25).unwrap();
        let points = decode_all(&buf);
        assert_eq!(points.len(), 4); // ceil(100/25)
        let last = points.last().unwrap();
        assert_eq!((last.x, last.y), (100, 0));
        assert_eq!((last.r, last.g, last.b), (1, 2, 3));
    }

    #[test]
    fn draw_path_zero_speed_uses_default() {
        let mut buf = Vec::new();
        let segment = Segment::new(0, 0, 50, 0);
        draw_path(&mut buf, segment, Color::new(1, 1, 1), 0).unwrap();
        let points = decode_all(&buf);
        assert_eq!(points.len(), 1); // ceil(50/50)
    }

    #[test]
    fn draw_path_degenerate_segment_emits_one_point() {
        let mut buf = Vec::new();
        let segment = Segment::new(5, 5, 5, 5);
        draw_path(&mut buf, segment, Color::new(9, 9, 9), 50).unwrap();
        assert_eq!(decode_all(&buf).len(), 1);
    }

    #[test]
    fn blank_path_emits_pre_then_post_blanked_points() {
        let mut buf = Vec::new();
        let segment = Segment::new(10, 20, 30, 40);
        blank_path(&mut buf, segment, BlankCount { pre: 2, post: 3 }).unwrap();
        let points = decode_all(&buf);
        assert_eq!(points.len(), 5);
        for p in &points[..2] {
            assert_eq!((p.x, p.y), (10, 20));
        }
        for p in &points[2..] {
            assert_eq!((p.x, p.y), (30, 40));
        }
        assert!(points.iter().all(|p| (p.r, p.g, p.b, p.i) == (0, 0, 0, 0)));
    }

    #[test]
    fn blank_path_defaults_match_spec() {
        let defaults = BlankCount::default();
        assert_eq!((defaults.pre, defaults.post), (0, 20));
    }

    #[test]
    fn next_frame_pads_to_exactly_frame_points() {
        let mut buf = Vec::new();
        let last = Point::new(7, 8, 255, 0, 0);
        next_frame(&mut buf, 800, 650, last).unwrap();
        let points = decode_all(&buf);
        assert_eq!(points.len(), 150);
        assert!(points.iter().all(|p| (p.x, p.y) == (7, 8)));
        assert!(points.iter().all(|p| (p.r, p.g, p.b, p.i) == (0, 0, 0, 0)));
    }

    #[test]
    fn next_frame_no_padding_when_frame_already_full() {
        let mut buf = Vec::new();
        next_frame(&mut buf, 800, 900, Point::new(0, 0, 0, 0, 0)).unwrap();
        assert!(buf.is_empty());
    }
}
