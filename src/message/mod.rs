pub mod segments;

pub use segments::{DEFAULT_LANGUAGE, Segment, SegmentKind, reconstruct, scan_segments};
