//! Frame lookup over heterogeneous frame storage.
//!
//! Frame data arrives either positionally (a `Vec`/slice where the index is
//! the frame number) or keyed by frame number (`BTreeMap`/`HashMap`). Both
//! shapes implement [`FrameLookup`], so the trajectory code never inspects
//! which one it was handed.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::error::{Result, TrajectoryError};
use crate::types::{ObjectFrame, ObjectId, ObjectRecord};

/// Read-only access to per-frame data by frame number.
pub trait FrameLookup<T> {
    /// Entry stored for `frame`, if any.
    fn at_frame(&self, frame: usize) -> Option<&T>;

    /// One past the highest frame number the storage can answer for.
    ///
    /// Saturates at `usize::MAX` when the highest key is `usize::MAX`.
    fn frame_limit(&self) -> usize;

    /// Stored entries in ascending frame order, skipping gaps.
    fn stored_frames(&self) -> Vec<(usize, &T)>;

    /// Like [`FrameLookup::at_frame`], but distinguishes a frame past the end
    /// of storage from a gap inside it.
    fn require_frame(&self, frame: usize) -> Result<&T> {
        self.at_frame(frame).ok_or_else(|| {
            let available = self.frame_limit();
            if frame >= available {
                TrajectoryError::FrameOutOfRange { frame, available }
            } else {
                TrajectoryError::FrameMissing { frame }
            }
        })
    }
}

impl<T> FrameLookup<T> for [T] {
    fn at_frame(&self, frame: usize) -> Option<&T> {
        self.get(frame)
    }

    fn frame_limit(&self) -> usize {
        self.len()
    }

    fn stored_frames(&self) -> Vec<(usize, &T)> {
        self.iter().enumerate().collect()
    }
}

impl<T> FrameLookup<T> for Vec<T> {
    fn at_frame(&self, frame: usize) -> Option<&T> {
        self.get(frame)
    }

    fn frame_limit(&self) -> usize {
        self.len()
    }

    fn stored_frames(&self) -> Vec<(usize, &T)> {
        self.iter().enumerate().collect()
    }
}

impl<T> FrameLookup<T> for BTreeMap<usize, T> {
    fn at_frame(&self, frame: usize) -> Option<&T> {
        self.get(&frame)
    }

    fn frame_limit(&self) -> usize {
        self.last_key_value()
            .map(|(frame, _)| frame.saturating_add(1))
            .unwrap_or(0)
    }

    fn stored_frames(&self) -> Vec<(usize, &T)> {
        self.iter().map(|(frame, entry)| (*frame, entry)).collect()
    }
}

impl<T, S: BuildHasher> FrameLookup<T> for HashMap<usize, T, S> {
    fn at_frame(&self, frame: usize) -> Option<&T> {
        self.get(&frame)
    }

    fn frame_limit(&self) -> usize {
        self.keys().max().map(|frame| frame.saturating_add(1)).unwrap_or(0)
    }

    fn stored_frames(&self) -> Vec<(usize, &T)> {
        let mut entries: Vec<(usize, &T)> = self.iter().map(|(frame, entry)| (*frame, entry)).collect();
        entries.sort_unstable_by_key(|(frame, _)| *frame);
        entries
    }
}

/// Objects present in `frame`, or `None` when the storage has no entry for it.
pub fn objects_at_frame<F>(frames: &F, frame: usize) -> Option<&[ObjectRecord]>
where
    F: FrameLookup<ObjectFrame> + ?Sized,
{
    frames.at_frame(frame).map(Vec::as_slice)
}

/// Linear search for `id` within one frame's objects.
pub fn find_by_id<'a>(objects: &'a [ObjectRecord], id: &ObjectId) -> Option<&'a ObjectRecord> {
    objects.iter().find(|record| &record.id == id)
}

/// Record of object `id` at `frame`, failing loudly when it is absent.
pub fn require_object<'a, F>(frames: &'a F, frame: usize, id: &ObjectId) -> Result<&'a ObjectRecord>
where
    F: FrameLookup<ObjectFrame> + ?Sized,
{
    objects_at_frame(frames, frame)
        .and_then(|objects| find_by_id(objects, id))
        .ok_or_else(|| TrajectoryError::object_not_found(id, frame))
}
