use cgmath::{InnerSpace, VectorSpace};

#[derive(Clone, Debug, PartialEq)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
    /// Morph target weights per keyframe, e.g. a wing-beat cycle.
    Weights(Vec<Vec<f32>>),
}

impl Keyframes {
    pub fn len(&self) -> usize {
        match self {
            Keyframes::Translation(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
            Keyframes::Scale(v) => v.len(),
            Keyframes::Weights(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single sampled value of a clip.
#[derive(Clone, Debug, PartialEq)]
pub enum Pose {
    Translation(cgmath::Vector3<f32>),
    Rotation(cgmath::Quaternion<f32>),
    Scale(cgmath::Vector3<f32>),
    Weights(Vec<f32>),
}

/// An animation clip: a named track of keyframes and their timestamps in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub keyframes: Keyframes,
    pub timestamps: Vec<f32>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, keyframes: Keyframes, timestamps: Vec<f32>) -> Self {
        if keyframes.len() != timestamps.len() {
            log::warn!(
                "Clip has {} keyframes but {} timestamps, surplus entries are ignored.",
                keyframes.len(),
                timestamps.len()
            );
        }
        Self {
            name: name.into(),
            keyframes,
            timestamps,
        }
    }

    /// Length of the clip in seconds (the last usable timestamp).
    pub fn duration(&self) -> f32 {
        let usable = self.keyframes.len().min(self.timestamps.len());
        usable
            .checked_sub(1)
            .and_then(|last| self.timestamps.get(last))
            .copied()
            .unwrap_or(0.0)
    }

    /**
     * Samples the clip at `time` seconds, interpolating linearly between the
     * surrounding keyframes (normalized lerp for rotations).
     *
     * Times before the first and after the last timestamp clamp to the
     * boundary keyframe. Returns `None` for an empty clip.
     */
    pub fn sample(&self, time: f32) -> Option<Pose> {
        let usable = self.keyframes.len().min(self.timestamps.len());
        if usable == 0 {
            return None;
        }
        let times = &self.timestamps[..usable];
        let next = times.partition_point(|&t| t <= time);
        let (a, b, factor) = if next == 0 {
            (0, 0, 0.0)
        } else if next >= usable {
            (usable - 1, usable - 1, 0.0)
        } else {
            let prev = next - 1;
            let span = times[next] - times[prev];
            let factor = if span > 0.0 { (time - times[prev]) / span } else { 0.0 };
            (prev, next, factor)
        };

        let pose = match &self.keyframes {
            Keyframes::Translation(v) => Pose::Translation(v[a].lerp(v[b], factor)),
            Keyframes::Scale(v) => Pose::Scale(v[a].lerp(v[b], factor)),
            Keyframes::Rotation(v) => Pose::Rotation(v[a].nlerp(v[b], factor).normalize()),
            Keyframes::Weights(v) => Pose::Weights(
                v[a].iter()
                    .zip(v[b].iter())
                    .map(|(from, to)| from + (to - from) * factor)
                    .collect(),
            ),
        };
        Some(pose)
    }
}
