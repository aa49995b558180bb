//! Reduction of decoded frame amplitudes to per-column bar heights.
//!
//! The pipeline is: [`effective_width`] caps the column count at the frame
//! count, [`downsample`] keeps one frame per stride, [`normalize`] scales
//! against the loudest kept frame, and [`interpolate`] fills the columns
//! [`normalize`] marked with [`NEEDS_INTERPOLATION`].

/// Marker for a column whose height must be derived from its neighbours.
pub const NEEDS_INTERPOLATION: i32 = -1;

/// Number of columns actually drawn for `frame_count` frames.
pub fn effective_width(requested: u32, frame_count: usize) -> u32 {
    if requested as usize > frame_count {
        frame_count as u32
    } else {
        requested
    }
}

/// Columns sampled from the frames plus the largest amplitude seen.
#[derive(Debug, Clone, PartialEq)]
pub struct Downsampled {
    pub columns: Vec<f32>,
    pub max_amplitude: f32,
}

/// Take one frame every `ceil(frames / width)` frames.
///
/// Always returns exactly `width` columns; when the stride runs past the end
/// of the frames the trailing columns stay silent.
pub fn downsample(amplitudes: &[f32], width: usize) -> Downsampled {
    let mut columns = vec![0.0f32; width];
    let mut max_amplitude = 0.0f32;

    if width == 0 || amplitudes.is_empty() {
        return Downsampled {
            columns,
            max_amplitude,
        };
    }

    let stride = amplitudes.len().div_ceil(width);
    for (column, &amplitude) in columns
        .iter_mut()
        .zip(amplitudes.iter().step_by(stride))
    {
        let amplitude = amplitude.abs();
        *column = amplitude;
        max_amplitude = max_amplitude.max(amplitude);
    }

    Downsampled {
        columns,
        max_amplitude,
    }
}

/// Scale columns to `round((sample / max) * height)`.
///
/// Values over half the image height are replaced by
/// [`NEEDS_INTERPOLATION`]. A zero `max_amplitude` (silence) yields all-zero
/// columns, which render as a bare center line.
pub fn normalize(columns: &[f32], max_amplitude: f32, height: u32) -> Vec<i32> {
    if max_amplitude <= 0.0 || !max_amplitude.is_finite() {
        return vec![0; columns.len()];
    }

    columns
        .iter()
        .map(|&sample| {
            let value = ((sample / max_amplitude) * height as f32).round() as i64;
            if value * 2 > height as i64 {
                NEEDS_INTERPOLATION
            } else {
                value as i32
            }
        })
        .collect()
}

/// Replace each marked column with the mean of its nearest unmarked
/// neighbours. A side with no unmarked neighbour counts as zero.
pub fn interpolate(values: &[i32]) -> Vec<i32> {
    let mut result = values.to_vec();

    for (i, slot) in result.iter_mut().enumerate() {
        if values[i] != NEEDS_INTERPOLATION {
            continue;
        }
        let left = values[..i]
            .iter()
            .rev()
            .find(|&&v| v != NEEDS_INTERPOLATION)
            .copied()
            .unwrap_or(0);
        let right = values[i + 1..]
            .iter()
            .find(|&&v| v != NEEDS_INTERPOLATION)
            .copied()
            .unwrap_or(0);
        *slot = (left + right) / 2;
    }

    result
}

/// Full reduction from frame amplitudes to bar heights for a `width` x
/// `height` image. `width` should already be capped with [`effective_width`].
pub fn column_heights(amplitudes: &[f32], width: u32, height: u32) -> Vec<i32> {
    let sampled = downsample(amplitudes, width as usize);
    let normalized = normalize(&sampled.columns, sampled.max_amplitude, height);
    interpolate(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_capped_at_frame_count() {
        assert_eq!(effective_width(800, 120), 120);
        assert_eq!(effective_width(800, 800), 800);
        assert_eq!(effective_width(100, 44_100), 100);
        assert_eq!(effective_width(10, 0), 0);
    }

    #[test]
    fn test_downsample_stride() {
        let amplitudes: Vec<f32> = (0..10).map(|v| v as f32).collect();
        let sampled = downsample(&amplitudes, 4);
        // stride = ceil(10 / 4) = 3
        assert_eq!(sampled.columns, vec![0.0, 3.0, 6.0, 9.0]);
        assert_eq!(sampled.max_amplitude, 9.0);
    }

    #[test]
    fn test_downsample_pads_short_stride() {
        let amplitudes: Vec<f32> = (1..=10).map(|v| v as f32).collect();
        let sampled = downsample(&amplitudes, 6);
        // stride 2 yields five frames for six columns
        assert_eq!(sampled.columns, vec![1.0, 3.0, 5.0, 7.0, 9.0, 0.0]);
    }

    #[test]
    fn test_downsample_uses_magnitude() {
        let sampled = downsample(&[-4.0, 2.0], 2);
        assert_eq!(sampled.columns, vec![4.0, 2.0]);
        assert_eq!(sampled.max_amplitude, 4.0);
    }

    #[test]
    fn test_normalize_silence_is_flat() {
        assert_eq!(normalize(&[0.0, 0.0, 0.0], 0.0, 100), vec![0, 0, 0]);
    }

    #[test]
    fn test_normalize_marks_values_over_half_height() {
        // height 100: 0.25 -> 25, 0.5 -> 50 (kept), 0.6 -> 60 (marked)
        let normalized = normalize(&[0.25, 0.5, 0.6, 1.0], 1.0, 100);
        assert_eq!(
            normalized,
            vec![25, 50, NEEDS_INTERPOLATION, NEEDS_INTERPOLATION]
        );
    }

    #[test]
    fn test_interpolate_two_sided() {
        assert_eq!(interpolate(&[10, NEEDS_INTERPOLATION, 30]), vec![10, 20, 30]);
    }

    #[test]
    fn test_interpolate_runs_use_nearest_unmarked() {
        let values = [10, NEEDS_INTERPOLATION, NEEDS_INTERPOLATION, 20];
        assert_eq!(interpolate(&values), vec![10, 15, 15, 20]);
    }

    #[test]
    fn test_interpolate_missing_side_counts_zero() {
        assert_eq!(interpolate(&[NEEDS_INTERPOLATION, 40]), vec![20, 40]);
        assert_eq!(interpolate(&[40, NEEDS_INTERPOLATION]), vec![40, 20]);
        assert_eq!(
            interpolate(&[NEEDS_INTERPOLATION, NEEDS_INTERPOLATION]),
            vec![0, 0]
        );
    }

    #[test]
    fn test_column_heights_stay_within_half_height() {
        let amplitudes: Vec<f32> = (0..1000).map(|i| ((i % 37) as f32) / 37.0).collect();
        let heights = column_heights(&amplitudes, 200, 64);
        assert_eq!(heights.len(), 200);
        assert!(heights.iter().all(|&h| (0..=32).contains(&h)));
    }
}
