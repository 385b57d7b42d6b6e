//! Image quality metrics and colour space conversion over single-channel byte planes.
//!
//! These are used to judge how visible a concealed payload is: a high PSNR and a correlation
//! close to 1 between the original and the modified plane mean the change is hard to see.
//! Functions return `NaN` where the statistic is undefined, e.g. for empty input.

use std::ops::Range;

/// Arithmetic mean.
#[must_use]
pub fn mean(data: &[u8]) -> f64 {
    data.iter().map(|&x| f64::from(x)).sum::<f64>() / data.len() as f64
}

/// Sample standard deviation.
#[must_use]
pub fn std_deviation(data: &[u8]) -> f64 {
    let m = mean(data);
    let sum: f64 = data.iter().map(|&x| (f64::from(x) - m).powi(2)).sum();

    (sum / (data.len() as f64 - 1.0)).sqrt()
}

/// Pearson correlation coefficient of two equally long planes.
///
/// Only the common prefix is considered if the lengths differ.
#[must_use]
pub fn correlation(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    let (mean_a, mean_b) = (mean(a), mean(b));
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (f64::from(x) - mean_a) * (f64::from(y) - mean_b))
        .sum();

    sum / (len as f64 * std_deviation(a) * std_deviation(b))
}

/// Peak signal-to-noise ratio in decibels. Identical planes yield positive infinity.
#[must_use]
pub fn psnr(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len().min(b.len());
    let noise: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (f64::from(x) - f64::from(y)).powi(2))
        .sum();

    10.0 * (len as f64 * f64::from(u8::MAX).powi(2) / noise).log10()
}

/// Shannon entropy in bits per byte.
#[must_use]
pub fn entropy(data: &[u8]) -> f64 {
    let mut freq = [0usize; 256];
    for &x in data {
        freq[x as usize] += 1;
    }

    let n = data.len() as f64;
    -freq
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / n;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Horizontal shifts sampled by [`autocorrelation`].
pub const AUTOCORRELATION_STEP: usize = 5;

/// Correlates a `width` x `height` plane with copies of itself shifted by `dy` rows and by
/// every multiple of [`AUTOCORRELATION_STEP`] columns in `-width / 4..width / 4`.
///
/// Returns `(dx, r)` pairs, where `r` is the [`correlation`] of each sample with the one `dy`
/// rows below and `dx` columns to the right of it, over the region where both exist. Rows are
/// taken in the order they are stored in `plane`, and rows past the end of `plane` are ignored.
///
/// Concealed data tends to flatten this curve, since it replaces neighbouring low bits with
/// unrelated ones.
#[must_use]
pub fn autocorrelation(plane: &[u8], width: usize, height: usize, dy: isize) -> Vec<(isize, f64)> {
    let height = height.min(plane.len().checked_div(width).unwrap_or(0));
    let max = isize::try_from(width / 4).unwrap_or(isize::MAX);

    (-max..max)
        .step_by(AUTOCORRELATION_STEP)
        .map(|dx| {
            let (mut a, mut b) = (Vec::new(), Vec::new());

            for row in overlap(height, dy) {
                let shifted = row.wrapping_add_signed(dy) * width;
                for col in overlap(width, dx) {
                    a.push(plane[row * width + col]);
                    b.push(plane[shifted + col.wrapping_add_signed(dx)]);
                }
            }

            (dx, correlation(&a, &b))
        })
        .collect()
}

/// Indices `i` in `0..len` for which `i + shift` also lies in `0..len`.
fn overlap(len: usize, shift: isize) -> Range<usize> {
    let skip = shift.unsigned_abs().min(len);

    if shift < 0 {
        skip..len
    } else {
        0..len - skip
    }
}

/// Rounds and saturates a colour component into a byte.
fn clip(x: f64) -> u8 {
    x.round().clamp(0.0, f64::from(u8::MAX)) as u8
}

/// Converts RGB planes into Y, Cb and Cr planes.
#[must_use]
pub fn rgb_to_ycbcr(red: &[u8], green: &[u8], blue: &[u8]) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    red.iter()
        .zip(green)
        .zip(blue)
        .map(|((&r, &g), &b)| {
            let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
            let y = 0.299 * r + 0.587 * g + 0.114 * b;

            (
                clip(y),
                clip(0.5643 * (b - y) + 128.0),
                clip(0.7132 * (r - y) + 128.0),
            )
        })
        .fold((Vec::new(), Vec::new(), Vec::new()), push3)
}

/// Converts Y, Cb and Cr planes back into RGB planes.
#[must_use]
pub fn ycbcr_to_rgb(luma: &[u8], cb: &[u8], cr: &[u8]) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    luma.iter()
        .zip(cb)
        .zip(cr)
        .map(|((&y, &cb), &cr)| {
            let (y, cb, cr) = (f64::from(y), f64::from(cb) - 128.0, f64::from(cr) - 128.0);

            (
                clip(y + 1.402 * cr),
                clip(y - 0.714 * cr - 0.334 * cb),
                clip(y + 1.772 * cb),
            )
        })
        .fold((Vec::new(), Vec::new(), Vec::new()), push3)
}

fn push3(
    (mut a, mut b, mut c): (Vec<u8>, Vec<u8>, Vec<u8>),
    (x, y, z): (u8, u8, u8),
) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    a.push(x);
    b.push(y);
    c.push(z);
    (a, b, c)
}
