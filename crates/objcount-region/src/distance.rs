//! Euclidean distance transform
//!
//! Computes, for every foreground pixel, the straight-line distance to the
//! nearest background pixel. The transform is exact: a 1D lower-envelope
//! pass over columns is followed by one over rows, working on squared
//! distances throughout.

use objcount_core::{BinaryMask, DistanceField};

/// Exact Euclidean distance transform of a binary mask
///
/// Background pixels map to 0. A mask with no background pixel has no
/// defined distances; it maps to a flat field of 1.0 on every pixel, so a
/// later maxima search sees one plateau.
pub fn euclidean_distance_transform(mask: &BinaryMask) -> DistanceField {
    let (width, height) = mask.dimensions();
    if !mask.data().iter().any(|&v| !v) {
        return mask.map(|_| 1.0f32);
    }

    let w = width as usize;
    let h = height as usize;
    // larger than any squared distance that can occur in the grid
    let far = (w * w + h * h) as f64 + 1.0;

    let mut sq: Vec<f64> = mask
        .data()
        .iter()
        .map(|&fg| if fg { far } else { 0.0 })
        .collect();

    let n = w.max(h);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    for x in 0..w {
        for y in 0..h {
            f[y] = sq[y * w + x];
        }
        squared_distance_1d(&f[..h], &mut d[..h], &mut v, &mut z);
        for y in 0..h {
            sq[y * w + x] = d[y];
        }
    }

    for y in 0..h {
        let row = &mut sq[y * w..(y + 1) * w];
        f[..w].copy_from_slice(row);
        squared_distance_1d(&f[..w], &mut d[..w], &mut v, &mut z);
        row.copy_from_slice(&d[..w]);
    }

    let mut field = mask.map(|_| 0.0f32);
    for (out, &s) in field.data_mut().iter_mut().zip(&sq) {
        *out = s.sqrt() as f32;
    }
    field
}

/// Lower envelope of the parabolas rooted at each sample of `f`
fn squared_distance_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let fq = f[q] + (q * q) as f64;
        let mut s;
        loop {
            let p = v[k];
            s = (fq - (f[p] + (p * p) as f64)) / (2.0 * (q as f64 - p as f64));
            if s <= z[k] && k > 0 {
                k -= 1;
            } else {
                break;
            }
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let p = v[k];
        let dq = q as f64 - p as f64;
        *out = dq * dq + f[p];
    }
}
