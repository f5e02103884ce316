//! Angular wavenumbers of a periodic grid

use data::Precision;
use ndarray::Array1;
use std::f64::consts::TAU;

/// Angular wavenumbers associated with a grid of `num_points` points spaced
/// by `dx`, in discrete Fourier transform bin order
///
/// Bin `j` holds frequency `j` for the first `ceil(num_points/2)` bins and
/// `j - num_points` for the others, scaled by `2π / (num_points·dx)`.
pub fn kappa(num_points: usize, dx: Precision) -> Array1<Precision> {
    let scale = TAU / (num_points as Precision * dx);
    let num_positive = num_points.div_ceil(2);
    Array1::from_shape_fn(num_points, |bin| {
        let frequency = if bin < num_positive {
            bin as Precision
        } else {
            bin as Precision - num_points as Precision
        };
        frequency * scale
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_bin_order() {
        let even = kappa(8, 0.5);
        let unit = TAU / 4.0;
        let expected = [0.0, 1.0, 2.0, 3.0, -4.0, -3.0, -2.0, -1.0].map(|f| f * unit);
        assert_eq!(even.to_vec(), expected.to_vec());

        let odd = kappa(5, 1.0);
        let unit = TAU / 5.0;
        let expected = [0.0, 1.0, 2.0, -2.0, -1.0].map(|f| f * unit);
        assert_eq!(odd.to_vec(), expected.to_vec());
    }

    #[test]
    fn length_and_symmetry() {
        for num_points in 1..=65 {
            let k = kappa(num_points, 0.1);
            assert_eq!(k.len(), num_points);
            assert_eq!(k[0], 0.0);
            for j in 1..num_points {
                assert_eq!(k[j].abs(), k[num_points - j].abs(), "N={num_points}, j={j}");
            }
        }
    }

    #[test]
    fn inverse_length_units() {
        // Doubling the spacing halves every wavenumber
        let fine = kappa(100, 0.1);
        let coarse = kappa(100, 0.2);
        for (f, c) in fine.iter().zip(&coarse) {
            assert!((f - 2.0 * c).abs() <= 1e-12 * f.abs());
        }
        assert!((fine[1] - TAU / 10.0).abs() < 1e-12);
    }

    #[test]
    fn empty_grid() {
        assert!(kappa(0, 0.1).is_empty());
    }
}
