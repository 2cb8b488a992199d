//! Gauss–Jordan elimination over a [`Scalar`] field.
use crate::{
    scalar::{magnitude, Scalar},
    Error, Result,
};

/// Reduced row echelon form in place. Returns the pivot columns.
///
/// Inexact entries are zero if they are negligible compared to the largest
/// entry of the coefficient columns.
fn rref<T: Scalar>(m: &mut [Vec<T>], cols: usize) -> Vec<usize> {
    let scale = magnitude(m.iter().flat_map(|row| &row[..cols.min(row.len())]));
    let mut pivots = Vec::new();
    let mut row = 0;
    for col in 0..cols {
        if row == m.len() {
            break;
        }
        // Partial pivoting by magnitude, which is harmless for exact fields
        let Some(best) = (row..m.len())
            .filter(|&r| !m[r][col].is_negligible_to(scale))
            .max_by(|&a, &b| m[a][col].to_f64().abs().total_cmp(&m[b][col].to_f64().abs()))
        else {
            continue;
        };
        m.swap(row, best);
        let inv = T::one() / m[row][col].clone();
        for v in m[row].iter_mut() {
            *v = v.clone() * inv.clone();
        }
        for r in 0..m.len() {
            if r == row || m[r][col].is_zero() {
                continue;
            }
            let f = m[r][col].clone();
            for c in 0..m[r].len() {
                let sub = f.clone() * m[row][c].clone();
                m[r][c] = m[r][c].clone() - sub;
            }
            m[r][col] = T::zero();
        }
        pivots.push(col);
        row += 1;
    }
    pivots
}

/// Solve the square system `a x = b`.
///
/// Fails with [`Error::Singular`] if the solution is not unique.
pub fn solve<T: Scalar>(a: &[Vec<T>], b: &[T]) -> Result<Vec<T>> {
    let n = a.len();
    if b.len() != n {
        return Err(Error::Dimension { expected: n, got: b.len() });
    }
    let mut m = a
        .iter()
        .zip(b)
        .map(|(row, v)| {
            if row.len() == n {
                let mut row = row.clone();
                row.push(v.clone());
                Ok(row)
            } else {
                Err(Error::Dimension { expected: n, got: row.len() })
            }
        })
        .collect::<Result<Vec<_>>>()?;
    let pivots = rref(&mut m, n);
    if pivots.len() < n {
        return Err(Error::Singular);
    }
    Ok(m.into_iter().map(|row| row[n].clone()).collect())
}

/// A basis of the null space of `a` (with `cols` unknowns).
pub fn null_space<T: Scalar>(a: &[Vec<T>], cols: usize) -> Vec<Vec<T>> {
    let mut m = a.to_vec();
    let pivots = rref(&mut m, cols);
    (0..cols)
        .filter(|c| !pivots.contains(c))
        .map(|free| {
            let mut v = vec![T::zero(); cols];
            v[free] = T::one();
            for (row, &p) in pivots.iter().enumerate() {
                v[p] = -m[row][free].clone();
            }
            v
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{int, Rational};

    #[test]
    fn exact_solve_and_kernel() {
        let a: Vec<Vec<Rational>> = [[2, 1, 0], [1, 3, 1], [0, 1, 4]]
            .iter()
            .map(|r| r.iter().map(|&v| int(v)).collect())
            .collect();
        let b = [3, 5, 5].map(int::<Rational>);
        let x = solve(&a, &b).unwrap();
        assert_eq!(x, vec![int(1), int(1), int(1)]);

        let sing: Vec<Vec<Rational>> = [[1, 2, 3], [2, 4, 6]]
            .iter()
            .map(|r| r.iter().map(|&v| int(v)).collect())
            .collect();
        let ker = null_space(&sing, 3);
        assert_eq!(ker.len(), 2);
        for v in &ker {
            let dot = v[0].clone()
                + int::<Rational>(2) * v[1].clone()
                + int::<Rational>(3) * v[2].clone();
            assert_eq!(dot, int(0));
        }
        let sing3 = [sing[0].clone(), sing[1].clone(), vec![int(0); 3]];
        assert!(matches!(solve(&sing3, &b), Err(Error::Singular)));
    }

    #[test]
    fn small_entries_are_not_zero() {
        let a = [vec![2e-12, 1e-12], vec![1e-12, 3e-12]];
        let x = solve(&a, &[3e-12, 4e-12]).unwrap();
        assert!((x[0] - 1.).abs() < 1e-9 && (x[1] - 1.).abs() < 1e-9);
        let sing = [vec![1e6, 2e6, 3e6], vec![2e6, 4e6, 6e6 + 1e-5]];
        assert_eq!(null_space(&sing, 3).len(), 2);
    }
}
