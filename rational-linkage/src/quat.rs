//! Quaternions over a [`Scalar`] field.
use crate::scalar::Scalar;
use std::ops::{Add, Mul, Neg, Sub};

/// Quaternion `w + x i + y j + z k`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Quaternion<T = f64> {
    /// Scalar part
    pub w: T,
    /// `i` component
    pub x: T,
    /// `j` component
    pub y: T,
    /// `k` component
    pub z: T,
}

impl<T: Scalar> Quaternion<T> {
    /// Create a new instance.
    pub const fn new(w: T, x: T, y: T, z: T) -> Self {
        Self { w, x, y, z }
    }

    /// Create from an array `[w, x, y, z]`.
    pub fn from_array([w, x, y, z]: [T; 4]) -> Self {
        Self { w, x, y, z }
    }

    /// Pure quaternion from a vector.
    pub fn pure([x, y, z]: [T; 3]) -> Self {
        Self { w: T::zero(), x, y, z }
    }

    /// Real quaternion.
    pub fn real(w: T) -> Self {
        Self { w, x: T::zero(), y: T::zero(), z: T::zero() }
    }

    /// The zero quaternion.
    pub fn zero() -> Self {
        Self::real(T::zero())
    }

    /// The unit quaternion `1`.
    pub fn one() -> Self {
        Self::real(T::one())
    }

    /// Components `[w, x, y, z]`.
    pub fn to_array(&self) -> [T; 4] {
        [self.w.clone(), self.x.clone(), self.y.clone(), self.z.clone()]
    }

    /// Vector part `[x, y, z]`.
    pub fn vector(&self) -> [T; 3] {
        [self.x.clone(), self.y.clone(), self.z.clone()]
    }

    /// Conjugate `w - x i - y j - z k`.
    pub fn conjugate(&self) -> Self {
        Self::new(self.w.clone(), -self.x.clone(), -self.y.clone(), -self.z.clone())
    }

    /// Squared norm `q q~`, always a non-negative scalar.
    pub fn norm(&self) -> T {
        self.dot(self)
    }

    /// Euclidean inner product of the coefficients.
    pub fn dot(&self, rhs: &Self) -> T {
        self.w.clone() * rhs.w.clone()
            + self.x.clone() * rhs.x.clone()
            + self.y.clone() * rhs.y.clone()
            + self.z.clone() * rhs.z.clone()
    }

    /// Multiplicative inverse. Returns `None` for the zero quaternion.
    pub fn inv(&self) -> Option<Self> {
        let n = self.norm();
        (!n.is_negligible()).then(|| self.conjugate().scale(&(T::one() / n)))
    }

    /// Multiply by a scalar.
    pub fn scale(&self, s: &T) -> Self {
        Self::from_array(self.to_array().map(|c| c * s.clone()))
    }

    /// Return true if every component is negligible.
    pub fn is_negligible(&self) -> bool {
        self.to_array().iter().all(T::is_negligible)
    }

    /// Return true if the vector part is negligible.
    pub fn is_real(&self) -> bool {
        self.vector().iter().all(T::is_negligible)
    }

    /// Return true if the scalar part is negligible.
    pub fn is_pure(&self) -> bool {
        self.w.is_negligible()
    }

    /// Convert the component type.
    pub fn map<U: Scalar>(&self, f: impl Fn(&T) -> U) -> Quaternion<U> {
        Quaternion::new(f(&self.w), f(&self.x), f(&self.y), f(&self.z))
    }

    /// Convert to floating point.
    pub fn to_f64(&self) -> Quaternion<f64> {
        self.map(T::to_f64)
    }
}

impl<T: Scalar> Add for &Quaternion<T> {
    type Output = Quaternion<T>;

    fn add(self, rhs: Self) -> Self::Output {
        Quaternion::new(
            self.w.clone() + rhs.w.clone(),
            self.x.clone() + rhs.x.clone(),
            self.y.clone() + rhs.y.clone(),
            self.z.clone() + rhs.z.clone(),
        )
    }
}

impl<T: Scalar> Sub for &Quaternion<T> {
    type Output = Quaternion<T>;

    fn sub(self, rhs: Self) -> Self::Output {
        Quaternion::new(
            self.w.clone() - rhs.w.clone(),
            self.x.clone() - rhs.x.clone(),
            self.y.clone() - rhs.y.clone(),
            self.z.clone() - rhs.z.clone(),
        )
    }
}

impl<T: Scalar> Mul for &Quaternion<T> {
    type Output = Quaternion<T>;

    // Hamilton product
    fn mul(self, rhs: Self) -> Self::Output {
        let [a1, b1, c1, d1] = self.to_array();
        let [a2, b2, c2, d2] = rhs.to_array();
        Quaternion::new(
            a1.clone() * a2.clone()
                - b1.clone() * b2.clone()
                - c1.clone() * c2.clone()
                - d1.clone() * d2.clone(),
            a1.clone() * b2.clone() + b1.clone() * a2.clone() + c1.clone() * d2.clone()
                - d1.clone() * c2.clone(),
            a1.clone() * c2.clone() - b1.clone() * d2.clone()
                + c1.clone() * a2.clone()
                + d1.clone() * b2.clone(),
            a1 * d2 + b1 * c2 - c1 * b2 + d1 * a2,
        )
    }
}

impl<T: Scalar> Neg for &Quaternion<T> {
    type Output = Quaternion<T>;

    fn neg(self) -> Self::Output {
        Quaternion::from_array(self.to_array().map(|c| -c))
    }
}

macro_rules! impl_by_value {
    ($ty:ident, $($trait:ident, $method:ident);+ $(;)?) => {$(
        impl<T: Scalar> $trait for $ty<T> {
            type Output = $ty<T>;

            fn $method(self, rhs: Self) -> Self::Output {
                (&self).$method(&rhs)
            }
        }
    )+};
}
pub(crate) use impl_by_value;

impl_by_value!(Quaternion, Add, add; Sub, sub; Mul, mul);

impl<T: Scalar> Neg for Quaternion<T> {
    type Output = Quaternion<T>;

    fn neg(self) -> Self::Output {
        -&self
    }
}

#[test]
fn hamilton_rules() {
    let i = Quaternion::<f64>::new(0., 1., 0., 0.);
    let j = Quaternion::new(0., 0., 1., 0.);
    let k = Quaternion::new(0., 0., 0., 1.);
    assert_eq!(&i * &j, k);
    assert_eq!(&j * &i, -&k);
    assert_eq!(&(&i * &j) * &k, Quaternion::real(-1.));
    let q = Quaternion::new(1., 2., -1., 3.);
    assert_eq!(q.norm(), 15.);
    let e = &q * &q.inv().unwrap();
    assert!((&e - &Quaternion::one()).is_negligible());
}
