use std::ops::{AddAssign, Div};

#[cfg(test)]
#[ctor::ctor]
fn init_backtrace() {
    color_backtrace::install();
}

pub trait LogAbuse {
    fn ln_or_inf(self) -> f64;
}

impl LogAbuse for f64 {
    fn ln_or_inf(self) -> f64 {
        if self == 0.0 {
            -f64::INFINITY
        } else {
            self.ln()
        }
    }
}

pub trait Float: PartialOrd + Copy + Div<Output = Self> + AddAssign {
    fn from_usize(n: usize) -> Self;
}

impl Float for f64 {
    fn from_usize(n: usize) -> Self {
        n as f64
    }
}

pub trait VecMath<T>
where
    T: Float,
{
    fn avg(&self) -> Option<T>;
    fn argmax(&self) -> Option<usize>;
    fn argmin(&self) -> Option<usize>;
}

impl<T> VecMath<T> for [T]
where
    T: Float,
{
    fn avg(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let mut sum = T::from_usize(0);
        self.iter().for_each(|&item| sum += item);

        Some(sum / T::from_usize(self.len()))
    }

    fn argmax(&self) -> Option<usize> {
        let mut max = *self.first()?;
        let mut argmax: usize = 0;

        for (idx, &item) in self.iter().enumerate().skip(1) {
            if item > max {
                max = item;
                argmax = idx;
            }
        }

        Some(argmax)
    }

    fn argmin(&self) -> Option<usize> {
        let mut min = *self.first()?;
        let mut argmin: usize = 0;

        for (idx, &item) in self.iter().enumerate().skip(1) {
            if item < min {
                min = item;
                argmin = idx;
            }
        }

        Some(argmin)
    }
}

/// The log of a probability ratio.
///
/// A ratio of two zero probabilities carries no information and scores 0.0.
#[inline(always)]
pub fn log_odds(foreground: f64, background: f64) -> f64 {
    if foreground == 0.0 && background == 0.0 {
        0.0
    } else {
        (foreground / background).ln_or_inf()
    }
}

/// Maps a score in (-inf, inf) to a probability in [0, 1].
#[inline(always)]
pub fn logistic(score: f64) -> f64 {
    1.0 / (1.0 + (-score).exp())
}

/// Round to `digits` decimal places, ties to even.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10.0_f64.powi(digits);
    (value * factor).round_ties_even() / factor
}

#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr) => {
        $crate::assert_close!($left, $right, 1e-9)
    };
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (left, right): (f64, f64) = ($left, $right);
        ::std::assert!(
            (left - right).abs() <= $tolerance,
            "{} is not within {} of {}",
            left,
            $tolerance,
            right
        );
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_vec_math() {
        let v = vec![1.0, 5.0, -2.0, 4.0];
        check!(v.avg() == Some(2.0));
        check!(v.argmax() == Some(1));
        check!(v.argmin() == Some(2));

        let empty: Vec<f64> = vec![];
        check!(empty.avg().is_none());
        check!(empty.argmax().is_none());
    }

    #[test]
    fn test_logistic() {
        check!(logistic(0.0) == 0.5);
        check!(logistic(10.0) > 0.99);
        check!(logistic(-10.0) < 0.01);
    }

    #[test]
    fn test_round_to() {
        check!(round_to(33.333333, 2) == 33.33);
        check!(round_to(66.666666, 2) == 66.67);
        check!(round_to(12.5, 0) == 12.0);
        check!(round_to(13.5, 0) == 14.0);
        check!(round_to(3.125, 2) == 3.12);
        check!(round_to(3.375, 2) == 3.38);
    }

    #[test]
    fn test_log_odds() {
        check!(log_odds(0.0, 0.0) == 0.0);
        check!(log_odds(0.0, 0.5) == -f64::INFINITY);
        assert_close!(log_odds(0.5, 0.25), std::f64::consts::LN_2);
    }
}
