//! Differencing, integration and the KPSS unit-root test.

/// KPSS level-stationarity critical value at the 5 % level.
pub const KPSS_CRITICAL_5PCT: f64 = 0.463;

/// Apply first differencing `d` times.
pub fn difference(y: &[f64], d: usize) -> Vec<f64> {
    let mut out = y.to_vec();
    for _ in 0..d {
        if out.len() < 2 {
            return Vec::new();
        }
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Undo `d` differences of a forecast path, anchored at the end of `history`.
///
/// `diffed` continues `difference(history, d)`; the result continues `history`.
pub fn integrate(diffed: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    let mut current = diffed.to_vec();
    for level in (0..d).rev() {
        let Some(&last) = difference(history, level).last() else {
            return current;
        };
        let mut acc = last;
        current = current
            .iter()
            .map(|v| {
                acc += v;
                acc
            })
            .collect();
    }
    current
}

/// True when every value equals the first within relative tolerance.
pub fn is_constant(x: &[f64]) -> bool {
    let Some(&first) = x.first() else {
        return true;
    };
    let scale = first.abs().max(1.0);
    x.iter().all(|v| (v - first).abs() <= 1e-10 * scale)
}

/// KPSS statistic for level stationarity with a Bartlett-kernel long-run
/// variance and `floor(4 (n/100)^0.25)` lags.
pub fn kpss_statistic(x: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = x.iter().sum::<f64>() / nf;
    let e: Vec<f64> = x.iter().map(|v| v - mean).collect();

    let mut partial = 0.0;
    let mut eta = 0.0;
    for v in &e {
        partial += v;
        eta += partial * partial;
    }
    eta /= nf * nf;

    let lags = (4.0 * (nf / 100.0).powf(0.25)).floor() as usize;
    let mut s2 = e.iter().map(|v| v * v).sum::<f64>() / nf;
    for j in 1..=lags.min(n - 1) {
        let weight = 1.0 - j as f64 / (lags as f64 + 1.0);
        let cov: f64 = (j..n).map(|t| e[t] * e[t - j]).sum();
        s2 += 2.0 * weight * cov / nf;
    }

    if s2 <= 0.0 || !s2.is_finite() {
        return 0.0;
    }
    eta / s2
}

/// Number of differences needed for stationarity, by repeated KPSS tests.
pub fn ndiffs(x: &[f64], max_d: usize) -> usize {
    let mut d = 0;
    let mut current = x.to_vec();
    while d < max_d {
        if current.len() < 3 || is_constant(&current) {
            break;
        }
        let stat = kpss_statistic(&current);
        tracing::trace!(d, stat, "kpss");
        if stat <= KPSS_CRITICAL_5PCT {
            break;
        }
        current = difference(&current, 1);
        d += 1;
    }
    d
}
