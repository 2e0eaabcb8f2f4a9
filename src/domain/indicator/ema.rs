//! Exponential moving average.
//!
//! alpha = 2/(span+1). The recursion starts at the first defined input,
//! EMA[i] = x[i]*alpha + EMA[i-1]*(1-alpha), and the output is reported once
//! `span` inputs have been folded in. Undefined inputs (a leading warmup from
//! an upstream indicator) are skipped and stay undefined in the output.

pub fn ema(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; values.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut state: Option<f64> = None;
    let mut observed = 0usize;
    let mut out = Vec::with_capacity(values.len());

    for value in values {
        match value {
            Some(x) => {
                let next = match state {
                    None => *x,
                    Some(prev) => x * alpha + prev * (1.0 - alpha),
                };
                state = Some(next);
                observed += 1;
                out.push(if observed >= span { Some(next) } else { None });
            }
            None => out.push(None),
        }
    }

    out
}
