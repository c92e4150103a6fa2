use serde::Serialize;
use threej_core::ThreejjSequence;

/// Parses `3`, `-2.5` or `-5/2` into a quantum number.
pub(super) fn parse_quantum_number(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    let value = match trimmed.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator = parse_component(numerator, raw)?;
            let denominator = parse_component(denominator, raw)?;
            if denominator == 0.0 {
                return Err(format!("'{raw}' has a zero denominator"));
            }
            numerator / denominator
        }
        None => parse_component(trimmed, raw)?,
    };

    if !value.is_finite() {
        return Err(format!("'{raw}' is not a finite quantum number"));
    }
    Ok(value)
}

fn parse_component(component: &str, raw: &str) -> Result<f64, String> {
    component
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{raw}' is not a number or fraction like 5/2"))
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct ComputeOutput {
    pub(super) l2: f64,
    pub(super) l3: f64,
    pub(super) m2: f64,
    pub(super) m3: f64,
    pub(super) precision: &'static str,
    pub(super) plan: &'static str,
    pub(super) l1min: f64,
    pub(super) l1max: f64,
    pub(super) length: usize,
    pub(super) unitarity_sum: f64,
    pub(super) values: Vec<f64>,
}

impl ComputeOutput {
    pub(super) fn new(
        quantum_numbers: [f64; 4],
        precision: &'static str,
        plan: &'static str,
        sequence: ThreejjSequence<f64>,
    ) -> Self {
        let [l2, l3, m2, m3] = quantum_numbers;
        Self {
            l2,
            l3,
            m2,
            m3,
            precision,
            plan,
            l1min: sequence.l1min,
            l1max: sequence.l1max(),
            length: sequence.len(),
            unitarity_sum: sequence.unitarity_sum(),
            values: sequence.values,
        }
    }
}

pub(super) fn render_text(output: &ComputeOutput) -> String {
    let mut lines = vec![
        format!(
            "# threejj l2={} l3={} m2={} m3={}",
            format_quantum_number(output.l2),
            format_quantum_number(output.l3),
            format_quantum_number(output.m2),
            format_quantum_number(output.m3)
        ),
        format!(
            "# plan={} precision={} length={} unitarity={:.15}",
            output.plan, output.precision, output.length, output.unitarity_sum
        ),
        format!("# {:>6} {:>24}", "l1", "value"),
    ];
    for (index, value) in output.values.iter().enumerate() {
        let l1 = output.l1min + index as f64;
        lines.push(format!("  {:>6} {:>24.16e}", format_quantum_number(l1), value));
    }
    lines.join("\n")
}

/// Integers print bare, half-integers as `n/2`.
pub(super) fn format_quantum_number(value: f64) -> String {
    let doubled = (2.0 * value).round();
    if (2.0 * value - doubled).abs() > 1.0e-9 {
        return format!("{value}");
    }
    let doubled = doubled as i64;
    if doubled % 2 == 0 {
        format!("{}", doubled / 2)
    } else {
        format!("{doubled}/2")
    }
}
