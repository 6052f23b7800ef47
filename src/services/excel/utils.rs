use calamine::Data;

/// Renders a label cell as trimmed text. Empty cells become "".
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

pub fn cell_text_at(row: &[Data], idx: usize) -> String {
    row.get(idx).map(cell_text).unwrap_or_default()
}

/// Coerces an amount cell to a finite number; anything else is missing.
pub fn parse_amount(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}
