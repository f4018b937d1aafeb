pub(crate) fn parse_operand(raw: &str, label: &str) -> crate::Result<f64> {
    let text = raw.trim();
    let number = text
        .parse::<f64>()
        .map_err(|_| crate::Error::transform(raw, format!("{label} '{text}' is not a number")))?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(crate::Error::transform(
            raw,
            format!("{label} '{text}' is not a finite number"),
        ))
    }
}
