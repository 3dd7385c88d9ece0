use qrcode::{QrCode, render::unicode, types::QrError};

/// Half-block rendering of `data`, one string per terminal row.
pub fn render_lines(data: &str) -> Result<Vec<String>, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let rendered = code
        .render::<unicode::Dense1x2>()
        .quiet_zone(true)
        .module_dimensions(1, 1)
        .build();
    Ok(rendered.lines().map(str::to_string).collect())
}

/// Width in cells of the widest rendered row.
pub fn width(lines: &[String]) -> usize {
    lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_square_block() {
        let lines = render_lines("wc:abc@2?relay-protocol=irn&symKey=00").unwrap();
        assert!(!lines.is_empty());
        let width = width(&lines);
        assert!(lines.iter().all(|line| line.chars().count() == width));
        // Two modules per row in the vertical direction.
        assert_eq!(lines.len(), width.div_ceil(2));
    }
}
