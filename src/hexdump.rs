//! Hex + ASCII rendering of parameter bytes.

const BYTES_PER_LINE: usize = 16;

/// Format `data` as 16-byte lines: a hex column padded to 48 characters,
/// then the printable-ASCII view.
pub fn hex_dump(data: &[u8]) -> String {
    let mut lines = Vec::with_capacity(data.len().div_ceil(BYTES_PER_LINE));
    for chunk in data.chunks(BYTES_PER_LINE) {
        let mut hex = String::with_capacity(BYTES_PER_LINE * 3);
        for byte in chunk {
            hex.push_str(&format!("{byte:02X} "));
        }
        let ascii: String = chunk
            .iter()
            .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' })
            .collect();
        lines.push(format!("{hex:<48} {ascii}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_a_full_line() {
        let data: Vec<u8> = (0x41..0x51).collect();
        assert_eq!(
            hex_dump(&data),
            "41 42 43 44 45 46 47 48 49 4A 4B 4C 4D 4E 4F 50  ABCDEFGHIJKLMNOP"
        );
    }

    #[test]
    fn pads_a_short_tail_and_masks_unprintables() {
        let out = hex_dump(&[0x00, 0x41, 0x7F]);
        assert_eq!(out, format!("{:<48} .A.", "00 41 7F "));
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(hex_dump(&[]), "");
    }
}
