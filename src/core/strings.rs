use unicode_segmentation::UnicodeSegmentation;

const BYTE_UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

pub fn title_case(s: &str) -> String {
    s.split_word_bounds()
        .map(|w| {
            let mut g = w.graphemes(true);
            match g.next() {
                Some(first) => format!("{}{}", first.to_uppercase(), g.as_str().to_lowercase()),
                None => String::new(),
            }
        })
        .collect()
}

/// `"file"` or `"files"` depending on `count`
pub fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Human-readable binary size; the number of decimals grows with the unit
/// (`"900 B"`, `"1.5 KiB"`, `"2.25 MiB"`).
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size > 1024.0 && unit < BYTE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.*} {}", unit, size, BYTE_UNITS[unit])
}

/// Parse a size such as `"10MiB"`, `"1 GiB"`, `"512k"` or `"2048"` into bytes
///
/// All unit suffixes are binary (`k`, `kb` and `kib` all mean 1024).
pub fn parse_byte_size(value: &str) -> Result<u64, String> {
    let trimmed = value.trim();
    let split_at = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split_at);

    let number: u64 = digits
        .parse()
        .map_err(|_| format!("'{}' is not a valid size", value))?;

    let multiplier: u64 = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1 << 10,
        "m" | "mb" | "mib" => 1 << 20,
        "g" | "gb" | "gib" => 1 << 30,
        "t" | "tb" | "tib" => 1 << 40,
        other => return Err(format!("Unknown size unit '{}' in '{}'", other, value)),
    };

    number
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Size '{}' is too large", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("reposift"), "Reposift");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1024 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 + 256 * 1024), "3.25 MiB");
        assert_eq!(format_bytes(1 << 30 | 1), "1.000 GiB");
    }

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("2048"), Ok(2048));
        assert_eq!(parse_byte_size("10MiB"), Ok(10 * 1024 * 1024));
        assert_eq!(parse_byte_size("1 GiB"), Ok(1 << 30));
        assert_eq!(parse_byte_size("512k"), Ok(512 * 1024));
        assert!(parse_byte_size("ten").is_err());
        assert!(parse_byte_size("5 parsecs").is_err());
        assert!(parse_byte_size("99999999999TiB").is_err());
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "file", "files"), "file");
        assert_eq!(plural(0, "file", "files"), "files");
    }
}
