//! Utility functions and helpers

/// Insert `separator` between every group of three digits in an integer string.
///
/// A leading `-` is preserved and never grouped.
pub fn group_thousands(digits: &str, separator: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Build a sequence label such as `INV-0007`
pub fn sequence_label(prefix: &str, n: u32, width: usize) -> String {
    format!("{}{:0width$}", prefix, n, width = width)
}

/// Join the non-empty parts with `separator`
pub fn join_non_empty<'a, I>(parts: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1234567", ","), "1,234,567");
        assert_eq!(group_thousands("123", ","), "123");
        assert_eq!(group_thousands("-1000", "."), "-1.000");
        assert_eq!(group_thousands("", ","), "");
    }

    #[test]
    fn test_sequence_label() {
        assert_eq!(sequence_label("INV-", 7, 4), "INV-0007");
        assert_eq!(sequence_label("C-", 12345, 4), "C-12345");
    }

    #[test]
    fn test_join_non_empty() {
        assert_eq!(join_non_empty(["Acme", "", "Bolts"], " · "), "Acme · Bolts");
        assert_eq!(join_non_empty(["", ""], " · "), "");
    }
}
