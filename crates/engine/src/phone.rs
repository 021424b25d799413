/// Output of [`normalize_kenyan_mobile`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NormalizedPhone {
    pub value: String,
    pub is_valid: bool,
}

impl NormalizedPhone {
    fn valid(value: String) -> Self {
        Self {
            value,
            is_valid: true,
        }
    }

    fn invalid(value: String) -> Self {
        Self {
            value,
            is_valid: false,
        }
    }
}

const MAX_DIGITS: usize = 12;

/// Normalizes the keystrokes typed so far into a Kenyan mobile number.
///
/// Non-digits are stripped and the result is capped at 12 digits. Then:
/// - `254XXXXXXXXX` (12 digits) is kept as-is;
/// - `07…`/`01…` shorter than 10 digits is kept and still valid (the user is
///   typing), exactly 10 digits becomes `254` + the digits after the `0`;
/// - nothing typed is valid and empty;
/// - anything else is returned as raw digits and flagged invalid.
///
/// ```rust
/// use engine::normalize_kenyan_mobile;
///
/// let phone = normalize_kenyan_mobile("0712 345 678");
/// assert_eq!(phone.value, "254712345678");
/// assert!(phone.is_valid);
/// ```
pub fn normalize_kenyan_mobile(input: &str) -> NormalizedPhone {
    let digits: String = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DIGITS)
        .collect();

    if digits.is_empty() {
        return NormalizedPhone::valid(digits);
    }

    if digits.starts_with("254") && digits.len() == MAX_DIGITS {
        return NormalizedPhone::valid(digits);
    }

    if digits.starts_with("07") || digits.starts_with("01") {
        return match digits.len() {
            len if len < 10 => NormalizedPhone::valid(digits),
            10 => NormalizedPhone::valid(format!("254{}", &digits[1..])),
            _ => NormalizedPhone::invalid(digits),
        };
    }

    NormalizedPhone::invalid(digits)
}

/// A number ready to be submitted: `254` followed by nine digits.
pub fn is_complete_kenyan_phone(value: &str) -> bool {
    value.len() == MAX_DIGITS
        && value.starts_with("254")
        && value.chars().all(|ch| ch.is_ascii_digit())
}
