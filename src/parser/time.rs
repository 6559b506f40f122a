/// Normalize a loosely formatted time token into `H:MM` + lowercase meridiem.
///
/// The transformation is driven purely by the length of the digit body and the
/// presence of a colon, not by semantic parsing: `.` separators become `:`,
/// hour-only tokens get `:00` appended, and 3-4 digit bodies get a colon
/// inserted before the last two digits ("530pm" -> "5:30pm"). Tokens that do
/// not fit any of these shapes are returned untouched so that the strict
/// datetime parse in event building rejects them instead.
pub fn normalize_time(time_str: &str) -> String {
    let t = time_str.trim().to_lowercase().replace('.', ":");

    let (body, meridiem) = if let Some(b) = t.strip_suffix("am") {
        (b, "am")
    } else if let Some(b) = t.strip_suffix("pm") {
        (b, "pm")
    } else {
        return t;
    };

    // Already separated, assume canonical (idempotent on "5:30pm")
    if body.contains(':') {
        return t;
    }

    if !body.chars().all(|c| c.is_ascii_digit()) {
        return t;
    }

    match body.len() {
        // Hour only: "1pm" -> "1:00pm", "11am" -> "11:00am"
        1 | 2 => format!("{}:00{}", body, meridiem),
        // Hour and minutes run together: "530pm" -> "5:30pm", "1230pm" -> "12:30pm"
        3 | 4 => format!(
            "{}:{}{}",
            &body[..body.len() - 2],
            &body[body.len() - 2..],
            meridiem
        ),
        // Malformed length, leave for the datetime parse to reject
        _ => t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_only() {
        assert_eq!(normalize_time("1pm"), "1:00pm");
        assert_eq!(normalize_time("5pm"), "5:00pm");
        assert_eq!(normalize_time("11am"), "11:00am");
    }

    #[test]
    fn test_compact_hour_minutes() {
        assert_eq!(normalize_time("530pm"), "5:30pm");
        assert_eq!(normalize_time("915am"), "9:15am");
        assert_eq!(normalize_time("1230pm"), "12:30pm");
    }

    #[test]
    fn test_dot_separator() {
        assert_eq!(normalize_time("5.30pm"), "5:30pm");
        assert_eq!(normalize_time("12.05am"), "12:05am");
    }

    #[test]
    fn test_idempotent_on_canonical() {
        for canonical in ["1:00pm", "5:30pm", "12:30pm", "11:00am"] {
            assert_eq!(normalize_time(canonical), canonical);
            assert_eq!(normalize_time(&normalize_time(canonical)), canonical);
        }
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(normalize_time(" 530PM "), "5:30pm");
        assert_eq!(normalize_time("1Pm"), "1:00pm");
    }

    #[test]
    fn test_malformed_lengths_pass_through() {
        // Five or more digits cannot be a plausible clock time, leave untouched
        assert_eq!(normalize_time("53012pm"), "53012pm");
        assert_eq!(normalize_time("pm"), "pm");
        assert_eq!(normalize_time("noon"), "noon");
        assert_eq!(normalize_time("5x0pm"), "5x0pm");
    }
}
