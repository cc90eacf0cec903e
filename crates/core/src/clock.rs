use chrono::Timelike;

/// 12-hour clock text as it is read aloud, e.g. `3:05 PM`.
pub fn format_clock<T: Timelike>(time: &T) -> String {
    let (is_pm, hour) = time.hour12();
    let meridiem = if is_pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {meridiem}", time.minute())
}

pub fn announce_time<T: Timelike>(time: &T) -> String {
    format!("The current time is {}", format_clock(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn midnight_reads_as_twelve_am() {
        assert_eq!(format_clock(&at(0, 0)), "12:00 AM");
    }

    #[test]
    fn noon_reads_as_twelve_pm() {
        assert_eq!(format_clock(&at(12, 30)), "12:30 PM");
    }

    #[test]
    fn minutes_are_zero_padded() {
        assert_eq!(format_clock(&at(15, 5)), "3:05 PM");
        assert_eq!(format_clock(&at(9, 41)), "9:41 AM");
    }

    #[test]
    fn announcement_wraps_clock() {
        assert_eq!(announce_time(&at(23, 59)), "The current time is 11:59 PM");
    }
}
