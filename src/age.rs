use time::{macros::format_description, Date};

use crate::error::FormError;

/// Years plus remaining months between two calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Age {
    pub years:  i32,
    pub months: u8
}

/// Age on `today` of someone born on `birth`, by calendar month only.
///
/// The day of month is not considered. A birth date after `today` yields
/// a negative year count.
pub fn age_on(birth: Date, today: Date) -> Age {
    let mut years = today.year() - birth.year();
    let mut months = i32::from(u8::from(today.month())) - i32::from(u8::from(birth.month()));
    if months < 0 {
        years -= 1;
        months += 12;
    }
    Age {
        years,
        months: months as u8
    }
}

/// Parses the `YYYY-MM-DD` value of an `<input type="date">`.
pub fn parse_birth_date(value: &str) -> Result<Date, FormError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| FormError::InvalidDate(format!("{value}: {e}")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::macros::date;

    use super::*;

    #[test]
    fn whole_years_and_months() {
        assert_eq!(
            age_on(date!(2015 - 03 - 10), date!(2021 - 09 - 10)),
            Age { years: 6, months: 6 }
        );
    }

    #[test]
    fn month_rolls_back_into_previous_year() {
        assert_eq!(
            age_on(date!(2015 - 11 - 01), date!(2021 - 02 - 01)),
            Age { years: 5, months: 3 }
        );
    }

    #[test]
    fn day_of_month_is_ignored() {
        assert_eq!(
            age_on(date!(2015 - 03 - 20), date!(2021 - 03 - 19)),
            Age { years: 6, months: 0 }
        );
        assert_eq!(
            age_on(date!(2015 - 03 - 01), date!(2021 - 04 - 30)),
            Age { years: 6, months: 1 }
        );
    }

    #[test]
    fn born_today_and_future_births() {
        let d = date!(2024 - 02 - 29);
        assert_eq!(age_on(d, d), Age { years: 0, months: 0 });
        assert_eq!(
            age_on(date!(2030 - 01 - 01), d),
            Age { years: -6, months: 1 }
        );
    }

    #[test]
    fn parses_date_input_values() {
        assert_eq!(parse_birth_date("2016-08-05").unwrap(), date!(2016 - 08 - 05));
        assert!(matches!(parse_birth_date("05/08/2016"), Err(FormError::InvalidDate(_))));
        assert!(matches!(parse_birth_date(""), Err(FormError::InvalidDate(_))));
    }
}
