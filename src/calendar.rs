use time::{error::ComponentRange, Date, Month, OffsetDateTime};

/// Months between registration and expiry, and between expiry and renewal.
pub const SUBSCRIPTION_MONTHS: u32 = 3;

/// Moves `at` forward by `months` calendar months.
///
/// The day of month is clamped to the last valid day of the target month
/// (Jan 31 + 1 month is Feb 28/29, never Mar 2/3). Time of day and UTC
/// offset are kept as they are.
pub fn add_months(at: OffsetDateTime, months: u32) -> Result<OffsetDateTime, ComponentRange> {
    let date = at.date();
    let zero_based = u32::from(u8::from(date.month()) - 1) + months;
    let year = date.year() + (zero_based / 12) as i32;
    let month = Month::January.nth_next((zero_based % 12) as u8);
    let day = date.day().min(month.length(year));

    let shifted = Date::from_calendar_date(year, month, day)?;
    Ok(at.replace_date(shifted))
}
