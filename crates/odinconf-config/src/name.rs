use chrono::{Local, NaiveDate};

/// Build a configuration name following the standard convention:
/// `{SUBJECT}_{DD}{MON}{YYYY}L{localization}M{montage}{STIM|NOSTIM}`,
/// uppercased.
pub fn make_config_name(
    subject: &str,
    localization: u32,
    montage: u32,
    stim: bool,
    date: NaiveDate,
) -> String {
    let name = format!(
        "{}_{}L{}M{}{}",
        subject,
        date.format("%d%b%Y"),
        localization,
        montage,
        if stim { "STIM" } else { "NOSTIM" }
    );
    name.to_uppercase()
}

/// [`make_config_name`] stamped with today's date.
pub fn make_config_name_today(subject: &str, localization: u32, montage: u32, stim: bool) -> String {
    make_config_name(subject, localization, montage, stim, Local::now().date_naive())
}
