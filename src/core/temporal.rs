use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::model::{Listing, MonthlyStats, StatsBundle};
use crate::utils::error::Result;

pub const MIN_LISTINGS_PER_MONTH: usize = 5;

/// Calendar month of a timestamp in UTC, formatted `YYYY-MM`.
pub fn month_key(created_at: &DateTime<Utc>) -> String {
    created_at.format("%Y-%m").to_string()
}

/// Listings grouped by month, ascending. Months with fewer than
/// [`MIN_LISTINGS_PER_MONTH`] listings and undated listings are dropped.
pub fn monthly_groups<'a>(listings: &[&'a Listing]) -> Vec<(String, Vec<&'a Listing>)> {
    let mut months: BTreeMap<String, Vec<&Listing>> = BTreeMap::new();
    for &listing in listings {
        if let Some(created_at) = &listing.created_at {
            months.entry(month_key(created_at)).or_default().push(listing);
        }
    }
    months
        .into_iter()
        .filter(|(_, group)| group.len() >= MIN_LISTINGS_PER_MONTH)
        .collect()
}

/// Runs `stats_for` on every retained month.
pub fn monthly_breakdown<F>(listings: &[&Listing], mut stats_for: F) -> Result<Vec<MonthlyStats>>
where
    F: FnMut(&[&Listing]) -> Result<StatsBundle>,
{
    monthly_groups(listings)
        .into_iter()
        .map(|(month, group)| {
            Ok(MonthlyStats {
                stats: stats_for(&group)?,
                month,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dated(year: i32, month: u32, day: u32) -> Listing {
        Listing::new(700.0, 60.0).created(Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_month_key_uses_utc() {
        let late = Utc.with_ymd_and_hms(2019, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(month_key(&late), "2019-12");
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(month_key(&early), "2020-01");
    }

    #[test]
    fn test_groups_are_sorted_and_thresholded() {
        let mut listings = Vec::new();
        listings.extend((1..=5).map(|d| dated(2020, 3, d)));
        listings.extend((1..=4).map(|d| dated(2020, 1, d)));
        listings.extend((1..=6).map(|d| dated(2019, 11, d)));
        listings.extend((1..=5).map(|d| dated(2020, 10, d)));
        listings.push(Listing::new(500.0, 40.0));
        let refs: Vec<&Listing> = listings.iter().collect();

        let groups = monthly_groups(&refs);
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["2019-11", "2020-03", "2020-10"]);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let retained: usize = groups.iter().map(|(_, g)| g.len()).sum();
        assert_eq!(retained, 16);
    }

    #[test]
    fn test_breakdown_tags_each_month() {
        let listings: Vec<Listing> = (1..=5).map(|d| dated(2021, 7, d)).collect();
        let refs: Vec<&Listing> = listings.iter().collect();
        let generated_at = Utc.with_ymd_and_hms(2021, 8, 1, 0, 0, 0).unwrap();

        let months = monthly_breakdown(&refs, |group| {
            let mut bundle = StatsBundle::empty(generated_at);
            bundle.count = group.len();
            Ok(bundle)
        })
        .unwrap();

        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, "2021-07");
        assert_eq!(months[0].stats.count, 5);
    }
}
