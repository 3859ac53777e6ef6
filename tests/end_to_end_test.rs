use rent_stats::{
    compute_histogram, CsvListingSource, Listing, Region, SanityBounds, StatsOptions,
    StatsOrchestrator,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_two_listings_around_berlin() {
    let file = write_csv(
        "total_rent,living_space,latitude,longitude,created_at\n\
         500,50,52.50,13.40,2020-01-15\n\
         1000,100,52.51,13.41,2020-01-20\n",
    );
    let orchestrator = StatsOrchestrator::new(
        CsvListingSource::new(file.path(), SanityBounds::default()),
        Default::default(),
    );

    let bundle = orchestrator
        .compute_stats(&Region::circle(52.505, 13.405, 5.0), StatsOptions::new(true, true))
        .await
        .unwrap();

    assert_eq!(bundle.count, 2);
    assert!((bundle.price_per_area.unwrap() - 10.0).abs() < 1e-9);
    assert!(bundle.standard_error.is_some());
    // two listings make neither a dense cell nor a retained month
    assert!(bundle.inequality_index.is_none());
    assert_eq!(bundle.monthly_breakdown, Some(vec![]));
}

#[tokio::test]
async fn test_serialized_bundle_shape() {
    let mut rows = String::from("total_rent,living_space,latitude,longitude,created_at\n");
    for day in 1..=6 {
        let area = 40 + day * 5;
        rows.push_str(&format!("{},{},48.137,11.575,2021-03-0{}\n", area * 18, area, day));
    }
    rows.push_str("900,60,48.140,11.580,2021-04-01\n");
    let file = write_csv(&rows);

    let orchestrator = StatsOrchestrator::new(
        CsvListingSource::new(file.path(), SanityBounds::default()),
        Default::default(),
    );
    let bundle = orchestrator
        .compute_stats(&Region::around(48.137, 11.575, None), StatsOptions::full())
        .await
        .unwrap();
    let json = serde_json::to_value(&bundle).unwrap();

    assert_eq!(json["count"], 7);
    assert!(json["pricePerArea"].is_number());
    assert!(json["generatedAt"].is_number());
    let months = json["monthlyBreakdown"].as_array().unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(months[0]["month"], "2021-03");
    assert_eq!(months[0]["count"], 6);
    assert!(months[0].get("monthlyBreakdown").is_none());
    assert!(months[0].get("histogram").is_none());
    let histogram = json["histogram"].as_array().unwrap();
    assert_eq!(histogram.len(), 300);
    assert_eq!(histogram[0]["lowerBound"], 0.0);
    assert_eq!(histogram[0]["upperBound"], 10.0);
    assert!(histogram[0].get("from").is_none());
    assert_eq!(histogram[81]["count"], 1);
    assert_eq!(histogram[90]["count"], 2);
    assert!(json["inequalityIndex"].is_number());
}

#[tokio::test]
async fn test_whole_dataset_keeps_listings_without_coordinates() {
    let file = write_csv(
        "total_rent,living_space,latitude,longitude,created_at\n\
         600,60,,,\n\
         800,80,52.5,13.4,\n\
         2500,250,52.5,13.4,\n",
    );
    let orchestrator = StatsOrchestrator::new(
        CsvListingSource::new(file.path(), SanityBounds::default()),
        Default::default(),
    );

    let all = orchestrator
        .compute_stats(&Region::all(), StatsOptions::leaf())
        .await
        .unwrap();
    assert_eq!(all.count, 2);
    assert!(all.is_leaf());

    let near = orchestrator
        .compute_stats(&Region::circle(52.5, 13.4, 1.0), StatsOptions::leaf())
        .await
        .unwrap();
    assert_eq!(near.count, 1);
}

#[tokio::test]
async fn test_unreadable_source_is_a_fetch_error() {
    let orchestrator = StatsOrchestrator::new(
        CsvListingSource::new("/does/not/exist.csv", SanityBounds::default()),
        Default::default(),
    );
    let err = orchestrator
        .compute_stats(&Region::all(), StatsOptions::full())
        .await
        .unwrap_err();
    assert!(err.is_fetch_error());
}

#[test]
fn test_histogram_counts_match_range() {
    let listings: Vec<Listing> = [5.0, 15.0, 15.5, 99.0, 100.0, 250.0]
        .iter()
        .map(|&rent| Listing::new(rent, 20.0))
        .collect();
    let refs: Vec<&Listing> = listings.iter().collect();

    let buckets = compute_histogram(&refs, 10.0, 10.0, 100.0).unwrap();
    assert_eq!(buckets.len(), 9);
    assert_eq!(buckets[0].count, 2);
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 3);
}
