//! Unit tests for log statistics

use std::collections::BTreeMap;

use chrono::Duration;

use peerlog::logparse::Timestamp;
use peerlog::stats::{
    connection_durations, connection_timeline, connection_types, notifications_per_peer,
    origins_by_country, UNCATEGORIZED,
};
use peerlog::{ConnectionRecord, IpInfo, LogParser, ParsedLog};

use crate::helpers::load_fixture;

fn fixture() -> ParsedLog {
    LogParser::new().parse_str(&load_fixture("monerod.log"))
}

fn info(category: Option<&str>, country: Option<&str>, loc: Option<&str>) -> IpInfo {
    IpInfo {
        category: category.map(str::to_string),
        country: country.map(str::to_string),
        loc: loc.map(str::to_string),
        ..Default::default()
    }
}

fn connection(peer: &str, connected: Option<&str>, disconnected: Option<&str>) -> ConnectionRecord {
    ConnectionRecord {
        peer: Some(peer.to_string()),
        connected_at: connected.map(Timestamp::new),
        disconnected_at: disconnected.map(Timestamp::new),
        reason: None,
    }
}

#[test]
fn connection_types_fall_back_to_uncategorized() {
    let parsed = fixture();
    let mut infos = BTreeMap::new();
    infos.insert("1.1.1.1".to_string(), info(Some("monero"), None, None));

    let types = connection_types(&parsed.connections, &infos);
    assert_eq!(types.get("monero"), Some(&1));
    assert_eq!(types.get(UNCATEGORIZED), Some(&1));
}

#[test]
fn durations_per_peer() {
    let durations = connection_durations(&fixture().connections);
    assert_eq!(durations["1.1.1.1"], vec![Duration::seconds(10)]);
    assert_eq!(durations["2.2.2.2"], vec![Duration::seconds(-2)]);
}

#[test]
fn durations_skip_missing_timestamps() {
    let connections = vec![
        connection("1.1.1.1", None, Some("2019-01-01 00:00:10.000")),
        connection("1.1.1.1", Some("2019-01-01 00:00:00.000"), Some("2019-01-01 00:00:00.750")),
    ];
    let durations = connection_durations(&connections);
    assert_eq!(durations["1.1.1.1"], vec![Duration::milliseconds(750)]);
}

#[test]
fn notifications_counted_per_peer() {
    let counts = notifications_per_peer(&fixture().notifications);
    assert_eq!(counts.get("1.1.1.1"), Some(&1));
    assert_eq!(counts.get("2.2.2.2"), Some(&1));
}

#[test]
fn timeline_steps_in_time_order() {
    let connections = vec![
        connection("1.1.1.1", Some("2019-01-01 00:00:00.000"), Some("2019-01-01 00:00:10.000")),
        connection("2.2.2.2", Some("2019-01-01 00:00:05.000"), Some("2019-01-01 00:00:20.000")),
    ];
    let timeline = connection_timeline(&connections);

    let open: Vec<i64> = timeline.iter().map(|(_, open)| *open).collect();
    assert_eq!(open, vec![1, 2, 1, 0]);
    assert!(timeline.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[test]
fn origins_only_for_uncategorized_located_peers() {
    let parsed = fixture();
    let mut infos = BTreeMap::new();
    infos.insert("1.1.1.1".to_string(), info(Some("monero"), Some("NL"), Some("52.3,4.8")));
    infos.insert("2.2.2.2".to_string(), info(None, Some("FR"), Some("48.8,2.3")));
    infos.insert("3.3.3.3".to_string(), info(None, Some("FR"), Some("43.2,5.3")));
    infos.insert("4.4.4.4".to_string(), info(None, Some("DE"), None));

    let origins = origins_by_country(&parsed.addresses, &infos);
    assert_eq!(origins.len(), 1);
    assert_eq!(origins.get("FR"), Some(&2));
}
