//! Unit tests for CSV reports

use std::fs;

use peerlog::report::{
    read_blocks_file, read_connections_file, read_notifications_file, read_report, write_report,
    NotifyColumns, ReportPaths,
};
use peerlog::LogParser;
use tempfile::TempDir;

use crate::helpers::{fixtures_dir, load_fixture};

#[test]
fn fixture_reports_match_expected_csv() {
    let parsed = LogParser::new().parse_str(&load_fixture("monerod.log"));
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::in_dir(dir.path());

    write_report(&parsed, &paths, NotifyColumns::IpFirst).unwrap();

    assert_eq!(
        fs::read_to_string(&paths.addresses).unwrap(),
        "ip-address,\n1.1.1.1,\n2.2.2.2,\n3.3.3.3,\n4.4.4.4,\n"
    );
    assert_eq!(
        fs::read_to_string(&paths.connections).unwrap(),
        "ip-address,connection-timestamp,disconnection-timestamp,reason,\n\
         1.1.1.1,2019-01-01 00:00:00.000,2019-01-01 00:00:10.000,tud.reason: idle,\n\
         2.2.2.2,2019-01-01 00:00:03.000,2019-01-01 00:00:01.000,-,\n"
    );
    assert_eq!(
        fs::read_to_string(&paths.notifications).unwrap(),
        "ip-address,timestamp,\n1.1.1.1,2019-01-01 00:00:02.000,\n2.2.2.2,N/A,\n"
    );
    assert_eq!(
        fs::read_to_string(&paths.blocks).unwrap(),
        "ip-address,timestamp,block-height,\n\
         4.4.4.4,2019-01-01 00:00:05.000,1780001,\n\
         2.2.2.2,2019-01-01 00:00:13.000,1780002,\n"
    );
}

#[test]
fn output_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::in_dir(dir.path().join("nested").join("out"));

    write_report(&Default::default(), &paths, NotifyColumns::default()).unwrap();

    for path in paths.all() {
        assert!(path.exists(), "missing {:?}", path);
    }
}

#[test]
fn blocks_report_reads_back() {
    let parsed = LogParser::new().parse_str(&load_fixture("monerod.log"));
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::in_dir(dir.path());
    write_report(&parsed, &paths, NotifyColumns::IpFirst).unwrap();

    assert_eq!(read_blocks_file(&paths.blocks).unwrap(), parsed.blocks);
}

#[test]
fn report_set_reads_back() {
    let parsed = LogParser::new().parse_str(&load_fixture("monerod.log"));
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::in_dir(dir.path());
    write_report(&parsed, &paths, NotifyColumns::IpFirst).unwrap();

    let loaded = read_report(&paths).unwrap();
    assert_eq!(loaded.addresses, parsed.addresses);
    assert_eq!(loaded.connections, parsed.connections);
    assert_eq!(loaded.notifications, parsed.notifications);
    assert_eq!(loaded.blocks, parsed.blocks);
}

#[test]
fn connection_placeholders_read_back_as_none() {
    let parsed = LogParser::new().parse_str(&load_fixture("monerod.log"));
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::in_dir(dir.path());
    write_report(&parsed, &paths, NotifyColumns::IpFirst).unwrap();

    let connections = read_connections_file(&paths.connections).unwrap();
    assert_eq!(connections[0].reason.as_deref(), Some("tud.reason: idle"));
    assert_eq!(connections[1].reason, None);
}

#[test]
fn timestamp_first_notifications_read_back() {
    let parsed = LogParser::new().parse_str(&load_fixture("monerod.log"));
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::in_dir(dir.path());
    write_report(&parsed, &paths, NotifyColumns::TimestampFirst).unwrap();

    let notifications = read_notifications_file(&paths.notifications).unwrap();
    assert_eq!(notifications, parsed.notifications);
    assert_eq!(notifications[1].timestamp, None);
}

#[test]
fn report_set_without_blocks_file() {
    let parsed = LogParser::new().parse_str(&load_fixture("monerod.log"));
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::in_dir(dir.path());
    write_report(&parsed, &paths, NotifyColumns::IpFirst).unwrap();
    fs::remove_file(&paths.blocks).unwrap();

    let loaded = read_report(&paths).unwrap();
    assert!(loaded.blocks.is_empty());
    assert_eq!(loaded.connections.len(), 2);
}

#[test]
fn report_set_needs_connections_file() {
    let dir = TempDir::new().unwrap();
    let paths = ReportPaths::in_dir(dir.path());
    write_report(&Default::default(), &paths, NotifyColumns::IpFirst).unwrap();
    fs::remove_file(&paths.connections).unwrap();

    let err = read_report(&paths).unwrap_err();
    assert!(err.to_string().contains("connections.csv"));
}

#[test]
fn blocks_fixture_with_placeholders() {
    let blocks = read_blocks_file(&fixtures_dir().join("node_b.csv")).unwrap();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[2].peer, None);
    assert_eq!(blocks[2].timestamp, None);
    assert_eq!(blocks[2].height, 1_780_004);
}
