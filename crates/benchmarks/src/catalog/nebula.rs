//! Built-in benchmarks for the Nebula crawler schema.
//!
//! Covers the `crawls`, `visits` and `neighbors` tables plus a cross-table
//! peer connectivity analysis.

use super::BenchmarkCatalog;
use querybench_core::BenchmarkDefinition;

/// `(name, description, query)` rows of the Nebula catalog.
const NEBULA_BENCHMARKS: &[(&str, &str, &str)] = &[
    (
        "crawls_table_scan_full",
        "Full table scan of the crawls table",
        "SELECT * FROM nebula.crawls",
    ),
    (
        "crawls_table_scan_last_day",
        "Last day table scan of the crawls table",
        "SELECT * FROM nebula.crawls WHERE created_at >= today() - INTERVAL 1 DAY",
    ),
    (
        "crawls_table_scan_last_3days",
        "Last 3 days table scan of the crawls table",
        "SELECT * FROM nebula.crawls WHERE created_at >= today() - INTERVAL 3 DAY",
    ),
    (
        "crawls_count",
        "Count of rows in crawls table",
        "SELECT COUNT(*) FROM nebula.crawls",
    ),
    (
        "crawls_filter_by_state",
        "Filter crawls by state",
        "SELECT * FROM crawls WHERE state = 'succeeded'",
    ),
    (
        "crawls_recent_stats",
        "Statistics from recent successful crawls",
        r#"
SELECT
    formatDateTime(created_at, '%Y-%m-%d') as day,
    COUNT(*) as total_crawls,
    AVG(crawled_peers) as avg_crawled_peers,
    AVG(dialable_peers) as avg_dialable_peers,
    AVG(undialable_peers) as avg_undialable_peers
FROM nebula.crawls
WHERE
    state = 'succeeded' AND
    created_at >= NOW() - INTERVAL 30 DAY
GROUP BY day
ORDER BY day DESC
"#,
    ),
    (
        "visits_table_scan_full",
        "Full table scan of the visits table",
        "SELECT * FROM nebula.visits",
    ),
    (
        "visits_table_scan_last_day_start",
        "Last day table scan of the visits table, by visit_started_at",
        "SELECT * FROM nebula.visits WHERE visit_started_at >= today() - INTERVAL 1 DAY",
    ),
    (
        "visits_table_scan_last_3days_start",
        "Last 3 days table scan of the visits table, by visit_started_at",
        "SELECT * FROM nebula.visits WHERE visit_started_at >= today() - INTERVAL 3 DAY",
    ),
    (
        "visits_table_scan_last_day_end",
        "Last day table scan of the visits table, by visit_ended_at",
        "SELECT * FROM nebula.visits WHERE visit_ended_at >= today() - INTERVAL 1 DAY",
    ),
    (
        "visits_table_scan_last_3days_end",
        "Last 3 days table scan of the visits table, by visit_ended_at",
        "SELECT * FROM nebula.visits WHERE visit_ended_at >= today() - INTERVAL 3 DAY",
    ),
    (
        "visits_count_full",
        "Count of rows in visits table",
        "SELECT COUNT(*) FROM nebula.visits",
    ),
    (
        "visits_count_last_day_start",
        "Last day count of rows in visits table, by visit_started_at",
        "SELECT COUNT(*) FROM nebula.visits WHERE visit_started_at >= today() - INTERVAL 1 DAY",
    ),
    (
        "visits_count_last_3days_start",
        "Last 3 days count of rows in visits table, by visit_started_at",
        "SELECT COUNT(*) FROM nebula.visits WHERE visit_started_at >= today() - INTERVAL 3 DAY",
    ),
    (
        "visits_count_last_day_end",
        "Last day count of rows in visits table, by visit_ended_at",
        "SELECT COUNT(*) FROM nebula.visits WHERE visit_ended_at >= today() - INTERVAL 1 DAY",
    ),
    (
        "visits_count_last_3days_end",
        "Last 3 days count of rows in visits table, by visit_ended_at",
        "SELECT COUNT(*) FROM nebula.visits WHERE visit_ended_at >= today() - INTERVAL 3 DAY",
    ),
    (
        "visits_filter_by_crawl_id",
        "Filter visits by crawl_id",
        r#"
SELECT *
FROM nebula.visits
WHERE crawl_id = (SELECT id FROM crawls ORDER BY created_at DESC LIMIT 1)
LIMIT 10000
"#,
    ),
    (
        "visits_recent_with_filtering",
        "Recent visits with filtering",
        r#"
SELECT
    visit_started_at,
    peer_id,
    agent_version,
    connect_maddr,
    dial_errors
FROM nebula.visits
WHERE
    visit_started_at >= NOW() - INTERVAL 1 DAY AND
    length(dial_errors) = 0
ORDER BY visit_started_at DESC
LIMIT 10000
"#,
    ),
    (
        "visits_complex_json_extraction",
        "Complex JSON extraction and filtering",
        r#"
SELECT
    visit_started_at,
    peer_id,
    JSONExtractString(toString(peer_properties), 'ip') AS ip
FROM nebula.visits
WHERE
    visit_started_at >= NOW() - INTERVAL 7 DAY AND
    toString(peer_properties) LIKE '%ip%'
ORDER BY visit_started_at DESC
LIMIT 10000
"#,
    ),
    (
        "neighbors_full_table_scan",
        "Full table scan of the neighbors table",
        "SELECT * FROM nebula.neighbors LIMIT 10000",
    ),
    (
        "neighbors_count",
        "Count of rows in neighbors table",
        "SELECT COUNT(*) FROM nebula.neighbors",
    ),
    (
        "neighbors_with_join",
        "Neighbors with join to discovery_id_prefixes_x_peer_ids",
        r#"
SELECT
    n.crawl_id,
    dp.peer_id as peer,
    dn.peer_id as neighbor
FROM nebula.neighbors n
JOIN nebula.discovery_id_prefixes_x_peer_ids dp ON n.peer_discovery_id_prefix = dp.discovery_id_prefix
JOIN nebula.discovery_id_prefixes_x_peer_ids dn ON n.neighbor_discovery_id_prefix = dn.discovery_id_prefix
LIMIT 10000
"#,
    ),
    (
        "peer_connectivity_analysis",
        "Analyze peer connectivity",
        r#"
WITH
    recent_crawl AS (
        SELECT id
        FROM nebula.crawls
        WHERE state = 'succeeded'
        ORDER BY created_at DESC
        LIMIT 1
    ),
    connected_peers AS (
        SELECT
            peer_id,
            length(protocols) as protocol_count,
            length(dial_maddrs) as dial_addr_count,
            length(filtered_maddrs) as filtered_addr_count,
            length(extra_maddrs) as extra_addr_count,
            connect_maddr IS NOT NULL as is_connected
        FROM nebula.visits
        WHERE crawl_id = (SELECT id FROM recent_crawl)
    )
SELECT
    is_connected,
    COUNT(*) as peer_count,
    AVG(protocol_count) as avg_protocols,
    AVG(dial_addr_count) as avg_dial_addrs,
    AVG(filtered_addr_count) as avg_filtered_addrs,
    AVG(extra_addr_count) as avg_extra_addrs
FROM connected_peers
GROUP BY is_connected
"#,
    ),
];

/// The Nebula crawler schema catalog.
pub fn nebula() -> BenchmarkCatalog {
    BenchmarkCatalog {
        name: "nebula_benchmarks".to_string(),
        description: "Benchmark queries for Nebula database tables (crawls, visits, neighbors, etc.)"
            .to_string(),
        definitions: NEBULA_BENCHMARKS
            .iter()
            .map(|(name, description, query)| {
                BenchmarkDefinition::new(*name, *description, query.trim())
            })
            .collect(),
    }
}
