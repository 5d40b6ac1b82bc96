//! Database seeders for reference data.
//!
//! Places, time ranges, and timeslot templates have no public CRUD surface;
//! deployments provision them here (catalog on first startup, demo roster
//! on request).

use anyhow::Result;
use chrono::NaiveTime;
use sqlx::SqlitePool;
use tracing::info;

use super::models::DAY_NAMES;

/// Seed the standard time-range catalog if none exists yet: half-hour
/// ranges from 08:00 to 10:00, then hourly ranges until 21:00.
pub async fn seed_catalog(pool: &SqlitePool) -> Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM time_ranges")
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    info!("Seeding default time-range catalog...");

    let mut ranges: Vec<(NaiveTime, NaiveTime)> = Vec::new();
    for half_hours in 0..4 {
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap()
            + chrono::Duration::minutes(30 * half_hours);
        ranges.push((start, start + chrono::Duration::minutes(30)));
    }
    for hour in 10..21 {
        let start = NaiveTime::from_hms_opt(hour, 0, 0).unwrap();
        ranges.push((start, start + chrono::Duration::hours(1)));
    }

    for (start, end) in ranges {
        sqlx::query("INSERT INTO time_ranges (id, start_time, end_time) VALUES (?, ?, ?)")
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(start)
            .bind(end)
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Opening hours for a demo place on a given weekday, with the flag that
/// marks the first and last range of the day as restricted.
struct DemoHours {
    open: NaiveTime,
    close: NaiveTime,
    restrict_edges: bool,
}

fn demo_hours(place: &str, day: &str) -> Option<DemoHours> {
    let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    match (place, day) {
        ("Front Desk", "Sunday") => Some(DemoHours {
            open: hm(9, 30),
            close: hm(15, 0),
            restrict_edges: true,
        }),
        ("Front Desk", "Saturday") => Some(DemoHours {
            open: hm(8, 30),
            close: hm(17, 0),
            restrict_edges: true,
        }),
        ("Front Desk", _) => Some(DemoHours {
            open: hm(8, 30),
            close: hm(21, 0),
            restrict_edges: true,
        }),
        ("Annex Desk", "Sunday") => None,
        ("Annex Desk", "Saturday") => Some(DemoHours {
            open: hm(8, 0),
            close: hm(17, 0),
            restrict_edges: false,
        }),
        ("Annex Desk", _) => Some(DemoHours {
            open: hm(8, 0),
            close: hm(21, 0),
            restrict_edges: false,
        }),
        _ => None,
    }
}

/// Seed two demo places with a full week of timeslot templates over the
/// catalog. Idempotent: skips entirely once any place exists.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM places")
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    info!("Seeding demo places and timeslot templates...");

    let ranges: Vec<(String, NaiveTime, NaiveTime)> =
        sqlx::query_as("SELECT id, start_time, end_time FROM time_ranges ORDER BY start_time")
            .fetch_all(pool)
            .await?;

    for place_name in ["Front Desk", "Annex Desk"] {
        let place_id = uuid::Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO places (id, name) VALUES (?, ?)")
            .bind(&place_id)
            .bind(place_name)
            .execute(pool)
            .await?;

        for day in DAY_NAMES {
            let Some(hours) = demo_hours(place_name, day) else {
                continue;
            };
            for (range_id, start, end) in &ranges {
                if *start < hours.open || *end > hours.close {
                    continue;
                }
                let mc_only =
                    hours.restrict_edges && (*start == hours.open || *end == hours.close);
                sqlx::query(
                    "INSERT INTO timeslots (id, place_id, day, time_range_id, mc_only) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(uuid::Uuid::new_v4().to_string())
                .bind(&place_id)
                .bind(day)
                .bind(range_id)
                .bind(mc_only)
                .execute(pool)
                .await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    #[tokio::test]
    async fn test_seed_catalog_once() {
        let pool = memory_pool().await;
        seed_catalog(&pool).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM time_ranges")
            .fetch_one(&pool)
            .await
            .unwrap();
        // 4 half-hour ranges + 11 hourly ranges
        assert_eq!(count.0, 15);

        // Re-seeding must not duplicate the catalog
        seed_catalog(&pool).await.unwrap();
        let again: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM time_ranges")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(again.0, 15);
    }

    #[tokio::test]
    async fn test_seed_demo_data() {
        let pool = memory_pool().await;
        seed_catalog(&pool).await.unwrap();
        seed_demo_data(&pool).await.unwrap();

        let places: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM places")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(places.0, 2);

        // The annex is closed on Sundays
        let sunday_annex: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM timeslots t \
             JOIN places p ON p.id = t.place_id \
             WHERE p.name = 'Annex Desk' AND t.day = 'Sunday'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(sunday_annex.0, 0);

        // Front Desk edge slots are restricted
        let restricted: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM timeslots t \
             JOIN places p ON p.id = t.place_id \
             WHERE p.name = 'Front Desk' AND t.mc_only = 1",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(restricted.0 > 0);
    }
}
