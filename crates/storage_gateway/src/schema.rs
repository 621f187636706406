//! SQL statements for the `location_data` table

/// Idempotent table creation, safe to run on every process start.
///
/// The four reserved columns stay nullable for forward compatibility; the
/// current insert path always writes them NULL.
pub const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS location_data (
        id BIGSERIAL PRIMARY KEY,
        latitude DECIMAL(10, 8) NOT NULL,
        longitude DECIMAL(11, 8) NOT NULL,
        timestamp_value BIGINT,
        accuracy DECIMAL(8, 2),
        altitude DECIMAL(8, 2),
        speed DECIMAL(8, 2),
        provider VARCHAR(50),
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

pub(crate) const INSERT_REPORT_SQL: &str = r#"
    INSERT INTO location_data
        (latitude, longitude, timestamp_value, accuracy, altitude, speed, provider)
    VALUES ($1, $2, $3, NULL, NULL, NULL, NULL)
    RETURNING id
"#;

pub(crate) const SELECT_LATEST_SQL: &str = r#"
    SELECT latitude, longitude, timestamp_value, created_at
    FROM location_data
    ORDER BY id DESC
    LIMIT 1
"#;

pub(crate) const SELECT_RECENT_SQL: &str = r#"
    SELECT id, latitude, longitude, timestamp_value,
           accuracy, altitude, speed, provider, created_at
    FROM location_data
    ORDER BY id DESC
    LIMIT $1
"#;
