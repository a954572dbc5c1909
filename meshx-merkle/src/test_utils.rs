//! Record fixtures shared by the unit tests.

use crate::SensorRecord;

/// The two-record scenario: `d1@100` followed by `d2@200`.
pub(crate) fn scenario_records() -> Vec<SensorRecord> {
    vec![
        SensorRecord::new("d1", 100, "a", "t", "l"),
        SensorRecord::new("d2", 200, "b", "t", "l"),
    ]
}

/// `count` distinct readings spread over three devices.
pub(crate) fn sample_records(count: u64) -> Vec<SensorRecord> {
    (0..count)
        .map(|i| {
            SensorRecord::new(
                format!("device-{:03}", i % 3),
                1_700_000_000 + i * 60,
                format!(r#"{{"temperature":{}.5,"unit":"celsius"}}"#, 20 + i % 10),
                "temperature",
                ["kitchen", "garage", "outside"][(i % 3) as usize],
            )
        })
        .collect()
}
