//! crates/liturgy_core/src/readings.rs
//!
//! The fixed reading table of the Easter Vigil.

use crate::calendar::is_holy_saturday;
use crate::domain::{CalendarDate, Reading};

/// Title and reference of each Easter Vigil reading, in liturgical order.
const EASTER_VIGIL: [(&str, &str); 16] = [
    ("Reading I", "Genesis 1:1—2:2"),
    ("Psalm I", "Psalm 104:1-2, 5-6, 10, 12, 13-14, 24, 35"),
    ("Reading II", "Genesis 22:1-18"),
    ("Psalm II", "Psalm 16:5, 8, 9-10, 11"),
    ("Reading III", "Exodus 14:15—15:1"),
    ("Psalm III", "Exodus 15:1-2, 3-4, 5-6, 17-18"),
    ("Reading IV", "Isaiah 54:5-14"),
    ("Psalm IV", "Psalm 30:2, 4, 5-6, 11-12, 13"),
    ("Reading V", "Isaiah 55:1-11"),
    ("Psalm V", "Isaiah 12:2-3, 4, 5-6"),
    ("Reading VI", "Baruch 3:9-15, 32-4:4"),
    ("Psalm VI", "Psalm 19:8, 9, 10, 11"),
    ("Reading VII", "Ezekiel 36:16-17a, 18-28"),
    ("Psalm VII", "Psalm 42:3, 5; 43:3, 4"),
    ("Epistle", "Romans 6:3-11"),
    ("Gospel", "Luke 24:1-12"),
];

/// The readings of the Easter Vigil. They are the same every year.
pub fn easter_vigil_readings() -> Vec<Reading> {
    EASTER_VIGIL
        .iter()
        .map(|(title, reference)| Reading::new(title, reference))
        .collect()
}

/// The fixed readings for `date` when it has them, i.e. on Holy Saturday.
pub fn fixed_readings_for(date: CalendarDate) -> Option<Vec<Reading>> {
    is_holy_saturday(date).then(easter_vigil_readings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easter_vigil_has_sixteen_ordered_readings() {
        let readings = easter_vigil_readings();
        assert_eq!(readings.len(), 16);
        assert_eq!(readings[0], Reading::new("Reading I", "Genesis 1:1—2:2"));
        assert_eq!(readings[13].title, "Psalm VII");
        assert_eq!(readings[14].title, "Epistle");
        assert_eq!(readings[15], Reading::new("Gospel", "Luke 24:1-12"));
        assert_eq!(readings, easter_vigil_readings());
    }

    #[test]
    fn test_fixed_readings_only_on_holy_saturday() {
        let holy_saturday = CalendarDate::from_ymd(2025, 4, 19).unwrap();
        let easter = CalendarDate::from_ymd(2025, 4, 20).unwrap();
        assert_eq!(fixed_readings_for(holy_saturday).map(|r| r.len()), Some(16));
        assert!(fixed_readings_for(easter).is_none());
    }
}
