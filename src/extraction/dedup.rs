use itertools::Itertools;

use crate::model::TimePair;

/// Keeps the first occurrence of every pair, in the original order.
pub fn dedup_pairs(pairs: Vec<TimePair>) -> Vec<TimePair> {
    pairs.into_iter().unique().collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let pairs = vec![
            TimePair::new("07:05", "07:21"),
            TimePair::new("08:10", "08:26"),
            TimePair::new("07:05", "07:21"),
        ];

        assert_eq!(
            dedup_pairs(pairs),
            vec![TimePair::new("07:05", "07:21"), TimePair::new("08:10", "08:26")]
        );
    }

    #[test]
    fn test_same_departure_different_arrival_is_kept() {
        let pairs = vec![TimePair::new("07:05", "07:21"), TimePair::new("07:05", "07:30")];

        assert_eq!(dedup_pairs(pairs.clone()), pairs);
    }

    #[test]
    fn test_idempotent() {
        let pairs = vec![
            TimePair::new("09:00", "09:20"),
            TimePair::new("06:00", "06:20"),
            TimePair::new("09:00", "09:20"),
            TimePair::new("06:00", "06:20"),
        ];

        let once = dedup_pairs(pairs);
        assert_eq!(dedup_pairs(once.clone()), once);
        assert!(dedup_pairs(vec![]).is_empty());
    }
}
