/// Splits `total` iterations into `workers` shares differing by at most one.
///
/// The first `total % workers` shares carry the extra iteration.
#[must_use]
pub fn partition_iterations(total: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    let base = total / workers;
    let remainder = total % workers;

    (0..workers)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        assert_eq!(partition_iterations(12, 4), vec![3, 3, 3, 3]);
    }

    #[test]
    fn test_remainder_goes_to_first_workers() {
        assert_eq!(partition_iterations(10, 4), vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_shares_sum_to_total() {
        for total in [0, 1, 7, 1_000_003] {
            for workers in 1..9 {
                assert_eq!(partition_iterations(total, workers).iter().sum::<u64>(), total);
            }
        }
    }

    #[test]
    fn test_zero_workers_treated_as_one() {
        assert_eq!(partition_iterations(5, 0), vec![5]);
    }
}
