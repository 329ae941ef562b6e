//! Element-wise application of single-pin operations.
//!
//! Every batch accessor on [`crate::pins::PinDriver`] goes through these
//! helpers: elements are processed left to right and the first failure
//! stops the batch.

use crate::error::Result;

/// Apply `op` to each pin, discarding results.
pub fn each<K, F>(pins: &[K], mut op: F) -> Result<()>
where
    F: FnMut(&K) -> Result<()>,
{
    for pin in pins {
        op(pin)?;
    }
    Ok(())
}

/// Apply `op` to each pin, collecting results in input order.
pub fn collect<K, T, F>(pins: &[K], mut op: F) -> Result<Vec<T>>
where
    F: FnMut(&K) -> Result<T>,
{
    let mut results = Vec::with_capacity(pins.len());
    for pin in pins {
        results.push(op(pin)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_collect_preserves_order() {
        let doubled = collect(&[3, 1, 2], |p| Ok(p * 2)).unwrap();
        assert_eq!(doubled, vec![6, 2, 4]);
    }

    #[test]
    fn test_each_stops_at_first_failure() {
        let mut visited = Vec::new();
        let result = each(&[1, 2, 3], |p| {
            visited.push(*p);
            if *p == 2 {
                Err(Error::unmapped(p))
            } else {
                Ok(())
            }
        });

        assert!(matches!(result, Err(Error::UnmappedPin(_))));
        assert_eq!(visited, vec![1, 2]);
    }

    #[test]
    fn test_empty_batch() {
        assert!(collect::<u8, u8, _>(&[], |_| unreachable!()).unwrap().is_empty());
        each::<u8, _>(&[], |_| unreachable!()).unwrap();
    }
}
