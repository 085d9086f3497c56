//! Lag-score interleaving
//!
//! At global step `g` every stream that still has items gets the score
//! `consumed / count - g / total`, and the stream with the lowest score
//! supplies the next item. Ties go to the stream listed first.
//!
//! The `g / total` term is shared by all streams at a given step, so the
//! lowest score always belongs to the stream with the lowest consumed
//! fraction. `schedule` exploits that with a min-heap keyed by consumed
//! fraction; `schedule_naive` rescans every stream at every step and serves
//! as the reference the heap version is checked against.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::models::{GlobalOrder, LagScore, Placement, Result, Stream};

/// Per-stream cursor over the remaining items
struct Lane<T> {
    items: std::vec::IntoIter<T>,
    count: usize,
}

impl<T> Lane<T> {
    fn consumed(&self) -> usize {
        self.count - self.items.len()
    }

    fn is_exhausted(&self) -> bool {
        self.items.len() == 0
    }
}

/// Validate every stream, then split into lanes and per-stream counts
fn prepare<T>(streams: Vec<Stream<T>>) -> Result<(Vec<Lane<T>>, Vec<usize>)> {
    let counts = streams
        .iter()
        .map(Stream::validate)
        .collect::<Result<Vec<_>>>()?;

    let lanes = streams
        .into_iter()
        .zip(&counts)
        .map(|(stream, &count)| Lane {
            items: stream.items.into_iter(),
            count,
        })
        .collect();

    Ok((lanes, counts))
}

/// Heap entry: a stream's consumed fraction, ordered low to high with the
/// stream index as the secondary key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    consumed: usize,
    count: usize,
    stream: usize,
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.consumed as u128 * other.count as u128;
        let rhs = other.consumed as u128 * self.count as u128;
        lhs.cmp(&rhs).then(self.stream.cmp(&other.stream))
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Merge the streams into one proportionally interleaved order.
///
/// Fails without scheduling anything if any stream's declared count is
/// negative or disagrees with its items. Empty streams are never selected;
/// if every stream is empty the result is empty.
pub fn schedule<T>(streams: Vec<Stream<T>>) -> Result<GlobalOrder<T>> {
    let (mut lanes, counts) = prepare(streams)?;
    let total: usize = counts.iter().sum();
    if total == 0 {
        return Ok(GlobalOrder::empty(counts));
    }

    let mut heap: BinaryHeap<Reverse<Cursor>> = lanes
        .iter()
        .enumerate()
        .filter(|(_, lane)| !lane.is_exhausted())
        .map(|(stream, lane)| {
            Reverse(Cursor {
                consumed: 0,
                count: lane.count,
                stream,
            })
        })
        .collect();

    let mut placements = Vec::with_capacity(total);
    for rank in 0..total {
        let Some(Reverse(mut cursor)) = heap.pop() else {
            break;
        };
        let Some(item) = lanes[cursor.stream].items.next() else {
            break;
        };

        placements.push(Placement {
            item,
            rank,
            stream: cursor.stream,
        });

        cursor.consumed += 1;
        if cursor.consumed < cursor.count {
            heap.push(Reverse(cursor));
        }
    }
    debug_assert_eq!(placements.len(), total);

    Ok(GlobalOrder {
        placements,
        stream_counts: counts,
    })
}

/// Reference scheduler: rescans every stream's lag score at every step.
///
/// Same contract and output as [`schedule`], in `O(total * streams)`.
pub fn schedule_naive<T>(streams: Vec<Stream<T>>) -> Result<GlobalOrder<T>> {
    let (mut lanes, counts) = prepare(streams)?;
    let total: usize = counts.iter().sum();
    if total == 0 {
        return Ok(GlobalOrder::empty(counts));
    }

    let mut placements = Vec::with_capacity(total);
    for rank in 0..total {
        let mut best: Option<(usize, LagScore)> = None;
        for (stream, lane) in lanes.iter().enumerate() {
            if lane.is_exhausted() {
                continue;
            }
            let score = LagScore::new(lane.consumed(), lane.count, rank, total);
            // Strict comparison keeps the earliest stream on ties
            if best.map_or(true, |(_, best_score)| score < best_score) {
                best = Some((stream, score));
            }
        }

        let Some((stream, _)) = best else {
            break;
        };
        let Some(item) = lanes[stream].items.next() else {
            break;
        };
        placements.push(Placement { item, rank, stream });
    }
    debug_assert_eq!(placements.len(), total);

    Ok(GlobalOrder {
        placements,
        stream_counts: counts,
    })
}
