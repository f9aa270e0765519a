use std::collections::VecDeque;
use std::ops::Range;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::config::{FilterConfig, Schedule};

/// Default block size, in samples, of reductions claimed one block at a time.
pub const DEFAULT_SAMPLE_CHUNK: usize = 4096;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The schedule name is not recognized.
    #[error("unknown schedule: {0}")]
    UnknownSchedule(String),
}

/// Split `len` items into contiguous, ordered blocks for the given schedule.
///
/// The returned ranges cover `0..len` exactly once and are sorted by start.
///
/// * `Static` without a chunk hint yields one block per worker, the first
///   `len % workers` blocks holding one extra item. With a chunk hint it yields
///   chunk-sized blocks.
/// * `Dynamic` yields chunk-sized blocks (chunk defaults to 1).
/// * `Guided` yields blocks of `max(ceil(remaining / workers), chunk)` items,
///   so block sizes never increase.
///
/// # Example
///
/// ```
/// use parfilter_imgproc::config::Schedule;
/// use parfilter_imgproc::parallel::partition;
///
/// assert_eq!(partition(Schedule::Static, 10, 3, 0), vec![0..4, 4..7, 7..10]);
/// assert_eq!(partition(Schedule::Dynamic, 5, 3, 2), vec![0..2, 2..4, 4..5]);
/// assert_eq!(partition(Schedule::Guided, 10, 2, 0), vec![0..5, 5..8, 8..9, 9..10]);
/// ```
pub fn partition(
    schedule: Schedule,
    len: usize,
    workers: usize,
    chunk_size: usize,
) -> Vec<Range<usize>> {
    let workers = workers.max(1);

    match (schedule, chunk_size) {
        (Schedule::Static, 0) => {
            let base = len / workers;
            let extra = len % workers;
            let mut start = 0;
            (0..workers)
                .map(|w| {
                    let size = base + usize::from(w < extra);
                    let block = start..start + size;
                    start += size;
                    block
                })
                .filter(|block| !block.is_empty())
                .collect()
        }
        (Schedule::Static, chunk) | (Schedule::Dynamic, chunk) => {
            let chunk = chunk.max(1);
            (0..len)
                .step_by(chunk)
                .map(|start| start..(start + chunk).min(len))
                .collect()
        }
        (Schedule::Guided, chunk) => {
            let min_chunk = chunk.max(1);
            let mut blocks = Vec::new();
            let mut start = 0;
            while start < len {
                let remaining = len - start;
                let size = remaining.div_ceil(workers).max(min_chunk).min(remaining);
                blocks.push(start..start + size);
                start += size;
            }
            blocks
        }
    }
}

/// Split `data` into one mutable sub-slice per block.
///
/// `blocks` must be contiguous and ordered starting at zero, as returned by
/// [`partition`]; each item spans `stride` elements of `data`.
pub fn split_blocks<'a, T>(
    mut data: &'a mut [T],
    blocks: Vec<Range<usize>>,
    stride: usize,
) -> Vec<(Range<usize>, &'a mut [T])> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        let (head, tail) = std::mem::take(&mut data).split_at_mut(block.len() * stride);
        out.push((block, head));
        data = tail;
    }
    out
}

/// The set of workers used for a single parallel call.
///
/// With `num_threads == 0` the global rayon pool is used, otherwise a local pool
/// with exactly `num_threads` threads lives for the duration of the call.
pub enum WorkerPool {
    /// The global rayon thread pool.
    Global,
    /// A dedicated thread pool.
    Local(rayon::ThreadPool),
}

impl WorkerPool {
    /// Create the pool described by `num_threads`.
    pub fn new(num_threads: usize) -> Result<Self, ParallelError> {
        if num_threads == 0 {
            return Ok(WorkerPool::Global);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| ParallelError::BuildError(e.to_string()))?;

        Ok(WorkerPool::Local(pool))
    }

    /// Number of workers in the pool.
    pub fn num_workers(&self) -> usize {
        match self {
            WorkerPool::Global => rayon::current_num_threads(),
            WorkerPool::Local(pool) => pool.current_num_threads(),
        }
    }

    fn scope<'scope, OP>(&self, op: OP)
    where
        OP: FnOnce(&rayon::Scope<'scope>) + Send,
    {
        match self {
            WorkerPool::Global => rayon::scope(op),
            WorkerPool::Local(pool) => pool.scope(op),
        }
    }

    /// Run `work` over every block, forking one task per worker and joining
    /// before returning.
    ///
    /// Each worker builds private state with `init`, feeds it every block it
    /// receives, then hands it to `finish` exactly once. With
    /// [`Schedule::Static`] blocks are dealt round-robin up front; otherwise
    /// workers pop the next block, in order, from a shared queue.
    pub fn dispatch<B, S, I, W, F>(
        &self,
        schedule: Schedule,
        blocks: Vec<B>,
        init: I,
        work: W,
        finish: F,
    ) where
        B: Send,
        I: Fn() -> S + Sync,
        W: Fn(&mut S, B) + Sync,
        F: Fn(S) + Sync,
    {
        let workers = self.num_workers().min(blocks.len());
        if workers == 0 {
            return;
        }

        log::debug!(
            "dispatching {} blocks to {} workers ({})",
            blocks.len(),
            workers,
            schedule
        );

        let (init, work, finish) = (&init, &work, &finish);

        match schedule {
            Schedule::Static => {
                let mut assigned: Vec<Vec<B>> = (0..workers).map(|_| Vec::new()).collect();
                for (i, block) in blocks.into_iter().enumerate() {
                    assigned[i % workers].push(block);
                }

                self.scope(|s| {
                    for mine in assigned {
                        s.spawn(move |_| {
                            let mut state = init();
                            for block in mine {
                                work(&mut state, block);
                            }
                            finish(state);
                        });
                    }
                });
            }
            Schedule::Dynamic | Schedule::Guided => {
                // blocks own `&mut` sub-slices, so claiming one moves it out of a single queue
                let queue = Mutex::new(blocks.into_iter().collect::<VecDeque<B>>());
                let queue = &queue;

                self.scope(|s| {
                    for _ in 0..workers {
                        s.spawn(move |_| {
                            let mut state = init();
                            loop {
                                let next = queue
                                    .lock()
                                    .unwrap_or_else(PoisonError::into_inner)
                                    .pop_front();
                                let Some(block) = next else {
                                    break;
                                };
                                work(&mut state, block);
                            }
                            finish(state);
                        });
                    }
                });
            }
        }
    }
}

/// Apply `f` to disjoint blocks of rows of `dst` in parallel.
///
/// `dst` is viewed as rows of `row_stride` elements. The rows are partitioned
/// according to `config` and every block is visited exactly once with its row
/// range and the matching mutable sub-slice.
///
/// # Example
///
/// ```
/// use parfilter_imgproc::config::{FilterConfig, Schedule};
/// use parfilter_imgproc::parallel::par_iter_row_blocks;
///
/// let mut dst = vec![0u8; 4 * 3];
/// let config = FilterConfig::new().with_num_threads(2).with_schedule(Schedule::Dynamic);
///
/// par_iter_row_blocks(&config, &mut dst, 3, |rows, block| {
///     for (y, row) in rows.zip(block.chunks_exact_mut(3)) {
///         row.fill(y as u8);
///     }
/// })
/// .unwrap();
///
/// assert_eq!(dst, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
/// ```
pub fn par_iter_row_blocks<T, F>(
    config: &FilterConfig,
    dst: &mut [T],
    row_stride: usize,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(Range<usize>, &mut [T]) + Sync,
{
    if row_stride == 0 {
        return Ok(());
    }

    let pool = WorkerPool::new(config.num_threads)?;
    let rows = dst.len() / row_stride;
    let ranges = partition(config.schedule, rows, pool.num_workers(), config.chunk_size);
    let blocks = split_blocks(dst, ranges, row_stride);

    pool.dispatch(
        config.schedule,
        blocks,
        || (),
        |_, (rows, block)| f(rows, block),
        |_| {},
    );

    Ok(())
}

/// Fold blocks of `len` samples into private per-worker accumulators and
/// merge each accumulator into `shared` under its mutex, once per worker.
///
/// `config.chunk_size` counts samples here. Without a hint, static splits
/// `len` evenly between the workers while dynamic and guided use
/// [`DEFAULT_SAMPLE_CHUNK`] as the block size floor.
///
/// The merge must be commutative and associative for the result to be
/// independent of the worker count and the merge order.
pub fn par_fold_samples<S, R, I, W, M>(
    config: &FilterConfig,
    len: usize,
    shared: &Mutex<R>,
    init: I,
    fold: W,
    merge: M,
) -> Result<(), ParallelError>
where
    R: Send,
    I: Fn() -> S + Sync,
    W: Fn(&mut S, Range<usize>) + Sync,
    M: Fn(&mut R, S) + Sync,
{
    let chunk_size = match (config.schedule, config.chunk_size) {
        (Schedule::Dynamic | Schedule::Guided, 0) => DEFAULT_SAMPLE_CHUNK,
        (_, chunk) => chunk,
    };

    let pool = WorkerPool::new(config.num_threads)?;
    let blocks = partition(config.schedule, len, pool.num_workers(), chunk_size);

    pool.dispatch(config.schedule, blocks, init, fold, |local| {
        let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
        merge(&mut *guard, local);
    });

    Ok(())
}
